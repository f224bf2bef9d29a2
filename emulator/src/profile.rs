use crate::interrupt::{LineConfig, Trigger};
use crate::ports::PortMap;

use common::constants::*;

// Board description. Everything that differs between targets lives here.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: &'static str,
    pub rom_base: u32,
    pub ports: PortMap,
    pub lines: Vec<LineConfig>,
    pub timer_line: usize,
    pub timer_max: u32,
    pub timer_enabled: bool,
}

impl Profile {
    pub const INT_LINE_TIMER: usize = 0;
    const DELAY_PORT: u16 = 0x80;

    // All edge triggered, fixed priorities, only the timer unmasked.
    fn edge_lines(vector_base: u8) -> Vec<LineConfig> {
        (0..INT_LINE_MAX as u8)
            .map(|i| LineConfig {
                trigger: Trigger::Edge,
                prio: i,
                vector: vector_base + i,
                masked: i as usize != Self::INT_LINE_TIMER,
            })
            .collect()
    }

    pub fn solo86() -> Self {
        Profile {
            name: "solo86",
            rom_base: SOLO86_ROM_BASE,
            ports: PortMap::new((0x06, 0x00), (0x18, 0x1A), (0x20, 0x22), Self::DELAY_PORT),
            lines: Self::edge_lines(0x20),
            timer_line: Self::INT_LINE_TIMER,
            timer_max: TIMER_MAX_SOLO86,
            timer_enabled: true,
        }
    }

    // The console sits on COM1. The 8259 takes its EOI on 20h and its mask
    // on 21h, so 20h is the data (EOI) role here.
    pub fn pcxtat() -> Self {
        Profile {
            name: "pcxtat",
            rom_base: PCXTAT_ROM_BASE,
            ports: PortMap::new((0x43, 0x40), (0x21, 0x20), (0x3FD, 0x3F8), Self::DELAY_PORT),
            lines: Self::edge_lines(0x08),
            timer_line: Self::INT_LINE_TIMER,
            timer_max: TIMER_MAX_PCXTAT,
            timer_enabled: true,
        }
    }

    pub fn with_timer_max(mut self, max: u32) -> Self {
        self.timer_max = max;
        self
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::solo86()
    }
}
