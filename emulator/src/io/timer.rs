use crate::interrupt::InterruptController;
use crate::io::{PortDevice, PortReg};

use common::constants::BUS_FLOAT_BYTE;
use log::debug;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

// Control words understood on the control port, as an 8253 counter 0 would
// be programmed by the BIOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum TimerCmd {
    Stop = 0x30,  // Counter 0, binary count, mode 0
    Start = 0x34, // Counter 0, binary count, mode 2
}

// Free running tick counter raising its interrupt line every `max` ticks.
pub struct Timer {
    line: usize,
    max: u32,
    enabled_at_reset: bool,
    enabled: bool,
    count: u32,
}

impl Timer {
    pub fn new(line: usize, max: u32, enabled: bool) -> Self {
        assert!(max > 0, "Timer threshold must be positive");
        Timer {
            line,
            max,
            enabled_at_reset: enabled,
            enabled,
            count: 0,
        }
    }

    // Called once per emulated time quantum.
    pub fn tick(&mut self, pic: &mut InterruptController) {
        if self.enabled {
            self.count += 1;
            if self.count >= self.max {
                self.count = 0;
                pic.set_line(self.line, true);
                return;
            }
        }
        pic.set_line(self.line, false);
    }

    pub fn handle_control_write(&mut self, val: u8) {
        match TimerCmd::from_u8(val) {
            Some(TimerCmd::Start) => {
                debug!("Timer: start");
                self.enabled = true;
            }
            Some(TimerCmd::Stop) => {
                debug!("Timer: stop");
                self.enabled = false;
                self.count = 0;
            }
            None => debug!("Timer: ignoring control word {val:#04x}"),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

impl PortDevice for Timer {
    fn reset(&mut self) {
        self.enabled = self.enabled_at_reset;
        self.count = 0;
    }

    fn read_byte(&mut self, _: PortReg) -> u8 {
        BUS_FLOAT_BYTE
    }

    fn write_byte(&mut self, reg: PortReg, val: u8) {
        match reg {
            PortReg::Ctrl => self.handle_control_write(val),
            PortReg::Data => (),
        }
    }
}
