pub mod console;
pub mod timer;

use crate::interrupt::InterruptController;

use common::constants::BUS_FLOAT_BYTE;
use log::trace;

// Register of a device as seen through the port map. Port numbers differ
// between boards, so devices only ever see the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortReg {
    Ctrl,
    Data,
}

pub trait PortDevice {
    fn reset(&mut self) {}

    fn read_byte(&mut self, reg: PortReg) -> u8;
    fn write_byte(&mut self, reg: PortReg, val: u8);

    // Devices are 8 bits wide; the upper half of a word floats to zero.
    fn read_word(&mut self, reg: PortReg) -> u16 {
        self.read_byte(reg) as u16
    }

    fn write_word(&mut self, reg: PortReg, val: u16) {
        self.write_byte(reg, val as u8);
    }
}

// The controller's own ports. Both registers are write only.
impl PortDevice for InterruptController {
    fn reset(&mut self) {
        InterruptController::reset(self);
    }

    fn read_byte(&mut self, _: PortReg) -> u8 {
        BUS_FLOAT_BYTE
    }

    fn write_byte(&mut self, reg: PortReg, val: u8) {
        match reg {
            // Reserved
            PortReg::Ctrl => trace!("Int: ignoring control write {val:#04x}"),
            PortReg::Data => self.end_of_service(),
        }
    }
}
