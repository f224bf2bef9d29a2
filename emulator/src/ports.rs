use crate::interrupt::InterruptController;
use crate::io::console::ConsolePort;
use crate::io::timer::Timer;
use crate::io::{PortDevice, PortReg};

use common::constants::{BUS_FLOAT_BYTE, BUS_FLOAT_WORD};
use common::misc::IsEven;
use log::trace;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("word access to odd port {port:#x}")]
    Misaligned { port: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortTarget {
    Timer(PortReg),
    Int(PortReg),
    Console(PortReg),
    Delay,
}

// Fixed port assignments of one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMap {
    table: Vec<(u16, PortTarget)>,
}

impl PortMap {
    pub fn new(
        timer: (u16, u16), // (ctrl, data)
        int: (u16, u16),
        console: (u16, u16),
        delay: u16,
    ) -> Self {
        let table = vec![
            (timer.0, PortTarget::Timer(PortReg::Ctrl)),
            (timer.1, PortTarget::Timer(PortReg::Data)),
            (int.0, PortTarget::Int(PortReg::Ctrl)),
            (int.1, PortTarget::Int(PortReg::Data)),
            (console.0, PortTarget::Console(PortReg::Ctrl)),
            (console.1, PortTarget::Console(PortReg::Data)),
            (delay, PortTarget::Delay),
        ];
        for (i, (port, _)) in table.iter().enumerate() {
            assert!(
                table[i + 1..].iter().all(|(other, _)| other != port),
                "Port {port:#x} mapped twice"
            );
        }
        PortMap { table }
    }

    pub fn route(&self, port: u16) -> Option<PortTarget> {
        self.table
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, target)| *target)
    }
}

// Everything reachable through the port space.
pub struct Devices {
    pub pic: InterruptController,
    pub timer: Timer,
    pub console: ConsolePort,
}

impl Devices {
    pub fn reset(&mut self) {
        PortDevice::reset(&mut self.pic);
        PortDevice::reset(&mut self.timer);
        PortDevice::reset(&mut self.console);
    }
}

// Routes port accesses to devices. Holds no state besides the wiring.
pub struct PortDispatcher {
    map: PortMap,
}

impl PortDispatcher {
    pub fn new(map: PortMap) -> Self {
        PortDispatcher { map }
    }

    pub fn map(&self) -> &PortMap {
        &self.map
    }

    // None for the delay port and unmapped ports.
    fn device<'a>(&self, devs: &'a mut Devices, port: u16) -> Option<(&'a mut dyn PortDevice, PortReg)> {
        let dev: (&mut dyn PortDevice, PortReg) = match self.map.route(port)? {
            PortTarget::Timer(reg) => (&mut devs.timer as &mut dyn PortDevice, reg),
            PortTarget::Int(reg) => (&mut devs.pic as &mut dyn PortDevice, reg),
            PortTarget::Console(reg) => (&mut devs.console as &mut dyn PortDevice, reg),
            PortTarget::Delay => return None,
        };
        Some(dev)
    }

    pub fn read_byte(&self, devs: &mut Devices, port: u16) -> u8 {
        let val = match self.device(devs, port) {
            Some((dev, reg)) => dev.read_byte(reg),
            None => BUS_FLOAT_BYTE,
        };
        trace!("[ INB {port:3x}h AL {val:02x}h]");
        val
    }

    pub fn write_byte(&self, devs: &mut Devices, port: u16, val: u8) {
        trace!("[OUTB {port:3x}h AL {val:02x}h]");
        if let Some((dev, reg)) = self.device(devs, port) {
            dev.write_byte(reg, val);
        }
    }

    pub fn read_word(&self, devs: &mut Devices, port: u16) -> Result<u16, PortError> {
        if !port.is_even() {
            return Err(PortError::Misaligned { port });
        }
        let val = match self.device(devs, port) {
            Some((dev, reg)) => dev.read_word(reg),
            None => BUS_FLOAT_WORD,
        };
        trace!("[ INW {port:3x}h AX {val:04x}h]");
        Ok(val)
    }

    pub fn write_word(&self, devs: &mut Devices, port: u16, val: u16) -> Result<(), PortError> {
        if !port.is_even() {
            return Err(PortError::Misaligned { port });
        }
        trace!("[OUTW {port:3x}h AX {val:04x}h]");
        if let Some((dev, reg)) = self.device(devs, port) {
            dev.write_word(reg, val);
        }
        Ok(())
    }
}
