use crate::interrupt::InterruptController;
use crate::io::console::{Console, ConsolePort};
use crate::io::timer::Timer;
use crate::memory::{MemError, Memory};
use crate::ports::{Devices, PortDispatcher, PortError, PortMap};
use crate::profile::Profile;

use std::sync::Arc;

use delegate::delegate;
use log::{debug, error};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmuError {
    #[error(transparent)]
    Mem(#[from] MemError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl EmuError {
    pub fn is_fatal(&self) -> bool {
        match self {
            EmuError::Mem(e) => e.is_fatal(),
            EmuError::Port(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecRet {
    Ok,
    Halt,
    // Idle until an interrupt is taken.
    Wait,
    // The data breakpoint address was touched.
    Break(u32),
}

// The instruction executor driven by `Machine`. It reaches memory and ports
// only through the machine it is handed.
pub trait Cpu {
    fn interrupts_enabled(&self) -> bool {
        true
    }

    // Enter the handler for `vector`.
    fn interrupt(&mut self, machine: &mut Machine, vector: u8) -> Result<(), EmuError>;

    // Execute one instruction.
    fn exec(&mut self, machine: &mut Machine) -> Result<ExecRet, EmuError>;
}

pub struct Machine {
    name: &'static str,
    memory: Memory,
    devices: Devices,
    ports: PortDispatcher,
    num_ins: usize,
    waiting: bool,
}

impl Machine {
    // Host events are polled this often, in instructions.
    pub const CONSOLE_PUMP_INTERVAL: usize = 1_000;

    pub fn new(profile: Profile, console: Arc<dyn Console>) -> Self {
        assert!(
            profile.timer_line < profile.lines.len(),
            "Timer line {} not wired",
            profile.timer_line
        );

        Machine {
            name: profile.name,
            memory: Memory::new(profile.rom_base),
            devices: Devices {
                pic: InterruptController::new(&profile.lines),
                timer: Timer::new(profile.timer_line, profile.timer_max, profile.timer_enabled),
                console: ConsolePort::new(console),
            },
            ports: PortDispatcher::new(profile.ports),
            num_ins: 0,
            waiting: false,
        }
    }

    pub fn reset(&mut self) {
        debug!("Machine: reset ({})", self.name);
        self.memory.reset();
        self.devices.reset();
        self.num_ins = 0;
        self.waiting = false;
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn num_ins(&self) -> usize {
        self.num_ins
    }

    delegate! {
        to self.memory {
            #[call(read_byte)]
            pub fn mem_read_byte(&mut self, addr: u32) -> Result<u8, MemError>;
            #[call(read_word)]
            pub fn mem_read_word(&mut self, addr: u32) -> Result<u16, MemError>;
            #[call(write_byte)]
            pub fn mem_write_byte(&mut self, addr: u32, val: u8, init: bool) -> Result<(), MemError>;
            #[call(write_word)]
            pub fn mem_write_word(&mut self, addr: u32, val: u16, init: bool) -> Result<(), MemError>;
            pub fn load_image(&mut self, data: &[u8], start: u32) -> Result<(), MemError>;
            pub fn set_breakpoint(&mut self, addr: Option<u32>);
        }
    }

    pub fn io_read_byte(&mut self, port: u16) -> u8 {
        self.ports.read_byte(&mut self.devices, port)
    }

    pub fn io_write_byte(&mut self, port: u16, val: u8) {
        self.ports.write_byte(&mut self.devices, port, val)
    }

    pub fn io_read_word(&mut self, port: u16) -> Result<u16, PortError> {
        self.ports.read_word(&mut self.devices, port)
    }

    pub fn io_write_word(&mut self, port: u16, val: u16) -> Result<(), PortError> {
        self.ports.write_word(&mut self.devices, port, val)
    }

    pub fn tick(&mut self) {
        self.devices.timer.tick(&mut self.devices.pic);
    }

    // Runs one instruction boundary: time passes, a pending interrupt may be
    // taken, then the CPU gets to execute.
    pub fn step(&mut self, cpu: &mut impl Cpu) -> Result<ExecRet, EmuError> {
        self.num_ins += 1;
        self.tick();

        if self.num_ins % Self::CONSOLE_PUMP_INTERVAL == 0 {
            self.devices.console.pump();
        }

        if cpu.interrupts_enabled() {
            if let Some(line) = self.devices.pic.highest_pending() {
                let vector = self.devices.pic.acknowledge(line);
                self.waiting = false;
                cpu.interrupt(self, vector)?;
            }
        }

        let ret = if self.waiting {
            ExecRet::Wait
        } else {
            cpu.exec(self)?
        };
        if ret == ExecRet::Wait {
            self.waiting = true;
        }

        if self.memory.take_breakpoint_hit() {
            // Set whenever the flag is.
            let addr = self.memory.breakpoint().unwrap_or_default();
            debug!("Machine: data breakpoint @ {addr:X}h");
            return Ok(ExecRet::Break(addr));
        }

        Ok(ret)
    }

    // Run until a halt, a breakpoint or a fatal error.
    pub fn run(&mut self, cpu: &mut impl Cpu) -> Result<ExecRet, EmuError> {
        loop {
            match self.step(cpu) {
                Ok(ExecRet::Ok | ExecRet::Wait) => (),
                Ok(ret) => return Ok(ret),
                Err(e) if !e.is_fatal() => {
                    debug!("Machine: continuing after {e}");
                }
                Err(e) => {
                    error!("fatal: {e}");
                    return Err(e);
                }
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn pic(&self) -> &InterruptController {
        &self.devices.pic
    }

    pub fn pic_mut(&mut self) -> &mut InterruptController {
        &mut self.devices.pic
    }

    pub fn timer(&self) -> &Timer {
        &self.devices.timer
    }

    pub fn console(&self) -> &ConsolePort {
        &self.devices.console
    }

    pub fn console_mut(&mut self) -> &mut ConsolePort {
        &mut self.devices.console
    }

    pub fn port_map(&self) -> &PortMap {
        self.ports.map()
    }
}
