use common::constants::{MEM_MAX, WORD_SIZE};

use bytemuck::pod_read_unaligned;
use derive_more::Display;
use log::{error, trace, warn};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Size {
    #[display(fmt = "byte")]
    Byte,
    #[display(fmt = "word")]
    Word,
}

impl Size {
    pub fn bytes(self) -> u32 {
        match self {
            Size::Byte => 1,
            Size::Word => WORD_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemError {
    // Fatal: the CPU loop computed an address outside the machine.
    #[error("accessing out of memory @ {addr:X}h")]
    OutOfRange { addr: u32 },

    #[error("writing {size} into ROM @ {addr:X}h")]
    RomWrite { addr: u32, size: Size },
}

impl MemError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, MemError::OutOfRange { .. })
    }
}

// Flat address space plus the per-address bookkeeping the CPU loop relies on.
pub struct Memory {
    mem: Vec<u8>,
    // Set once an address has been written since the last reset.
    init_stat: Vec<bool>,
    // Set while an address holds a decoded instruction.
    code_stat: Vec<bool>,
    rom_base: u32,
    break_addr: Option<u32>,
    break_hit: bool,
}

impl Memory {
    // Uninitialized memory reads as all ones.
    const UNINIT: u8 = 0xFF;

    pub fn new(rom_base: u32) -> Self {
        assert!(rom_base <= MEM_MAX, "ROM base {rom_base:X}h outside memory");
        Memory {
            mem: vec![Self::UNINIT; MEM_MAX as usize],
            init_stat: vec![false; MEM_MAX as usize],
            code_stat: vec![false; MEM_MAX as usize],
            rom_base,
            break_addr: None,
            break_hit: false,
        }
    }

    pub fn reset(&mut self) {
        self.mem.fill(Self::UNINIT);
        self.init_stat.fill(false);
        self.code_stat.fill(false);
        self.break_hit = false;
    }

    // Resolves an access of `size` at `addr` to an index, noting a breakpoint hit.
    fn resolve(&mut self, addr: u32, size: Size) -> Result<usize, MemError> {
        let end = addr.checked_add(size.bytes()).unwrap_or(u32::MAX);
        if end > MEM_MAX {
            let err = MemError::OutOfRange { addr };
            error!("Mem: {err}");
            return Err(err);
        }

        if self.break_addr == Some(addr) {
            trace!("Mem: data breakpoint hit @ {addr:X}h");
            self.break_hit = true;
        }

        Ok(addr as usize)
    }

    pub fn read_byte(&mut self, addr: u32) -> Result<u8, MemError> {
        let idx = self.resolve(addr, Size::Byte)?;
        Ok(self.mem[idx])
    }

    pub fn read_word(&mut self, addr: u32) -> Result<u16, MemError> {
        let idx = self.resolve(addr, Size::Word)?;
        let raw: u16 = pod_read_unaligned(&self.mem[idx..idx + 2]);
        Ok(u16::from_le(raw))
    }

    pub fn write_byte(&mut self, addr: u32, val: u8, init: bool) -> Result<(), MemError> {
        let idx = self.resolve(addr, Size::Byte)?;

        // Any write attempt invalidates decoded state, even a rejected one.
        self.code_stat[idx] = false;

        if addr >= self.rom_base && !init {
            let err = MemError::RomWrite { addr, size: Size::Byte };
            warn!("Mem: {err}");
            return Err(err);
        }

        trace!("Mem: writing {val:#04x} to {addr:05X}h (byte)");
        self.mem[idx] = val;
        self.init_stat[idx] = true;
        Ok(())
    }

    pub fn write_word(&mut self, addr: u32, val: u16, init: bool) -> Result<(), MemError> {
        let idx = self.resolve(addr, Size::Word)?;

        self.code_stat[idx] = false;
        self.code_stat[idx + 1] = false;

        // The upper byte of a word just below the boundary lands in ROM.
        if addr >= self.rom_base.saturating_sub(1) && !init {
            let err = MemError::RomWrite { addr, size: Size::Word };
            warn!("Mem: {err}");
            return Err(err);
        }

        trace!("Mem: writing {val:#06x} to {addr:05X}h (word)");
        self.mem[idx..idx + 2].copy_from_slice(&val.to_le_bytes());
        self.init_stat[idx] = true;
        self.init_stat[idx + 1] = true;
        Ok(())
    }

    // Writes with the init capability, e.g. to place a ROM image.
    pub fn load_image(&mut self, data: &[u8], start: u32) -> Result<(), MemError> {
        for (offset, byte) in data.iter().enumerate() {
            let addr = start
                .checked_add(offset as u32)
                .ok_or(MemError::OutOfRange { addr: u32::MAX })?;
            self.write_byte(addr, *byte, true)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self, addr: u32) -> bool {
        self.init_stat.get(addr as usize).copied().unwrap_or(false)
    }

    pub fn mark_code(&mut self, addr: u32) -> Result<(), MemError> {
        if addr >= MEM_MAX {
            return Err(MemError::OutOfRange { addr });
        }
        self.code_stat[addr as usize] = true;
        Ok(())
    }

    pub fn is_code(&self, addr: u32) -> bool {
        self.code_stat.get(addr as usize).copied().unwrap_or(false)
    }

    ///////////////////////////////////////////////////////////////////////////
    // Data breakpoint
    ///////////////////////////////////////////////////////////////////////////

    pub fn set_breakpoint(&mut self, addr: Option<u32>) {
        self.break_addr = addr;
        self.break_hit = false;
    }

    pub fn breakpoint(&self) -> Option<u32> {
        self.break_addr
    }

    pub fn breakpoint_hit(&self) -> bool {
        self.break_hit
    }

    // Returns whether the breakpoint was hit, clearing the flag.
    pub fn take_breakpoint_hit(&mut self) -> bool {
        std::mem::take(&mut self.break_hit)
    }
}
