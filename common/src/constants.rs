// 8086 physical address space: 20 address lines.
pub const MEM_MAX: u32 = 0x100000; // Exclusive, bytes

pub const WORD_SIZE: u32 = 2; // Bytes

// Default ROM cutoffs. Everything at or above is write protected.
pub const SOLO86_ROM_BASE: u32 = 0x80000;
pub const PCXTAT_ROM_BASE: u32 = 0xF0000;

pub const INT_LINE_MAX: usize = 8;

// What a floating data bus reads as.
pub const BUS_FLOAT_BYTE: u8 = 0xFF;
pub const BUS_FLOAT_WORD: u16 = 0xFFFF;

// Tick thresholds for the timer device.
pub const TIMER_MAX_SOLO86: u32 = 3_000;
pub const TIMER_MAX_PCXTAT: u32 = 20_000;
pub const TIMER_MAX_INTERACTIVE: u32 = 3_000;
pub const TIMER_MAX_FAST: u32 = 1_500;
