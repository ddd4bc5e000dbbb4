//! 6502 processor status register (P) flag bits.
//!
//! Bits 4 (B) and 5 don't exist in the register itself; they only appear in copies pushed to
//! the stack. See [Status flags](https://www.nesdev.org/wiki/Status_flags).

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // Settable, but the 2A03 has no BCD mode
pub const FLAG_BREAK: u8 = 1 << 4; // Set in PHP / BRK stack copies
pub const FLAG_UNUSED: u8 = 1 << 5; // Always 1 when read on 6502
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

/// Byte pushed for P. `brk` is true for PHP/BRK, false for NMI/IRQ.
pub fn status_for_push(status: u8, brk: bool) -> u8 {
    let pushed = status | FLAG_UNUSED;
    if brk {
        pushed | FLAG_BREAK
    } else {
        pushed & !FLAG_BREAK
    }
}

/// Value loaded into P by PLP/RTI: B dropped, bit 5 forced.
pub fn status_from_pull(value: u8) -> u8 {
    (value & !FLAG_BREAK) | FLAG_UNUSED
}
