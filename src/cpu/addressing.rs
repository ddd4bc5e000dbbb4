//! 6502 addressing modes and effective-address resolution.
//!
//! See [CPU addressing modes](https://www.nesdev.org/wiki/CPU_addressing_modes). Zero-page
//! indexing and zero-page pointers wrap inside page zero; `JMP ($xxFF)` fetches its high byte
//! from `$xx00`.

use crate::{bus::Bus, cpu::cpu::CPU};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub fn operand_len(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

/// Where an instruction's data lives once its addressing mode is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    /// Effective address. For `Immediate` this is the operand byte's own address; for
    /// `Relative` it is the branch target.
    Memory(u16),
}

fn crosses_page(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

impl<B: Bus> CPU<B> {
    /// Consume the operand bytes for `mode` and return the operand plus whether indexing
    /// (or a relative branch) crossed a page boundary.
    pub(crate) fn resolve(&mut self, mode: AddressingMode) -> (Operand, bool) {
        match mode {
            AddressingMode::Implied => (Operand::Implied, false),
            AddressingMode::Accumulator => (Operand::Accumulator, false),
            AddressingMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (Operand::Memory(addr), false)
            }
            AddressingMode::ZeroPage => (Operand::Memory(self.fetch_byte() as u16), false),
            AddressingMode::ZeroPageX => {
                let base = self.fetch_byte();
                (Operand::Memory(base.wrapping_add(self.x) as u16), false)
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch_byte();
                (Operand::Memory(base.wrapping_add(self.y) as u16), false)
            }
            AddressingMode::Absolute => (Operand::Memory(self.fetch_word()), false),
            AddressingMode::AbsoluteX => {
                let base = self.fetch_word();
                let addr = base.wrapping_add(self.x as u16);
                (Operand::Memory(addr), crosses_page(base, addr))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch_word();
                let addr = base.wrapping_add(self.y as u16);
                (Operand::Memory(addr), crosses_page(base, addr))
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word();
                // Hardware bug: the pointer's high byte never carries into the next page
                let hi_ptr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let lo = self.bus.read(ptr) as u16;
                let hi = self.bus.read(hi_ptr) as u16;
                (Operand::Memory((hi << 8) | lo), false)
            }
            AddressingMode::IndirectX => {
                let ptr = self.fetch_byte().wrapping_add(self.x);
                (Operand::Memory(self.read_zero_page_word(ptr)), false)
            }
            AddressingMode::IndirectY => {
                let ptr = self.fetch_byte();
                let base = self.read_zero_page_word(ptr);
                let addr = base.wrapping_add(self.y as u16);
                (Operand::Memory(addr), crosses_page(base, addr))
            }
            AddressingMode::Relative => {
                let offset = self.fetch_byte() as i8;
                let target = self.pc.wrapping_add(offset as u16);
                (Operand::Memory(target), crosses_page(self.pc, target))
            }
        }
    }

    fn read_zero_page_word(&mut self, ptr: u8) -> u16 {
        let lo = self.bus.read(ptr as u16) as u16;
        let hi = self.bus.read(ptr.wrapping_add(1) as u16) as u16;
        (hi << 8) | lo
    }
}
