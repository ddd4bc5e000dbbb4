//! 256-entry opcode table: instruction, addressing mode, base cycles, page-cross penalty.
//!
//! Covers every official opcode plus the stable undocumented ones that test ROMs and a few
//! games rely on ([CPU unofficial opcodes](https://www.nesdev.org/wiki/CPU_unofficial_opcodes)).
//! `None` entries (KIL/JAM and the unstable opcodes) are fatal when executed.

use crate::cpu::addressing::AddressingMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    ADC, AND, ASL, BCC, BCS, BEQ, BIT, BMI, BNE, BPL, BRK, BVC, BVS, CLC,
    CLD, CLI, CLV, CMP, CPX, CPY, DEC, DEX, DEY, EOR, INC, INX, INY, JMP,
    JSR, LDA, LDX, LDY, LSR, NOP, ORA, PHA, PHP, PLA, PLP, ROL, ROR, RTI,
    RTS, SBC, SEC, SED, SEI, STA, STX, STY, TAX, TAY, TSX, TXA, TXS, TYA,
    // Undocumented
    LAX, SAX, DCP, ISC, SLO, RLA, SRE, RRA,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub instruction: Instruction,
    pub mode: AddressingMode,
    /// Cycles before page-cross and branch penalties.
    pub cycles: u8,
    /// Charges +1 when indexing crosses a page (read instructions only).
    pub page_penalty: bool,
}

pub static OPCODE_TABLE: [Option<Opcode>; 256] = build_table();

const fn op(instruction: Instruction, mode: AddressingMode, cycles: u8) -> Option<Opcode> {
    Some(Opcode { instruction, mode, cycles, page_penalty: false })
}

const fn op_p(instruction: Instruction, mode: AddressingMode, cycles: u8) -> Option<Opcode> {
    Some(Opcode { instruction, mode, cycles, page_penalty: true })
}

/// Read-type column (`aaa bbb 01`): ORA AND EOR ADC LDA CMP SBC.
const fn read_group(t: &mut [Option<Opcode>; 256], base: usize, ins: Instruction) {
    use AddressingMode::*;
    t[base | 0x09] = op(ins, Immediate, 2);
    t[base | 0x05] = op(ins, ZeroPage, 3);
    t[base | 0x15] = op(ins, ZeroPageX, 4);
    t[base | 0x0D] = op(ins, Absolute, 4);
    t[base | 0x1D] = op_p(ins, AbsoluteX, 4);
    t[base | 0x19] = op_p(ins, AbsoluteY, 4);
    t[base | 0x01] = op(ins, IndirectX, 6);
    t[base | 0x11] = op_p(ins, IndirectY, 5);
}

/// Shift/rotate column (`aaa bbb 10`): ASL ROL LSR ROR.
const fn shift_group(t: &mut [Option<Opcode>; 256], base: usize, ins: Instruction) {
    use AddressingMode::*;
    t[base | 0x0A] = op(ins, Accumulator, 2);
    t[base | 0x06] = op(ins, ZeroPage, 5);
    t[base | 0x16] = op(ins, ZeroPageX, 6);
    t[base | 0x0E] = op(ins, Absolute, 6);
    t[base | 0x1E] = op(ins, AbsoluteX, 7);
}

/// Undocumented read-modify-write column (`aaa bbb 11`): SLO RLA SRE RRA DCP ISC.
const fn rmw_group(t: &mut [Option<Opcode>; 256], base: usize, ins: Instruction) {
    use AddressingMode::*;
    t[base | 0x07] = op(ins, ZeroPage, 5);
    t[base | 0x17] = op(ins, ZeroPageX, 6);
    t[base | 0x0F] = op(ins, Absolute, 6);
    t[base | 0x1F] = op(ins, AbsoluteX, 7);
    t[base | 0x1B] = op(ins, AbsoluteY, 7);
    t[base | 0x03] = op(ins, IndirectX, 8);
    t[base | 0x13] = op(ins, IndirectY, 8);
}

const fn build_table() -> [Option<Opcode>; 256] {
    use AddressingMode::*;
    use Instruction::*;

    let mut t: [Option<Opcode>; 256] = [None; 256];

    read_group(&mut t, 0x00, ORA);
    read_group(&mut t, 0x20, AND);
    read_group(&mut t, 0x40, EOR);
    read_group(&mut t, 0x60, ADC);
    read_group(&mut t, 0xA0, LDA);
    read_group(&mut t, 0xC0, CMP);
    read_group(&mut t, 0xE0, SBC);
    t[0xEB] = op(SBC, Immediate, 2);

    t[0x85] = op(STA, ZeroPage, 3);
    t[0x95] = op(STA, ZeroPageX, 4);
    t[0x8D] = op(STA, Absolute, 4);
    t[0x9D] = op(STA, AbsoluteX, 5);
    t[0x99] = op(STA, AbsoluteY, 5);
    t[0x81] = op(STA, IndirectX, 6);
    t[0x91] = op(STA, IndirectY, 6);

    shift_group(&mut t, 0x00, ASL);
    shift_group(&mut t, 0x20, ROL);
    shift_group(&mut t, 0x40, LSR);
    shift_group(&mut t, 0x60, ROR);

    t[0xC6] = op(DEC, ZeroPage, 5);
    t[0xD6] = op(DEC, ZeroPageX, 6);
    t[0xCE] = op(DEC, Absolute, 6);
    t[0xDE] = op(DEC, AbsoluteX, 7);
    t[0xE6] = op(INC, ZeroPage, 5);
    t[0xF6] = op(INC, ZeroPageX, 6);
    t[0xEE] = op(INC, Absolute, 6);
    t[0xFE] = op(INC, AbsoluteX, 7);

    t[0xA2] = op(LDX, Immediate, 2);
    t[0xA6] = op(LDX, ZeroPage, 3);
    t[0xB6] = op(LDX, ZeroPageY, 4);
    t[0xAE] = op(LDX, Absolute, 4);
    t[0xBE] = op_p(LDX, AbsoluteY, 4);
    t[0xA0] = op(LDY, Immediate, 2);
    t[0xA4] = op(LDY, ZeroPage, 3);
    t[0xB4] = op(LDY, ZeroPageX, 4);
    t[0xAC] = op(LDY, Absolute, 4);
    t[0xBC] = op_p(LDY, AbsoluteX, 4);

    t[0x86] = op(STX, ZeroPage, 3);
    t[0x96] = op(STX, ZeroPageY, 4);
    t[0x8E] = op(STX, Absolute, 4);
    t[0x84] = op(STY, ZeroPage, 3);
    t[0x94] = op(STY, ZeroPageX, 4);
    t[0x8C] = op(STY, Absolute, 4);

    t[0xE0] = op(CPX, Immediate, 2);
    t[0xE4] = op(CPX, ZeroPage, 3);
    t[0xEC] = op(CPX, Absolute, 4);
    t[0xC0] = op(CPY, Immediate, 2);
    t[0xC4] = op(CPY, ZeroPage, 3);
    t[0xCC] = op(CPY, Absolute, 4);

    t[0x24] = op(BIT, ZeroPage, 3);
    t[0x2C] = op(BIT, Absolute, 4);

    t[0x10] = op(BPL, Relative, 2);
    t[0x30] = op(BMI, Relative, 2);
    t[0x50] = op(BVC, Relative, 2);
    t[0x70] = op(BVS, Relative, 2);
    t[0x90] = op(BCC, Relative, 2);
    t[0xB0] = op(BCS, Relative, 2);
    t[0xD0] = op(BNE, Relative, 2);
    t[0xF0] = op(BEQ, Relative, 2);

    t[0x4C] = op(JMP, Absolute, 3);
    t[0x6C] = op(JMP, Indirect, 5);
    t[0x20] = op(JSR, Absolute, 6);
    t[0x60] = op(RTS, Implied, 6);
    t[0x40] = op(RTI, Implied, 6);
    t[0x00] = op(BRK, Implied, 7);

    t[0x48] = op(PHA, Implied, 3);
    t[0x08] = op(PHP, Implied, 3);
    t[0x68] = op(PLA, Implied, 4);
    t[0x28] = op(PLP, Implied, 4);

    t[0x18] = op(CLC, Implied, 2);
    t[0x38] = op(SEC, Implied, 2);
    t[0x58] = op(CLI, Implied, 2);
    t[0x78] = op(SEI, Implied, 2);
    t[0xB8] = op(CLV, Implied, 2);
    t[0xD8] = op(CLD, Implied, 2);
    t[0xF8] = op(SED, Implied, 2);

    t[0xAA] = op(TAX, Implied, 2);
    t[0xA8] = op(TAY, Implied, 2);
    t[0xBA] = op(TSX, Implied, 2);
    t[0x8A] = op(TXA, Implied, 2);
    t[0x9A] = op(TXS, Implied, 2);
    t[0x98] = op(TYA, Implied, 2);
    t[0xE8] = op(INX, Implied, 2);
    t[0xC8] = op(INY, Implied, 2);
    t[0xCA] = op(DEX, Implied, 2);
    t[0x88] = op(DEY, Implied, 2);

    t[0xEA] = op(NOP, Implied, 2);
    t[0x1A] = op(NOP, Implied, 2);
    t[0x3A] = op(NOP, Implied, 2);
    t[0x5A] = op(NOP, Implied, 2);
    t[0x7A] = op(NOP, Implied, 2);
    t[0xDA] = op(NOP, Implied, 2);
    t[0xFA] = op(NOP, Implied, 2);
    t[0x80] = op(NOP, Immediate, 2);
    t[0x82] = op(NOP, Immediate, 2);
    t[0x89] = op(NOP, Immediate, 2);
    t[0xC2] = op(NOP, Immediate, 2);
    t[0xE2] = op(NOP, Immediate, 2);
    t[0x04] = op(NOP, ZeroPage, 3);
    t[0x44] = op(NOP, ZeroPage, 3);
    t[0x64] = op(NOP, ZeroPage, 3);
    t[0x14] = op(NOP, ZeroPageX, 4);
    t[0x34] = op(NOP, ZeroPageX, 4);
    t[0x54] = op(NOP, ZeroPageX, 4);
    t[0x74] = op(NOP, ZeroPageX, 4);
    t[0xD4] = op(NOP, ZeroPageX, 4);
    t[0xF4] = op(NOP, ZeroPageX, 4);
    t[0x0C] = op(NOP, Absolute, 4);
    t[0x1C] = op_p(NOP, AbsoluteX, 4);
    t[0x3C] = op_p(NOP, AbsoluteX, 4);
    t[0x5C] = op_p(NOP, AbsoluteX, 4);
    t[0x7C] = op_p(NOP, AbsoluteX, 4);
    t[0xDC] = op_p(NOP, AbsoluteX, 4);
    t[0xFC] = op_p(NOP, AbsoluteX, 4);

    t[0xA7] = op(LAX, ZeroPage, 3);
    t[0xB7] = op(LAX, ZeroPageY, 4);
    t[0xAF] = op(LAX, Absolute, 4);
    t[0xBF] = op_p(LAX, AbsoluteY, 4);
    t[0xA3] = op(LAX, IndirectX, 6);
    t[0xB3] = op_p(LAX, IndirectY, 5);
    t[0x87] = op(SAX, ZeroPage, 3);
    t[0x97] = op(SAX, ZeroPageY, 4);
    t[0x8F] = op(SAX, Absolute, 4);
    t[0x83] = op(SAX, IndirectX, 6);

    rmw_group(&mut t, 0x00, SLO);
    rmw_group(&mut t, 0x20, RLA);
    rmw_group(&mut t, 0x40, SRE);
    rmw_group(&mut t, 0x60, RRA);
    rmw_group(&mut t, 0xC0, DCP);
    rmw_group(&mut t, 0xE0, ISC);

    t
}
