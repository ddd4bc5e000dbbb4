use crate::{
    bus::Bus,
    cpu::{
        addressing::Operand,
        flags::{
            FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW,
            FLAG_ZERO, status_for_push, status_from_pull,
        },
        opcodes::{Instruction, OPCODE_TABLE, Opcode},
    },
};

use ansi_term::Colour::Red;
use tracing::{debug, trace};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// CPU cycles a sprite DMA halts the CPU for (plus one on an odd cycle).
pub const OAM_DMA_CYCLES: u16 = 513;

pub struct CPU<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    /// Total cycles executed since power-on.
    pub cycles: u64,
    pub bus: B,
}

impl<B: Bus> CPU<B> {
    /// Power-up state ([CPU power up state](https://www.nesdev.org/wiki/CPU_power_up_state)):
    /// the reset sequence that follows brings SP to $FD.
    pub fn new(bus: B) -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0x00,
            pc: 0,
            status: 0x34,
            cycles: 0,
            bus,
        }
    }

    /// Reset sequence: the three stack pushes happen with writes suppressed, so only SP moves.
    pub fn reset(&mut self) -> u16 {
        self.sp = self.sp.wrapping_sub(3);
        self.pc = self.read_word(RESET_VECTOR);
        self.status |= FLAG_INTERRUPT_DISABLE;
        self.cycles += 7;
        debug!(pc = self.pc, "reset");
        7
    }

    pub fn nmi(&mut self) -> u16 {
        self.push_word(self.pc);
        self.push(status_for_push(self.status, false));
        self.status |= FLAG_INTERRUPT_DISABLE;
        let from = self.pc;
        self.pc = self.read_word(NMI_VECTOR);
        self.cycles += 7;
        debug!(from, to = self.pc, "NMI");
        7
    }

    /// Execute one instruction and return the cycles it took, including any page-cross and
    /// branch penalties and an OAM DMA it started.
    pub fn step(&mut self) -> u16 {
        let pc = self.pc;
        let code = self.fetch_byte();
        let Some(opcode) = OPCODE_TABLE[code as usize] else {
            panic!(
                "{} unimplemented opcode: ${:02X} at ${:04X}",
                Red.bold().paint("ERROR"),
                code,
                pc
            );
        };
        self.trace(pc, code, &opcode);

        let (operand, page_crossed) = self.resolve(opcode.mode);
        let mut cycles = opcode.cycles as u16;
        if opcode.page_penalty && page_crossed {
            cycles += 1;
        }
        cycles += self.execute(opcode.instruction, operand, page_crossed);

        if self.bus.poll_dma() {
            let odd = (self.cycles + cycles as u64) & 1;
            cycles += OAM_DMA_CYCLES + odd as u16;
        }

        self.cycles += cycles as u64;
        cycles
    }

    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let byte = self.bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    pub(crate) fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.bus.read(addr) as u16;
        let hi = self.bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// nestest-style line. Operand bytes are peeked, which is side-effect free for PRG and RAM.
    fn trace(&mut self, pc: u16, code: u8, opcode: &Opcode) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        let bytes = match opcode.mode.operand_len() {
            0 => format!("{code:02X}      "),
            1 => format!("{code:02X} {:02X}   ", self.bus.read(self.pc)),
            _ => format!(
                "{code:02X} {:02X} {:02X}",
                self.bus.read(self.pc),
                self.bus.read(self.pc.wrapping_add(1))
            ),
        };
        trace!(
            "{:04X}  {}  {:?}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            bytes,
            opcode.instruction,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        );
    }

    fn read_operand(&mut self, operand: Operand) -> u8 {
        match operand {
            Operand::Memory(addr) => self.bus.read(addr),
            Operand::Accumulator => self.a,
            Operand::Implied => 0,
        }
    }

    fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Memory(addr) => self.bus.write(addr, value),
            Operand::Accumulator => self.a = value,
            Operand::Implied => {}
        }
    }

    fn target(operand: Operand) -> u16 {
        match operand {
            Operand::Memory(addr) => addr,
            _ => 0,
        }
    }

    /// Run `instruction` on a resolved operand. Returns extra cycles (taken branches only).
    fn execute(&mut self, instruction: Instruction, operand: Operand, page_crossed: bool) -> u16 {
        use Instruction::*;

        match instruction {
            LDA => {
                self.a = self.read_operand(operand);
                self.update_zero_and_negative_flags(self.a);
            }
            LDX => {
                self.x = self.read_operand(operand);
                self.update_zero_and_negative_flags(self.x);
            }
            LDY => {
                self.y = self.read_operand(operand);
                self.update_zero_and_negative_flags(self.y);
            }
            LAX => {
                let value = self.read_operand(operand);
                self.a = value;
                self.x = value;
                self.update_zero_and_negative_flags(value);
            }
            STA => self.write_operand(operand, self.a),
            STX => self.write_operand(operand, self.x),
            STY => self.write_operand(operand, self.y),
            SAX => self.write_operand(operand, self.a & self.x),

            TAX => {
                self.x = self.a;
                self.update_zero_and_negative_flags(self.x);
            }
            TAY => {
                self.y = self.a;
                self.update_zero_and_negative_flags(self.y);
            }
            TSX => {
                self.x = self.sp;
                self.update_zero_and_negative_flags(self.x);
            }
            TXA => {
                self.a = self.x;
                self.update_zero_and_negative_flags(self.a);
            }
            TXS => self.sp = self.x,
            TYA => {
                self.a = self.y;
                self.update_zero_and_negative_flags(self.a);
            }

            ADC => {
                let value = self.read_operand(operand);
                self.adc(value);
            }
            SBC => {
                let value = self.read_operand(operand);
                self.adc(!value);
            }
            AND => {
                self.a &= self.read_operand(operand);
                self.update_zero_and_negative_flags(self.a);
            }
            ORA => {
                self.a |= self.read_operand(operand);
                self.update_zero_and_negative_flags(self.a);
            }
            EOR => {
                self.a ^= self.read_operand(operand);
                self.update_zero_and_negative_flags(self.a);
            }
            CMP => {
                let value = self.read_operand(operand);
                self.compare(self.a, value);
            }
            CPX => {
                let value = self.read_operand(operand);
                self.compare(self.x, value);
            }
            CPY => {
                let value = self.read_operand(operand);
                self.compare(self.y, value);
            }
            BIT => {
                let value = self.read_operand(operand);
                self.set_flag(FLAG_ZERO, self.a & value == 0);
                self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
                self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
            }

            INC | DEC => {
                let value = self.read_operand(operand);
                let result = if instruction == INC {
                    value.wrapping_add(1)
                } else {
                    value.wrapping_sub(1)
                };
                self.write_operand(operand, result);
                self.update_zero_and_negative_flags(result);
            }
            INX => {
                self.x = self.x.wrapping_add(1);
                self.update_zero_and_negative_flags(self.x);
            }
            INY => {
                self.y = self.y.wrapping_add(1);
                self.update_zero_and_negative_flags(self.y);
            }
            DEX => {
                self.x = self.x.wrapping_sub(1);
                self.update_zero_and_negative_flags(self.x);
            }
            DEY => {
                self.y = self.y.wrapping_sub(1);
                self.update_zero_and_negative_flags(self.y);
            }

            ASL | LSR | ROL | ROR => {
                let value = self.read_operand(operand);
                let result = self.shift(instruction, value);
                self.write_operand(operand, result);
                self.update_zero_and_negative_flags(result);
            }

            // Undocumented read-modify-write combos
            SLO | RLA | SRE | RRA => {
                let value = self.read_operand(operand);
                let kind = match instruction {
                    SLO => ASL,
                    RLA => ROL,
                    SRE => LSR,
                    _ => ROR,
                };
                let result = self.shift(kind, value);
                self.write_operand(operand, result);
                match instruction {
                    SLO => self.a |= result,
                    RLA => self.a &= result,
                    SRE => self.a ^= result,
                    _ => {
                        self.adc(result);
                        return 0;
                    }
                }
                self.update_zero_and_negative_flags(self.a);
            }
            DCP => {
                let result = self.read_operand(operand).wrapping_sub(1);
                self.write_operand(operand, result);
                self.compare(self.a, result);
            }
            ISC => {
                let result = self.read_operand(operand).wrapping_add(1);
                self.write_operand(operand, result);
                self.adc(!result);
            }

            BCC => return self.branch(self.status & FLAG_CARRY == 0, operand, page_crossed),
            BCS => return self.branch(self.status & FLAG_CARRY != 0, operand, page_crossed),
            BNE => return self.branch(self.status & FLAG_ZERO == 0, operand, page_crossed),
            BEQ => return self.branch(self.status & FLAG_ZERO != 0, operand, page_crossed),
            BPL => return self.branch(self.status & FLAG_NEGATIVE == 0, operand, page_crossed),
            BMI => return self.branch(self.status & FLAG_NEGATIVE != 0, operand, page_crossed),
            BVC => return self.branch(self.status & FLAG_OVERFLOW == 0, operand, page_crossed),
            BVS => return self.branch(self.status & FLAG_OVERFLOW != 0, operand, page_crossed),

            JMP => self.pc = Self::target(operand),
            JSR => {
                // Return address minus one: the last byte of the JSR itself
                self.push_word(self.pc.wrapping_sub(1));
                self.pc = Self::target(operand);
            }
            RTS => self.pc = self.pop_word().wrapping_add(1),
            RTI => {
                let status = self.pop();
                self.status = status_from_pull(status);
                self.pc = self.pop_word();
            }
            BRK => {
                // Skip the padding byte
                self.push_word(self.pc.wrapping_add(1));
                self.push(status_for_push(self.status, true));
                self.status |= FLAG_INTERRUPT_DISABLE;
                self.pc = self.read_word(IRQ_VECTOR);
            }

            PHA => self.push(self.a),
            PHP => self.push(status_for_push(self.status, true)),
            PLA => {
                self.a = self.pop();
                self.update_zero_and_negative_flags(self.a);
            }
            PLP => {
                let value = self.pop();
                self.status = status_from_pull(value);
            }

            CLC => self.set_flag(FLAG_CARRY, false),
            SEC => self.set_flag(FLAG_CARRY, true),
            CLI => self.set_flag(FLAG_INTERRUPT_DISABLE, false),
            SEI => self.set_flag(FLAG_INTERRUPT_DISABLE, true),
            CLV => self.set_flag(FLAG_OVERFLOW, false),
            CLD => self.set_flag(FLAG_DECIMAL, false),
            SED => self.set_flag(FLAG_DECIMAL, true),

            NOP => {
                // Multi-byte NOPs still perform their read
                if let Operand::Memory(addr) = operand {
                    self.bus.read(addr);
                }
            }
        }
        0
    }

    /// Binary add with carry. Overflow is set when both inputs share a sign that the result
    /// doesn't.
    fn adc(&mut self, value: u8) {
        let carry_in = (self.status & FLAG_CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry_in;
        let result = sum as u8;

        self.set_flag(FLAG_CARRY, sum > 0xFF);
        self.set_flag(
            FLAG_OVERFLOW,
            (value ^ self.a) < 0x80 && (value ^ result) & 0x80 != 0,
        );

        self.a = result;
        self.update_zero_and_negative_flags(self.a);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_CARRY, register >= value);
        self.update_zero_and_negative_flags(register.wrapping_sub(value));
    }

    /// ASL/LSR/ROL/ROR on `value`; updates carry, returns the result.
    fn shift(&mut self, kind: Instruction, value: u8) -> u8 {
        let carry_in = self.status & FLAG_CARRY;
        let (result, carry_out) = match kind {
            Instruction::ASL => (value << 1, value & 0x80 != 0),
            Instruction::LSR => (value >> 1, value & 0x01 != 0),
            Instruction::ROL => ((value << 1) | carry_in, value & 0x80 != 0),
            _ => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
        };
        self.set_flag(FLAG_CARRY, carry_out);
        result
    }

    /// Taken branches cost one cycle, two when the target is on another page.
    fn branch(&mut self, condition: bool, operand: Operand, page_crossed: bool) -> u16 {
        if !condition {
            return 0;
        }
        self.pc = Self::target(operand);
        if page_crossed { 2 } else { 1 }
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    fn push(&mut self, value: u8) {
        let addr = 0x0100 | self.sp as u16;
        self.bus.write(addr, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = 0x0100 | self.sp as u16;
        self.bus.read(addr)
    }

    fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    fn pop_word(&mut self) -> u16 {
        let lo = self.pop() as u16;
        let hi = self.pop() as u16;
        (hi << 8) | lo
    }
}
