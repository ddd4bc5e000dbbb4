//! 6502 CPU emulation for the NES.
//!
//! Official instruction set plus the stable undocumented opcodes; table-driven decode with
//! per-opcode base cycles and page-cross penalties. Bus trait used for all memory and I/O.

pub mod addressing;
pub mod cpu;
pub mod flags;
pub mod opcodes;
