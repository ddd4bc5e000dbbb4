//! Mapper trait: PRG/CHR memory access and mirroring.

use crate::cartridge::mapper::Mirroring;

/// Trait for NES cartridge mappers. The CPU bus routes $4020–$FFFF here; the PPU bus routes
/// pattern table reads ($0000–$1FFF) here.
///
/// A mapper with CHR RAM or bank registers extends its own state, not this capability set.
pub trait Mapper {
    /// Read from the cartridge's CPU window ($4020–$FFFF).
    fn prg_read(&self, addr: u16) -> u8;
    /// Write to the cartridge's CPU window (mapper registers, PRG RAM; no-op for ROM-only boards).
    fn prg_write(&mut self, addr: u16, data: u8);
    /// Read a pattern table byte ($0000–$1FFF).
    fn chr_read(&self, addr: u16) -> u8;
    /// Nametable mirroring wired by the board.
    fn mirroring(&self) -> Mirroring;
}
