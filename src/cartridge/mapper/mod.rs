//! NES mappers for PRG/CHR memory mapping.
//!
//! Mapper0 (NROM) and common types.

/// Nametable mirroring mode for the PPU, from iNES byte 6 bit 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000/$2400 share a bank, $2800/$2C00 share the other (vertical scrolling games).
    Horizontal,
    /// $2000/$2800 share a bank, $2400/$2C00 share the other (horizontal scrolling games).
    Vertical,
}

pub mod mapper;

pub mod mapper0;
