//! PPU (Picture Processing Unit) emulation for the NES.
//!
//! See [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers),
//! [PPU rendering](https://www.nesdev.org/wiki/PPU_rendering). Handles 341-dot scanlines, 262
//! scanlines per frame, vblank NMI, background and sprite pixels, OAM, sprite 0 hit.

pub mod ppu;
