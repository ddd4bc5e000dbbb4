//! NES cartridge loading and mapper support.
//!
//! - **cartridge**: Loads iNES (.nes) images, validates the header, owns the mapper.
//! - **mapper**: the `Mapper` capability set, NROM (0), and nametable mirroring.

pub mod cartridge;
pub mod mapper;
