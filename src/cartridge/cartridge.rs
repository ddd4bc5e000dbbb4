//! NES cartridge loading from iNES format (.nes files).
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) format: 16-byte header (magic "NES\x1A",
//! PRG size in 16 KiB units, CHR size in 8 KiB units, flags 6–7 for mapper and mirroring), an
//! optional 512-byte trainer, then PRG ROM, then CHR ROM. [NES 2.0](https://www.nesdev.org/wiki/NES_2.0)
//! headers are rejected. [Mapper](https://www.nesdev.org/wiki/Mapper) implements CPU PRG
//! ($4020–$FFFF) and PPU CHR ($0000–$1FFF) address decoding.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::cartridge::mapper::Mirroring;
use crate::cartridge::mapper::mapper::Mapper;
use crate::cartridge::mapper::mapper0::{CHR_BANK_SIZE, Mapper0, PRG_BANK_SIZE};

pub const HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const MAGIC: [u8; 4] = *b"NES\x1A";

/// Why a ROM image could not become a [`Cartridge`].
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
    #[error("not an iNES image (bad signature)")]
    BadSignature,
    #[error("NES 2.0 headers are not supported")]
    Nes2Unsupported,
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    #[error("mapper {mapper} cannot hold {prg} bytes of PRG and {chr} bytes of CHR")]
    UnsupportedRomSize { mapper: u8, prg: usize, chr: usize },
    #[error("ROM body is {actual} bytes, header declares {expected}")]
    Truncated { expected: usize, actual: usize },
}

/// Cartridge: holds the mapper that owns PRG/CHR storage and implements address decoding.
/// The mapper's backing store lives on the heap and is released when the cartridge is dropped.
pub struct Cartridge {
    pub mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Build a cartridge from a 16-byte iNES header and the bytes that follow it.
    ///
    /// Header bytes 4–5 = PRG/CHR size; byte 6 bit 0 = mirroring, bit 2 = trainer present;
    /// mapper number = high nibble of 7 | high nibble of 6 shifted down.
    pub fn load(header: &[u8; HEADER_LEN], body: &[u8]) -> Result<Self, CartridgeError> {
        if header[0..4] != MAGIC {
            return Err(CartridgeError::BadSignature);
        }
        if header[7] & 0x0C == 0x08 {
            return Err(CartridgeError::Nes2Unsupported);
        }

        let prg_size = header[4] as usize * PRG_BANK_SIZE;
        let chr_size = header[5] as usize * CHR_BANK_SIZE;
        let mapper_id = (header[7] & 0xF0) | (header[6] >> 4);
        let mirroring = if header[6] & 1 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let prg_start = if header[6] & 0x04 != 0 { TRAINER_LEN } else { 0 };

        if mapper_id != 0 {
            return Err(CartridgeError::UnsupportedMapper(mapper_id));
        }

        let expected = prg_start + prg_size + chr_size;
        if body.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: body.len(),
            });
        }

        let chr_start = prg_start + prg_size;
        let prg_rom = body[prg_start..chr_start].to_vec();
        let chr_rom = body[chr_start..expected].to_vec();

        let mapper = Mapper0::new(prg_rom, chr_rom, mirroring).ok_or(
            CartridgeError::UnsupportedRomSize {
                mapper: mapper_id,
                prg: prg_size,
                chr: chr_size,
            },
        )?;
        let cart = Self {
            mapper: Box::new(mapper),
        };

        info!(
            mapper = mapper_id,
            prg_kib = prg_size / 1024,
            chr_kib = chr_size / 1024,
            ?mirroring,
            "cartridge loaded: NMI ${:04X}, RESET ${:04X}, IRQ ${:04X}",
            cart.vector(0xFFFA),
            cart.vector(0xFFFC),
            cart.vector(0xFFFE)
        );

        Ok(cart)
    }

    /// Split a whole iNES image into header and body, then [`Cartridge::load`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_LEN {
            return Err(CartridgeError::Truncated {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }
        let (header, body) = data.split_at(HEADER_LEN);
        let mut h = [0u8; HEADER_LEN];
        h.copy_from_slice(header);
        Self::load(&h, body)
    }

    /// Read a .nes file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CartridgeError> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// CPU read in $4020–$FFFF.
    pub fn prg_read(&self, addr: u16) -> u8 {
        self.mapper.prg_read(addr)
    }

    /// CPU write in $4020–$FFFF. PRG ROM is read-only; mappers may latch registers here.
    pub fn prg_write(&mut self, addr: u16, data: u8) {
        self.mapper.prg_write(addr, data);
    }

    /// PPU pattern table read ($0000–$1FFF).
    pub fn chr_read(&self, addr: u16) -> u8 {
        self.mapper.chr_read(addr)
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    fn vector(&self, addr: u16) -> u16 {
        let lo = self.prg_read(addr) as u16;
        let hi = self.prg_read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}
