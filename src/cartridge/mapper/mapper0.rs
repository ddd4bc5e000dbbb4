//! Mapper 0 (NROM): no bank switching, 16/32 KiB PRG, 8 KiB CHR.
//!
//! [NROM](https://www.nesdev.org/wiki/NROM): NROM-128 mirrors its single 16 KiB bank at
//! $8000 and $C000; NROM-256 maps 32 KiB straight through.

use crate::cartridge::mapper::{Mirroring, mapper::Mapper};

pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;

/// NROM mapper: fixed PRG and CHR ROM, mirroring from the header solder pads.
pub struct Mapper0 {
    prg_rom: Box<[u8]>,
    chr_rom: Box<[u8]>,
    /// `prg_rom.len() - 1`; folds the 32 KiB window onto a 16 KiB ROM.
    prg_mask: usize,
    mirroring: Mirroring,
}

impl Mapper0 {
    /// Returns `None` unless PRG is 16 or 32 KiB and CHR is exactly 8 KiB.
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, mirroring: Mirroring) -> Option<Self> {
        let prg_ok = prg_rom.len() == PRG_BANK_SIZE || prg_rom.len() == 2 * PRG_BANK_SIZE;
        if !prg_ok || chr_rom.len() != CHR_BANK_SIZE {
            return None;
        }

        let prg_mask = prg_rom.len() - 1;
        Some(Self {
            prg_rom: prg_rom.into_boxed_slice(),
            chr_rom: chr_rom.into_boxed_slice(),
            prg_mask,
            mirroring,
        })
    }
}

impl Mapper for Mapper0 {
    fn prg_read(&self, addr: u16) -> u8 {
        match addr {
            0x8000..=0xFFFF => self.prg_rom[(addr as usize - 0x8000) & self.prg_mask],
            // No PRG RAM on NROM
            _ => 0,
        }
    }

    fn prg_write(&mut self, _addr: u16, _data: u8) {}

    fn chr_read(&self, addr: u16) -> u8 {
        self.chr_rom[(addr & 0x1FFF) as usize]
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
