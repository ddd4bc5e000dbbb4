//! Memory buses and address decoding for the NES.
//!
//! [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map): `NesBus` maps CPU addresses to
//! RAM, PPU registers, OAM DMA, controllers, silent APU registers, and the cartridge.
//! [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map): `PpuBus` maps the PPU's 14-bit
//! space to CHR, mirrored nametable RAM, and palette RAM.

use ansi_term::Colour::Red;
use tracing::{debug, trace};

use crate::{
    cartridge::{cartridge::Cartridge, mapper::Mirroring},
    controller::Controller,
    ppu::ppu::{FrameBuffer, PPU},
};

/// Trait for memory-mapped I/O and bus access used by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);

    /// Consume a pending OAM DMA started by the last write, if any.
    fn poll_dma(&mut self) -> bool {
        false
    }
}

/// PPU-owned memory that isn't on the cartridge: 2 KiB CIRAM and 32 bytes of palette RAM.
pub struct Vram {
    pub nametables: [u8; 0x800],
    pub palette: [u8; 32],
}

impl Vram {
    pub fn new() -> Self {
        Self {
            nametables: [0; 0x800],
            palette: [0; 32],
        }
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a nametable address ($2000–$3EFF) to an index into the 2 KiB CIRAM.
///
/// Vertical mirroring selects the bank with address bit 10 ($2000/$2800 vs $2400/$2C00);
/// horizontal mirroring selects it with bit 11 ($2000/$2400 vs $2800/$2C00).
pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> usize {
    let offset = addr & 0x3FF;
    let bank = match mirroring {
        Mirroring::Vertical => (addr >> 10) & 1,
        Mirroring::Horizontal => (addr >> 11) & 1,
    };
    (bank * 0x400 + offset) as usize
}

/// Resolve a palette address ($3F00–$3FFF) to a 32-byte index.
/// Every entry whose index is a multiple of 4 shares slot 0 (universal background color).
pub fn palette_index(addr: u16) -> usize {
    let i = (addr & 0x1F) as usize;
    if i % 4 == 0 { 0 } else { i }
}

/// View of the PPU address space for one register access or a run of dots.
pub struct PpuBus<'a> {
    pub vram: &'a mut Vram,
    pub cart: &'a Cartridge,
}

impl PpuBus<'_> {
    pub fn read(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.cart.chr_read(addr),
            0x2000..=0x3EFF => {
                self.vram.nametables[map_nametable_addr(addr, self.cart.mirroring())]
            }
            0x3F00..=0x3FFF => self.vram.palette[palette_index(addr)],
            _ => unreachable_ppu(addr),
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            // CHR ROM: writes dropped
            0x0000..=0x1FFF => {}
            0x2000..=0x3EFF => {
                let i = map_nametable_addr(addr, self.cart.mirroring());
                self.vram.nametables[i] = data;
            }
            0x3F00..=0x3FFF => self.vram.palette[palette_index(addr)] = data & 0x3F,
            _ => unreachable_ppu(addr),
        }
    }
}

fn unreachable_ppu(addr: u16) -> ! {
    panic!(
        "{} PPU bus address ${:04X} outside decoded range",
        Red.bold().paint("ERROR"),
        addr
    )
}

/// Main NES bus: RAM, PPU and its memory, cartridge, and both controller ports.
pub struct NesBus {
    pub ram: [u8; 2048],
    pub ppu: PPU,
    pub vram: Vram,
    pub cart: Cartridge,
    pub controllers: [Controller; 2],
    /// Set by a $4014 write; the CPU charges the stall on the instruction that wrote it.
    pub dma_pending: bool,
}

impl NesBus {
    /// Create a new bus with the given cartridge. RAM and VRAM power up zeroed.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: [0; 2048],
            ppu: PPU::new(),
            vram: Vram::new(),
            cart,
            controllers: [Controller::new(); 2],
            dma_pending: false,
        }
    }

    /// Advance the PPU `dots` dots. Returns true if vblank started during the run.
    pub fn step_ppu(&mut self, dots: u32, frame: &mut FrameBuffer) -> bool {
        let mut bus = PpuBus {
            vram: &mut self.vram,
            cart: &self.cart,
        };
        let mut vblank = false;
        for _ in 0..dots {
            vblank |= self.ppu.tick(&mut bus, frame);
        }
        vblank
    }

    /// OAM DMA ($4014): copy CPU page `page` into OAM starting at OAMADDR.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for i in 0..=0xFFu16 {
            let data = self.read(base | i);
            let slot = self.ppu.oam_addr.wrapping_add(i as u8);
            self.ppu.oam[slot as usize] = data;
        }
        self.dma_pending = true;
        debug!("OAM DMA from page ${:02X}", page);
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        match addr {
            // Internal RAM (mirrored 4x in 0x0000-0x1FFF)
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            // PPU registers $2000-$3FFF (mirrored every 8 bytes)
            0x2000..=0x3FFF => {
                let mut bus = PpuBus {
                    vram: &mut self.vram,
                    cart: &self.cart,
                };
                self.ppu.read_register(addr & 7, &mut bus)
            }
            0x4016 => self.controllers[0].read(),
            0x4017 => self.controllers[1].read(),
            // APU and OAMDMA: write-only or unmodeled
            0x4000..=0x4015 => 0,
            // Test-mode registers
            0x4018..=0x401F => 0,
            0x4020..=0xFFFF => self.cart.prg_read(addr),
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = data,
            0x2000..=0x3FFF => {
                let mut bus = PpuBus {
                    vram: &mut self.vram,
                    cart: &self.cart,
                };
                self.ppu.write_register(addr & 7, data, &mut bus);
            }
            0x4014 => self.oam_dma(data),
            // Strobe goes to both pads
            0x4016 => {
                for c in &mut self.controllers {
                    c.write(data);
                }
            }
            // APU channels, status, frame counter ($4017 write)
            0x4000..=0x4013 | 0x4015 | 0x4017 => {
                trace!("APU write ${:04X} <- ${:02X} ignored", addr, data);
            }
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => self.cart.prg_write(addr, data),
        }
    }

    fn poll_dma(&mut self) -> bool {
        std::mem::take(&mut self.dma_pending)
    }
}
