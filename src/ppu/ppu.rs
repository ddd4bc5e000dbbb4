//! NES PPU (Picture Processing Unit) implementation.
//!
//! One counter covers the whole frame: `cycle = scanline * 341 + dot`, 262 scanlines of 341 dots.
//! Each `tick` handles exactly one dot: visible pixels on scanlines 0–239 (dots 0–255), vblank
//! at 241/1, flag clear at 261/1, and the OAMADDR reset window at dots 257–320. Registers:
//! $2000–$2007 (mirrored), see [PPU registers](https://www.nesdev.org/wiki/PPU_registers).

use tracing::debug;

use crate::bus::PpuBus;

pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 240;

/// 256×240 palette indices (0–63), row-major.
pub type FrameBuffer = [u8; WIDTH * HEIGHT];

pub const DOTS_PER_SCANLINE: u32 = 341;
pub const SCANLINES_PER_FRAME: u32 = 262;
pub const DOTS_PER_FRAME: u32 = DOTS_PER_SCANLINE * SCANLINES_PER_FRAME;
/// Scanline 241, dot 1.
pub const VBLANK_START: u32 = 241 * DOTS_PER_SCANLINE + 1;
/// Scanline 261 (pre-render), dot 1.
pub const PRE_RENDER_START: u32 = 261 * DOTS_PER_SCANLINE + 1;

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

pub const CTRL_INCREMENT_32: u8 = 1 << 2;
pub const CTRL_SPRITE_TABLE: u8 = 1 << 3;
pub const CTRL_BG_TABLE: u8 = 1 << 4;
pub const CTRL_SPRITE_16: u8 = 1 << 5;
pub const CTRL_NMI_ENABLE: u8 = 1 << 7;

pub const MASK_GREYSCALE: u8 = 1 << 0;
pub const MASK_BG_LEFT: u8 = 1 << 1;
pub const MASK_SPRITES_LEFT: u8 = 1 << 2;
pub const MASK_BG: u8 = 1 << 3;
pub const MASK_SPRITES: u8 = 1 << 4;

pub const STATUS_SPRITE_OVERFLOW: u8 = 1 << 5;
pub const STATUS_SPRITE_ZERO_HIT: u8 = 1 << 6;
pub const STATUS_VBLANK: u8 = 1 << 7;

/// A sprite picked for the current scanline, with its pattern row already fetched.
#[derive(Clone, Copy, Default)]
struct SpriteSlot {
    x: u8,
    attr: u8,
    pattern_lo: u8,
    pattern_hi: u8,
    sprite_zero: bool,
}

struct SpritePixel {
    value: u8,
    palette: u8,
    behind_bg: bool,
    sprite_zero: bool,
}

/// PPU state: registers, OAM, frame position, and the current scanline's sprites.
pub struct PPU {
    pub ctrl: u8,
    pub mask: u8,
    /// PPUSTATUS bits 5–7; bits 0–4 read back from `io_latch`.
    pub status: u8,
    pub oam_addr: u8,
    pub oam: [u8; OAM_LEN],
    /// VRAM address set through $2006, 14 bits.
    pub addr: u16,
    /// Shared first/second write toggle for $2005 and $2006.
    pub write_toggle: bool,
    pub scroll_x: u8,
    pub scroll_y: u8,
    /// $2007 read buffer.
    pub read_buffer: u8,
    /// Last value driven on the PPU data bus; fills write-only and unused status bits.
    pub io_latch: u8,
    /// Position in the frame, 0..DOTS_PER_FRAME.
    pub cycle: u32,
    /// NMI line raised; taken by the console.
    pub nmi: bool,
    sprites: [SpriteSlot; 8],
    sprite_count: usize,
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

impl PPU {
    /// Power-up state: every register zero, frame position at scanline 0 dot 0.
    pub fn new() -> Self {
        Self {
            ctrl: 0,
            mask: 0,
            status: 0,
            oam_addr: 0,
            oam: [0; OAM_LEN],
            addr: 0,
            write_toggle: false,
            scroll_x: 0,
            scroll_y: 0,
            read_buffer: 0,
            io_latch: 0,
            cycle: 0,
            nmi: false,
            sprites: [SpriteSlot::default(); 8],
            sprite_count: 0,
        }
    }

    pub fn scanline(&self) -> u32 {
        self.cycle / DOTS_PER_SCANLINE
    }

    pub fn dot(&self) -> u32 {
        self.cycle % DOTS_PER_SCANLINE
    }

    /// Take the NMI line, clearing it.
    pub fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Advance one dot. Returns true on the dot vblank begins.
    pub fn tick(&mut self, bus: &mut PpuBus, frame: &mut FrameBuffer) -> bool {
        let scanline = self.scanline();
        let dot = self.dot();
        let mut vblank = false;

        match (scanline, dot) {
            (0..=239, 0..=255) => {
                if dot == 0 {
                    self.evaluate_sprites(bus, scanline);
                }
                self.render_pixel(bus, frame, dot as usize, scanline as usize);
            }
            (241, 1) => {
                self.status |= STATUS_VBLANK;
                if self.ctrl & CTRL_NMI_ENABLE != 0 {
                    self.nmi = true;
                }
                vblank = true;
                debug!(ctrl = self.ctrl, nmi = self.nmi, "vblank");
            }
            (261, 1) => {
                self.status &= !(STATUS_VBLANK | STATUS_SPRITE_ZERO_HIT | STATUS_SPRITE_OVERFLOW);
            }
            _ => {}
        }

        // OAMADDR is cleared during sprite tile loading on every rendering line
        if (scanline < 240 || scanline == 261) && (257..=320).contains(&dot) {
            self.oam_addr = 0;
        }

        self.cycle += 1;
        if self.cycle == DOTS_PER_FRAME {
            self.cycle = 0;
        }
        vblank
    }

    /// Pick up to 8 sprites for `scanline` in OAM order; a ninth sets the overflow flag.
    /// Sprite Y is one less than the first line it appears on.
    fn evaluate_sprites(&mut self, bus: &PpuBus, scanline: u32) {
        self.sprite_count = 0;
        if self.mask & (MASK_BG | MASK_SPRITES) == 0 {
            return;
        }

        let height: i32 = if self.ctrl & CTRL_SPRITE_16 != 0 { 16 } else { 8 };
        for i in 0..64 {
            let entry = &self.oam[i * 4..i * 4 + 4];
            let row = scanline as i32 - entry[0] as i32 - 1;
            if !(0..height).contains(&row) {
                continue;
            }
            if self.sprite_count == 8 {
                self.status |= STATUS_SPRITE_OVERFLOW;
                break;
            }

            let (tile, attr, x) = (entry[1], entry[2], entry[3]);
            let row = (if attr & 0x80 != 0 { height - 1 - row } else { row }) as u16;
            let tile_addr = if height == 8 {
                let table = if self.ctrl & CTRL_SPRITE_TABLE != 0 { 0x1000 } else { 0 };
                table + tile as u16 * 16 + row
            } else {
                let table = (tile & 1) as u16 * 0x1000;
                let top = (tile & 0xFE) as u16;
                if row < 8 {
                    table + top * 16 + row
                } else {
                    table + (top + 1) * 16 + (row - 8)
                }
            };

            let mut pattern_lo = bus.read(tile_addr);
            let mut pattern_hi = bus.read(tile_addr + 8);
            if attr & 0x40 != 0 {
                pattern_lo = pattern_lo.reverse_bits();
                pattern_hi = pattern_hi.reverse_bits();
            }
            self.sprites[self.sprite_count] = SpriteSlot {
                x,
                attr,
                pattern_lo,
                pattern_hi,
                sprite_zero: i == 0,
            };
            self.sprite_count += 1;
        }
    }

    /// Background pixel (0–3) and attribute palette (0–3) at screen position (x, y).
    ///
    /// Scroll and the base nametable select place the screen inside the 512×480 logical
    /// nametable space, which wraps.
    fn background_pixel(&self, bus: &PpuBus, x: usize, y: usize) -> (u8, u8) {
        let base = (self.ctrl & 3) as usize;
        let px = (x + self.scroll_x as usize + (base & 1) * 256) % 512;
        let py = (y + self.scroll_y as usize + (base >> 1) * 240) % 480;

        let table = (py / 240) * 2 + px / 256;
        let tile_x = (px % 256) / 8;
        let tile_y = (py % 240) / 8;
        let nt_base = 0x2000 + (table as u16) * 0x400;

        let tile = bus.read(nt_base + (tile_y * 32 + tile_x) as u16);
        let attr = bus.read(nt_base + 0x3C0 + ((tile_y / 4) * 8 + tile_x / 4) as u16);
        let shift = ((tile_y & 2) << 1) | (tile_x & 2);
        let palette = (attr >> shift) & 3;

        let pattern_base = if self.ctrl & CTRL_BG_TABLE != 0 { 0x1000 } else { 0 };
        let row_addr = pattern_base + tile as u16 * 16 + (py % 8) as u16;
        let bit = 7 - (px % 8);
        let lo = (bus.read(row_addr) >> bit) & 1;
        let hi = (bus.read(row_addr + 8) >> bit) & 1;
        ((hi << 1) | lo, palette)
    }

    /// First opaque sprite pixel at column `x`; lower OAM index wins.
    fn sprite_pixel(&self, x: usize) -> Option<SpritePixel> {
        self.sprites[..self.sprite_count].iter().find_map(|s| {
            let dx = x.checked_sub(s.x as usize).filter(|dx| *dx < 8)?;
            let bit = 7 - dx;
            let value = (((s.pattern_hi >> bit) & 1) << 1) | ((s.pattern_lo >> bit) & 1);
            (value != 0).then_some(SpritePixel {
                value,
                palette: s.attr & 3,
                behind_bg: s.attr & 0x20 != 0,
                sprite_zero: s.sprite_zero,
            })
        })
    }

    fn render_pixel(&mut self, bus: &PpuBus, frame: &mut FrameBuffer, x: usize, y: usize) {
        let show_bg = self.mask & MASK_BG != 0 && (x >= 8 || self.mask & MASK_BG_LEFT != 0);
        let show_sprites =
            self.mask & MASK_SPRITES != 0 && (x >= 8 || self.mask & MASK_SPRITES_LEFT != 0);

        let (bg, bg_palette) = if show_bg {
            self.background_pixel(bus, x, y)
        } else {
            (0, 0)
        };
        let sprite = if show_sprites {
            self.sprite_pixel(x)
        } else {
            None
        };

        if let Some(s) = &sprite {
            if s.sprite_zero && bg != 0 && x != 255 {
                self.status |= STATUS_SPRITE_ZERO_HIT;
            }
        }

        let palette_addr = match sprite {
            Some(s) if bg == 0 || !s.behind_bg => 0x3F10 + (s.palette as u16) * 4 + s.value as u16,
            _ if bg != 0 => 0x3F00 + (bg_palette as u16) * 4 + bg as u16,
            _ => 0x3F00,
        };
        let mut color = bus.read(palette_addr);
        if self.mask & MASK_GREYSCALE != 0 {
            color &= 0x30;
        }
        frame[y * WIDTH + x] = color;
    }

    /// CPU read of register `reg` (address & 7).
    pub fn read_register(&mut self, reg: u16, bus: &mut PpuBus) -> u8 {
        let value = match reg {
            2 => self.read_status(),
            4 => self.oam[self.oam_addr as usize],
            7 => self.read_data(bus),
            // Write-only registers return what's left on the bus
            _ => self.io_latch,
        };
        self.io_latch = value;
        value
    }

    /// CPU write of register `reg` (address & 7).
    pub fn write_register(&mut self, reg: u16, data: u8, bus: &mut PpuBus) {
        self.io_latch = data;
        match reg {
            0 => self.write_ctrl(data),
            1 => self.mask = data,
            2 => {}
            3 => self.oam_addr = data,
            4 => self.write_oam_data(data),
            5 => self.write_scroll(data),
            6 => self.write_addr(data),
            7 => self.write_data(bus, data),
            _ => unreachable!("PPU register index is 3 bits"),
        }
    }

    /// Read PPUSTATUS ($2002); clears vblank and the $2005/$2006 write toggle.
    pub fn read_status(&mut self) -> u8 {
        let value = (self.status & 0xE0) | (self.io_latch & 0x1F);
        self.status &= !STATUS_VBLANK;
        self.write_toggle = false;
        value
    }

    /// Write PPUCTRL ($2000). Enabling NMI while vblank is set raises NMI immediately.
    pub fn write_ctrl(&mut self, data: u8) {
        let was_enabled = self.ctrl & CTRL_NMI_ENABLE != 0;
        self.ctrl = data;
        if !was_enabled && data & CTRL_NMI_ENABLE != 0 && self.status & STATUS_VBLANK != 0 {
            self.nmi = true;
        }
    }

    /// Write OAMDATA ($2004); writes OAM and increments OAMADDR.
    pub fn write_oam_data(&mut self, data: u8) {
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Write PPUSCROLL ($2005): first write = X, second write = Y.
    pub fn write_scroll(&mut self, data: u8) {
        if !self.write_toggle {
            self.scroll_x = data;
        } else {
            self.scroll_y = data;
        }
        self.write_toggle = !self.write_toggle;
    }

    /// Write PPUADDR ($2006): high byte first (6 bits), then low byte.
    pub fn write_addr(&mut self, data: u8) {
        if !self.write_toggle {
            self.addr = ((data as u16 & 0x3F) << 8) | (self.addr & 0x00FF);
        } else {
            self.addr = (self.addr & 0xFF00) | data as u16;
        }
        self.write_toggle = !self.write_toggle;
    }

    /// Read PPUDATA ($2007). Returns the buffered byte, except palette reads which return
    /// directly while the buffer takes the nametable byte underneath.
    pub fn read_data(&mut self, bus: &mut PpuBus) -> u8 {
        let addr = self.addr & 0x3FFF;
        let value = if addr >= 0x3F00 {
            self.read_buffer = bus.read(addr - 0x1000);
            bus.read(addr)
        } else {
            std::mem::replace(&mut self.read_buffer, bus.read(addr))
        };
        self.increment_addr();
        value
    }

    /// Write PPUDATA ($2007), then advance the address.
    pub fn write_data(&mut self, bus: &mut PpuBus, data: u8) {
        bus.write(self.addr, data);
        self.increment_addr();
    }

    fn increment_addr(&mut self) {
        let inc = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.addr = self.addr.wrapping_add(inc) & 0x3FFF;
    }
}
