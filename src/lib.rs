//! nescore: a cycle-counted NES (Nintendo Entertainment System) core written in Rust.
//!
//! Implements the NES chipset as documented on the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide): Ricoh 2A03 CPU core,
//! 2C02 PPU, NROM cartridges, and controller I/O. Audio registers are decoded but silent.
//!
//! ## Modules (NESdev references)
//!
//! - **bus** – [CPU memory map](https://www.nesdev.org/wiki/CPU_memory_map) and
//!   [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map): RAM, PPU registers, OAM DMA,
//!   controllers, cartridge; nametable [mirroring](https://www.nesdev.org/wiki/Mirroring), palette RAM
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) loading; [Mapper](https://www.nesdev.org/wiki/Mapper) NROM (0)
//! - **console** – CPU + bus aggregate, reset/NMI latches, 3 PPU dots per CPU cycle
//! - **controller** – [Controller reading](https://www.nesdev.org/wiki/Controller_reading): $4016 strobe, shift-out
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU) / 2A03: official + stable undocumented opcodes, [NMI](https://www.nesdev.org/wiki/NMI)
//! - **palette** – 64-entry RGB lookup for presenting frames
//! - **ppu** – [PPU](https://www.nesdev.org/wiki/PPU), [PPU registers](https://www.nesdev.org/wiki/PPU_registers), OAM, sprite 0 hit, 256×240

pub mod bus;
pub mod cartridge;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod palette;
pub mod ppu;

pub use cartridge::cartridge::{Cartridge, CartridgeError};
pub use console::Console;
pub use ppu::ppu::{FrameBuffer, HEIGHT, WIDTH};
