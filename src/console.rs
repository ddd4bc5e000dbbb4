//! The console: CPU, bus (PPU, RAM, cartridge, controllers) and interrupt latches.
//!
//! The host alternates [`Console::step_processor`] and [`Console::step_picture`]; each CPU
//! cycle is three PPU dots ([Cycle reference chart](https://www.nesdev.org/wiki/Cycle_reference_chart)).

use crate::{
    bus::NesBus,
    cartridge::cartridge::Cartridge,
    cpu::cpu::CPU,
    ppu::ppu::{FrameBuffer, HEIGHT, WIDTH},
};

pub const DOTS_PER_CPU_CYCLE: u32 = 3;

pub struct Console {
    pub cpu: CPU<NesBus>,
    /// Set at power-on and by `request_reset`; serviced by the next processor step.
    pub reset_pending: bool,
    /// Latched from the PPU's NMI line; serviced by the next processor step.
    pub nmi_pending: bool,
}

impl Console {
    /// Power on with `cart` inserted. The first processor step runs the reset sequence.
    pub fn new(cart: Cartridge) -> Self {
        Self {
            cpu: CPU::new(NesBus::new(cart)),
            reset_pending: true,
            nmi_pending: false,
        }
    }

    /// Run one reset sequence, NMI entry, or instruction. Returns CPU cycles elapsed.
    pub fn step_processor(&mut self) -> u16 {
        let cycles = if self.reset_pending {
            self.reset_pending = false;
            self.nmi_pending = false;
            self.cpu.reset()
        } else if self.nmi_pending {
            self.nmi_pending = false;
            self.cpu.nmi()
        } else {
            self.cpu.step()
        };
        // A $2000 write can raise NMI mid-instruction
        self.latch_nmi();
        cycles
    }

    /// Advance the PPU by `cycles` CPU cycles. Returns true if vblank started.
    pub fn step_picture(&mut self, cycles: u16, frame: &mut FrameBuffer) -> bool {
        self.step_dots(cycles as u32 * DOTS_PER_CPU_CYCLE, frame)
    }

    /// Advance the PPU by individual dots.
    pub fn step_dots(&mut self, dots: u32, frame: &mut FrameBuffer) -> bool {
        let vblank = self.cpu.bus.step_ppu(dots, frame);
        self.latch_nmi();
        vblank
    }

    /// Step both processors until vblank starts. Returns the CPU cycles spent.
    pub fn run_frame(&mut self, frame: &mut FrameBuffer) -> u64 {
        let mut cycles = 0u64;
        loop {
            let elapsed = self.step_processor();
            cycles += elapsed as u64;
            if self.step_picture(elapsed, frame) {
                return cycles;
            }
        }
    }

    pub fn request_reset(&mut self) {
        self.reset_pending = true;
    }

    /// Button latch for controller `port` (0 or 1): bit 7 = Right ... bit 0 = A.
    /// Sampled by the next $4016 strobe.
    pub fn set_input(&mut self, port: usize, buttons: u8) {
        if let Some(pad) = self.cpu.bus.controllers.get_mut(port) {
            pad.state = buttons;
        }
    }

    /// A zeroed frame buffer of the right size.
    pub fn new_frame() -> Box<FrameBuffer> {
        Box::new([0; WIDTH * HEIGHT])
    }

    fn latch_nmi(&mut self) {
        if self.cpu.bus.ppu.poll_nmi() {
            self.nmi_pending = true;
        }
    }
}
