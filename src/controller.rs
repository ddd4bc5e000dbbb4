//! NES controller input handling.
//!
//! Implements the standard NES controller shift register protocol
//! ([Standard controller](https://www.nesdev.org/wiki/Standard_controller)):
//! write 1 then 0 to $4016 to latch current state; then read $4016/$4017 repeatedly
//! to get one bit per read (A, B, Select, Start, Up, Down, Left, Right).

pub const BUTTON_A: u8 = 1 << 0;
pub const BUTTON_B: u8 = 1 << 1;
pub const BUTTON_SELECT: u8 = 1 << 2;
pub const BUTTON_START: u8 = 1 << 3;
pub const BUTTON_UP: u8 = 1 << 4;
pub const BUTTON_DOWN: u8 = 1 << 5;
pub const BUTTON_LEFT: u8 = 1 << 6;
pub const BUTTON_RIGHT: u8 = 1 << 7;

/// A single NES controller on port 1 ($4016) or port 2 ($4017).
#[derive(Clone, Copy, Debug, Default)]
pub struct Controller {
    /// Host-side button latch: bit 0 = A, 1 = B, 2 = Select, 3 = Start, 4 = Up, 5 = Down, 6 = Left, 7 = Right.
    pub state: u8,
    /// Shift register: latched from `state` on strobe; shifted out LSB-first on read.
    pub shift: u8,
    /// Strobe line (bit 0 of the last $4016 write). While high the shift register keeps reloading.
    pub strobe: bool,
}

impl Controller {
    /// Create a new controller with no buttons pressed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one button state. Returns bit 0 of the shift register OR'd with open bus ($40).
    /// After all eight buttons the official pad returns 1.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return (self.state & 1) | 0x40;
        }
        let bit = self.shift & 1;
        self.shift = (self.shift >> 1) | 0x80;
        bit | 0x40
    }

    /// Write to $4016. Bit 0 set latches the current button state into the shift register.
    pub fn write(&mut self, data: u8) {
        self.strobe = data & 1 != 0;
        if self.strobe {
            self.shift = self.state;
        }
    }
}
