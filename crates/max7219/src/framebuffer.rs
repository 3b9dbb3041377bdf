//! In-memory framebuffer for a MAX7219 chain.

use crate::protocol::{BUFFER_SIZE, HEIGHT, MAX_MODULES, MODULE_SIZE};

/// 1bpp framebuffer spanning `modules` chained 8x8 matrices.
///
/// Row-major with `modules` bytes per row. Bit 7 of a byte is the leftmost
/// pixel of that module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
    modules: usize,
}

impl FrameBuffer {
    /// Creates a dark framebuffer; `modules` is clamped to `1..=MAX_MODULES`.
    pub const fn new(modules: usize) -> Self {
        let modules = if modules == 0 {
            1
        } else if modules > MAX_MODULES {
            MAX_MODULES
        } else {
            modules
        };

        Self {
            bytes: [0u8; BUFFER_SIZE],
            modules,
        }
    }

    pub const fn modules(&self) -> usize {
        self.modules
    }

    /// Width in pixels.
    pub const fn width(&self) -> usize {
        self.modules * MODULE_SIZE
    }

    /// Sets every pixel off (`on = false`) or on (`on = true`).
    pub fn clear(&mut self, on: bool) {
        let used = self.modules * HEIGHT;
        self.bytes[..used].fill(if on { 0xFF } else { 0x00 });
    }

    /// Sets a pixel state.
    ///
    /// Returns `true` when pixel is in bounds, `false` otherwise.
    pub fn set_pixel(&mut self, x: usize, y: usize, on: bool) -> bool {
        let Some((byte_index, bit_mask)) = self.locate(x, y) else {
            return false;
        };

        if on {
            self.bytes[byte_index] |= bit_mask;
        } else {
            self.bytes[byte_index] &= !bit_mask;
        }

        true
    }

    /// Reads a pixel state.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        let (byte_index, bit_mask) = self.locate(x, y)?;
        Some((self.bytes[byte_index] & bit_mask) != 0)
    }

    /// Returns the bytes of row `0..8`, one per module.
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        if row >= HEIGHT {
            return None;
        }

        let start = row * self.modules;
        Some(&self.bytes[start..start + self.modules])
    }

    /// Number of lit pixels; handy for diagnostics and tests.
    pub fn lit_count(&self) -> u32 {
        self.bytes[..self.modules * HEIGHT]
            .iter()
            .map(|b| b.count_ones())
            .sum()
    }

    fn locate(&self, x: usize, y: usize) -> Option<(usize, u8)> {
        if x >= self.width() || y >= HEIGHT {
            return None;
        }

        let byte_index = y * self.modules + (x / 8);
        let bit_mask = 1u8 << (7 - (x % 8));
        Some((byte_index, bit_mask))
    }
}
