//! Monochrome 64x32 framebuffer.
//!
//! Pixels are packed eight to a byte, row-major, most significant bit
//! leftmost. Sprites are XORed onto the buffer one byte (eight pixels)
//! at a time; each of the eight columns wraps around the right edge on
//! its own, so a byte anchored at column 60 touches 60..63 then 0..3.

use serde::{Deserialize, Serialize};

/// Display width in pixels.
pub const WIDTH: usize = 64;

/// Display height in pixels.
pub const HEIGHT: usize = 32;

/// Packed size in bytes.
pub const BUFFER_SIZE: usize = WIDTH * HEIGHT / 8;

/// The display bitmap.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framebuffer {
    bits: Vec<u8>,
}

impl Framebuffer {
    /// Create a blank framebuffer.
    pub fn new() -> Self {
        Self {
            bits: vec![0; BUFFER_SIZE],
        }
    }

    /// Locate the byte and bit mask holding pixel `(row, col)`.
    #[inline]
    fn locate(row: usize, col: usize) -> (usize, u8) {
        assert!(
            row < HEIGHT && col < WIDTH,
            "pixel ({}, {}) out of range ({}x{})",
            row, col, HEIGHT, WIDTH
        );
        let index = row * WIDTH + col;
        (index / 8, 0x80 >> (index % 8))
    }

    /// Read a single pixel.
    ///
    /// # Panics
    /// Panics if `row >= 32` or `col >= 64`.
    pub fn get(&self, row: usize, col: usize) -> bool {
        let (byte, mask) = Self::locate(row, col);
        self.bits[byte] & mask != 0
    }

    /// Write a single pixel.
    ///
    /// # Panics
    /// Panics if `row >= 32` or `col >= 64`.
    pub fn set(&mut self, row: usize, col: usize, on: bool) {
        let (byte, mask) = Self::locate(row, col);
        if on {
            self.bits[byte] |= mask;
        } else {
            self.bits[byte] &= !mask;
        }
    }

    /// Read eight pixels starting at `col`, wrapping each column modulo 64.
    ///
    /// The pixel at `col` becomes bit 7 of the result.
    pub fn get_byte(&self, row: usize, col: usize) -> u8 {
        (0..8).fold(0u8, |acc, i| {
            let bit = self.get(row, (col + i) % WIDTH) as u8;
            acc | (bit << (7 - i))
        })
    }

    /// Overwrite eight pixels starting at `col`, wrapping each column modulo 64.
    pub fn set_byte(&mut self, row: usize, col: usize, value: u8) {
        for i in 0..8 {
            let on = value & (0x80 >> i) != 0;
            self.set(row, (col + i) % WIDTH, on);
        }
    }

    /// XOR `sprite` onto eight pixels starting at `col`.
    ///
    /// Returns `true` if any pixel went from set to unset.
    pub fn blit_byte(&mut self, row: usize, col: usize, sprite: u8) -> bool {
        let before = self.get_byte(row, col);
        self.set_byte(row, col, before ^ sprite);
        before & sprite != 0
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.bits.fill(0);
    }

    /// Whether every pixel is off.
    pub fn is_blank(&self) -> bool {
        self.bits.iter().all(|b| *b == 0)
    }

    /// The packed bytes, 8 per row.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Row-major boolean copy of the display.
    pub fn snapshot(&self) -> [[bool; WIDTH]; HEIGHT] {
        let mut out = [[false; WIDTH]; HEIGHT];
        for (row, line) in out.iter_mut().enumerate() {
            for (col, px) in line.iter_mut().enumerate() {
                *px = self.get(row, col);
            }
        }
        out
    }

    /// Text view using `1` for lit and `0` for dark pixels.
    pub fn render(&self) -> String {
        self.render_with('1', '0')
    }

    /// Text view with caller-chosen glyphs, one line per row.
    pub fn render_with(&self, on: char, off: char) -> String {
        self.snapshot()
            .iter()
            .map(|line| {
                line.iter()
                    .map(|px| if *px { on } else { off })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.bits.iter().map(|b| b.count_ones()).sum::<u32>();
        f.debug_struct("Framebuffer")
            .field("lit_pixels", &lit)
            .field("size", &format_args!("{}x{}", WIDTH, HEIGHT))
            .finish()
    }
}
