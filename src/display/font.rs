//! Built-in hexadecimal glyphs.
//!
//! Sixteen 4x5 glyphs, one per hex digit, each stored as five bytes
//! whose high nibble holds the pixels.

use crate::cpu::memory::{Memory, PROGRAM_START};

/// Address of the first glyph byte.
pub const FONT_BASE: u16 = 0x050;

/// Bytes per glyph.
pub const GLYPH_SIZE: u16 = 5;

/// Glyph patterns for `0`-`F`.
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// One past the last glyph byte.
const FONT_END: usize = FONT_BASE as usize + FONT.len();

// The glyph region has to sit entirely below program space.
const _: () = assert!(FONT_END <= PROGRAM_START as usize);

/// Address of the glyph for `digit`.
///
/// Values above `0xF` are not masked; they address past the table the
/// same way the instruction set does.
pub fn glyph_address(digit: u8) -> u16 {
    FONT_BASE + digit as u16 * GLYPH_SIZE
}

/// Write the glyph table into memory at [`FONT_BASE`].
pub fn load_font(mem: &mut Memory) {
    mem.cells_mut()[FONT_BASE as usize..FONT_END].copy_from_slice(&FONT);
}
