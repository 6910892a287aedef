//! Display-side state: the framebuffer and the built-in font.
//!
//! - [`Framebuffer`] - packed 64x32 bitmap with XOR blitting
//! - [`font`] - hex digit glyphs loaded below program space

pub mod font;
mod framebuffer;

pub use font::{glyph_address, FONT, FONT_BASE, GLYPH_SIZE};
pub use framebuffer::{Framebuffer, BUFFER_SIZE, HEIGHT, WIDTH};
