//! # plan8
//!
//! A CHIP-8 virtual machine interpreter.
//!
//! The core is the fetch-decode-dispatch-execute engine and the
//! framebuffer's XOR-blit/collision model. Loading ROM files, drawing
//! the framebuffer, feeding keys and ticking timers at 60Hz are left to
//! the host; the [`tui`] module is one such host.

pub mod config;
pub mod cpu;
pub mod display;
pub mod random;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use config::{Config, ShiftFlag, SpriteRows};
pub use cpu::{Cpu, CpuError, CpuSnapshot, CpuState, Instruction, Step};
pub use display::Framebuffer;
pub use random::{RandomSource, Sequence, ThreadRandom};
pub use asm::{disassemble, disassemble_instruction, load_rom, RomError};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
