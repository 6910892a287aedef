//! Program tooling.
//!
//! This module provides:
//! - ROM file loading with the size check
//! - A disassembler (raw words → readable text)

pub mod disasm;
pub mod rom;

pub use disasm::{disassemble, disassemble_instruction};
pub use rom::{load_rom, RomError};
