//! The CHIP-8 machine.
//!
//! This module implements the interpreter core:
//! - 4096 bytes of memory with the font at 0x050 and programs at 0x200
//! - 16 general registers (VF is the flag), index register, PC, 16-deep stack
//! - delay/sound timers and a 16-key pad, both driven by the host
//! - a table-driven dispatcher over the 34 instruction forms

pub mod memory;
pub mod registers;
pub mod peripherals;
pub mod decode;
pub mod dispatch;
pub mod execute;

pub use memory::{Memory, MemoryError, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
pub use registers::{Registers, Stack, StackError};
pub use peripherals::{Keypad, Timers};
pub use decode::{decode, encode, Instruction, Opcode};
pub use dispatch::dispatch;
pub use execute::{Cpu, CpuError, CpuSnapshot, CpuState, Step};
