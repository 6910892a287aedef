//! Register file and call stack.
//!
//! - V0-VF: sixteen 8-bit general registers; VF doubles as the flag
//!   register for carry, borrow, shift-out and collision
//! - I: 16-bit index register
//! - PC: 16-bit program counter
//! - a 16-entry return stack with its own pointer

use crate::cpu::memory::PROGRAM_START;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of general registers.
pub const REGISTER_COUNT: usize = 16;

/// Index of the flag register.
pub const FLAG: usize = 0xF;

/// Depth of the return stack.
pub const STACK_DEPTH: usize = 16;

/// Fixed-depth return stack.
///
/// The pointer counts used slots, so it lives in `0..=16`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stack {
    slots: [u16; STACK_DEPTH],
    sp: u8,
}

impl Stack {
    /// Create an empty stack.
    pub const fn new() -> Self {
        Self {
            slots: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    /// Store `addr` in the next free slot.
    pub fn push(&mut self, addr: u16) -> Result<(), StackError> {
        let sp = self.sp as usize;
        if sp >= STACK_DEPTH {
            return Err(StackError::Overflow);
        }
        self.slots[sp] = addr;
        self.sp += 1;
        Ok(())
    }

    /// Remove and return the most recently pushed address.
    pub fn pop(&mut self) -> Result<u16, StackError> {
        if self.sp == 0 {
            return Err(StackError::Underflow);
        }
        self.sp -= 1;
        Ok(self.slots[self.sp as usize])
    }

    /// The stack pointer (number of occupied slots).
    pub fn pointer(&self) -> u8 {
        self.sp
    }

    /// Occupied slots, oldest first.
    pub fn frames(&self) -> &[u16] {
        &self.slots[..self.sp as usize]
    }
}

/// The register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// V0-VF.
    pub v: [u8; REGISTER_COUNT],

    /// I: index register for memory and sprite addressing.
    pub i: u16,

    /// PC: address of the next instruction to fetch.
    pub pc: u16,

    /// Return addresses for subroutine calls.
    pub stack: Stack,
}

impl Registers {
    /// Create a register file at power-on state (PC = 0x200).
    pub fn new() -> Self {
        Self {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            stack: Stack::new(),
        }
    }

    /// Reset to power-on state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Move to the next instruction.
    #[inline]
    pub fn advance_pc(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Skip over the next instruction.
    #[inline]
    pub fn skip_pc(&mut self) {
        self.pc = self.pc.wrapping_add(4);
    }

    /// Advance past the next instruction when `condition` holds.
    pub fn skip_if(&mut self, condition: bool) {
        if condition {
            self.skip_pc();
        } else {
            self.advance_pc();
        }
    }

    /// Set the program counter to an absolute address.
    pub fn jump(&mut self, addr: u16) {
        self.pc = addr;
    }

    /// VF.
    pub fn flag(&self) -> u8 {
        self.v[FLAG]
    }

    /// Write VF.
    pub fn set_flag(&mut self, value: u8) {
        self.v[FLAG] = value;
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by the return stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StackError {
    #[error("stack overflow: all {} slots in use", STACK_DEPTH)]
    Overflow,

    #[error("stack underflow: return with an empty stack")]
    Underflow,
}
