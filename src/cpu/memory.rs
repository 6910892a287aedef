//! Interpreter memory.
//!
//! 4096 bytes, 0x000-0xFFF. The font occupies 0x050-0x09F and programs
//! load at 0x200. Every access is bounds-checked; nothing wraps.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of addressable bytes.
pub const MEMORY_SIZE: usize = 4096;

/// Where programs are loaded and where execution starts.
pub const PROGRAM_START: u16 = 0x200;

/// Largest program that fits above [`PROGRAM_START`].
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Byte-addressed memory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a zeroed memory.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Check that `len` bytes starting at `addr` are addressable.
    #[inline]
    fn check(addr: usize, len: usize) -> Result<(), MemoryError> {
        match addr.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(()),
            _ => Err(MemoryError::AddressOutOfRange { addr, len }),
        }
    }

    /// Read one byte.
    pub fn read(&self, addr: usize) -> Result<u8, MemoryError> {
        Self::check(addr, 1)?;
        Ok(self.cells[addr])
    }

    /// Write one byte.
    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), MemoryError> {
        Self::check(addr, 1)?;
        self.cells[addr] = value;
        Ok(())
    }

    /// Read a big-endian 16-bit word from `addr` and `addr + 1`.
    pub fn read_word(&self, addr: usize) -> Result<u16, MemoryError> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8], MemoryError> {
        Self::check(addr, len)?;
        Ok(&self.cells[addr..addr + len])
    }

    /// Copy `data` into memory starting at `addr`.
    ///
    /// Either the whole slice is written or nothing is.
    pub fn write_slice(&mut self, addr: usize, data: &[u8]) -> Result<(), MemoryError> {
        Self::check(addr, data.len())?;
        self.cells[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Mutable view of every byte, for fixed regions known to fit.
    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Load a program image starting at `start_addr`.
    pub fn load_program(&mut self, start_addr: usize, program: &[u8]) -> Result<(), MemoryError> {
        let available = MEMORY_SIZE.saturating_sub(start_addr);
        if program.len() > available {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available,
            });
        }
        self.write_slice(start_addr, program)
    }

}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|b| **b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// The range `addr..addr + len` reaches past 0xFFF.
    #[error("memory range {addr:#05X}+{len} out of range (0x000-0xFFF)")]
    AddressOutOfRange { addr: usize, len: usize },

    /// Program does not fit between its load address and the top of memory.
    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
}
