//! Program images on disk.
//!
//! A ROM is a raw byte dump with no header, loaded verbatim at 0x200.
//! The only validation is that it fits in the space above 0x200.

use crate::cpu::memory::MAX_PROGRAM_SIZE;
use std::path::Path;
use thiserror::Error;

/// Read a program image, rejecting anything that will not fit in memory.
pub fn load_rom<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, RomError> {
    let bytes = std::fs::read(path.as_ref()).map_err(|e| RomError::Io(e.to_string()))?;
    check_size(&bytes)?;
    Ok(bytes)
}

/// Check a program image against the available space.
pub fn check_size(image: &[u8]) -> Result<(), RomError> {
    if image.len() > MAX_PROGRAM_SIZE {
        return Err(RomError::TooLarge {
            size: image.len(),
            available: MAX_PROGRAM_SIZE,
        });
    }
    Ok(())
}

/// Errors that can occur while reading a ROM.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("ROM size {size} exceeds available space {available}")]
    TooLarge { size: usize, available: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_limit() {
        assert!(check_size(&vec![0; 3584]).is_ok());
        assert_eq!(
            check_size(&vec![0; 3585]),
            Err(RomError::TooLarge { size: 3585, available: 3584 })
        );
    }

    #[test]
    fn test_load_rom_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("plan8-rom-test-{}.ch8", std::process::id()));
        std::fs::write(&path, [0x6A, 0x11]).unwrap();

        let image = load_rom(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(image, vec![0x6A, 0x11]);
    }

    #[test]
    fn test_load_missing_rom() {
        assert!(matches!(
            load_rom("/nonexistent/plan8/missing.ch8"),
            Err(RomError::Io(_))
        ));
    }
}
