//! Interpreter configuration.
//!
//! Two behaviours are left open by the instruction set and differ
//! between interpreters; both are selectable here. The CLI reads a
//! [`Config`] from JSON and lets flags override individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// What `8XYE` writes to VF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftFlag {
    /// VF := 1 if bit 7 was set, else 0. Matches `8XY6`.
    #[default]
    Normalized,
    /// VF := VX & 0x80, the raw masked high bit (0x00 or 0x80).
    RawMask,
}

/// How sprite rows below the bottom edge are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteRows {
    /// Rows at y >= 32 are not drawn.
    #[default]
    Clip,
    /// Rows continue from the top, modulo 32.
    Wrap,
}

/// Interpreter behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shift_flag: ShiftFlag,
    pub sprite_rows: SpriteRows,
}

impl Config {
    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a JSON configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&text)
    }
}

/// Errors that can occur while loading a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid configuration: {0}")]
    Parse(String),
}
