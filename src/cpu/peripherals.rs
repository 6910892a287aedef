//! Host-driven peripherals: the two countdown timers and the keypad.
//!
//! The interpreter only reads and writes these. Decrementing the timers
//! and refreshing key state happen on the host's own cadence.

use serde::{Deserialize, Serialize};

/// Number of keys on the hex keypad.
pub const KEY_COUNT: usize = 16;

/// Delay and sound timers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    /// Count both timers down by one, stopping at zero.
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Whether the host should be producing a tone.
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

/// Pressed/released state for keys 0x0-0xF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    /// All keys released.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `key`, or `None` if it is not a keypad key.
    pub fn is_pressed(&self, key: u8) -> Option<bool> {
        self.keys.get(key as usize).copied()
    }

    /// Set the state of a single key. Keys above 0xF are ignored.
    pub fn set(&mut self, key: u8, pressed: bool) {
        if let Some(slot) = self.keys.get_mut(key as usize) {
            *slot = pressed;
        }
    }

    /// Replace the whole key vector.
    pub fn set_all(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    /// Lowest-numbered key currently held.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }

    /// Release every key.
    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_floor_at_zero() {
        let mut timers = Timers { delay: 2, sound: 1 };
        timers.tick();
        assert_eq!(timers, Timers { delay: 1, sound: 0 });
        assert!(!timers.sound_active());
        timers.tick();
        timers.tick();
        assert_eq!(timers, Timers { delay: 0, sound: 0 });
    }

    #[test]
    fn test_keypad() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.first_pressed(), None);

        keypad.set(0xB, true);
        keypad.set(0x4, true);
        keypad.set(0x20, true);

        assert_eq!(keypad.is_pressed(0xB), Some(true));
        assert_eq!(keypad.is_pressed(0x0), Some(false));
        assert_eq!(keypad.is_pressed(0x10), None);
        assert_eq!(keypad.first_pressed(), Some(0x4));

        keypad.release_all();
        assert_eq!(keypad.first_pressed(), None);
    }
}
