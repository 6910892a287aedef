//! Random byte source for `CXNN`.
//!
//! The machine owns a boxed [`RandomSource`]; tests swap in a fixed
//! sequence instead of relying on global random state.

/// Something that can produce random bytes.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

/// Uniform bytes from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_byte(&mut self) -> u8 {
        rand::random::<u8>()
    }
}

impl<F> RandomSource for F
where
    F: FnMut() -> u8,
{
    fn next_byte(&mut self) -> u8 {
        self()
    }
}

/// Replays a fixed sequence of bytes, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct Sequence {
    bytes: Vec<u8>,
    next: usize,
}

impl Sequence {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            next: 0,
        }
    }
}

impl RandomSource for Sequence {
    fn next_byte(&mut self) -> u8 {
        if self.bytes.is_empty() {
            return 0;
        }
        let byte = self.bytes[self.next % self.bytes.len()];
        self.next = self.next.wrapping_add(1);
        byte
    }
}
