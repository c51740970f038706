//! Buzhash (cyclic polynomial) rolling hash over a fixed byte window.
//!
//! The fingerprint is the XOR of the table words of the last `window` bytes,
//! each rotated by its age. Rolling in a byte rotates everything by one,
//! cancels the byte that just left the window and mixes in the new one, so
//! the fingerprint only ever depends on the trailing window.

use super::RollingHash;
use super::table::BYTE_TABLE;

/// Windowed Buzhash state.
#[derive(Debug, Clone)]
pub struct Buzhash {
    hash: u64,
    window: Box<[u8]>,
    /// Next slot to overwrite; also the oldest byte once the window is full.
    pos: usize,
    filled: usize,
    mask: u64,
}

impl Buzhash {
    /// Creates a hash over a `window_size` byte window. A boundary is a
    /// fingerprint whose low `mask_bits` bits are all ones.
    pub fn new(window_size: usize, mask_bits: u32) -> Self {
        let window_size = window_size.max(1);
        let mask = if mask_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << mask_bits) - 1
        };
        Self {
            hash: 0,
            window: vec![0u8; window_size].into_boxed_slice(),
            pos: 0,
            filled: 0,
            mask,
        }
    }

    /// Returns the current fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.hash
    }

    /// Returns the window width in bytes.
    pub fn window_size(&self) -> usize {
        self.window.len()
    }
}

impl RollingHash for Buzhash {
    #[inline]
    fn roll(&mut self, byte: u8) {
        let width = self.window.len();
        self.hash = self.hash.rotate_left(1);

        if self.filled == width {
            let out = self.window[self.pos];
            self.hash ^= BYTE_TABLE[out as usize].rotate_left((width % 64) as u32);
        } else {
            self.filled += 1;
        }

        self.hash ^= BYTE_TABLE[byte as usize];
        self.window[self.pos] = byte;
        self.pos = (self.pos + 1) % width;
    }

    #[inline]
    fn is_boundary(&self, _len: usize) -> bool {
        self.hash & self.mask == self.mask
    }

    fn reset(&mut self) {
        self.hash = 0;
        self.pos = 0;
        self.filled = 0;
        self.window.fill(0);
    }
}
