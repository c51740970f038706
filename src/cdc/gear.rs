//! FastCDC gear hash.
//!
//! The gear hash shifts the fingerprint left by one bit per byte and adds a
//! table word for the incoming byte, so bit `k` of the fingerprint depends on
//! the last `k + 1` bytes. Boundary masks are therefore taken from the high
//! bits, giving an effective window of 64 bytes without keeping one.
//!
//! Normalized chunking uses two masks: a strict one (more bits) while the
//! chunk is shorter than the target size and a loose one (fewer bits) after,
//! which pulls the size distribution toward the target.
//!
//! # References
//!
//! "FastCDC: A Fast and Efficient Content-Defined Chunking Approach for Data
//! Deduplication", Wen Xia et al., USENIX ATC 2016.

use super::RollingHash;
use super::table::BYTE_TABLE;

/// FastCDC rolling hash state.
#[derive(Debug, Clone)]
pub struct Gear {
    /// Current fingerprint.
    hash: u64,

    /// Chunk length at which the loose mask takes over.
    avg_size: usize,

    /// Mask used below `avg_size` (harder to match).
    mask_s: u64,

    /// Mask used from `avg_size` on (easier to match).
    mask_l: u64,
}

impl Gear {
    /// Creates a gear hash targeting `avg_size` byte chunks.
    ///
    /// `mask_bits` is the nominal mask width; the strict and loose masks are
    /// `mask_bits ± normalization_level` bits wide.
    pub fn new(avg_size: usize, mask_bits: u32, normalization_level: u8) -> Self {
        let level = u32::from(normalization_level);
        Self {
            hash: 0,
            avg_size,
            mask_s: high_mask(mask_bits + level),
            mask_l: high_mask(mask_bits.saturating_sub(level).max(1)),
        }
    }

    /// Returns the current fingerprint.
    pub fn fingerprint(&self) -> u64 {
        self.hash
    }
}

impl RollingHash for Gear {
    #[inline]
    fn roll(&mut self, byte: u8) {
        self.hash = (self.hash << 1).wrapping_add(BYTE_TABLE[byte as usize]);
    }

    #[inline]
    fn is_boundary(&self, len: usize) -> bool {
        let mask = if len < self.avg_size {
            self.mask_s
        } else {
            self.mask_l
        };
        self.hash & mask == 0
    }

    fn reset(&mut self) {
        self.hash = 0;
    }
}

/// A mask selecting the `bits` most significant bits.
fn high_mask(bits: u32) -> u64 {
    match bits {
        0 => 0,
        64.. => u64::MAX,
        n => u64::MAX << (64 - n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_mask() {
        assert_eq!(high_mask(0), 0);
        assert_eq!(high_mask(1), 1 << 63);
        assert_eq!(high_mask(4), 0xf000_0000_0000_0000);
        assert_eq!(high_mask(64), u64::MAX);
    }

    #[test]
    fn test_normalized_masks() {
        let gear = Gear::new(1 << 13, 13, 2);
        assert_eq!(gear.mask_s.count_ones(), 15);
        assert_eq!(gear.mask_l.count_ones(), 11);
    }

    #[test]
    fn test_strict_mask_before_avg() {
        let mut gear = Gear::new(16, 4, 2);
        // Only the top six bits matter below avg, the top two after it.
        gear.hash = 0x0200_0000_0000_0000;
        assert!(gear.is_boundary(8));
        gear.hash = 0x2000_0000_0000_0000;
        assert!(!gear.is_boundary(8));
        assert!(gear.is_boundary(16));
    }

    #[test]
    fn test_fingerprint_forgets_old_bytes() {
        let mut a = Gear::new(16, 4, 0);
        let mut b = Gear::new(16, 4, 0);
        a.roll(0x01);
        b.roll(0xFE);
        for i in 0..64u8 {
            a.roll(i);
            b.roll(i);
        }
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_reset() {
        let mut gear = Gear::new(16, 4, 0);
        gear.roll(0xAA);
        assert_ne!(gear.fingerprint(), 0);
        gear.reset();
        assert_eq!(gear.fingerprint(), 0);
    }
}
