//! Content-Defined Chunking (CDC) boundary detection.
//!
//! This module contains the algorithms that decide where chunks end:
//!
//! - [`RollingHash`] - an incremental fingerprint plus its boundary predicate
//! - [`Gear`] - FastCDC gear hash with normalized chunking
//! - [`Buzhash`] - cyclic polynomial hash over an explicit byte window
//! - [`RollingBoundaryDetector`] - applies the min/max rules on top of a hash

mod buzhash;
mod detector;
mod gear;
mod table;

pub use buzhash::Buzhash;
pub use detector::RollingBoundaryDetector;
pub use gear::Gear;

use crate::config::{Algorithm, ChunkerConfig};

/// An incremental fingerprint over the trailing bytes of a stream.
///
/// Implementations keep all of their window state internally, so feeding a
/// byte sequence produces the same fingerprints no matter how the sequence
/// was split across calls.
pub trait RollingHash: Send {
    /// Rolls one byte into the fingerprint.
    fn roll(&mut self, byte: u8);

    /// Whether the current fingerprint marks a natural boundary.
    ///
    /// `len` is the number of bytes consumed since the previous boundary,
    /// including the one just rolled in.
    fn is_boundary(&self, len: usize) -> bool;

    /// Forgets all window state, as if no byte had been seen.
    fn reset(&mut self);
}

/// The hash family selected by a [`ChunkerConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredHash {
    /// See [`Gear`].
    Gear(Gear),
    /// See [`Buzhash`].
    Buzhash(Buzhash),
}

impl ConfiguredHash {
    /// Builds the hash described by `config`.
    pub fn from_config(config: &ChunkerConfig) -> Self {
        match config.algorithm() {
            Algorithm::Gear => ConfiguredHash::Gear(Gear::new(
                config.avg_size(),
                config.mask_bits(),
                config.normalization_level(),
            )),
            Algorithm::Buzhash => {
                ConfiguredHash::Buzhash(Buzhash::new(config.window_size(), config.mask_bits()))
            }
        }
    }
}

impl RollingHash for ConfiguredHash {
    #[inline]
    fn roll(&mut self, byte: u8) {
        match self {
            ConfiguredHash::Gear(h) => h.roll(byte),
            ConfiguredHash::Buzhash(h) => h.roll(byte),
        }
    }

    #[inline]
    fn is_boundary(&self, len: usize) -> bool {
        match self {
            ConfiguredHash::Gear(h) => h.is_boundary(len),
            ConfiguredHash::Buzhash(h) => h.is_boundary(len),
        }
    }

    fn reset(&mut self) {
        match self {
            ConfiguredHash::Gear(h) => h.reset(),
            ConfiguredHash::Buzhash(h) => h.reset(),
        }
    }
}
