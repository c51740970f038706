//! Min/max boundary rules on top of a [`RollingHash`].

use super::{ConfiguredHash, RollingHash};
use crate::config::ChunkerConfig;
use crate::error::ChunkError;

/// Finds chunk boundaries in a byte stream delivered as arbitrary slices.
///
/// A natural boundary is a byte after which the hash predicate holds and the
/// chunk length lies in `[min_size, max_size]`. If no natural boundary shows
/// up, one is forced at exactly `max_size` bytes. Either kind of boundary
/// resets the hash and the byte counter, so the next chunk is detected as if
/// the stream started there.
#[derive(Debug, Clone)]
pub struct RollingBoundaryDetector<H = ConfiguredHash> {
    hash: H,
    min_size: usize,
    max_size: usize,
    since_boundary: usize,
    last_forced: bool,
}

impl RollingBoundaryDetector<ConfiguredHash> {
    /// Creates a detector with the hash family and bounds of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` does not validate.
    pub fn from_config(config: &ChunkerConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::new(
            ConfiguredHash::from_config(config),
            config.min_size(),
            config.max_size(),
        ))
    }
}

impl<H: RollingHash> RollingBoundaryDetector<H> {
    /// Creates a detector around a custom `hash` with the bounds of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` does not validate.
    pub fn with_hash(config: &ChunkerConfig, hash: H) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::new(hash, config.min_size(), config.max_size()))
    }

    /// Bounds must come from a validated [`ChunkerConfig`].
    pub(crate) fn new(hash: H, min_size: usize, max_size: usize) -> Self {
        debug_assert!(0 < min_size && min_size <= max_size);
        Self {
            hash,
            min_size,
            max_size,
            since_boundary: 0,
            last_forced: false,
        }
    }

    /// Consumes `data` up to and including the next boundary.
    ///
    /// Returns the 1-based offset within `data` of the byte that completed a
    /// chunk, or `None` if all of `data` was consumed without reaching one.
    ///
    /// ```
    /// use dedup_chunker::{ChunkerConfig, RollingBoundaryDetector};
    ///
    /// let config = ChunkerConfig::new(4, 8, 16)?.with_mask_bits(40);
    /// let mut detector = RollingBoundaryDetector::from_config(&config)?;
    ///
    /// assert_eq!(detector.push(&[0u8; 10]), None);
    /// assert_eq!(detector.push(&[0u8; 10]), Some(6));
    /// # Ok::<(), dedup_chunker::ChunkError>(())
    /// ```
    pub fn push(&mut self, data: &[u8]) -> Option<usize> {
        for (i, &byte) in data.iter().enumerate() {
            self.hash.roll(byte);
            self.since_boundary += 1;

            if self.since_boundary < self.min_size {
                continue;
            }

            if self.since_boundary >= self.max_size {
                self.cut(true);
                return Some(i + 1);
            }

            if self.hash.is_boundary(self.since_boundary) {
                self.cut(false);
                return Some(i + 1);
            }
        }
        None
    }

    fn cut(&mut self, forced: bool) {
        self.since_boundary = 0;
        self.last_forced = forced;
        self.hash.reset();
    }

    /// Returns the number of bytes consumed since the last boundary.
    pub fn bytes_since_boundary(&self) -> usize {
        self.since_boundary
    }

    /// Whether the most recent boundary was forced by `max_size`.
    pub fn last_boundary_forced(&self) -> bool {
        self.last_forced
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the maximum chunk size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}
