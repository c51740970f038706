//! Configuration for chunking behavior.
//!
//! [`ChunkerConfig`] holds the size bounds and rolling-hash parameters of a
//! chunker. It is `Copy` and never changes once a stream has been opened with
//! it, so any number of streams can share one value.
//!
//! # Example
//!
//! ```
//! use dedup_chunker::{Algorithm, ChunkerConfig};
//!
//! // Custom chunk sizes
//! let config = ChunkerConfig::new(2048, 8192, 32768)?;
//!
//! // Windowed Buzhash instead of the default gear hash
//! let config = ChunkerConfig::default()
//!     .with_algorithm(Algorithm::Buzhash)
//!     .with_window_size(48);
//! config.validate()?;
//!
//! # Ok::<(), dedup_chunker::ChunkError>(())
//! ```

use crate::error::ChunkError;

/// Default minimum chunk size (4 KiB).
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 4 * 1024;

/// Default average/target chunk size (16 KiB).
pub const DEFAULT_AVG_CHUNK_SIZE: usize = 16 * 1024;

/// Default maximum chunk size (64 KiB).
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 64 * 1024;

/// Default rolling window width in bytes.
pub const DEFAULT_WINDOW_SIZE: usize = 64;

/// Largest accepted rolling window width in bytes.
pub const MAX_WINDOW_SIZE: usize = 4096;

/// Default normalization level (masks differ by ±2 bits).
pub const DEFAULT_NORMALIZATION_LEVEL: u8 = 2;

/// Widest accepted boundary mask.
pub const MAX_MASK_BITS: u32 = 48;

/// Rolling hash family used to find natural boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    /// FastCDC gear hash with normalized chunking.
    #[default]
    Gear,
    /// Cyclic-polynomial hash over an explicit `window_size` byte window.
    Buzhash,
}

/// Configuration for content-defined chunking.
///
/// Size constraints: `0 < min_size <= avg_size <= max_size`. Sizes do not
/// have to be powers of two.
///
/// The boundary mask width defaults to `floor(log2(avg_size))` (at least 1)
/// and follows `avg_size` unless pinned with [`ChunkerConfig::with_mask_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkerConfig {
    min_size: usize,
    avg_size: usize,
    max_size: usize,
    window_size: usize,
    mask_bits: Option<u32>,
    normalization_level: u8,
    algorithm: Algorithm,
}

impl ChunkerConfig {
    /// Creates a new configuration with default hash parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if any size is zero or the sizes
    /// are out of order.
    ///
    /// # Example
    ///
    /// ```
    /// use dedup_chunker::ChunkerConfig;
    ///
    /// let config = ChunkerConfig::new(4, 8, 16)?;
    /// assert_eq!(config.max_size(), 16);
    /// assert!(ChunkerConfig::new(8, 4, 16).is_err());
    /// # Ok::<(), dedup_chunker::ChunkError>(())
    /// ```
    pub fn new(min_size: usize, avg_size: usize, max_size: usize) -> Result<Self, ChunkError> {
        check_sizes(min_size, avg_size, max_size)?;

        let avg_bits = log2_floor(avg_size);
        let effective_level = DEFAULT_NORMALIZATION_LEVEL.min(avg_bits.saturating_sub(2) as u8);

        let config = Self {
            min_size,
            avg_size,
            max_size,
            window_size: DEFAULT_WINDOW_SIZE,
            mask_bits: None,
            normalization_level: effective_level,
            algorithm: Algorithm::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the minimum chunk size.
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Sets the average/target chunk size.
    pub fn with_avg_size(mut self, size: usize) -> Self {
        self.avg_size = size;
        self
    }

    /// Sets the maximum chunk size.
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Sets the rolling window width (used by [`Algorithm::Buzhash`]).
    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Pins the boundary mask width instead of deriving it from `avg_size`.
    pub fn with_mask_bits(mut self, bits: u32) -> Self {
        self.mask_bits = Some(bits);
        self
    }

    /// Sets the normalization level (used by [`Algorithm::Gear`]).
    pub fn with_normalization_level(mut self, level: u8) -> Self {
        self.normalization_level = level;
        self
    }

    /// Selects the rolling hash family.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the average/target chunk size.
    pub fn avg_size(&self) -> usize {
        self.avg_size
    }

    /// Returns the maximum chunk size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the rolling window width.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns the boundary mask width in bits.
    pub fn mask_bits(&self) -> u32 {
        self.mask_bits.unwrap_or_else(|| log2_floor(self.avg_size).max(1))
    }

    /// Returns the normalization level.
    pub fn normalization_level(&self) -> u8 {
        self.normalization_level
    }

    /// Returns the rolling hash family.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Validates the current configuration.
    ///
    /// Builder setters do not validate; streams call this before they start.
    ///
    /// ```
    /// use dedup_chunker::ChunkerConfig;
    ///
    /// let config = ChunkerConfig::default().with_min_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ChunkError> {
        check_sizes(self.min_size, self.avg_size, self.max_size)?;

        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(ChunkError::InvalidConfig {
                message: "window_size must be between 1 and 4096",
            });
        }

        let bits = self.mask_bits();
        if bits == 0 || bits > MAX_MASK_BITS {
            return Err(ChunkError::InvalidConfig {
                message: "mask_bits must be between 1 and 48",
            });
        }

        let level = u32::from(self.normalization_level);
        if level > 0 && level >= bits {
            return Err(ChunkError::InvalidConfig {
                message: "normalization_level must be smaller than mask_bits",
            });
        }
        if bits + level > 63 {
            return Err(ChunkError::InvalidConfig {
                message: "mask_bits plus normalization_level cannot exceed 63",
            });
        }

        Ok(())
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_CHUNK_SIZE,
            avg_size: DEFAULT_AVG_CHUNK_SIZE,
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            mask_bits: None,
            normalization_level: DEFAULT_NORMALIZATION_LEVEL,
            algorithm: Algorithm::default(),
        }
    }
}

fn check_sizes(min_size: usize, avg_size: usize, max_size: usize) -> Result<(), ChunkError> {
    if min_size == 0 || avg_size == 0 || max_size == 0 {
        return Err(ChunkError::InvalidConfig {
            message: "chunk sizes must be non-zero",
        });
    }

    if min_size > avg_size {
        return Err(ChunkError::InvalidConfig {
            message: "min_size cannot be greater than avg_size",
        });
    }

    if avg_size > max_size {
        return Err(ChunkError::InvalidConfig {
            message: "avg_size cannot be greater than max_size",
        });
    }

    Ok(())
}

fn log2_floor(value: usize) -> u32 {
    usize::BITS - 1 - value.max(1).leading_zeros()
}
