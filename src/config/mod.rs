//! Configuration for chunking, tree building and lookups.
//!
//! - [`ChunkConfig`] - Chunk size bounds, tree fan-out and literal batching
//! - [`LookupConfig`] - Request timeout for the remote index
//!
//! Both sides of a delta (the original tree and the modified stream) must
//! be chunked with the same [`ChunkConfig`]; boundaries are only comparable
//! when every constant matches.
//!
//! # Example
//!
//! ```
//! use chunkdiff::ChunkConfig;
//!
//! let config = ChunkConfig::new(4096, 16384, 65536)?
//!     .with_fanout_bits(4)
//!     .with_max_level(6);
//! config.validate()?;
//!
//! # Ok::<(), chunkdiff::ChunkError>(())
//! ```

use std::time::Duration;

use crate::error::ChunkError;

/// Default minimum chunk size (4 KiB).
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 4 * 1024;

/// Default average chunk size (16 KiB), i.e. a 14-bit level-0 mask.
pub const DEFAULT_AVG_CHUNK_SIZE: usize = 16 * 1024;

/// Default maximum chunk size (64 KiB).
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 64 * 1024;

/// Default number of extra hash bits required per tree level.
pub const DEFAULT_FANOUT_BITS: u8 = 4;

/// Default highest boundary level reported by the detector.
pub const DEFAULT_MAX_LEVEL: u8 = 8;

/// Default cap on a single `Literal` instruction (256 KiB).
pub const DEFAULT_MAX_LITERAL_SIZE: usize = 256 * 1024;

/// Default timeout for a single remote lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of threads serving remote lookups.
pub const DEFAULT_LOOKUP_WORKERS: usize = 4;

/// Configuration for content-defined chunking and tree grouping.
///
/// Size constraints: `min_size <= avg_size <= max_size`, all powers of 2.
///
/// The average size sets the level-0 boundary mask (`log2(avg_size)` high
/// hash bits must be zero). Each tree level above that requires another
/// `fanout_bits` zero bits, so a level-L node groups on average
/// `2^fanout_bits` level-(L-1) nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    min_size: usize,
    avg_size: usize,
    max_size: usize,
    fanout_bits: u8,
    max_level: u8,
    max_literal_size: usize,
}

impl ChunkConfig {
    /// Creates a new configuration with the specified size bounds.
    ///
    /// Fan-out, level cap and literal batching take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if:
    /// - Any size is zero
    /// - `min_size > avg_size` or `avg_size > max_size`
    /// - Sizes are not powers of 2
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::ChunkConfig;
    ///
    /// let config = ChunkConfig::new(4096, 16384, 65536)?;
    /// assert_eq!(config.min_size(), 4096);
    /// # Ok::<(), chunkdiff::ChunkError>(())
    /// ```
    pub fn new(min_size: usize, avg_size: usize, max_size: usize) -> Result<Self, ChunkError> {
        let config = Self {
            min_size,
            avg_size,
            max_size,
            fanout_bits: DEFAULT_FANOUT_BITS,
            max_level: DEFAULT_MAX_LEVEL,
            max_literal_size: DEFAULT_MAX_LITERAL_SIZE.max(max_size),
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the minimum chunk size.
    ///
    /// Note: This does not validate the configuration. Use [`ChunkConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_min_size(mut self, size: usize) -> Self {
        self.min_size = size;
        self
    }

    /// Sets the average chunk size.
    pub fn with_avg_size(mut self, size: usize) -> Self {
        self.avg_size = size;
        self
    }

    /// Sets the maximum chunk size.
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Sets how many extra zero hash bits each tree level requires.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::ChunkConfig;
    ///
    /// let config = ChunkConfig::default().with_fanout_bits(2);
    /// assert_eq!(config.fanout_bits(), 2);
    /// ```
    pub fn with_fanout_bits(mut self, bits: u8) -> Self {
        self.fanout_bits = bits;
        self
    }

    /// Sets the highest boundary level the detector reports.
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = level;
        self
    }

    /// Sets the size at which an accumulating `Literal` is flushed.
    pub fn with_max_literal_size(mut self, size: usize) -> Self {
        self.max_literal_size = size;
        self
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Returns the average chunk size.
    pub fn avg_size(&self) -> usize {
        self.avg_size
    }

    /// Returns the maximum chunk size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of extra zero bits per tree level.
    pub fn fanout_bits(&self) -> u8 {
        self.fanout_bits
    }

    /// Returns the highest boundary level.
    pub fn max_level(&self) -> u8 {
        self.max_level
    }

    /// Returns the literal flush threshold.
    pub fn max_literal_size(&self) -> usize {
        self.max_literal_size
    }

    /// Number of high hash bits that must be zero for a level-0 boundary.
    pub(crate) fn chunk_bits(&self) -> u32 {
        self.avg_size.trailing_zeros()
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkdiff::ChunkConfig;
    ///
    /// let config = ChunkConfig::default().with_min_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ChunkError> {
        let (min_size, avg_size, max_size) = (self.min_size, self.avg_size, self.max_size);

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

        if !min_size.is_power_of_two() || !avg_size.is_power_of_two() || !max_size.is_power_of_two()
        {
            return Err(ChunkError::InvalidConfig {
                message: "chunk sizes should be powers of 2",
            });
        }

        if self.fanout_bits == 0 || self.fanout_bits > 16 {
            return Err(ChunkError::InvalidConfig {
                message: "fanout_bits must be between 1 and 16",
            });
        }

        let level_bits = self.chunk_bits() + u32::from(self.max_level) * u32::from(self.fanout_bits);
        if level_bits > 64 {
            return Err(ChunkError::InvalidConfig {
                message: "max_level * fanout_bits exceeds the 64-bit rolling hash",
            });
        }

        if self.max_literal_size < max_size {
            return Err(ChunkError::InvalidConfig {
                message: "max_literal_size cannot be smaller than max_size",
            });
        }

        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_CHUNK_SIZE,
            avg_size: DEFAULT_AVG_CHUNK_SIZE,
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            fanout_bits: DEFAULT_FANOUT_BITS,
            max_level: DEFAULT_MAX_LEVEL,
            max_literal_size: DEFAULT_MAX_LITERAL_SIZE,
        }
    }
}

/// Configuration for the remote (request/response) index.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use chunkdiff::LookupConfig;
///
/// let config = LookupConfig::default().with_timeout(Duration::from_millis(250));
/// assert_eq!(config.timeout(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupConfig {
    timeout: Duration,
    workers: usize,
}

impl LookupConfig {
    /// Creates a lookup configuration with the given per-request timeout.
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            workers: DEFAULT_LOOKUP_WORKERS,
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many lookups [`RemoteIndex::serve`](crate::RemoteIndex::serve)
    /// answers at once. Values below 1 are treated as 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of serving threads, at least 1.
    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}
