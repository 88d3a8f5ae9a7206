//! Gear rolling hash with multi-level boundary detection.
//!
//! # Algorithm Overview
//!
//! The detector keeps a 64-bit gear hash `h = (h << 1) + GEAR[byte]`. Each
//! shift pushes the oldest contribution one bit further out, so after 64
//! bytes a byte no longer influences the hash: the checksum is a rolling
//! window over the last 64 bytes, updated in O(1) per byte.
//!
//! Boundaries are judged on the *high* bits, which carry the longest
//! history:
//!
//! - **Level 0**: the top `log2(avg_size)` bits are all zero.
//! - **Level L**: additionally the next `L * fanout_bits` bits are zero, so
//!   each level is `2^fanout_bits` times rarer than the one below.
//! - **Forced**: `max_size` bytes since the previous boundary with no match
//!   yields a level-0 cut.
//!
//! No boundary fires before `min_size` bytes. The hash is never reset at a
//! boundary, so whether a position is a boundary depends only on the window
//! contents and the distance from the previous boundary. This is what lets
//! an edited stream fall back into step with the original after an edit.

use crate::config::ChunkConfig;

/// Seed of the gear table. Changing it changes every boundary.
const GEAR_SEED: u64 = 0x6368_756e_6b64_6966;

/// splitmix64 expansion of [`GEAR_SEED`] into 256 table entries.
const fn gear_values() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut state = GEAR_SEED;
    let mut i = 0;
    while i < 256 {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        table[i] = z ^ (z >> 31);
        i += 1;
    }
    table
}

static GEAR: [u64; 256] = gear_values();

/// Rolling boundary detector.
///
/// Feed bytes with [`update`](Self::update); a `Some(level)` result means
/// the byte just consumed is the last byte of a chunk.
///
/// # Example
///
/// ```ignore
/// use chunkdiff::cdc::RollingBoundary;
///
/// let mut detector = RollingBoundary::new(&ChunkConfig::default());
///
/// for byte in data {
///     if let Some(level) = detector.update(byte) {
///         println!("boundary at level {level}");
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RollingBoundary {
    /// Current gear hash.
    hash: u64,

    /// Bytes consumed since the previous boundary.
    bytes_since_boundary: usize,

    min_size: usize,
    max_size: usize,

    /// Leading zero bits required for a level-0 boundary.
    chunk_bits: u32,

    /// Extra leading zero bits per level.
    fanout_bits: u32,

    max_level: u8,
}

impl RollingBoundary {
    /// Creates a detector from a configuration.
    ///
    /// An unvalidated `fanout_bits` of 0 is treated as 1.
    pub fn new(config: &ChunkConfig) -> Self {
        Self {
            hash: 0,
            bytes_since_boundary: 0,
            min_size: config.min_size(),
            max_size: config.max_size(),
            chunk_bits: config.chunk_bits(),
            fanout_bits: u32::from(config.fanout_bits().max(1)),
            max_level: config.max_level(),
        }
    }

    /// Resets the state for a new stream.
    pub fn reset(&mut self) {
        self.hash = 0;
        self.bytes_since_boundary = 0;
    }

    /// Consumes one byte and reports the boundary level, if a boundary
    /// falls right after it.
    #[inline]
    pub fn update(&mut self, byte: u8) -> Option<u8> {
        self.hash = (self.hash << 1).wrapping_add(GEAR[byte as usize]);
        self.bytes_since_boundary += 1;

        if self.bytes_since_boundary < self.min_size {
            return None;
        }

        let zeros = self.hash.leading_zeros();
        if zeros >= self.chunk_bits {
            self.bytes_since_boundary = 0;
            let level = (zeros - self.chunk_bits) / self.fanout_bits;
            return Some(level.min(u32::from(self.max_level)) as u8);
        }

        if self.bytes_since_boundary >= self.max_size {
            self.bytes_since_boundary = 0;
            return Some(0);
        }

        None
    }

    /// Scans `data` and returns `(len, level)` for the first boundary found,
    /// where `len` counts the bytes of `data` up to and including it.
    pub fn find_boundary(&mut self, data: &[u8]) -> Option<(usize, u8)> {
        data.iter()
            .enumerate()
            .find_map(|(i, &byte)| self.update(byte).map(|level| (i + 1, level)))
    }

    /// Returns the number of bytes since the last boundary.
    pub fn bytes_since_boundary(&self) -> usize {
        self.bytes_since_boundary
    }
}

impl Default for RollingBoundary {
    fn default() -> Self {
        Self::new(&ChunkConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> ChunkConfig {
        ChunkConfig::new(16, 64, 256).unwrap()
    }

    fn noise(len: usize, mut seed: u64) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                seed as u8
            })
            .collect()
    }

    fn boundaries(detector: &mut RollingBoundary, data: &[u8]) -> Vec<(usize, u8)> {
        data.iter()
            .enumerate()
            .filter_map(|(i, &b)| detector.update(b).map(|level| (i + 1, level)))
            .collect()
    }

    #[test]
    fn test_gear_table_is_populated() {
        assert_ne!(GEAR[0], GEAR[1]);
        assert!(GEAR.iter().all(|&v| v != 0));
    }

    #[test]
    fn test_min_size_constraint() {
        let mut detector = RollingBoundary::new(&small());
        for _ in 0..15 {
            assert_eq!(detector.update(0xFF), None, "No boundary before min_size");
        }
    }

    #[test]
    fn test_max_size_enforcement() {
        let config = ChunkConfig::new(2, 8, 8).unwrap();
        let mut detector = RollingBoundary::new(&config);

        let cuts = boundaries(&mut detector, &[0x42; 64]);
        assert!(!cuts.is_empty());

        let mut previous = 0;
        for (pos, _) in cuts {
            assert!(pos - previous <= 8, "Boundary spacing must not exceed max_size");
            previous = pos;
        }
    }

    #[test]
    fn test_determinism() {
        let data = noise(20_000, 0x1234_5678);

        let first = boundaries(&mut RollingBoundary::new(&small()), &data);
        let second = boundaries(&mut RollingBoundary::new(&small()), &data);

        assert!(!first.is_empty());
        assert_eq!(first, second, "Same input must produce same boundaries");
    }

    #[test]
    fn test_higher_levels_are_rarer() {
        let config = small().with_fanout_bits(2);
        let data = noise(200_000, 42);
        let cuts = boundaries(&mut RollingBoundary::new(&config), &data);

        let level0 = cuts.len();
        let level1 = cuts.iter().filter(|(_, level)| *level >= 1).count();
        assert!(level1 > 0, "Expected some level >= 1 boundaries");
        assert!(level1 < level0 / 2);
    }

    #[test]
    fn test_level_is_capped() {
        let config = small().with_fanout_bits(1).with_max_level(1);
        let data = noise(50_000, 7);
        let cuts = boundaries(&mut RollingBoundary::new(&config), &data);
        assert!(cuts.iter().all(|(_, level)| *level <= 1));
    }

    #[test]
    fn test_zero_fanout_acts_as_one() {
        let data = noise(20_000, 8);
        let zero = boundaries(&mut RollingBoundary::new(&small().with_fanout_bits(0)), &data);
        let one = boundaries(&mut RollingBoundary::new(&small().with_fanout_bits(1)), &data);
        assert!(!zero.is_empty());
        assert_eq!(zero, one);
    }

    #[test]
    fn test_reset() {
        let mut detector = RollingBoundary::new(&small());
        for _ in 0..3 {
            detector.update(0xAA);
        }
        assert_eq!(detector.bytes_since_boundary(), 3);

        detector.reset();
        assert_eq!(detector.bytes_since_boundary(), 0);
        assert_eq!(detector.hash, 0);
    }

    #[test]
    fn test_find_boundary_matches_update() {
        let data = noise(4096, 99);

        let expected = boundaries(&mut RollingBoundary::new(&small()), &data);

        let mut detector = RollingBoundary::new(&small());
        let mut found = Vec::new();
        let mut consumed = 0;
        while let Some((len, level)) = detector.find_boundary(&data[consumed..]) {
            consumed += len;
            found.push((consumed, level));
        }
        assert_eq!(found, expected);
    }

    #[test]
    fn test_window_resynchronizes() {
        // Identical 64-byte suffixes produce identical hashes regardless of prefix.
        let tail = noise(64, 5);
        let mut a = RollingBoundary::new(&small());
        let mut b = RollingBoundary::new(&small());
        for &byte in noise(100, 1).iter().chain(&tail) {
            a.update(byte);
        }
        for &byte in noise(37, 2).iter().chain(&tail) {
            b.update(byte);
        }
        assert_eq!(a.hash, b.hash);
    }
}
