//! Bloom filter for probabilistic set membership
//!
//! A Bloom filter is a space-efficient probabilistic data structure that tests
//! whether an element is a member of a set. False positives are possible, but
//! false negatives are not: [`BloomFilter::contains`] never answers `false`
//! for an item that was inserted.

use crate::hash;
use crate::math;
use crate::traits::{ConfigError, DecodeError, MembershipSketch, MergeError, Sketch};

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{format, vec, vec::Vec};

/// Magic bytes at the start of every filter snapshot
const SNAPSHOT_MAGIC: [u8; 4] = *b"UQBF";
/// Current snapshot format version
const SNAPSHOT_VERSION: u32 = 1;
/// Fixed header: magic, version, num_bits, num_hashes, count
const SNAPSHOT_HEADER_LEN: usize = 32;

/// Bloom filter for set membership testing
///
/// # Example
///
/// ```
/// use uniqstats::membership::BloomFilter;
///
/// // Create a filter for ~1000 items with a 1% false positive rate
/// let mut bloom = BloomFilter::with_capacity(1000, 0.01)?;
///
/// bloom.insert(b"apple");
/// bloom.insert(b"banana");
///
/// assert!(bloom.contains(b"apple"));   // true - definitely inserted
/// assert!(bloom.contains(b"banana"));  // true - definitely inserted
/// assert!(!bloom.contains(b"cherry")); // probably false (might be a false positive)
/// # Ok::<(), uniqstats::ConfigError>(())
/// ```
///
/// # False Positive Rate
///
/// The actual false positive rate depends on the number of items inserted.
/// If you insert more items than the expected capacity, the false positive
/// rate will increase. Re-inserting an item leaves the bit vector unchanged,
/// so duplicates never degrade the filter.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array, packed 64 bits per word
    bits: Vec<u64>,
    /// Number of addressable bits (m)
    num_bits: usize,
    /// Number of hash rounds (k)
    num_hashes: usize,
    /// Number of insert calls processed
    count: u64,
}

impl BloomFilter {
    /// Create a Bloom filter with explicit parameters
    ///
    /// The filter addresses exactly `num_bits` bits; storage rounds up to
    /// whole 64-bit words but the spare bits are never probed.
    ///
    /// # Arguments
    ///
    /// * `num_bits` - Number of bits in the filter
    /// * `num_hashes` - Number of hash rounds per item
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBits`] or [`ConfigError::ZeroHashRounds`]
    /// if either parameter is zero.
    pub fn new(num_bits: usize, num_hashes: usize) -> Result<Self, ConfigError> {
        if num_bits == 0 {
            return Err(ConfigError::ZeroBits);
        }
        if num_hashes == 0 {
            return Err(ConfigError::ZeroHashRounds);
        }

        let num_words = (num_bits + 63) / 64;

        Ok(Self {
            bits: vec![0u64; num_words],
            num_bits,
            num_hashes,
            count: 0,
        })
    }

    /// Create a Bloom filter sized for an expected workload
    ///
    /// Derives the bit count and hash round count from [`bits_for`] and
    /// [`rounds_for`], with a floor of 64 bits and rounds clamped to `[1, 32]`.
    ///
    /// # Arguments
    ///
    /// * `expected_items` - Expected number of distinct items to insert
    /// * `false_positive_rate` - Desired false positive rate (e.g., 0.01 for 1%)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `expected_items` is zero, or
    /// [`ConfigError::RateOutOfRange`] if the rate is not in (0, 1).
    ///
    /// [`bits_for`]: crate::membership::bits_for
    /// [`rounds_for`]: crate::membership::rounds_for
    pub fn with_capacity(
        expected_items: usize,
        false_positive_rate: f64,
    ) -> Result<Self, ConfigError> {
        if expected_items == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(ConfigError::RateOutOfRange(false_positive_rate));
        }

        let num_bits = super::bits_for(expected_items, false_positive_rate).max(64);
        let num_hashes = super::rounds_for(num_bits, expected_items).clamp(1, 32);

        Self::new(num_bits, num_hashes)
    }

    /// Insert an item into the filter
    ///
    /// Each hash round sets one bit.
    pub fn insert(&mut self, item: &[u8]) {
        self.count += 1;

        for round in 0..self.num_hashes as u64 {
            let hash = hash::digest(item, round);
            let bit_idx = (hash % self.num_bits as u64) as usize;
            let word_idx = bit_idx / 64;
            let bit_offset = bit_idx % 64;
            self.bits[word_idx] |= 1u64 << bit_offset;
        }
    }

    /// Check if an item might be in the filter
    ///
    /// Returns `true` if the item might be in the set (possibly a false
    /// positive), or `false` if the item is definitely not in the set.
    /// Bails out on the first unset bit, so a miss usually probes fewer
    /// than `num_hashes` rounds.
    pub fn contains(&self, item: &[u8]) -> bool {
        for round in 0..self.num_hashes as u64 {
            let hash = hash::digest(item, round);
            let bit_idx = (hash % self.num_bits as u64) as usize;
            let word_idx = bit_idx / 64;
            let bit_offset = bit_idx % 64;
            if (self.bits[word_idx] & (1u64 << bit_offset)) == 0 {
                return false;
            }
        }
        true
    }

    /// Get the number of addressable bits in the filter
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Get the number of hash rounds per item
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Get the number of bits set to 1
    pub fn bits_set(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Estimate the current false positive rate
    ///
    /// This is based on the actual fill ratio of the filter.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let fill_ratio = self.bits_set() as f64 / self.num_bits as f64;
        math::powi(fill_ratio, self.num_hashes as i32)
    }

    /// Estimate the number of distinct items in the filter
    ///
    /// Uses the fill ratio to estimate cardinality.
    pub fn estimated_count(&self) -> f64 {
        let bits_set = self.bits_set() as f64;
        let m = self.num_bits as f64;
        let k = self.num_hashes as f64;

        if bits_set >= m {
            return f64::INFINITY;
        }

        // n ≈ -m/k * ln(1 - X/m) where X is bits set
        -(m / k) * math::ln(1.0 - bits_set / m)
    }

    /// Serialize the filter to a portable byte snapshot
    ///
    /// The layout is a fixed little-endian header (magic, version, bit
    /// count, hash round count, insert count) followed by the packed words.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SNAPSHOT_HEADER_LEN + self.bits.len() * 8);
        buf.extend_from_slice(&SNAPSHOT_MAGIC);
        buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        buf.extend_from_slice(&(self.num_bits as u64).to_le_bytes());
        buf.extend_from_slice(&(self.num_hashes as u64).to_le_bytes());
        buf.extend_from_slice(&self.count.to_le_bytes());
        for word in &self.bits {
            buf.extend_from_slice(&word.to_le_bytes());
        }
        buf
    }

    /// Deserialize a filter from a snapshot produced by [`to_bytes`]
    ///
    /// The reconstructed filter answers every query exactly as the original
    /// did at snapshot time.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the buffer is truncated, carries the
    /// wrong magic or version, or declares parameters that do not match the
    /// payload.
    ///
    /// [`to_bytes`]: BloomFilter::to_bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < SNAPSHOT_HEADER_LEN {
            return Err(DecodeError::BufferTooShort {
                expected: SNAPSHOT_HEADER_LEN,
                found: bytes.len(),
            });
        }
        if bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(DecodeError::InvalidHeader);
        }
        let version = read_u32(bytes, 4);
        if version != SNAPSHOT_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let num_bits = read_u64(bytes, 8);
        let num_hashes = read_u64(bytes, 16);
        let count = read_u64(bytes, 24);

        if num_bits == 0 || num_hashes == 0 {
            return Err(DecodeError::Corrupted("zero bit or hash round count".into()));
        }
        let num_bits = usize::try_from(num_bits)
            .map_err(|_| DecodeError::Corrupted("bit count exceeds address space".into()))?;
        let num_hashes = usize::try_from(num_hashes)
            .map_err(|_| DecodeError::Corrupted("hash round count exceeds address space".into()))?;

        let num_words = (num_bits - 1) / 64 + 1;
        let expected = SNAPSHOT_HEADER_LEN + num_words * 8;
        if bytes.len() < expected {
            return Err(DecodeError::BufferTooShort {
                expected,
                found: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(DecodeError::Corrupted("trailing bytes after bit array".into()));
        }

        let mut bits = Vec::with_capacity(num_words);
        let mut at = SNAPSHOT_HEADER_LEN;
        while at < expected {
            bits.push(read_u64(bytes, at));
            at += 8;
        }

        Ok(Self {
            bits,
            num_bits,
            num_hashes,
            count,
        })
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}

impl Sketch for BloomFilter {
    type Item = [u8];

    fn update(&mut self, item: &Self::Item) {
        self.insert(item);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.num_bits != other.num_bits || self.num_hashes != other.num_hashes {
            return Err(MergeError::IncompatibleConfig {
                expected: format!("bits={}, hashes={}", self.num_bits, self.num_hashes),
                found: format!("bits={}, hashes={}", other.num_bits, other.num_hashes),
            });
        }

        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= *b;
        }
        self.count += other.count;

        Ok(())
    }

    fn clear(&mut self) {
        self.bits.fill(0);
        self.count = 0;
    }

    fn size_bytes(&self) -> usize {
        self.bits.len() * 8 + core::mem::size_of::<Self>()
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl MembershipSketch for BloomFilter {
    fn contains(&self, item: &Self::Item) -> bool {
        self.contains(item)
    }

    fn false_positive_rate(&self) -> f64 {
        self.estimated_false_positive_rate()
    }

    fn len(&self) -> usize {
        self.count as usize
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BloomFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("BloomFilter", 4)?;
        state.serialize_field("num_bits", &self.num_bits)?;
        state.serialize_field("num_hashes", &self.num_hashes)?;
        state.serialize_field("bits", &self.bits)?;
        state.serialize_field("count", &self.count)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for BloomFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct BloomData {
            num_bits: usize,
            num_hashes: usize,
            bits: Vec<u64>,
            count: u64,
        }

        let data = BloomData::deserialize(deserializer)?;
        if data.num_bits == 0 || data.num_hashes == 0 {
            return Err(serde::de::Error::custom("zero bit or hash round count"));
        }
        if data.bits.len() != (data.num_bits - 1) / 64 + 1 {
            return Err(serde::de::Error::custom("bit array length mismatch"));
        }

        Ok(BloomFilter {
            bits: data.bits,
            num_bits: data.num_bits,
            num_hashes: data.num_hashes,
            count: data.count,
        })
    }
}
