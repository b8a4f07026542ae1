//! HyperLogLog cardinality estimator
//!
//! Implementation of the HyperLogLog algorithm with small-range (linear
//! counting) and large-range corrections over the raw harmonic-mean
//! estimate.

use crate::hash;
use crate::math;
use crate::traits::{
    CardinalitySketch, ConfigError, DecodeError, ErrorBounds, MergeError, Sketch,
};

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{format, vec, vec::Vec};

/// Lowest supported precision
pub const MIN_PRECISION: u8 = 4;
/// Highest supported precision
pub const MAX_PRECISION: u8 = 18;

/// Size of the 64-bit hash space
const HASH_SPACE: f64 = (1u128 << 64) as f64;

/// Magic bytes at the start of every estimator snapshot
const SNAPSHOT_MAGIC: [u8; 4] = *b"UQHL";
/// Current snapshot format version
const SNAPSHOT_VERSION: u32 = 1;
/// Fixed header: magic, version, precision, count
const SNAPSHOT_HEADER_LEN: usize = 17;

/// HyperLogLog cardinality estimator
///
/// Estimates the number of distinct elements with configurable precision.
/// Memory usage is 2^precision bytes.
///
/// # Error Rate
///
/// The relative standard error is approximately 1.04 / sqrt(m) where m = 2^precision.
///
/// | Precision | Memory | Error |
/// |-----------|--------|-------|
/// | 10 | 1 KB | ~3.25% |
/// | 12 | 4 KB | ~1.63% |
/// | 14 | 16 KB | ~0.81% |
/// | 16 | 64 KB | ~0.41% |
/// | 18 | 256 KB | ~0.20% |
///
/// # Example
///
/// ```
/// use uniqstats::cardinality::HyperLogLog;
/// use uniqstats::traits::CardinalitySketch;
///
/// let mut hll = HyperLogLog::new(12)?;
///
/// for i in 0..10000 {
///     hll.insert(&format!("user_{}", i));
/// }
///
/// let count = hll.estimate();
/// println!("Approximately {} distinct users", count);
/// # Ok::<(), uniqstats::ConfigError>(())
/// ```
#[derive(Clone, Debug)]
pub struct HyperLogLog {
    /// Precision parameter (4-18)
    precision: u8,
    /// Registers (one byte per register)
    registers: Vec<u8>,
    /// Number of insert calls processed
    count: u64,
}

impl HyperLogLog {
    /// Create a new HyperLogLog with the given precision
    ///
    /// Higher precision gives better accuracy but uses more memory
    /// (2^precision registers of one byte each).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PrecisionOutOfRange`] if `precision` is not in
    /// `[MIN_PRECISION, MAX_PRECISION]`.
    pub fn new(precision: u8) -> Result<Self, ConfigError> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(ConfigError::PrecisionOutOfRange {
                precision,
                min: MIN_PRECISION,
                max: MAX_PRECISION,
            });
        }

        let m = 1usize << precision;
        Ok(Self {
            precision,
            registers: vec![0u8; m],
            count: 0,
        })
    }

    /// Create a HyperLogLog targeting a specific relative standard error
    ///
    /// The smallest precision whose expected error is at or below the target
    /// is chosen, clamped to the supported range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RateOutOfRange`] if `target_error` is not in
    /// (0, 1).
    pub fn with_error(target_error: f64) -> Result<Self, ConfigError> {
        if !(target_error > 0.0 && target_error < 1.0) {
            return Err(ConfigError::RateOutOfRange(target_error));
        }
        Self::new(super::precision_for_error(target_error))
    }

    /// Get the precision parameter
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Get the number of registers (m = 2^precision)
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Insert a string item
    pub fn insert(&mut self, item: &str) {
        self.insert_bytes(item.as_bytes());
    }

    /// Insert raw bytes
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        self.insert_hash(hash::base_digest(bytes));
    }

    /// Insert a pre-computed 64-bit hash value
    pub fn insert_hash(&mut self, hash: u64) {
        self.count += 1;

        // Top p bits route to a register
        let idx = (hash >> (64 - self.precision)) as usize;

        // Rank is leading zeros of the remaining bits, plus one; the guard
        // bit caps it at 64 - precision + 1
        let w = hash << self.precision | (1u64 << (self.precision - 1));
        let rho = w.leading_zeros() as u8 + 1;

        if rho > self.registers[idx] {
            self.registers[idx] = rho;
        }
    }

    /// Raw estimate using the harmonic mean
    fn raw_estimate(&self) -> f64 {
        let m = self.registers.len() as f64;

        let sum: f64 = self
            .registers
            .iter()
            .map(|&r| math::powi(2.0, -(r as i32)))
            .sum();

        self.alpha_m() * m * m / sum
    }

    /// Alpha bias-correction constant for the register count
    fn alpha_m(&self) -> f64 {
        let m = self.registers.len();
        match m {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m as f64),
        }
    }

    /// Count registers with value 0
    fn count_zeros(&self) -> usize {
        self.registers.iter().filter(|&&r| r == 0).count()
    }

    /// Linear counting estimate for small cardinalities
    fn linear_counting(&self, zeros: usize) -> f64 {
        let m = self.registers.len() as f64;
        m * math::ln(m / zeros as f64)
    }

    /// Range corrections over the raw estimate
    fn corrected(&self, raw: f64) -> f64 {
        let m = self.registers.len() as f64;
        let threshold = 2.5 * m;

        // Small range: prefer linear counting while zero registers remain
        if raw <= threshold {
            let zeros = self.count_zeros();
            if zeros > 0 {
                let lc = self.linear_counting(zeros);
                if lc <= threshold {
                    return lc;
                }
            }
            return raw;
        }

        // Large range: account for hash collisions near the capacity of the
        // 64-bit hash space; the result stays within [0, 2^64]
        if raw > HASH_SPACE / 30.0 {
            let clipped = (raw / HASH_SPACE).min(1.0);
            return (-HASH_SPACE * math::ln(1.0 - clipped)).min(HASH_SPACE);
        }

        raw
    }

    /// Serialize the estimator to a portable byte snapshot
    ///
    /// The layout is a fixed little-endian header (magic, version,
    /// precision, insert count) followed by one byte per register.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(SNAPSHOT_HEADER_LEN + self.registers.len());
        buf.extend_from_slice(&SNAPSHOT_MAGIC);
        buf.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        buf.push(self.precision);
        buf.extend_from_slice(&self.count.to_le_bytes());
        buf.extend_from_slice(&self.registers);
        buf
    }

    /// Deserialize an estimator from a snapshot produced by [`to_bytes`]
    ///
    /// The reconstructed estimator reports exactly the estimate the original
    /// did at snapshot time.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the buffer is truncated, carries the
    /// wrong magic or version, or holds registers inconsistent with the
    /// declared precision.
    ///
    /// [`to_bytes`]: HyperLogLog::to_bytes
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

        let precision = bytes[8];
        let count = read_u64(bytes, 9);

        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(DecodeError::Corrupted("precision out of range".into()));
        }

        let m = 1usize << precision;
        let expected = SNAPSHOT_HEADER_LEN + m;
        if bytes.len() < expected {
            return Err(DecodeError::BufferTooShort {
                expected,
                found: bytes.len(),
            });
        }
        if bytes.len() > expected {
            return Err(DecodeError::Corrupted("trailing bytes after registers".into()));
        }

        let registers = bytes[SNAPSHOT_HEADER_LEN..expected].to_vec();
        let max_rank = 64 - precision + 1;
        if registers.iter().any(|&r| r > max_rank) {
            return Err(DecodeError::Corrupted("register exceeds rank bound".into()));
        }

        Ok(Self {
            precision,
            registers,
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

impl Sketch for HyperLogLog {
    type Item = [u8];

    fn update(&mut self, item: &[u8]) {
        self.insert_bytes(item);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        if self.precision != other.precision {
            return Err(MergeError::IncompatibleConfig {
                expected: format!("precision={}", self.precision),
                found: format!("precision={}", other.precision),
            });
        }

        // Element-wise max yields the union of both streams
        for (a, &b) in self.registers.iter_mut().zip(other.registers.iter()) {
            *a = (*a).max(b);
        }

        self.count += other.count;
        Ok(())
    }

    fn clear(&mut self) {
        self.registers.fill(0);
        self.count = 0;
    }

    fn size_bytes(&self) -> usize {
        self.registers.len() + core::mem::size_of::<Self>()
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl CardinalitySketch for HyperLogLog {
    fn estimate(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }

        let raw = self.raw_estimate();
        self.corrected(raw)
    }

    fn error_bounds(&self, confidence: f64) -> ErrorBounds {
        let estimate = self.estimate();
        let rse = self.relative_error();

        // Convert confidence to z-score (approximate)
        let z = match confidence {
            c if c >= 0.99 => 2.576,
            c if c >= 0.95 => 1.96,
            c if c >= 0.90 => 1.645,
            c if c >= 0.80 => 1.282,
            _ => 1.0,
        };

        let margin = z * rse * estimate;
        ErrorBounds::new(
            (estimate - margin).max(0.0),
            estimate,
            estimate + margin,
            confidence,
        )
    }

    fn relative_error(&self) -> f64 {
        let m = self.registers.len() as f64;
        1.04 / math::sqrt(m)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for HyperLogLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("HyperLogLog", 3)?;
        state.serialize_field("precision", &self.precision)?;
        state.serialize_field("registers", &self.registers)?;
        state.serialize_field("count", &self.count)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for HyperLogLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct HllData {
            precision: u8,
            registers: Vec<u8>,
            count: u64,
        }

        let data = HllData::deserialize(deserializer)?;
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&data.precision) {
            return Err(serde::de::Error::custom("precision out of range"));
        }
        if data.registers.len() != 1usize << data.precision {
            return Err(serde::de::Error::custom("register count mismatch"));
        }

        Ok(HyperLogLog {
            precision: data.precision,
            registers: data.registers,
            count: data.count,
        })
    }
}
