//! Core traits for streaming sketches
//!
//! All sketches implement the base [`Sketch`] trait, with specialized traits
//! for the membership and cardinality families, plus the error types shared
//! across the crate.

use core::fmt::Debug;

#[cfg(feature = "std")]
use std::string::String;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Error from sketch construction with invalid parameters
///
/// Constructors validate their configuration up front and fail before any
/// state is allocated or mutated; a sketch that exists is always usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Bit vector size of zero
    ZeroBits,
    /// Hash round count of zero
    ZeroHashRounds,
    /// Expected item capacity of zero
    ZeroCapacity,
    /// Rate parameter outside (0, 1)
    RateOutOfRange(f64),
    /// Precision outside the supported range
    PrecisionOutOfRange { precision: u8, min: u8, max: u8 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroBits => write!(f, "bit count must be positive"),
            ConfigError::ZeroHashRounds => write!(f, "hash round count must be positive"),
            ConfigError::ZeroCapacity => write!(f, "expected item count must be positive"),
            ConfigError::RateOutOfRange(rate) => {
                write!(f, "rate must be in (0, 1), got {}", rate)
            }
            ConfigError::PrecisionOutOfRange { precision, min, max } => {
                write!(f, "precision {} outside supported range [{}, {}]", precision, min, max)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Error during sketch merge operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Sketches have incompatible configurations
    IncompatibleConfig {
        expected: String,
        found: String,
    },
}

impl core::fmt::Display for MergeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MergeError::IncompatibleConfig { expected, found } => {
                write!(f, "incompatible config: expected {}, found {}", expected, found)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MergeError {}

/// Error during sketch snapshot decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input buffer too short
    BufferTooShort { expected: usize, found: usize },
    /// Invalid magic number or header
    InvalidHeader,
    /// Unsupported snapshot format version
    UnsupportedVersion(u32),
    /// Corrupted data
    Corrupted(String),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::BufferTooShort { expected, found } => {
                write!(f, "buffer too short: expected {}, found {}", expected, found)
            }
            DecodeError::InvalidHeader => write!(f, "invalid header"),
            DecodeError::UnsupportedVersion(v) => write!(f, "unsupported version: {}", v),
            DecodeError::Corrupted(msg) => write!(f, "corrupted data: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Error bounds for a sketch estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBounds {
    /// Lower bound of the estimate
    pub lower: f64,
    /// Point estimate
    pub estimate: f64,
    /// Upper bound of the estimate
    pub upper: f64,
    /// Confidence level (e.g., 0.95 for 95%)
    pub confidence: f64,
}

impl ErrorBounds {
    /// Create new error bounds
    pub fn new(lower: f64, estimate: f64, upper: f64, confidence: f64) -> Self {
        Self {
            lower,
            estimate,
            upper,
            confidence,
        }
    }

    /// Check if a value falls within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Width of the confidence interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Relative width (width / estimate)
    pub fn relative_width(&self) -> f64 {
        if self.estimate == 0.0 {
            0.0
        } else {
            self.width() / self.estimate
        }
    }
}

/// Core trait for all streaming sketches
pub trait Sketch: Clone + Debug {
    /// The type of item this sketch processes
    type Item: ?Sized;

    /// Add an item to the sketch
    fn update(&mut self, item: &Self::Item);

    /// Merge another sketch into this one
    ///
    /// Returns an error if sketches are incompatible
    fn merge(&mut self, other: &Self) -> Result<(), MergeError>;

    /// Reset sketch to its freshly-constructed empty state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if sketch is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Cardinality (distinct count) estimation sketches
pub trait CardinalitySketch: Sketch {
    /// Estimate number of distinct items seen
    fn estimate(&self) -> f64;

    /// Get error bounds at given confidence level (0.0 to 1.0)
    fn error_bounds(&self, confidence: f64) -> ErrorBounds;

    /// Relative standard error (RSE) of the estimate
    ///
    /// RSE = standard_error / true_value ≈ 1.04 / sqrt(m) for HLL
    fn relative_error(&self) -> f64;

    /// Estimate with default 95% confidence bounds
    fn estimate_with_bounds(&self) -> ErrorBounds {
        self.error_bounds(0.95)
    }
}

/// Membership testing sketches (Bloom filters, etc.)
pub trait MembershipSketch: Sketch {
    /// Test if item might be in set
    ///
    /// - `true` means item might be present (possible false positive)
    /// - `false` means item is definitely not present
    fn contains(&self, item: &Self::Item) -> bool;

    /// Theoretical false positive rate given current state
    fn false_positive_rate(&self) -> f64;

    /// Number of items added
    fn len(&self) -> usize;

    /// Check if filter is empty
    fn is_filter_empty(&self) -> bool {
        self.len() == 0
    }
}
