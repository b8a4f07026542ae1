//! Membership testing data structures
//!
//! This module provides probabilistic data structures for testing set
//! membership. These structures trade a small probability of false positives
//! for significant space savings compared to exact set representations, and
//! a uniqueness checker that classifies candidate items against a filter.
//!
//! # Example
//!
//! ```
//! use uniqstats::membership::BloomFilter;
//!
//! let mut bloom = BloomFilter::with_capacity(1000, 0.01)?;
//! bloom.insert(b"hello");
//! assert!(bloom.contains(b"hello"));
//! # Ok::<(), uniqstats::ConfigError>(())
//! ```

use crate::math;

mod bloom;

#[cfg(feature = "std")]
mod uniqueness;

pub use bloom::BloomFilter;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub use uniqueness::{Candidate, UniquenessChecker, Verdict};

/// Compute the optimal bit count for a capacity and target false positive rate
///
/// m = -n * ln(p) / (ln 2)^2
pub fn bits_for(expected_items: usize, false_positive_rate: f64) -> usize {
    let ln2_squared = core::f64::consts::LN_2 * core::f64::consts::LN_2;
    math::ceil(-(expected_items as f64) * math::ln(false_positive_rate) / ln2_squared) as usize
}

/// Compute the optimal hash round count for a bit count and capacity
///
/// k = (m/n) * ln 2
pub fn rounds_for(num_bits: usize, expected_items: usize) -> usize {
    math::ceil((num_bits as f64 / expected_items as f64) * core::f64::consts::LN_2) as usize
}
