//! Exact versus estimated distinct counting
//!
//! Runs an exact `HashSet` count and a [`HyperLogLog`] estimate over the
//! same items, timing each pass independently so their cost can be compared.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::cardinality::HyperLogLog;
use crate::traits::{CardinalitySketch, ConfigError};

/// Side-by-side result of an exact count and a sketch estimate
///
/// Durations are wall-clock times of each pass, measured independently.
/// Seconds are available via [`Duration::as_secs_f64`] for tabular output.
#[derive(Clone, Debug, PartialEq)]
pub struct CountComparison {
    /// Distinct count from the exact set
    pub exact_count: usize,
    /// Distinct count estimated by the sketch
    pub estimated_count: f64,
    /// Time spent filling and sizing the exact set
    pub exact_duration: Duration,
    /// Time spent feeding the sketch and reading its estimate
    pub estimated_duration: Duration,
}

/// Count distinct items exactly and with a HyperLogLog, reporting both
///
/// Both passes iterate the same slice in the same order. The estimator is
/// constructed before its pass starts, so the timings compare pure insert
/// and query cost.
///
/// # Errors
///
/// Returns [`ConfigError::PrecisionOutOfRange`] if `precision` is outside
/// the supported range.
///
/// # Example
///
/// ```
/// use uniqstats::cardinality::compare_counts;
///
/// let ips = ["10.0.0.1", "10.0.0.2", "10.0.0.1"];
/// let report = compare_counts(&ips, 14)?;
///
/// assert_eq!(report.exact_count, 2);
/// assert!((report.estimated_count - 2.0).abs() < 0.5);
/// # Ok::<(), uniqstats::ConfigError>(())
/// ```
pub fn compare_counts<S: AsRef<str>>(
    items: &[S],
    precision: u8,
) -> Result<CountComparison, ConfigError> {
    let mut sketch = HyperLogLog::new(precision)?;

    let exact_start = Instant::now();
    let mut seen = HashSet::new();
    for item in items {
        seen.insert(item.as_ref());
    }
    let exact_count = seen.len();
    let exact_duration = exact_start.elapsed();

    let estimated_start = Instant::now();
    for item in items {
        sketch.insert(item.as_ref());
    }
    let estimated_count = sketch.estimate();
    let estimated_duration = estimated_start.elapsed();

    Ok(CountComparison {
        exact_count,
        estimated_count,
        exact_duration,
        estimated_duration,
    })
}
