//! Candidate uniqueness screening over a Bloom filter
//!
//! Classifies an ordered stream of candidate values against a
//! [`BloomFilter`], inserting first sightings into the filter so that later
//! repeats in the same batch are caught as duplicates.

use std::collections::HashMap;
use std::fmt;

use crate::membership::BloomFilter;

/// Classification of a single candidate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Not a usable text value (empty, whitespace-only, or non-textual)
    Invalid,
    /// Seen before, either preloaded or earlier in the stream
    Duplicate,
    /// First sighting; the filter was updated
    Unique,
}

impl Verdict {
    /// Stable lowercase label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Invalid => "invalid",
            Verdict::Duplicate => "duplicate",
            Verdict::Unique => "unique",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single input awaiting classification
///
/// Text candidates are eligible for screening. Non-textual inputs are
/// carried by their display form, always classify [`Verdict::Invalid`], and
/// never reach the filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Candidate {
    /// A text value
    Text(String),
    /// A non-textual value coerced to its display form
    Coerced(String),
}

impl Candidate {
    /// Build a coerced candidate from any displayable value
    pub fn coerced<T: fmt::Display>(value: T) -> Self {
        Candidate::Coerced(value.to_string())
    }

    /// The mapping key this candidate reports under
    pub fn label(&self) -> &str {
        match self {
            Candidate::Text(s) | Candidate::Coerced(s) => s,
        }
    }

    fn into_label(self) -> String {
        match self {
            Candidate::Text(s) | Candidate::Coerced(s) => s,
        }
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Candidate::Text(value.to_string())
    }
}

impl From<String> for Candidate {
    fn from(value: String) -> Self {
        Candidate::Text(value)
    }
}

/// Screens candidates for uniqueness against an owned Bloom filter
///
/// The filter is usually preloaded with already-known values before the
/// checker takes ownership, so screening a batch flags collisions with both
/// historical data and earlier entries of the same batch.
///
/// # Example
///
/// ```
/// use uniqstats::membership::{BloomFilter, UniquenessChecker, Verdict};
///
/// let mut known = BloomFilter::with_capacity(100, 0.01)?;
/// known.insert(b"password123");
///
/// let mut checker = UniquenessChecker::new(known);
/// let report = checker.check_batch(["password123", "correct horse"]);
///
/// assert_eq!(report["password123"], Verdict::Duplicate);
/// assert_eq!(report["correct horse"], Verdict::Unique);
/// # Ok::<(), uniqstats::ConfigError>(())
/// ```
#[derive(Clone, Debug)]
pub struct UniquenessChecker {
    filter: BloomFilter,
}

impl UniquenessChecker {
    /// Wrap an existing filter, typically preloaded with known values
    pub fn new(filter: BloomFilter) -> Self {
        Self { filter }
    }

    /// Classify one candidate, recording a first sighting in the filter
    ///
    /// A candidate is valid if it is text and non-empty after trimming
    /// surrounding whitespace; the untrimmed text is what the filter sees.
    /// Invalid candidates leave the filter untouched.
    pub fn classify(&mut self, candidate: &Candidate) -> Verdict {
        let text = match candidate {
            Candidate::Text(text) => text,
            Candidate::Coerced(_) => return Verdict::Invalid,
        };
        if text.trim().is_empty() {
            return Verdict::Invalid;
        }

        if self.filter.contains(text.as_bytes()) {
            return Verdict::Duplicate;
        }
        self.filter.insert(text.as_bytes());
        Verdict::Unique
    }

    /// Classify a batch of candidates strictly in input order
    ///
    /// Unique sightings mutate the filter before the next candidate is
    /// examined, so an in-batch repeat classifies [`Verdict::Duplicate`].
    /// The report holds one entry per distinct label; when a label occurs
    /// more than once the last classification wins.
    pub fn check_batch<I>(&mut self, candidates: I) -> HashMap<String, Verdict>
    where
        I: IntoIterator,
        I::Item: Into<Candidate>,
    {
        let mut report = HashMap::new();
        for candidate in candidates {
            let candidate = candidate.into();
            let verdict = self.classify(&candidate);
            report.insert(candidate.into_label(), verdict);
        }
        report
    }

    /// Borrow the underlying filter
    pub fn filter(&self) -> &BloomFilter {
        &self.filter
    }

    /// Take the filter back, consuming the checker
    pub fn into_filter(self) -> BloomFilter {
        self.filter
    }
}
