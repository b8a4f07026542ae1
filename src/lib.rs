//! # Uniqstats
//!
//! Probabilistic uniqueness and distinct-count analytics for Rust.
//!
//! Uniqstats provides compact sketch data structures for answering two
//! questions about large streams: "have I seen this value before?" and
//! "how many distinct values were there?", plus the orchestration to screen
//! candidate batches and to compare estimates against exact counts.
//!
//! ## Features
//!
//! - **Membership Testing**: Bloom filter with no false negatives
//! - **Uniqueness Screening**: classify candidate streams as unique,
//!   duplicate, or invalid against an accumulating filter
//! - **Cardinality Estimation**: count distinct elements with HyperLogLog
//! - **Exact Comparison**: run a reference count next to the estimate and
//!   time both passes
//! - **Full Mergeability**: sketches combine across partitions or workers
//! - **Error Bounds**: formal guarantees on approximation accuracy
//!
//! ## Quick Start
//!
//! ```rust
//! use uniqstats::prelude::*;
//!
//! // Count distinct users
//! let mut hll = HyperLogLog::new(14)?;
//! for user_id in ["alice", "bob", "charlie", "alice"] {
//!     hll.insert(user_id);
//! }
//! println!("Distinct users: ~{}", hll.estimate());
//! # Ok::<(), uniqstats::ConfigError>(())
//! ```
//!
//! ## Distributed Computing
//!
//! All sketches implement the [`Sketch`](traits::Sketch) trait which includes
//! a `merge` operation, allowing sketches to be combined across distributed
//! workers:
//!
//! ```rust
//! use uniqstats::cardinality::HyperLogLog;
//! use uniqstats::traits::Sketch;
//!
//! let mut worker1 = HyperLogLog::new(14)?;
//! let mut worker2 = HyperLogLog::new(14)?;
//!
//! // Each worker processes its partition
//! worker1.insert("user_a");
//! worker2.insert("user_b");
//!
//! // Merge results
//! worker1.merge(&worker2)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Concurrency
//!
//! All sketches are single-threaded, synchronous structures: inserts and
//! queries complete before returning, with no suspension points and no I/O.
//! Queries (`contains`, `estimate`) take `&self` and may run concurrently;
//! inserts take `&mut self` and need exclusive access. A single
//! reader-writer lock per instance is sufficient for shared use, since
//! updates are monotonic bit-set and register-max operations with no
//! cross-cell invariants.
//!
//! ## Feature Flags
//!
//! Algorithm families (pick what you need):
//! - `membership` (default): Bloom filter and uniqueness screening
//! - `cardinality` (default): HyperLogLog and exact-count comparison
//! - `full`: Enable all algorithm families
//!
//! Platform features:
//! - `std` (default): Standard library support; disabling it drops the
//!   orchestration layers (uniqueness screening, timed comparison) but
//!   keeps the sketches
//! - `serde`: Enable serialization

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Core traits and the hash family always available
pub mod hash;
pub mod traits;

#[cfg(any(feature = "membership", feature = "cardinality"))]
mod math;

#[cfg(feature = "membership")]
#[cfg_attr(docsrs, doc(cfg(feature = "membership")))]
pub mod membership;

#[cfg(feature = "cardinality")]
#[cfg_attr(docsrs, doc(cfg(feature = "cardinality")))]
pub mod cardinality;

pub mod prelude {
    pub use crate::traits::*;

    #[cfg(feature = "membership")]
    pub use crate::membership::BloomFilter;

    #[cfg(all(feature = "membership", feature = "std"))]
    pub use crate::membership::{Candidate, UniquenessChecker, Verdict};

    #[cfg(feature = "cardinality")]
    pub use crate::cardinality::HyperLogLog;

    #[cfg(all(feature = "cardinality", feature = "std"))]
    pub use crate::cardinality::{compare_counts, CountComparison};
}

pub use traits::{ConfigError, DecodeError, ErrorBounds, MergeError};

#[cfg(feature = "membership")]
pub use membership::BloomFilter;

#[cfg(feature = "cardinality")]
pub use cardinality::HyperLogLog;
