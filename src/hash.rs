//! Seeded 64-bit hashing shared by all sketches
//!
//! Every sketch in this crate derives its indexes and ranks from one base
//! algorithm (xxh3) parameterized by a salt, rather than carrying a family of
//! distinct hash functions. Digests for distinct salts of the same input are
//! statistically independent for sketching purposes, and every digest is
//! deterministic across processes and platforms, which keeps filter and
//! estimator state reproducible.
//!
//! None of this is cryptographic: the guarantees are uniformity and
//! determinism, not attack resistance.

use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// Multiplier used to spread consecutive salts across the seed space
/// (2^64 / phi, the golden-gamma constant).
const SALT_GAMMA: u64 = 0x9e3779b97f4a7c15;

/// Hash `bytes` under the given `salt`.
///
/// Consecutive salts (0, 1, 2, ...) act as independent hash rounds: the salt
/// is spread by a golden-gamma multiply before seeding xxh3, so neighboring
/// salts land far apart in the seed space.
///
/// # Example
///
/// ```
/// use uniqstats::hash;
///
/// // Deterministic: same (value, salt) always produces the same digest.
/// assert_eq!(hash::digest(b"10.0.0.1", 3), hash::digest(b"10.0.0.1", 3));
///
/// // Distinct salts behave as distinct hash functions.
/// assert_ne!(hash::digest(b"10.0.0.1", 0), hash::digest(b"10.0.0.1", 1));
/// ```
#[inline]
pub fn digest(bytes: &[u8], salt: u64) -> u64 {
    xxh3_64_with_seed(bytes, salt.wrapping_mul(SALT_GAMMA))
}

/// Hash `bytes` with the fixed base salt.
///
/// This is the single wide digest used for register routing; it equals
/// `digest(bytes, 0)`.
#[inline]
pub fn base_digest(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}
