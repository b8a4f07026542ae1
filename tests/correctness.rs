//! Correctness and invariant tests for uniqstats
//!
//! These tests verify critical invariants, merge semantics, and edge cases
//! across both algorithm families. They complement the unit tests in each
//! module by focusing on properties that must always hold.
//!
//! Run with: cargo test --test correctness

// Require both families plus std for the orchestration layers
#[cfg(not(all(feature = "cardinality", feature = "membership", feature = "std")))]
compile_error!("Correctness tests require the default features. Run: cargo test --test correctness");

use uniqstats::cardinality::{compare_counts, error_for_precision, HyperLogLog};
use uniqstats::membership::{BloomFilter, Candidate, UniquenessChecker, Verdict};
use uniqstats::traits::{CardinalitySketch, Sketch};

// ============================================================================
// Bloom Filter
// ============================================================================

mod bloom {
    use super::*;

    /// The absolute invariant: no false negatives, ever.
    #[test]
    fn zero_false_negatives() {
        let mut bloom = BloomFilter::with_capacity(10_000, 0.01).unwrap();

        let items: Vec<String> = (0..10_000).map(|i| format!("item_{}", i)).collect();

        for item in &items {
            bloom.insert(item.as_bytes());
        }

        for item in &items {
            assert!(
                bloom.contains(item.as_bytes()),
                "FALSE NEGATIVE: '{}' was inserted but contains() returned false",
                item
            );
        }
    }

    /// Merge must preserve the zero-false-negatives invariant.
    #[test]
    fn merge_preserves_zero_false_negatives() {
        let mut bloom1 = BloomFilter::with_capacity(10_000, 0.01).unwrap();
        let mut bloom2 = BloomFilter::with_capacity(10_000, 0.01).unwrap();

        let items1: Vec<String> = (0..5_000).map(|i| format!("a_{}", i)).collect();
        let items2: Vec<String> = (0..5_000).map(|i| format!("b_{}", i)).collect();

        for item in &items1 {
            bloom1.insert(item.as_bytes());
        }
        for item in &items2 {
            bloom2.insert(item.as_bytes());
        }

        bloom1.merge(&bloom2).unwrap();

        for item in items1.iter().chain(items2.iter()) {
            assert!(
                bloom1.contains(item.as_bytes()),
                "FALSE NEGATIVE after merge: '{}' missing",
                item
            );
        }
    }

    #[test]
    fn false_positive_rate_within_tolerance() {
        let expected_items = 10_000;
        let target_fpr = 0.01;
        let mut bloom = BloomFilter::with_capacity(expected_items, target_fpr).unwrap();

        for i in 0..expected_items {
            bloom.insert(format!("item_{}", i).as_bytes());
        }

        let mut false_positives = 0;
        let test_count = 100_000;
        for i in 0..test_count {
            if bloom.contains(format!("other_{}", i).as_bytes()) {
                false_positives += 1;
            }
        }

        let actual_fpr = false_positives as f64 / test_count as f64;
        assert!(
            actual_fpr < target_fpr * 3.0,
            "FP rate {:.4} exceeds 3x target {:.4}",
            actual_fpr,
            target_fpr
        );
    }

    /// Inserting a value twice leaves exactly the state one insert produces.
    #[test]
    fn insertion_is_idempotent() {
        let mut once = BloomFilter::new(8192, 5).unwrap();
        let mut twice = BloomFilter::new(8192, 5).unwrap();

        for i in 0..1_000 {
            let item = format!("item_{}", i);
            once.insert(item.as_bytes());
            twice.insert(item.as_bytes());
            twice.insert(item.as_bytes());
        }

        assert_eq!(
            once.bits_set(),
            twice.bits_set(),
            "Double insertion changed the bit vector"
        );
        assert_eq!(
            once.estimated_false_positive_rate(),
            twice.estimated_false_positive_rate()
        );
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut bloom1 = BloomFilter::with_capacity(1000, 0.01).unwrap();
        let bloom2 = BloomFilter::with_capacity(1000, 0.01).unwrap();

        bloom1.insert(b"hello");
        let bits_before = bloom1.bits_set();

        bloom1.merge(&bloom2).unwrap();

        assert_eq!(bloom1.bits_set(), bits_before);
        assert!(bloom1.contains(b"hello"));
    }

    #[test]
    fn clear_resets_completely() {
        let mut bloom = BloomFilter::with_capacity(1000, 0.01).unwrap();
        bloom.insert(b"hello");

        bloom.clear();

        assert!(!bloom.contains(b"hello"));
        assert_eq!(bloom.count(), 0);
        assert_eq!(bloom.bits_set(), 0);
    }
}

// ============================================================================
// HyperLogLog
// ============================================================================

mod hyperloglog {
    use super::*;

    #[test]
    fn duplicates_do_not_inflate_estimate() {
        let mut hll = HyperLogLog::new(14).unwrap();

        for _ in 0..1_000_000 {
            hll.insert("same_item");
        }

        let estimate = hll.estimate();
        assert!(
            estimate >= 0.5 && estimate <= 2.0,
            "1M inserts of same item should estimate ~1, got {}",
            estimate
        );
    }

    #[test]
    fn error_within_theoretical_bounds() {
        let precision = 12u8;
        let trials = 20;
        let limit = 3.0 * error_for_precision(precision);

        for &true_cardinality in &[100usize, 100_000] {
            let mut total_relative_error = 0.0;

            for trial in 0..trials {
                let mut hll = HyperLogLog::new(precision).unwrap();

                for i in 0..true_cardinality {
                    hll.insert(&format!("t{}_n{}_item_{}", trial, true_cardinality, i));
                }

                let estimate = hll.estimate();
                total_relative_error +=
                    (estimate - true_cardinality as f64).abs() / true_cardinality as f64;
            }

            let avg_error = total_relative_error / trials as f64;
            assert!(
                avg_error < limit,
                "Average relative error over {} trials at p={}, n={} is {:.2}%, expected < {:.2}%",
                trials,
                precision,
                true_cardinality,
                avg_error * 100.0,
                limit * 100.0
            );
        }
    }

    #[test]
    fn merge_disjoint_sets_estimate_sum() {
        let mut hll1 = HyperLogLog::new(14).unwrap();
        let mut hll2 = HyperLogLog::new(14).unwrap();

        for i in 0..50_000 {
            hll1.insert(&format!("a_{}", i));
        }
        for i in 0..50_000 {
            hll2.insert(&format!("b_{}", i));
        }

        hll1.merge(&hll2).unwrap();

        let estimate = hll1.estimate();
        assert!(
            estimate > 90_000.0 && estimate < 110_000.0,
            "Merge of two disjoint 50K sets should estimate ~100K, got {}",
            estimate
        );
    }

    #[test]
    fn merge_overlapping_sets_does_not_double_count() {
        let mut hll1 = HyperLogLog::new(14).unwrap();
        let mut hll2 = HyperLogLog::new(14).unwrap();

        for i in 0..10_000 {
            hll1.insert(&format!("item_{}", i));
            hll2.insert(&format!("item_{}", i));
        }

        hll1.merge(&hll2).unwrap();

        let estimate = hll1.estimate();
        assert!(
            estimate > 9_000.0 && estimate < 11_000.0,
            "Merge of identical sets should estimate ~10K, got {}",
            estimate
        );
    }

    /// One estimator over the whole stream and the elementwise-max merge of
    /// two half-stream estimators must hold identical registers.
    #[test]
    fn merged_halves_match_full_stream() {
        let mut full = HyperLogLog::new(14).unwrap();
        let mut left = HyperLogLog::new(14).unwrap();
        let mut right = HyperLogLog::new(14).unwrap();

        for i in 0..20_000 {
            let item = format!("item_{}", i);
            full.insert(&item);
            if i % 2 == 0 {
                left.insert(&item);
            } else {
                right.insert(&item);
            }
        }

        left.merge(&right).unwrap();

        assert_eq!(
            left.to_bytes(),
            full.to_bytes(),
            "Merged halves should reproduce the full-stream register state"
        );
        assert_eq!(left.estimate(), full.estimate());
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let mut hll1 = HyperLogLog::new(12).unwrap();
        let hll2 = HyperLogLog::new(12).unwrap();

        for i in 0..10_000 {
            hll1.insert(&format!("item_{}", i));
        }

        let est_before = hll1.estimate();
        hll1.merge(&hll2).unwrap();
        let est_after = hll1.estimate();

        assert!(
            (est_before - est_after).abs() < 1.0,
            "Merge with empty changed estimate: {} -> {}",
            est_before,
            est_after
        );
    }

    #[test]
    fn estimate_nonnegative() {
        let hll = HyperLogLog::new(10).unwrap();
        assert!(hll.estimate() >= 0.0);

        let mut hll2 = HyperLogLog::new(10).unwrap();
        hll2.insert("x");
        assert!(hll2.estimate() >= 0.0);
    }

    #[test]
    fn clear_resets_completely() {
        let mut hll = HyperLogLog::new(12).unwrap();

        for i in 0..10_000 {
            hll.insert(&format!("item_{}", i));
        }

        hll.clear();

        assert_eq!(hll.estimate(), 0.0);
        assert_eq!(hll.count(), 0);
    }
}

// ============================================================================
// Uniqueness screening
// ============================================================================

mod uniqueness {
    use super::*;

    fn preloaded_checker(known: &[&str]) -> UniquenessChecker {
        let mut filter = BloomFilter::with_capacity(1000, 0.001).unwrap();
        for value in known {
            filter.insert(value.as_bytes());
        }
        UniquenessChecker::new(filter)
    }

    /// A password batch mixing known, fresh, blank, and non-textual entries.
    #[test]
    fn password_batch_verdicts() {
        let mut checker = preloaded_checker(&["password123", "admin123", "qwerty123"]);

        let report = checker.check_batch([
            Candidate::from("password123"),
            Candidate::from("newpassword"),
            Candidate::from("admin123"),
            Candidate::from("guest"),
            Candidate::from(""),
            Candidate::from("  "),
            Candidate::coerced("None"),
            Candidate::from("123"),
        ]);

        assert_eq!(report["password123"], Verdict::Duplicate);
        assert_eq!(report["newpassword"], Verdict::Unique);
        assert_eq!(report["admin123"], Verdict::Duplicate);
        assert_eq!(report["guest"], Verdict::Unique);
        assert_eq!(report[""], Verdict::Invalid);
        assert_eq!(report["  "], Verdict::Invalid);
        assert_eq!(report["None"], Verdict::Invalid);
        assert_eq!(report["123"], Verdict::Unique);
        assert_eq!(report.len(), 8);
    }

    #[test]
    fn in_batch_repeat_is_caught() {
        let mut checker = preloaded_checker(&[]);

        let report = checker.check_batch(["fresh", "other", "fresh"]);

        assert_eq!(report.len(), 2);
        assert_eq!(
            report["fresh"],
            Verdict::Duplicate,
            "The second sighting inside one batch must classify as duplicate"
        );
        assert_eq!(report["other"], Verdict::Unique);
    }

    #[test]
    fn verdicts_depend_on_accumulated_state() {
        let mut checker = preloaded_checker(&[]);

        let first = checker.check_batch(["alpha", "beta"]);
        assert_eq!(first["alpha"], Verdict::Unique);
        assert_eq!(first["beta"], Verdict::Unique);

        let second = checker.check_batch(["alpha", "gamma"]);
        assert_eq!(
            second["alpha"],
            Verdict::Duplicate,
            "State must persist across batches"
        );
        assert_eq!(second["gamma"], Verdict::Unique);
    }

    /// Non-textual inputs classify invalid and never enter the filter, so a
    /// textually identical later candidate is still a first sighting.
    #[test]
    fn coerced_values_never_reach_the_filter() {
        let mut checker = preloaded_checker(&[]);

        let bits_before = checker.filter().bits_set();
        let report = checker.check_batch([Candidate::coerced(123), Candidate::coerced(123)]);

        assert_eq!(report["123"], Verdict::Invalid);
        assert_eq!(checker.filter().bits_set(), bits_before);

        let followup = checker.check_batch([Candidate::from("123")]);
        assert_eq!(
            followup["123"],
            Verdict::Unique,
            "The textual twin of a coerced value is still unseen"
        );
    }

    #[test]
    fn last_write_wins_for_repeated_labels() {
        let mut checker = preloaded_checker(&[]);

        let report = checker.check_batch(["token", "token", "token"]);

        assert_eq!(report.len(), 1);
        assert_eq!(report["token"], Verdict::Duplicate);
    }

    #[test]
    fn invalid_entries_do_not_abort_the_batch() {
        let mut checker = preloaded_checker(&[]);

        let report = checker.check_batch(["", "valid_one", " ", "valid_two"]);

        assert_eq!(report["valid_one"], Verdict::Unique);
        assert_eq!(report["valid_two"], Verdict::Unique);
        assert_eq!(report[""], Verdict::Invalid);
        assert_eq!(report[" "], Verdict::Invalid);
    }
}

// ============================================================================
// Exact-vs-estimate comparison
// ============================================================================

mod comparison {
    use super::*;
    use std::time::Duration;

    /// Three repeats of one address plus two unique others: exact count 3,
    /// estimate on the linear-counting path lands right next to it.
    #[test]
    fn ip_scenario_small_counts() {
        let ips = [
            "10.0.0.1", "10.0.0.1", "10.0.0.1", "172.16.0.9", "192.168.1.40",
        ];

        let report = compare_counts(&ips, 14).unwrap();

        assert_eq!(report.exact_count, 3);
        assert!(
            (report.estimated_count - 3.0).abs() < 0.5,
            "Small-range estimate should be ~3, got {}",
            report.estimated_count
        );
    }

    #[test]
    fn counts_agree_on_large_stream() {
        let distinct = 20_000usize;
        let items: Vec<String> = (0..50_000)
            .map(|i| {
                let v = i % distinct;
                format!("10.{}.{}.{}", v / 65_536, (v / 256) % 256, v % 256)
            })
            .collect();

        let report = compare_counts(&items, 14).unwrap();

        assert_eq!(report.exact_count, distinct);
        let relative = (report.estimated_count - distinct as f64).abs() / distinct as f64;
        assert!(
            relative < 0.05,
            "Estimate {:.0} deviates {:.2}% from exact {}",
            report.estimated_count,
            relative * 100.0,
            distinct
        );
        assert!(report.exact_duration > Duration::ZERO);
        assert!(report.estimated_duration > Duration::ZERO);
    }

    /// The comparison's estimate equals a standalone sketch fed the same
    /// stream, since hashing is deterministic.
    #[test]
    fn estimate_matches_standalone_sketch() {
        let items: Vec<String> = (0..5_000).map(|i| format!("host_{}", i % 1_700)).collect();

        let report = compare_counts(&items, 12).unwrap();

        let mut standalone = HyperLogLog::new(12).unwrap();
        for item in &items {
            standalone.insert(item);
        }

        assert_eq!(report.exact_count, 1_700);
        assert_eq!(report.estimated_count, standalone.estimate());
    }

    #[test]
    fn empty_input_reports_zero() {
        let items: [&str; 0] = [];
        let report = compare_counts(&items, 10).unwrap();

        assert_eq!(report.exact_count, 0);
        assert_eq!(report.estimated_count, 0.0);
    }
}

// ============================================================================
// Snapshots
// ============================================================================

mod snapshots {
    use super::*;
    use uniqstats::traits::DecodeError;

    #[test]
    fn filter_roundtrip_preserves_queries() {
        let mut bloom = BloomFilter::with_capacity(5_000, 0.01).unwrap();
        for i in 0..5_000 {
            bloom.insert(format!("item_{}", i).as_bytes());
        }

        let restored = BloomFilter::from_bytes(&bloom.to_bytes()).unwrap();

        for i in 0..5_000 {
            let item = format!("item_{}", i);
            assert!(
                restored.contains(item.as_bytes()),
                "Snapshot lost '{}'",
                item
            );
        }
        for i in 0..5_000 {
            let probe = format!("probe_{}", i);
            assert_eq!(
                restored.contains(probe.as_bytes()),
                bloom.contains(probe.as_bytes()),
                "Snapshot answers differently for '{}'",
                probe
            );
        }
    }

    #[test]
    fn estimator_roundtrip_preserves_estimate() {
        let mut hll = HyperLogLog::new(14).unwrap();
        for i in 0..50_000 {
            hll.insert(&format!("item_{}", i));
        }

        let restored = HyperLogLog::from_bytes(&hll.to_bytes()).unwrap();

        assert_eq!(restored.estimate(), hll.estimate());
        assert_eq!(restored.count(), hll.count());
    }

    /// Each snapshot kind carries its own magic, so feeding one kind to the
    /// other decoder is rejected up front.
    #[test]
    fn kind_magic_is_checked() {
        let bloom = BloomFilter::with_capacity(100, 0.01).unwrap();
        let hll = HyperLogLog::new(10).unwrap();

        assert_eq!(
            BloomFilter::from_bytes(&hll.to_bytes()).unwrap_err(),
            DecodeError::InvalidHeader
        );
        assert_eq!(
            HyperLogLog::from_bytes(&bloom.to_bytes()).unwrap_err(),
            DecodeError::InvalidHeader
        );
    }

    #[test]
    fn truncation_reports_sizes() {
        let hll = HyperLogLog::new(10).unwrap();
        let bytes = hll.to_bytes();

        match HyperLogLog::from_bytes(&bytes[..bytes.len() / 2]) {
            Err(DecodeError::BufferTooShort { expected, found }) => {
                assert_eq!(expected, bytes.len());
                assert_eq!(found, bytes.len() / 2);
            }
            other => panic!("Expected BufferTooShort, got {:?}", other),
        }
    }
}
