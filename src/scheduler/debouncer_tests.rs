//! Tests for debouncer

use super::*;
use proptest::prelude::*;

const TEST_RATE_MS: u64 = 5;

#[test]
fn test_new_debouncer_has_no_window() {
    let debouncer = Debouncer::new(TEST_RATE_MS);
    assert!(!debouncer.is_window_open(0));
    assert_eq!(debouncer.window_end(), None);
    assert_eq!(debouncer.suppressed(), 0);
}

#[test]
fn test_first_call_fires_immediately() {
    let mut debouncer = Debouncer::new(TEST_RATE_MS);
    assert_eq!(debouncer.call_at("foo", 0), Some("foo".to_string()));
    assert!(debouncer.is_window_open(TEST_RATE_MS - 1));
}

#[test]
fn test_burst_fires_once() {
    let mut debouncer = Debouncer::new(TEST_RATE_MS);

    assert_eq!(debouncer.call_at("a", 0), Some("a".to_string()));
    assert_eq!(debouncer.call_at("ab", 2), None);
    assert_eq!(debouncer.call_at("abc", 4), None);

    // Each swallowed call pushes the window out
    assert_eq!(debouncer.window_end(), Some(9));
    assert!(debouncer.is_window_open(8));
    assert!(!debouncer.is_window_open(9));
    assert_eq!(debouncer.suppressed(), 2);
}

#[test]
fn test_call_after_window_fires_immediately_again() {
    let mut debouncer = Debouncer::new(TEST_RATE_MS);
    assert!(debouncer.call_at("foo", 0).is_some());
    assert_eq!(debouncer.call_at("poo", TEST_RATE_MS + 1), Some("poo".to_string()));
    assert_eq!(debouncer.suppressed(), 0);
}

#[test]
fn test_call_exactly_at_window_end_fires() {
    let mut debouncer = Debouncer::new(TEST_RATE_MS);
    debouncer.call_at("foo", 0);
    assert_eq!(debouncer.call_at("bar", TEST_RATE_MS), Some("bar".to_string()));
}

#[test]
fn test_zero_rate_never_coalesces() {
    let mut debouncer = Debouncer::default();
    assert_eq!(debouncer.rate_ms(), 0);
    assert!(debouncer.call_at("a", 0).is_some());
    assert!(debouncer.call_at("ab", 0).is_some());
    assert!(debouncer.call_at("abc", 0).is_some());
    assert_eq!(debouncer.suppressed(), 0);
}

// Feature: debounce, one fire per burst
// *For any* burst of calls spaced closer than the rate, exactly one call
// fires (the leading one) and the window closes at last call + rate.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_burst_fires_once(
        num_calls in 2usize..=10,
        rate_ms in 5u64..50u64
    ) {
        let mut debouncer = Debouncer::new(rate_ms);
        let step = rate_ms - 1;
        let mut now = 0;
        let mut fired = Vec::new();

        for i in 0..num_calls {
            if let Some(value) = debouncer.call_at(&format!("q{}", i), now) {
                fired.push(value);
            }
            now += step;
        }
        let last_call = now - step;

        prop_assert_eq!(fired, vec!["q0".to_string()]);
        prop_assert_eq!(debouncer.suppressed(), num_calls - 1);
        prop_assert!(debouncer.is_window_open(last_call + rate_ms - 1));
        prop_assert!(!debouncer.is_window_open(last_call + rate_ms));
    }
}

// Feature: debounce, quiet periods
// *For any* sequence of calls spaced at least the rate apart, every call fires
// immediately.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_spaced_calls_all_fire(num_calls in 1usize..=10, rate_ms in 0u64..50u64) {
        let mut debouncer = Debouncer::new(rate_ms);
        for i in 0..num_calls {
            let now = i as u64 * rate_ms;
            prop_assert!(debouncer.call_at("query", now).is_some());
        }
        prop_assert_eq!(debouncer.suppressed(), 0);
    }
}
