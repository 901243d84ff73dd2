//! Property tests for index normalization.

use af_core::{TimeSlider, normalize_index, normalize_index_range};
use proptest::prelude::*;

fn any_input() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1_000_i64..1_000).prop_map(|v| v as f64),
        -1_000.0_f64..1_000.0,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

proptest! {
    #[test]
    fn index_is_always_in_bounds(value in any_input(), max_index in -50_i64..500) {
        let idx = normalize_index(value, max_index as f64);
        prop_assert!(idx <= max_index.max(0) as usize);
    }

    #[test]
    fn range_is_ordered_and_separated(
        start in any_input(),
        end in any_input(),
        max_index in 0_i64..500,
        min_sep in 0_i64..500,
    ) {
        prop_assume!(min_sep <= max_index);
        let (s, e) = normalize_index_range((start, end), max_index as f64, min_sep as f64);
        prop_assert!(s <= e);
        prop_assert!(e <= max_index as usize);
        prop_assert!(e - s >= min_sep.min(max_index) as usize);
    }

    #[test]
    fn range_tolerates_any_separation(
        start in any_input(),
        end in any_input(),
        max_index in any_input(),
        min_sep in any_input(),
    ) {
        let (s, e) = normalize_index_range((start, end), max_index, min_sep);
        prop_assert!(s <= e);
    }

    #[test]
    fn normalized_range_is_a_fixed_point(
        start in -100_i64..600,
        end in -100_i64..600,
        max_index in 0_i64..500,
        min_sep in 0_i64..10,
    ) {
        let first = normalize_index_range((start as f64, end as f64), max_index as f64, min_sep as f64);
        let second = normalize_index_range((first.0 as f64, first.1 as f64), max_index as f64, min_sep as f64);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn slider_stays_within_series(len in 0_usize..600, raw in any_input(), raw_end in any_input()) {
        let slider = TimeSlider::for_len(len);
        let idx = slider.index(raw);
        let (s, e) = slider.range((raw, raw_end));
        let last = len.saturating_sub(1);
        prop_assert!(idx <= last);
        prop_assert!(s <= e && e <= last);
    }
}
