use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::HashMap;

use kit::api::{DailyStat, StatsDocument};
use kit::range::{DateRange, MAX_SPAN_DAYS};
use kit::series::{materialize, DATE_KEY_FORMAT};

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

fn stats_for(days: &[NaiveDate], downloads: impl Fn(usize) -> u64) -> StatsDocument {
    let daily_stats: HashMap<String, DailyStat> = days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            (
                day.format(DATE_KEY_FORMAT).to_string(),
                DailyStat {
                    downloads: downloads(i),
                },
            )
        })
        .collect();
    StatsDocument {
        plugin_name: "ctx".to_string(),
        daily_stats,
    }
}

proptest! {
    #[test]
    fn prop_short_span_covers_both_endpoints(offset in 0..20_000i64, span in 0..=MAX_SPAN_DAYS) {
        let start = base() + Duration::days(offset);
        let end = start + Duration::days(span);
        let days = DateRange::new(Some(start), Some(end)).day_series();

        prop_assert_eq!(days.len() as i64, span + 1);
        prop_assert_eq!(days.first(), Some(&start));
        prop_assert_eq!(days.last(), Some(&end));
        for pair in days.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn prop_long_span_is_clamped_to_366_days(offset in 0..20_000i64, span in (MAX_SPAN_DAYS + 1)..5_000i64) {
        let start = base() + Duration::days(offset);
        let end = start + Duration::days(span);
        let days = DateRange::new(Some(start), Some(end)).day_series();

        prop_assert_eq!(days.len(), 366);
        prop_assert_eq!(days.last(), Some(&end));
    }

    #[test]
    fn prop_inverted_range_is_empty(offset in 0..20_000i64, back in 1..5_000i64) {
        let end = base() + Duration::days(offset);
        let start = end + Duration::days(back);
        prop_assert!(DateRange::new(Some(start), Some(end)).day_series().is_empty());
    }

    #[test]
    fn prop_materialize_preserves_length(span in 0..400i64, keep in proptest::collection::vec(any::<bool>(), 0..400)) {
        let start = base();
        let days = DateRange::new(Some(start), Some(start + Duration::days(span))).day_series();
        let present: Vec<NaiveDate> = days
            .iter()
            .zip(keep.iter().chain(std::iter::repeat(&false)))
            .filter(|(_, keep)| **keep)
            .map(|(day, _)| *day)
            .collect();
        let doc = stats_for(&present, |i| i as u64);

        let points = materialize(&days, Some(&doc));
        prop_assert_eq!(points.len(), days.len());
        for (point, day) in points.iter().zip(&days) {
            prop_assert_eq!(point.x, *day);
            prop_assert_eq!(point.y.is_some(), present.contains(day));
        }
    }

    #[test]
    fn prop_full_coverage_maps_every_value(span in 0..200i64, seed in any::<u32>()) {
        let start = base();
        let days = DateRange::new(Some(start), Some(start + Duration::days(span))).day_series();
        let downloads = |i: usize| (seed as u64).wrapping_mul(i as u64 + 1) % 100_000;
        let doc = stats_for(&days, downloads);

        let points = materialize(&days, Some(&doc));
        for (i, point) in points.iter().enumerate() {
            prop_assert_eq!(point.y, Some(downloads(i)));
        }

        let empty = stats_for(&[], downloads);
        prop_assert!(materialize(&days, Some(&empty)).iter().all(|p| p.y.is_none()));
    }
}

#[test]
fn test_scenario_sparse_january() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    let days = DateRange::new(Some(start), Some(end)).day_series();
    let doc: StatsDocument = serde_json::from_str(
        r#"{"pluginName":"ctx","stats":{"2024-01-01":{"downloads":5},"2024-01-03":{"downloads":7}}}"#,
    )
    .unwrap();

    let ys: Vec<_> = materialize(&days, Some(&doc)).iter().map(|p| p.y).collect();
    assert_eq!(ys, vec![Some(5), None, Some(7)]);
}
