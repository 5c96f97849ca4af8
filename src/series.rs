/// Series materialization: sparse daily stats to a dense per-day series.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::StatsDocument;

/// Key format used by the stats documents.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// One charted day. `y` is `None` when the stats have no entry for `x`,
/// which is different from a recorded zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: NaiveDate,
    pub y: Option<u64>,
}

/// Advisory value-axis bounds. `None` leaves that side unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AxisBounds {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

/// Totals over a materialized series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeriesSummary {
    pub total_downloads: u64,
    pub days_with_data: usize,
    pub days_missing: usize,
    pub peak: Option<ChartPoint>,
}

/// One point per day in `days`, in order.
///
/// Returns an empty series when there is no stats document or no days.
pub fn materialize(days: &[NaiveDate], stats: Option<&StatsDocument>) -> Vec<ChartPoint> {
    let Some(stats) = stats else {
        return Vec::new();
    };

    days.iter()
        .map(|day| ChartPoint {
            x: *day,
            y: stats
                .daily_stats
                .get(&day.format(DATE_KEY_FORMAT).to_string())
                .map(|stat| stat.downloads),
        })
        .collect()
}

/// Smallest and largest present values.
///
/// A computed bound of exactly 0 collapses to unbounded, as does an empty
/// candidate set.
// NOTE: the zero collapse is suspect (0 treated as "unset"); see DESIGN.md.
pub fn compute_bounds(points: &[ChartPoint]) -> AxisBounds {
    let values = || points.iter().filter_map(|point| point.y);
    AxisBounds {
        min: values().min().filter(|v| *v != 0),
        max: values().max().filter(|v| *v != 0),
    }
}

pub fn summarize(points: &[ChartPoint]) -> SeriesSummary {
    let mut summary = SeriesSummary::default();
    for point in points {
        match point.y {
            Some(downloads) => {
                summary.total_downloads = summary.total_downloads.saturating_add(downloads);
                summary.days_with_data += 1;
                // Earliest day wins on ties
                if summary.peak.and_then(|p| p.y).map_or(true, |best| downloads > best) {
                    summary.peak = Some(*point);
                }
            }
            None => summary.days_missing += 1,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DailyStat;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stats(entries: &[(&str, u64)]) -> StatsDocument {
        StatsDocument {
            plugin_name: "ctx".to_string(),
            daily_stats: entries
                .iter()
                .map(|(day, downloads)| {
                    (
                        day.to_string(),
                        DailyStat {
                            downloads: *downloads,
                        },
                    )
                })
                .collect(),
        }
    }

    fn point(x: NaiveDate, y: Option<u64>) -> ChartPoint {
        ChartPoint { x, y }
    }

    #[test]
    fn test_gap_is_missing_not_zero() {
        let days = [date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];
        let doc = stats(&[("2024-01-01", 5), ("2024-01-03", 7)]);
        assert_eq!(
            materialize(&days, Some(&doc)),
            vec![
                point(date(2024, 1, 1), Some(5)),
                point(date(2024, 1, 2), None),
                point(date(2024, 1, 3), Some(7)),
            ]
        );
    }

    #[test]
    fn test_recorded_zero_is_kept() {
        let days = [date(2024, 1, 1)];
        let doc = stats(&[("2024-01-01", 0)]);
        assert_eq!(
            materialize(&days, Some(&doc)),
            vec![point(date(2024, 1, 1), Some(0))]
        );
    }

    #[test]
    fn test_absent_stats_or_no_days_is_empty() {
        let days = [date(2024, 1, 1)];
        assert!(materialize(&days, None).is_empty());
        assert!(materialize(&[], Some(&stats(&[("2024-01-01", 1)]))).is_empty());
    }

    #[test]
    fn test_bounds_min_zero_collapses() {
        let points = [
            point(date(2024, 1, 1), Some(3)),
            point(date(2024, 1, 2), Some(0)),
            point(date(2024, 1, 3), Some(5)),
        ];
        assert_eq!(
            compute_bounds(&points),
            AxisBounds {
                min: None,
                max: Some(5)
            }
        );
    }

    #[test]
    fn test_bounds_skip_missing() {
        let points = [
            point(date(2024, 1, 1), None),
            point(date(2024, 1, 2), Some(4)),
            point(date(2024, 1, 3), Some(9)),
        ];
        assert_eq!(
            compute_bounds(&points),
            AxisBounds {
                min: Some(4),
                max: Some(9)
            }
        );
    }

    #[test]
    fn test_bounds_empty_or_all_zero_are_unbounded() {
        assert_eq!(compute_bounds(&[]), AxisBounds::default());
        let points = [point(date(2024, 1, 1), None), point(date(2024, 1, 2), Some(0))];
        assert_eq!(compute_bounds(&points), AxisBounds::default());
    }

    #[test]
    fn test_summarize() {
        let points = [
            point(date(2024, 1, 1), Some(5)),
            point(date(2024, 1, 2), None),
            point(date(2024, 1, 3), Some(7)),
            point(date(2024, 1, 4), Some(7)),
        ];
        let summary = summarize(&points);
        assert_eq!(summary.total_downloads, 19);
        assert_eq!(summary.days_with_data, 3);
        assert_eq!(summary.days_missing, 1);
        assert_eq!(summary.peak, Some(point(date(2024, 1, 3), Some(7))));
    }

    #[test]
    fn test_serialized_point_shape() {
        let json = serde_json::to_string(&point(date(2024, 1, 2), None)).unwrap();
        assert_eq!(json, r#"{"x":"2024-01-02","y":null}"#);
    }
}
