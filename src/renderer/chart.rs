/// Text line chart for terminals.
///
/// One column per day (or per bucket of days when the series is wider than
/// `max_width`). Missing days between two recorded days are bridged with a
/// dimmer marker when `connect_gaps` is set; they are never drawn as zero.
use unicode_width::UnicodeWidthStr;

use super::{format_number, Report};
use crate::series::ChartPoint;

const POINT: char = '●';
const BRIDGE: char = '·';

#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    /// Plot rows, at least 2.
    pub height: usize,
    /// Maximum plot columns before days are bucketed.
    pub max_width: usize,
    pub connect_gaps: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            height: 10,
            max_width: 72,
            connect_gaps: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Value(f64),
    Bridged(f64),
    Empty,
}

pub fn render(report: &Report, options: &ChartOptions) -> String {
    let mut output = String::new();
    render_title(&mut output, report);

    if report.points.is_empty() {
        output.push_str("No data for the selected range.\n");
        return output;
    }

    let values: Vec<u64> = report.points.iter().filter_map(|p| p.y).collect();
    let Some(&observed_max) = values.iter().max() else {
        output.push_str("No downloads recorded in the selected range.\n");
        return output;
    };

    // Bounds are hints; anything outside them is still plotted at the edge.
    let lo = report.bounds.min.unwrap_or(0);
    let hi = report.bounds.max.unwrap_or(observed_max).max(lo.saturating_add(1));

    let columns = bucket(report.points, options.max_width.max(1));
    let cells = if options.connect_gaps {
        bridge_gaps(&columns)
    } else {
        columns
            .iter()
            .map(|c| c.map_or(Cell::Empty, Cell::Value))
            .collect()
    };

    let height = options.height.max(2);
    let hi_label = format_number(hi);
    let lo_label = format_number(lo);
    let label_width = hi_label.len().max(lo_label.len());

    for row in (0..height).rev() {
        let label = match row {
            r if r == height - 1 => hi_label.as_str(),
            0 => lo_label.as_str(),
            _ => "",
        };
        output.push_str(&format!("{:>width$} ┤", label, width = label_width));
        for cell in &cells {
            let ch = match cell {
                Cell::Value(v) if level(*v, lo, hi, height) == row => POINT,
                Cell::Bridged(v) if level(*v, lo, hi, height) == row => BRIDGE,
                _ => ' ',
            };
            output.push(ch);
        }
        output.push('\n');
    }

    output.push_str(&format!(
        "{:>width$} └{}\n",
        "",
        "─".repeat(cells.len()),
        width = label_width
    ));
    render_x_labels(&mut output, report.points, label_width + 2, cells.len());
    output
}

fn render_title(output: &mut String, report: &Report) {
    let title = match report.window {
        Some((from, to)) => format!("{} | {} → {}", report.plugin, from, to),
        None => report.plugin.to_string(),
    };
    output.push_str(&title);
    output.push('\n');
    output.push_str(&"═".repeat(UnicodeWidthStr::width(title.as_str())));
    output.push('\n');
}

fn render_x_labels(output: &mut String, points: &[ChartPoint], indent: usize, columns: usize) {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return;
    };
    let first = first.x.format("%Y-%m-%d").to_string();
    let last = last.x.format("%Y-%m-%d").to_string();

    output.push_str(&" ".repeat(indent));
    if first == last {
        output.push_str(&first);
    } else if columns > first.len() + last.len() {
        output.push_str(&first);
        output.push_str(&" ".repeat(columns - first.len() - last.len()));
        output.push_str(&last);
    } else {
        output.push_str(&format!("{} → {}", first, last));
    }
    output.push('\n');
}

/// Collapse points into at most `max_width` columns, averaging the present
/// values in each bucket. A bucket with no values stays missing.
fn bucket(points: &[ChartPoint], max_width: usize) -> Vec<Option<f64>> {
    let size = points.len().div_ceil(max_width).max(1);
    points
        .chunks(size)
        .map(|chunk| {
            let present: Vec<u64> = chunk.iter().filter_map(|p| p.y).collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<u64>() as f64 / present.len() as f64)
            }
        })
        .collect()
}

/// Linearly interpolate runs of missing columns between two present ones.
/// Leading and trailing gaps stay empty.
fn bridge_gaps(columns: &[Option<f64>]) -> Vec<Cell> {
    let mut cells: Vec<Cell> = columns
        .iter()
        .map(|c| c.map_or(Cell::Empty, Cell::Value))
        .collect();

    let mut previous: Option<(usize, f64)> = None;
    for (i, column) in columns.iter().enumerate() {
        let Some(value) = column else { continue };
        if let Some((start, from)) = previous {
            let span = (i - start) as f64;
            for (gap, cell) in cells.iter_mut().enumerate().take(i).skip(start + 1) {
                let t = (gap - start) as f64 / span;
                *cell = Cell::Bridged(from + (value - from) * t);
            }
        }
        previous = Some((i, *value));
    }
    cells
}

fn level(value: f64, lo: u64, hi: u64, height: usize) -> usize {
    let scaled = (value - lo as f64) / (hi - lo) as f64 * (height - 1) as f64;
    scaled.round().clamp(0.0, (height - 1) as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{compute_bounds, AxisBounds};
    use chrono::NaiveDate;

    fn points(values: &[Option<u64>]) -> Vec<ChartPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        start
            .iter_days()
            .zip(values)
            .map(|(x, y)| ChartPoint { x, y: *y })
            .collect()
    }

    fn report<'a>(points: &'a [ChartPoint]) -> Report<'a> {
        Report {
            plugin: "ctx",
            window: points.first().zip(points.last()).map(|(a, b)| (a.x, b.x)),
            points,
            bounds: compute_bounds(points),
            last_updated: None,
        }
    }

    #[test]
    fn test_empty_series_message() {
        let output = render(&report(&[]), &ChartOptions::default());
        assert!(output.contains("No data for the selected range."));
    }

    #[test]
    fn test_all_missing_message() {
        let pts = points(&[None, None]);
        let output = render(&report(&pts), &ChartOptions::default());
        assert!(output.contains("No downloads recorded"));
    }

    #[test]
    fn test_plots_one_marker_per_present_day() {
        let pts = points(&[Some(1), None, Some(9)]);
        let output = render(&report(&pts), &ChartOptions::default());
        assert_eq!(output.matches(POINT).count(), 2);
        assert_eq!(output.matches(BRIDGE).count(), 1);
        assert!(output.contains("2024-01-01 → 2024-01-03"));
    }

    #[test]
    fn test_gaps_not_bridged_when_disabled() {
        let pts = points(&[Some(1), None, Some(9)]);
        let options = ChartOptions {
            connect_gaps: false,
            ..ChartOptions::default()
        };
        let output = render(&report(&pts), &options);
        assert_eq!(output.matches(BRIDGE).count(), 0);
    }

    #[test]
    fn test_bridge_interpolates_between_neighbours() {
        let cells = bridge_gaps(&[None, Some(0.0), None, None, Some(3.0), None]);
        assert_eq!(
            cells,
            vec![
                Cell::Empty,
                Cell::Value(0.0),
                Cell::Bridged(1.0),
                Cell::Bridged(2.0),
                Cell::Value(3.0),
                Cell::Empty,
            ]
        );
    }

    #[test]
    fn test_bucket_limits_width() {
        let values: Vec<Option<u64>> = (0..366).map(|i| Some(i as u64)).collect();
        let pts = points(&values);
        assert_eq!(bucket(&pts, 72).len(), 61);
        assert_eq!(bucket(&pts[..10], 72).len(), 10);
    }

    #[test]
    fn test_flat_series_does_not_divide_by_zero() {
        let pts = points(&[Some(4), Some(4)]);
        let mut rep = report(&pts);
        rep.bounds = AxisBounds {
            min: Some(4),
            max: Some(4),
        };
        let output = render(&rep, &ChartOptions::default());
        assert_eq!(output.matches(POINT).count(), 2);
    }
}
