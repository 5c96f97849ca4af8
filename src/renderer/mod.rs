/// Output formats for a plugin's download series.
pub mod chart;
pub mod md;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

use crate::series::{AxisBounds, ChartPoint};
use crate::timefmt;

/// Everything a renderer needs to describe one plugin's series.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub plugin: &'a str,
    pub window: Option<(NaiveDate, NaiveDate)>,
    pub points: &'a [ChartPoint],
    pub bounds: AxisBounds,
    /// Unix seconds of the last directory update, when known.
    pub last_updated: Option<i64>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    plugin: &'a str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    last_updated: Option<String>,
    bounds: AxisBounds,
    points: &'a [ChartPoint],
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> Result<String> {
    let json = JsonReport {
        plugin: report.plugin,
        from: report.window.map(|(from, _)| from),
        to: report.window.map(|(_, to)| to),
        last_updated: report.last_updated.map(timefmt::format_timestamp),
        bounds: report.bounds,
        points: report.points,
    };
    let mut output = serde_json::to_string_pretty(&json)?;
    output.push('\n');
    Ok(output)
}

/// Group digits by thousands (1234567 → "1,234,567").
pub(crate) fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped_rev = String::new();

    for (count, ch) in digits.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped_rev.push(',');
        }
        grouped_rev.push(ch);
    }

    grouped_rev.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_render_json_keeps_missing_as_null() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = [ChartPoint { x: day, y: None }];
        let report = Report {
            plugin: "ctx",
            window: Some((day, day)),
            points: &points,
            bounds: AxisBounds::default(),
            last_updated: Some(1704067200),
        };
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["plugin"], "ctx");
        assert_eq!(value["from"], "2024-01-01");
        assert_eq!(value["last_updated"], "2024-01-01T00:00:00.000Z");
        assert!(value["points"][0]["y"].is_null());
        assert!(value["bounds"]["min"].is_null());
    }
}
