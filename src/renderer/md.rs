use super::chart::{self, ChartOptions};
use super::{format_number, Report};
use crate::series;
use crate::timefmt;
use anyhow::Result;

/// Render a plugin's series as a Markdown report
pub fn render(report: &Report) -> Result<String> {
    let mut output = String::new();

    // 1. Title and metadata
    render_header(&mut output, report);

    // 2. Summary
    render_summary(&mut output, report);

    // 3. Chart
    if !report.points.is_empty() {
        output.push_str("### 📈 Chart\n");
        output.push_str("```text\n");
        output.push_str(&chart::render(report, &ChartOptions::default()));
        output.push_str("```\n\n");
    }

    // 4. Daily table
    render_daily(&mut output, report);

    Ok(output)
}

fn render_header(output: &mut String, report: &Report) {
    output.push_str(&format!("# 📦 {} — daily downloads\n", report.plugin));

    match report.window {
        Some((from, to)) => {
            output.push_str(&format!(
                "- **Window:** {} → {} ({} days)\n",
                from,
                to,
                report.points.len()
            ));
        }
        None => output.push_str("- **Window:** no valid date range selected\n"),
    }
    output.push_str(&format!(
        "- **Last updated:** {}\n",
        timefmt::format_timestamp_opt(report.last_updated)
    ));
    output.push('\n');
}

fn render_summary(output: &mut String, report: &Report) {
    let summary = series::summarize(report.points);

    output.push_str("### 📊 Summary\n");
    output.push_str(&format!(
        "- ⬇️ **Total downloads:** {}\n",
        format_number(summary.total_downloads)
    ));
    output.push_str(&format!(
        "- 📅 **Days with data:** {} ({} missing)\n",
        summary.days_with_data, summary.days_missing
    ));
    if let Some(peak) = summary.peak {
        output.push_str(&format!(
            "- 🏔️ **Peak:** {} on {}\n",
            format_number(peak.y.unwrap_or_default()),
            peak.x
        ));
    }
    output.push_str(&format!(
        "- 📏 **Axis hint:** min {}, max {}\n",
        bound_label(report.bounds.min),
        bound_label(report.bounds.max)
    ));
    output.push('\n');
}

fn render_daily(output: &mut String, report: &Report) {
    output.push_str("### 🗓️ By day\n");
    if report.points.is_empty() {
        output.push_str("_No data for the selected range._\n");
        return;
    }

    output.push_str("| Date | Downloads |\n");
    output.push_str("| ---- | --------- |\n");
    for point in report.points {
        let downloads = point
            .y
            .map(format_number)
            .unwrap_or_else(|| "–".to_string());
        output.push_str(&format!("| {} | {} |\n", point.x, downloads));
    }
    output.push('\n');
}

fn bound_label(bound: Option<u64>) -> String {
    bound.map(format_number).unwrap_or_else(|| "auto".to_string())
}
