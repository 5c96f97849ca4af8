/// One-shot command implementations.
///
/// Each returns its output as a string so the binary decides where it goes.
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::warn;

use crate::api::StatsClient;
use crate::dashboard::Dashboard;
use crate::progress::FetchProgress;
use crate::range::{parse_date_arg, DateRange};
use crate::renderer::chart::{self, ChartOptions};
use crate::renderer::{self, md, Report};
use crate::series;
use crate::timefmt;

/// Output format of `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Text line chart
    Chart,
    /// Markdown report
    Md,
    Json,
}

/// Build the date range from optional `--from` / `--to` arguments, falling
/// back to the last week ending `today`.
pub fn range_from_args(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    let mut range = DateRange::default_for(today);
    if let Some(from) = from {
        range.set_start(parse_date_arg(from, today).context("Invalid --from")?);
    }
    if let Some(to) = to {
        range.set_end(parse_date_arg(to, today).context("Invalid --to")?);
    }
    Ok(range)
}

/// Sorted plugin names, one per line.
pub async fn plugins(client: &StatsClient) -> Result<String> {
    let directory = client
        .fetch_directory()
        .await
        .with_context(|| format!("Failed to fetch plugin directory from {}", client.source()))?;

    let mut output = String::new();
    for name in directory.sorted_names() {
        output.push_str(&name);
        output.push('\n');
    }
    Ok(output)
}

/// Last directory update as ISO-8601 UTC.
pub async fn updated(client: &StatsClient) -> Result<String> {
    let timestamp = client
        .fetch_last_updated_timestamp()
        .await
        .with_context(|| format!("Failed to fetch plugin directory from {}", client.source()))?;
    Ok(format!("{}\n", timefmt::format_timestamp(timestamp)))
}

/// Fetch one plugin's stats and render the selected range.
pub async fn show(
    client: &StatsClient,
    plugin: &str,
    range: DateRange,
    format: Format,
    chart_options: &ChartOptions,
) -> Result<String> {
    let progress = FetchProgress::start(format!("Fetching stats for {}…", plugin));
    let result = fetch_series(client, plugin, range).await;
    progress.finish();
    let (dashboard, last_updated) = result?;

    let points = dashboard.series();
    let report = Report {
        plugin,
        window: dashboard.range().effective_window(),
        points: &points,
        bounds: series::compute_bounds(&points),
        last_updated,
    };

    match format {
        Format::Chart => Ok(chart::render(&report, chart_options)),
        Format::Md => md::render(&report),
        Format::Json => renderer::render_json(&report),
    }
}

async fn fetch_series(
    client: &StatsClient,
    plugin: &str,
    range: DateRange,
) -> Result<(Dashboard, Option<i64>)> {
    let directory = client
        .fetch_directory()
        .await
        .with_context(|| format!("Failed to fetch plugin directory from {}", client.source()))?;

    let mut dashboard = Dashboard::new(range);
    dashboard.set_plugins(directory.to_plugins());
    let selected = dashboard.find_plugin(plugin).cloned().with_context(|| {
        format!(
            "Unknown plugin '{}'. Run `kit plugins` to list available plugins.",
            plugin
        )
    })?;

    let Some(request) = dashboard.select_plugin(Some(selected)) else {
        // Incomplete range: nothing to fetch, the series is empty
        return Ok((dashboard, Some(directory.timestamp)));
    };

    let (stats, timestamp) = tokio::join!(
        client.fetch_stats(&request.plugin),
        client.fetch_last_updated_timestamp()
    );

    let stats = stats.with_context(|| format!("Failed to fetch stats for {}", plugin))?;
    let last_updated = match timestamp {
        Ok(timestamp) => Some(timestamp),
        Err(e) => {
            warn!("Could not refresh last-updated timestamp: {}", e);
            Some(directory.timestamp)
        }
    };

    dashboard.apply_stats(request.ticket, Ok(stats));
    Ok((dashboard, last_updated))
}
