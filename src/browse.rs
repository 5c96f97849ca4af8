/// Interactive browse mode.
///
/// Pick a plugin with a fuzzy selector, move either end of the date range with
/// a date picker, and the chart is redrawn after every change. Stats fetches
/// run as background tasks; a result that arrives after the selection moved on
/// is discarded by the dashboard.
use anyhow::{Context, Result};
use inquire::{DateSelect, InquireError, Select};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api::{StatsClient, StatsDocument};
use crate::dashboard::{Dashboard, FetchRequest, FetchTicket, StatsUpdate};
use crate::error::FetchError;
use crate::progress::FetchProgress;
use crate::range::DateRange;
use crate::renderer::chart::{self, ChartOptions};
use crate::renderer::Report;
use crate::series;

/// How long to block the prompt waiting for a stats fetch.
const FETCH_WAIT: Duration = Duration::from_secs(10);

type StatsResult = (FetchTicket, Result<StatsDocument, FetchError>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SelectPlugin,
    SetStart,
    SetEnd,
    Reload,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::SelectPlugin,
        Action::SetStart,
        Action::SetEnd,
        Action::Reload,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::SelectPlugin => "Select plugin",
            Action::SetStart => "Change start date",
            Action::SetEnd => "Change end date",
            Action::Reload => "Reload plugin directory",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Run the interactive session until the user quits.
pub async fn run(client: StatsClient, range: DateRange, plugin: Option<String>) -> Result<()> {
    let mut dashboard = Dashboard::new(range);
    let (tx, mut rx) = mpsc::unbounded_channel::<StatsResult>();

    let mut last_updated = Some(
        load_directory(&client, &mut dashboard)
            .await
            .context("Failed to load plugin directory")?,
    );

    let mut pending: Option<FetchTicket> = None;
    if let Some(name) = plugin {
        let plugin = dashboard
            .find_plugin(&name)
            .cloned()
            .with_context(|| format!("Unknown plugin: {}", name))?;
        pending = issue(&client, dashboard.select_plugin(Some(plugin)), &tx);
    }

    loop {
        if let Some(ticket) = pending {
            if wait_for(&mut dashboard, &mut rx, ticket).await {
                pending = None;
            } else {
                eprintln!("⏳ Still loading; showing the previous data.");
            }
        }
        drain(&mut dashboard, &mut rx);
        print!("{}", render_current(&dashboard, last_updated));

        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let request = match action {
            Action::SelectPlugin => {
                let names = plugin_names(&dashboard);
                if names.is_empty() {
                    eprintln!("No plugins available; try reloading the plugin directory.");
                    None
                } else {
                    let choice = Select::new("Plugin:", names).prompt_skippable()?;
                    let plugin = choice.and_then(|name| dashboard.find_plugin(&name).cloned());
                    dashboard.select_plugin(plugin)
                }
            }
            Action::SetStart => {
                let start = prompt_date("From:", dashboard.range().start())?;
                dashboard.set_start(start)
            }
            Action::SetEnd => {
                let end = prompt_date("To:", dashboard.range().end())?;
                dashboard.set_end(end)
            }
            Action::Reload => {
                match load_directory(&client, &mut dashboard).await {
                    Ok(timestamp) => last_updated = Some(timestamp),
                    Err(e) => warn!("Keeping previous plugin directory: {}", e),
                }
                let selected = dashboard.selected().cloned();
                dashboard.select_plugin(selected)
            }
            Action::Quit => break,
        };

        pending = issue(&client, request, &tx);
    }

    Ok(())
}

/// Selector options, sorted by name.
fn plugin_names(dashboard: &Dashboard) -> Vec<String> {
    let mut names: Vec<String> = dashboard
        .plugins()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    names.sort();
    names
}

/// Fetch the directory and hand its plugins to the dashboard. Returns the
/// directory timestamp.
async fn load_directory(client: &StatsClient, dashboard: &mut Dashboard) -> Result<i64, FetchError> {
    let progress = FetchProgress::start("Fetching plugin directory…");
    let result = client.fetch_directory().await;
    progress.finish();

    let directory = result?;
    dashboard.set_plugins(directory.to_plugins());
    Ok(directory.timestamp)
}

fn prompt_date(
    message: &str,
    current: Option<chrono::NaiveDate>,
) -> Result<Option<chrono::NaiveDate>> {
    let mut prompt = DateSelect::new(message).with_help_message("Esc clears the date");
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }
    Ok(prompt.prompt_skippable()?)
}

/// Spawn the fetch for `request`, if any, and return its ticket.
fn issue(
    client: &StatsClient,
    request: Option<FetchRequest>,
    tx: &UnboundedSender<StatsResult>,
) -> Option<FetchTicket> {
    let request = request?;
    let ticket = request.ticket;
    spawn_fetch(client, request, tx.clone());
    Some(ticket)
}

fn spawn_fetch(client: &StatsClient, request: FetchRequest, tx: UnboundedSender<StatsResult>) {
    let client = client.clone();
    tokio::spawn(async move {
        let result = client.fetch_stats(&request.plugin).await;
        // A closed channel means the session already ended
        let _ = tx.send((request.ticket, result));
    });
}

/// Apply results until the one for `ticket` arrives. Returns `false` if it did
/// not arrive within [`FETCH_WAIT`].
async fn wait_for(
    dashboard: &mut Dashboard,
    rx: &mut UnboundedReceiver<StatsResult>,
    ticket: FetchTicket,
) -> bool {
    let progress = FetchProgress::start("Fetching download stats…");
    let deadline = tokio::time::sleep(FETCH_WAIT);
    tokio::pin!(deadline);

    let resolved = loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some((received_ticket, result)) => {
                    let update = dashboard.apply_stats(received_ticket, result);
                    debug!("Stats update: {:?}", update);
                    if received_ticket == ticket {
                        break true;
                    }
                }
                None => break true,
            },
            _ = &mut deadline => break false,
        }
    };

    progress.finish();
    resolved
}

/// Apply whatever results have already arrived.
fn drain(dashboard: &mut Dashboard, rx: &mut UnboundedReceiver<StatsResult>) {
    while let Ok((ticket, result)) = rx.try_recv() {
        if dashboard.apply_stats(ticket, result) == StatsUpdate::Stale {
            debug!("Dropped a stale stats response");
        }
    }
}

fn render_current(dashboard: &Dashboard, last_updated: Option<i64>) -> String {
    let points = dashboard.series();
    let report = Report {
        plugin: dashboard
            .selected()
            .map(|p| p.name())
            .unwrap_or("(no plugin selected)"),
        window: dashboard.range().effective_window(),
        points: &points,
        bounds: series::compute_bounds(&points),
        last_updated,
    };
    let mut output = chart::render(&report, &ChartOptions::default());
    output.push('\n');
    output
}
