/// Selection state behind the chart: plugin directory, selected plugin, date
/// range and the most recent stats document.
///
/// Every selection change bumps a generation counter. Stats fetches carry the
/// generation they were issued for, and a result whose generation is no longer
/// current is dropped so a late response cannot overwrite newer state.
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::api::{Plugin, StatsDocument};
use crate::error::FetchError;
use crate::range::DateRange;
use crate::series::{self, AxisBounds, ChartPoint};

/// Tag attached to a stats fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// A stats fetch the caller should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub plugin: Plugin,
}

/// Outcome of handing a fetch result back to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsUpdate {
    Applied,
    /// The selection changed after the request was issued.
    Stale,
    /// The fetch failed; previous stats are kept.
    Failed,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    plugins: Vec<Plugin>,
    selected: Option<Plugin>,
    range: DateRange,
    days: Vec<NaiveDate>,
    stats: Option<StatsDocument>,
    generation: u64,
}

impl Dashboard {
    pub fn new(range: DateRange) -> Self {
        Self {
            plugins: Vec::new(),
            selected: None,
            days: range.day_series(),
            range,
            stats: None,
            generation: 0,
        }
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn selected(&self) -> Option<&Plugin> {
        self.selected.as_ref()
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Day sequence of the current range, derived once per range change.
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn stats(&self) -> Option<&StatsDocument> {
        self.stats.as_ref()
    }

    /// Replace the plugin directory. The selection is swapped for the entry of
    /// the same name in the new directory, or cleared when it is gone.
    pub fn set_plugins(&mut self, plugins: Vec<Plugin>) {
        let refreshed = self.selected.as_ref().map(|selected| {
            plugins
                .iter()
                .find(|p| p.name() == selected.name())
                .cloned()
        });
        self.plugins = plugins;
        match refreshed {
            Some(Some(plugin)) => self.selected = Some(plugin),
            Some(None) => {
                self.select_plugin(None);
            }
            None => {}
        }
    }

    pub fn find_plugin(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|plugin| plugin.name() == name)
    }

    /// Select a plugin (or none). Stats of the previous plugin are dropped.
    pub fn select_plugin(&mut self, plugin: Option<Plugin>) -> Option<FetchRequest> {
        if self.selected.as_ref().map(Plugin::name) != plugin.as_ref().map(Plugin::name) {
            self.stats = None;
        }
        self.selected = plugin;
        self.invalidate()
    }

    pub fn set_start(&mut self, start: Option<NaiveDate>) -> Option<FetchRequest> {
        self.range.set_start(start);
        self.days = self.range.day_series();
        self.invalidate()
    }

    pub fn set_end(&mut self, end: Option<NaiveDate>) -> Option<FetchRequest> {
        self.range.set_end(end);
        self.days = self.range.day_series();
        self.invalidate()
    }

    /// Whether a result for `ticket` would still be applied.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Hand back the result of a fetch issued for `ticket`.
    pub fn apply_stats(
        &mut self,
        ticket: FetchTicket,
        result: Result<StatsDocument, FetchError>,
    ) -> StatsUpdate {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stats for generation {} (current {})",
                ticket.generation, self.generation
            );
            return StatsUpdate::Stale;
        }

        match result {
            Ok(stats) => {
                if let Some(selected) = &self.selected {
                    if stats.plugin_name != selected.name() {
                        warn!(
                            "Stats document names '{}' but '{}' is selected",
                            stats.plugin_name,
                            selected.name()
                        );
                    }
                }
                self.stats = Some(stats);
                StatsUpdate::Applied
            }
            Err(e) => {
                warn!("Stats fetch failed: {}", e);
                StatsUpdate::Failed
            }
        }
    }

    /// The chart series for the current range and stats.
    pub fn series(&self) -> Vec<ChartPoint> {
        series::materialize(&self.days, self.stats.as_ref())
    }

    pub fn bounds(&self) -> AxisBounds {
        series::compute_bounds(&self.series())
    }

    fn invalidate(&mut self) -> Option<FetchRequest> {
        self.generation += 1;

        let incomplete = self.range.start().is_none() || self.range.end().is_none();
        match &self.selected {
            Some(plugin) if !incomplete => Some(FetchRequest {
                ticket: FetchTicket {
                    generation: self.generation,
                },
                plugin: plugin.clone(),
            }),
            _ => {
                self.stats = None;
                None
            }
        }
    }
}
