/// Date range model for the displayed window.
///
/// Holds a `(start, end)` pair that can be updated one endpoint at a time and
/// derives the contiguous sequence of calendar days to display, clamped to at
/// most 365 days back from `end`.
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, Local, NaiveDate};

/// Longest span (in whole days between endpoints) shown without clamping.
pub const MAX_SPAN_DAYS: i64 = 365;

/// Days before `end` used for the initial `start`.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Selected start and end dates. Either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// The initial range: the last week ending on `today`.
    pub fn default_for(today: NaiveDate) -> Self {
        Self::new(Some(today - Duration::days(DEFAULT_LOOKBACK_DAYS)), Some(today))
    }

    /// The initial range evaluated against the local calendar date.
    pub fn ending_today() -> Self {
        Self::default_for(Local::now().date_naive())
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Replace the start endpoint. An inverted range is allowed.
    pub fn set_start(&mut self, start: Option<NaiveDate>) {
        self.start = start;
    }

    /// Replace the end endpoint. An inverted range is allowed.
    pub fn set_end(&mut self, end: Option<NaiveDate>) {
        self.end = end;
    }

    /// The clamped `(start, end)` actually displayed, or `None` when the range
    /// is incomplete or inverted. The stored start is never modified.
    pub fn effective_window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = (self.start?, self.end?);
        if start > end {
            return None;
        }

        let start = if (end - start).num_days() > MAX_SPAN_DAYS {
            end - Duration::days(MAX_SPAN_DAYS)
        } else {
            start
        };
        Some((start, end))
    }

    /// Every calendar day of the effective window in ascending order.
    ///
    /// Empty when either endpoint is absent or `start > end`.
    pub fn day_series(&self) -> Vec<NaiveDate> {
        match self.effective_window() {
            Some((start, end)) => start.iter_days().take_while(|day| *day <= end).collect(),
            None => Vec::new(),
        }
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::ending_today()
    }
}

/// Parse a date endpoint given on the command line.
///
/// Accepts `YYYY-MM-DD`, `today`, a relative offset such as `-30d`, or `none`
/// for an absent endpoint.
pub fn parse_date_arg(raw: &str, today: NaiveDate) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();

    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    if raw.eq_ignore_ascii_case("today") {
        return Ok(Some(today));
    }

    if let Some(days) = raw.strip_prefix('-').and_then(|r| r.strip_suffix('d')) {
        // u32 parsing still takes a leading '+'; only bare digits count
        if !days.starts_with(|c: char| c.is_ascii_digit()) {
            bail!("Invalid relative date: '{}'", raw);
        }
        let days: u32 = days
            .parse()
            .map_err(|_| anyhow!("Invalid relative date: '{}'", raw))?;
        return Duration::try_days(i64::from(days))
            .and_then(|offset| today.checked_sub_signed(offset))
            .map(Some)
            .ok_or_else(|| anyhow!("Relative date out of range: '{}'", raw));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            anyhow!(
                "Invalid date: '{}'. Expected: '2025-03-15', 'today', '-30d', or 'none'",
                raw
            )
        })
}
