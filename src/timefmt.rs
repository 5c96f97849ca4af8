use chrono::{TimeZone, Utc};

/// Format a unix-seconds timestamp as ISO-8601 UTC, or return a placeholder on error.
pub fn format_timestamp(ts_secs: i64) -> String {
    match Utc.timestamp_opt(ts_secs, 0) {
        chrono::LocalResult::Single(datetime) => {
            datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
        }
        _ => "invalid timestamp".to_string(),
    }
}

/// Format an optional unix-seconds timestamp, using '-' when missing.
pub fn format_timestamp_opt(ts: Option<i64>) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}
