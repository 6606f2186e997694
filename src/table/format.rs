//! Cell formatting helpers shared by the row converters

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Maximum width of a structured value rendered into a single cell
pub const MAX_CELL_WIDTH: usize = 60;

/// Placeholder for a missing optional cell
pub const NONE: &str = "<none>";

/// Format a duration the way `kubectl` does for AGE columns
///
/// Precision drops as the duration grows: `90s`, `5m30s`, `45m`, `3h20m`,
/// `20h`, `3d4h`, `45d`, `2y30d`, `9y`.
pub fn human_duration(duration: chrono::Duration) -> String {
    let seconds = duration.num_seconds();
    if seconds < -1 {
        return "<invalid>".to_string();
    } else if seconds < 0 {
        return "0s".to_string();
    } else if seconds < 60 * 2 {
        return format!("{}s", seconds);
    }

    let minutes = duration.num_minutes();
    if minutes < 10 {
        let s = seconds % 60;
        if s == 0 {
            return format!("{}m", minutes);
        }
        return format!("{}m{}s", minutes, s);
    } else if minutes < 60 * 3 {
        return format!("{}m", minutes);
    }

    let hours = duration.num_hours();
    if hours < 8 {
        let m = minutes % 60;
        if m == 0 {
            return format!("{}h", hours);
        }
        format!("{}h{}m", hours, m)
    } else if hours < 48 {
        format!("{}h", hours)
    } else if hours < 24 * 8 {
        let h = hours % 24;
        if h == 0 {
            return format!("{}d", hours / 24);
        }
        format!("{}d{}h", hours / 24, h)
    } else if hours < 24 * 365 * 2 {
        format!("{}d", hours / 24)
    } else if hours < 24 * 365 * 8 {
        let days = (hours / 24) % 365;
        if days == 0 {
            return format!("{}y", hours / 24 / 365);
        }
        format!("{}y{}d", hours / 24 / 365, days)
    } else {
        format!("{}y", hours / 24 / 365)
    }
}

/// Parse an RFC 3339 timestamp field
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Human age of a timestamp relative to `now`, `<unknown>` when absent
pub fn age_since(timestamp: Option<&Value>, now: DateTime<Utc>) -> String {
    match parse_timestamp(timestamp) {
        Some(ts) => human_duration(now.signed_duration_since(ts)),
        None => "<unknown>".to_string(),
    }
}

/// AGE cell for an object, read from `metadata.creationTimestamp`
pub fn object_age(object: &Value, now: DateTime<Utc>) -> String {
    age_since(
        object.get("metadata").and_then(|m| m.get("creationTimestamp")),
        now,
    )
}

/// Truncate a value to `max` characters, appending `...` when cut
pub fn truncate_value(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let truncated: String = value.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

/// Join values with commas, `<none>` when empty
pub fn join_or_none<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        NONE.to_string()
    } else {
        joined
    }
}

/// Render a selector map as `k=v,k2=v2`, `<none>` when empty
pub fn format_label_map<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    join_or_none(labels.into_iter().map(|(k, v)| format!("{}={}", k, v)))
}
