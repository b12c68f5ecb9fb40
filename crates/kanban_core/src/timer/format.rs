//! Duration and timestamp rendering.
//!
//! # Invariants
//! - Negative durations render as zero.
//! - A longer duration never renders as a shorter one.

use chrono::{Local, TimeZone};
use std::fmt::Display;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

const TIMESTAMP_FORMAT: &str = "%A, %b %-d, %Y at %-I:%M %p";

/// Renders a running duration as `H:MM:SS` (one hour or more) or `MM:SS`.
pub fn format_elapsed_time(elapsed_ms: i64) -> String {
    let total_seconds = elapsed_ms.max(0) / SECOND_MS;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Renders a frozen duration in a compact unit pair.
///
/// `under a minute`, `3m 12s`, `2h 5m`, `1d 4h`.
pub fn format_completed_time(time_spent_ms: i64) -> String {
    let ms = time_spent_ms.max(0);
    if ms < MINUTE_MS {
        return "under a minute".to_string();
    }
    if ms < HOUR_MS {
        return format!("{}m {}s", ms / MINUTE_MS, (ms % MINUTE_MS) / SECOND_MS);
    }
    if ms < DAY_MS {
        return format!("{}h {}m", ms / HOUR_MS, (ms % HOUR_MS) / MINUTE_MS);
    }
    format!("{}d {}h", ms / DAY_MS, (ms % DAY_MS) / HOUR_MS)
}

/// Renders epoch milliseconds in local time, e.g.
/// `Monday, Dec 1, 2025 at 2:30 PM`.
pub fn format_timestamp(epoch_ms: i64) -> String {
    format_timestamp_in(epoch_ms, &Local)
}

/// Same as [`format_timestamp`] for an explicit timezone.
pub fn format_timestamp_in<Tz>(epoch_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(epoch_ms).single() {
        Some(moment) => moment.format(TIMESTAMP_FORMAT).to_string(),
        None => format!("{epoch_ms} ms"),
    }
}
