// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Display formatting for times, durations and dates.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour on
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Format a feed duration for display
///
/// Values already containing `:` are returned unchanged; anything else is
/// read as a number of seconds, using its leading digits.
pub fn format_duration(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains(':') {
        return raw.to_string();
    }

    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u64>() {
        Ok(seconds) => format_time(seconds as f64),
        Err(_) => format_time(f64::NAN),
    }
}

/// Format a publication date as `Jan 5, 2024`
///
/// Unparsable dates are returned as found in the feed.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();

    if let Some(date) = parse_feed_date(raw) {
        return date.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }

    raw.to_string()
}

/// Parse the date formats seen in podcast feeds
pub fn parse_feed_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }

    let formats = [
        "%a, %d %b %Y %H:%M:%S %z",
        "%d %b %Y %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S %z",
    ];
    formats
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
}

/// `1 episode`, `12 episodes`
pub fn episode_count_label(count: usize) -> String {
    if count == 1 {
        "1 episode".to_string()
    } else {
        format!("{count} episodes")
    }
}

/// `1x`, `1.5x`
pub fn speed_label(speed: f64) -> String {
    format!("{speed}x")
}
