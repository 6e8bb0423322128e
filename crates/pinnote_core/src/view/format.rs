//! Note card date labels.
//!
//! # Invariants
//! - Labels are computed in UTC from the store's timestamp token.
//! - A note without a resolved timestamp reads as "Just now".

use crate::model::note::{Note, Timestamp};
use chrono::{DateTime, Datelike, Utc};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Relative label for a note timestamp as seen at `now`.
///
/// - within a day: `Today`
/// - within two days: `Yesterday`
/// - within a week: `N days ago`
/// - older: `Mar 7`, with `, 2025` appended when the year differs from `now`
pub fn relative_date(timestamp: Option<Timestamp>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return "Just now".to_string();
    };
    let Some(date) = DateTime::<Utc>::from_timestamp_millis(timestamp.as_millis()) else {
        return "Just now".to_string();
    };

    let diff_millis = (now - date).num_milliseconds().abs();
    // Whole days, rounded up.
    let diff_days = (diff_millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    match diff_days {
        0 | 1 => "Today".to_string(),
        2 => "Yesterday".to_string(),
        3..=7 => format!("{} days ago", diff_days - 1),
        _ if date.year() != now.year() => date.format("%b %-d, %Y").to_string(),
        _ => date.format("%b %-d").to_string(),
    }
}

/// Footer lines of a note card.
///
/// The "Updated" line only appears once the note was edited after creation.
pub fn footer_lines(note: &Note, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!(
        "Created: {}",
        relative_date(Some(note.created_at), now)
    )];
    if note.updated_at != note.created_at {
        lines.push(format!(
            "Updated: {}",
            relative_date(Some(note.updated_at), now)
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::relative_date;
    use crate::model::note::Timestamp;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn ts(date: DateTime<Utc>) -> Option<Timestamp> {
        Some(Timestamp::from_millis(date.timestamp_millis()))
    }

    #[test]
    fn missing_timestamp_reads_just_now() {
        assert_eq!(relative_date(None, at(2026, 5, 10, 12)), "Just now");
    }

    #[test]
    fn recent_days_use_relative_words() {
        let now = at(2026, 5, 10, 12);
        assert_eq!(relative_date(ts(at(2026, 5, 10, 12)), now), "Today");
        assert_eq!(relative_date(ts(at(2026, 5, 10, 1)), now), "Today");
        assert_eq!(relative_date(ts(at(2026, 5, 9, 1)), now), "Yesterday");
        assert_eq!(relative_date(ts(at(2026, 5, 5, 12)), now), "4 days ago");
    }

    #[test]
    fn older_dates_are_absolute() {
        let now = at(2026, 5, 10, 12);
        assert_eq!(relative_date(ts(at(2026, 3, 7, 9)), now), "Mar 7");
        assert_eq!(relative_date(ts(at(2025, 12, 24, 9)), now), "Dec 24, 2025");
    }
}
