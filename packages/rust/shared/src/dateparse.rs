//! Date-phrase resolution.
//!
//! Resolves free-form date phrases — CLI range bounds and the date text on
//! the listings page — into calendar instants. A phrase that no rule
//! recognizes is a hard [`ConftrackError::DatePhrase`] error; callers decide
//! what a failed resolution means for their batch.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{ConftrackError, Result};

/// Date-only formats tried in order. Day-first before month-first, matching
/// the upstream listing style (`13 Jul 2026`).
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Datetime formats tried before the date-only ones.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Resolve a date phrase into an instant.
///
/// `now` anchors the relative keywords (`now`, `today`, `tomorrow`,
/// `yesterday`); absolute dates resolve to midnight.
pub fn resolve_date_phrase(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let phrase = text.trim();
    if phrase.is_empty() {
        return Err(ConftrackError::date_phrase(text));
    }

    match phrase.to_lowercase().as_str() {
        "now" => return Ok(now),
        "today" => return Ok(midnight(now.date())),
        "tomorrow" => return Ok(midnight(now.date() + Duration::days(1))),
        "yesterday" => return Ok(midnight(now.date() - Duration::days(1))),
        _ => {}
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(phrase, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(phrase, format) {
            return Ok(midnight(date));
        }
    }

    Err(ConftrackError::date_phrase(phrase))
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
