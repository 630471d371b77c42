//! Line-oriented presentation of conference records.
//!
//! Two presentation modes share the same line shape and recency flag:
//! - [`render_by_year`] — a query result set (already in nearness order),
//!   with a year header whenever the start year changes.
//! - [`render_new_additions`] — an update's record set, no year grouping,
//!   new records collected under a trailing `NEW ADDITIONS:` section.
//!
//! All functions are pure over their inputs; the run timestamp is passed in
//! explicitly so one invocation sees one consistent "now".

use chrono::{Datelike, Duration, NaiveDateTime};
use conftrack_shared::StoredConference;

/// Default maximum display width for titles.
pub const DEFAULT_TITLE_WIDTH: usize = 40;

/// Default recency window: records added within the last day are "new".
pub const DEFAULT_RECENCY_HOURS: i64 = 24;

/// Inner width of the boxed banner.
const BANNER_INNER_WIDTH: usize = 56;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Presentation knobs, normally taken from the `[display]` config section.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Maximum title width before truncation.
    pub title_width: usize,
    /// Records with `date_added` within this window are flagged as new.
    pub recency_window: Duration,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title_width: DEFAULT_TITLE_WIDTH,
            recency_window: Duration::hours(DEFAULT_RECENCY_HOURS),
        }
    }
}

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

/// Truncate `s` to at most `maxlen` display characters, cutting at the last
/// whitespace boundary and appending an ellipsis. Titles already under the
/// limit pass through unchanged (trimmed).
pub fn cut_long_str(s: &str, maxlen: usize) -> String {
    let s = s.trim();
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < maxlen {
        return s.to_string();
    }

    // Cut at the last whitespace at or before maxlen - 2, leaving room for
    // the ellipsis glyph.
    let window = maxlen.saturating_sub(1).min(chars.len());
    match chars[..window].iter().rposition(|c| c.is_whitespace()) {
        Some(cut) => {
            let prefix: String = chars[..cut].iter().collect();
            format!("{}…", prefix.trim_end())
        }
        None => {
            let prefix: String = chars[..window].iter().collect();
            format!("{prefix}…")
        }
    }
}

/// Whether a record counts as newly added relative to the run timestamp.
pub fn is_recent(record: &StoredConference, now: NaiveDateTime, window: Duration) -> bool {
    now - record.date_added < window
}

/// Render one record line:
/// `<marker><truncated title padded> : <d/m> – <d/m/Y> @ <location>`.
pub fn format_line(record: &StoredConference, now: NaiveDateTime, opts: &RenderOptions) -> String {
    let marker = if is_recent(record, now, opts.recency_window) {
        "* "
    } else {
        "  "
    };
    let title = cut_long_str(&record.conference.title, opts.title_width);
    format!(
        "{marker}{title:<width$} : {start} – {end} @ {location}",
        width = opts.title_width,
        start = record.conference.start.format("%d/%m"),
        end = record.conference.end.format("%d/%m/%Y"),
        location = record.conference.location,
    )
}

/// Render a centered banner in a box of fixed width.
pub fn boxed_header(text: &str) -> Vec<String> {
    let len = text.chars().count();
    let inner = len.max(BANNER_INNER_WIDTH);
    let left = (inner - len) / 2;
    let right = inner - len - left;
    vec![
        format!("╔{}╗", "═".repeat(inner)),
        format!("║{}{text}{}║", " ".repeat(left), " ".repeat(right)),
        format!("╚{}╝", "═".repeat(inner)),
    ]
}

// ---------------------------------------------------------------------------
// Presentation modes
// ---------------------------------------------------------------------------

/// Render a query result set, emitting a year header whenever the start
/// year changes from the previously emitted record.
///
/// The input order (nearness) is preserved; grouping is a fold carrying the
/// previous year explicitly.
pub fn render_by_year(
    records: &[StoredConference],
    now: NaiveDateTime,
    opts: &RenderOptions,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut previous_year: Option<i32> = None;

    for record in records {
        let year = record.conference.start.year();
        if previous_year != Some(year) {
            lines.push(format!("---- {year} ----"));
            previous_year = Some(year);
        }
        lines.push(format_line(record, now, opts));
    }

    lines
}

/// Render an update's record set: non-new records first, then every new
/// record under a trailing `NEW ADDITIONS:` section. No year grouping.
pub fn render_new_additions(
    records: &[StoredConference],
    now: NaiveDateTime,
    opts: &RenderOptions,
) -> Vec<String> {
    let mut lines = Vec::new();

    for record in records {
        if !is_recent(record, now, opts.recency_window) {
            lines.push(format_line(record, now, opts));
        }
    }

    lines.push(String::new());
    lines.push("NEW ADDITIONS:".to_string());

    for record in records {
        if is_recent(record, now, opts.recency_window) {
            lines.push(format_line(record, now, opts));
        }
    }

    lines
}
