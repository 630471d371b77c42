//! Extraction of conference records from the listings document.
//!
//! One `div.evnt` fragment yields one [`Conference`]. A fragment missing a
//! required field is skipped with a warning and the batch continues; only a
//! document without the `div.evnt_list` container fails extraction outright.

use chrono::NaiveDateTime;
use conftrack_shared::{Conference, ConftrackError, Result, resolve_date_phrase};
use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};

use crate::labels::{Fragment, LabelLookup};

/// Glyph separating the date-range phrase from the location phrase.
const TIMELOC_SEPARATOR: char = '•';

/// Separator between the start and end phrases of a date range.
const RANGE_SEPARATOR: &str = " - ";

/// Extract all conference records from a listings document, in document order.
///
/// `now` anchors relative date phrases during resolution.
#[instrument(skip_all, fields(bytes = html.len()))]
pub fn extract_conferences(html: &str, now: NaiveDateTime) -> Result<Vec<Conference>> {
    let doc = Html::parse_document(html);

    let list_sel = Selector::parse("div.evnt_list").unwrap();
    let evnt_sel = Selector::parse("div.evnt").unwrap();

    let list = doc
        .select(&list_sel)
        .next()
        .ok_or_else(|| ConftrackError::parse("event list container (div.evnt_list) not found"))?;

    let mut conferences = Vec::new();
    for (index, evnt) in list.select(&evnt_sel).enumerate() {
        match extract_fragment(&Fragment::new(evnt), now) {
            Ok(conf) => {
                debug!(remote_id = conf.remote_id, title = %conf.title, "extracted conference");
                conferences.push(conf);
            }
            Err(e) => {
                warn!(fragment = index, error = %e, "skipping malformed event fragment");
            }
        }
    }

    Ok(conferences)
}

/// Extract one conference from a single event fragment.
fn extract_fragment(fragment: &Fragment<'_>, now: NaiveDateTime) -> Result<Conference> {
    let title = fragment
        .select_text(".sub_title")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConftrackError::parse("fragment has no subtitle"))?;

    let timeloc = fragment
        .select_text(".dates_location .conflist_value")
        .ok_or_else(|| ConftrackError::parse("fragment has no dates/location value"))?;

    let (time_phrase, location_raw) = timeloc
        .split_once(TIMELOC_SEPARATOR)
        .ok_or_else(|| ConftrackError::parse(format!("no '{TIMELOC_SEPARATOR}' in {timeloc:?}")))?;

    // Collapse embedded line breaks and whitespace runs in the location.
    let location = location_raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let time_phrase = time_phrase.trim();
    let (start_phrase, end_phrase) = match time_phrase.split_once(RANGE_SEPARATOR) {
        Some((s, e)) => (s, e),
        None => (time_phrase, time_phrase),
    };
    let start = resolve_date_phrase(start_phrase, now)?;
    let end = resolve_date_phrase(end_phrase, now)?;

    let abstract_text = fragment.labeled_value("Abstract:").unwrap_or_default();

    let remote_id_text = fragment
        .labeled_inline("Event listing ID:")
        .ok_or_else(|| ConftrackError::parse("fragment has no event listing ID"))?;
    let remote_id: i64 = remote_id_text
        .parse()
        .map_err(|_| ConftrackError::parse(format!("non-numeric listing ID {remote_id_text:?}")))?;

    let url = fragment
        .labeled_link("Event website:")
        .ok_or_else(|| ConftrackError::parse("fragment has no event website link"))?;

    Ok(Conference {
        remote_id,
        title,
        abstract_text,
        location,
        start,
        end,
        url,
    })
}
