//! The query engine: range filtering and nearness ordering.

use chrono::NaiveDateTime;
use conftrack_shared::{Result, StoredConference};
use conftrack_store::Storage;
use tracing::{debug, instrument};

/// Query stored conferences overlapping the inclusive `[start, end]` window.
///
/// Results are ordered by nearness: ascending `|now - record.start|`, so a
/// record starting exactly at `now` sorts first and records one day in the
/// past and one day in the future tie. Ties break on ascending `remote_id`,
/// which keeps the ordering deterministic across runs.
#[instrument(skip(storage))]
pub async fn query(
    storage: &Storage,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Result<Vec<StoredConference>> {
    let mut records = storage.search_conferences(start, end).await?;

    records.sort_by_key(|record| {
        (
            (now - record.conference.start).num_seconds().abs(),
            record.conference.remote_id,
        )
    });

    debug!(matched = records.len(), "query complete");
    Ok(records)
}
