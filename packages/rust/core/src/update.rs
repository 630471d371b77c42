//! The update pipeline: fetch, extract, reconcile.
//!
//! One invocation performs one fetch, one extraction pass, and one
//! reconciliation pass. A fetch failure aborts before any reconciliation;
//! each upsert is independently atomic, so a failure mid-batch leaves
//! previously committed records intact.

use chrono::NaiveDateTime;
use conftrack_shared::{Conference, Result, StoredConference};
use conftrack_store::{Storage, UpsertOutcome};
use tracing::{info, instrument};
use url::Url;

/// Summary of a completed update run.
#[derive(Debug)]
pub struct UpdateSummary {
    /// Records extracted from the listings document.
    pub extracted: usize,
    /// Records seen for the first time this run, in extraction order.
    pub inserted: Vec<StoredConference>,
    /// Records that already existed and were overwritten.
    pub updated: usize,
}

/// Fetch the listings page and reconcile its records into the store.
///
/// `run_timestamp` is captured once per invocation by the caller and is
/// shared across the whole batch.
#[instrument(skip_all, fields(url = %listing_url))]
pub async fn update_from_source(
    storage: &Storage,
    listing_url: &Url,
    run_timestamp: NaiveDateTime,
) -> Result<UpdateSummary> {
    let html = conftrack_extract::fetch_listing(listing_url).await?;
    let conferences = conftrack_extract::extract_conferences(&html, run_timestamp)?;
    reconcile(storage, conferences, run_timestamp).await
}

/// Upsert a batch of extracted records, collecting the newly inserted ones.
pub async fn reconcile(
    storage: &Storage,
    conferences: Vec<Conference>,
    run_timestamp: NaiveDateTime,
) -> Result<UpdateSummary> {
    let extracted = conferences.len();
    let mut inserted = Vec::new();
    let mut updated = 0;

    for conference in conferences {
        match storage.upsert_conference(&conference, run_timestamp).await? {
            UpsertOutcome::Inserted => inserted.push(StoredConference {
                conference,
                date_added: run_timestamp,
            }),
            UpsertOutcome::Updated => updated += 1,
        }
    }

    info!(
        extracted,
        inserted = inserted.len(),
        updated,
        "reconciliation complete"
    );

    Ok(UpdateSummary {
        extracted,
        inserted,
        updated,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use conftrack_extract::extract_conferences;

    use super::*;

    async fn test_storage() -> Storage {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let tmp = std::env::temp_dir().join(format!(
            "conftrack_core_test_{}_{nanos}.db",
            std::process::id()
        ));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn run_ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 27)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn fragment(remote_id: i64, title: &str, dates: &str) -> String {
        format!(
            r#"<div class="evnt">
                <div class="sub_title">{title}</div>
                <div class="dates_location"><span class="conflist_value">{dates} • Somewhere</span></div>
                <div>Event listing ID: <span class="conflist_inline">{remote_id}</span></div>
                <div>Event website: <a href="https://example.org/{remote_id}">x</a></div>
            </div>"#
        )
    }

    fn listing(fragments: &[String]) -> String {
        format!(r#"<div class="evnt_list">{}</div>"#, fragments.join("\n"))
    }

    #[tokio::test]
    async fn two_batch_reconciliation_end_to_end() {
        let storage = test_storage().await;

        // First run: two distinct conferences.
        let first = listing(&[
            fragment(100, "First Conference", "01 Mar 2027 - 03 Mar 2027"),
            fragment(200, "Second Conference", "10 Apr 2027"),
        ]);
        let confs = extract_conferences(&first, run_ts()).expect("extract");
        let summary = reconcile(&storage, confs, run_ts()).await.expect("reconcile");
        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.inserted.len(), 2);
        assert_eq!(summary.updated, 0);

        // Second run a day later: one repeat (updated title), one new.
        let later = run_ts() + Duration::days(1);
        let second = listing(&[
            fragment(100, "First Conference, Retitled", "01 Mar 2027 - 03 Mar 2027"),
            fragment(300, "Third Conference", "20 May 2027"),
        ]);
        let confs = extract_conferences(&second, later).expect("extract");
        let summary = reconcile(&storage, confs, later).await.expect("reconcile");
        assert_eq!(summary.inserted.len(), 1);
        assert_eq!(summary.inserted[0].conference.remote_id, 300);
        assert_eq!(summary.updated, 1);

        // Store holds exactly three records; the repeat kept its date_added.
        assert_eq!(storage.count_conferences().await.unwrap(), 3);
        let repeat = storage.get_conference(100).await.unwrap().unwrap();
        assert_eq!(repeat.date_added, run_ts());
        assert_eq!(repeat.conference.title, "First Conference, Retitled");
    }

    #[tokio::test]
    async fn inserted_records_carry_the_run_timestamp() {
        let storage = test_storage().await;
        let html = listing(&[fragment(7, "Lone Conference", "05 Jun 2027")]);
        let confs = extract_conferences(&html, run_ts()).expect("extract");

        let summary = reconcile(&storage, confs, run_ts()).await.expect("reconcile");
        assert_eq!(summary.inserted[0].date_added, run_ts());

        let stored = storage.get_conference(7).await.unwrap().unwrap();
        assert_eq!(stored.date_added, run_ts());
    }

    #[tokio::test]
    async fn update_from_source_against_mock_server() {
        let server = wiremock::MockServer::start().await;
        let html = listing(&[
            fragment(1, "Mock Conference A", "01 Feb 2027"),
            fragment(2, "Mock Conference B", "01 Mar 2027 - 05 Mar 2027"),
        ]);
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/listings.html"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let storage = test_storage().await;
        let url = Url::parse(&format!("{}/listings.html", server.uri())).unwrap();
        let summary = update_from_source(&storage, &url, run_ts())
            .await
            .expect("update");

        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.inserted.len(), 2);
        assert_eq!(storage.count_conferences().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_reconciles_nothing() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let storage = test_storage().await;
        let url = Url::parse(&server.uri()).unwrap();
        assert!(update_from_source(&storage, &url, run_ts()).await.is_err());
        assert_eq!(storage.count_conferences().await.unwrap(), 0);
    }
}
