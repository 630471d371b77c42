//! libSQL-backed reconciliation store for conference records.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one row per
//! upstream `remote_id`. Reconciliation is insert-or-update: the first
//! sighting of a `remote_id` records `date_added` from the run timestamp;
//! later sightings overwrite every other field and leave `date_added`
//! untouched. Rows are never deleted.
//!
//! Each write is a single SQL statement, so an upsert that fails cannot
//! leave a duplicate or half-written row behind, and a failure mid-batch
//! leaves previously committed rows intact.

mod migrations;

use std::path::Path;

use chrono::NaiveDateTime;
use conftrack_shared::{Conference, ConftrackError, Result, StoredConference, encode_datetime};
use libsql::{Connection, Database, params};

/// Outcome of a reconciliation upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First sighting of this `remote_id`; `date_added` was assigned.
    Inserted,
    /// Existing record; all fields except `date_added` were overwritten.
    Updated,
}

/// Primary storage handle wrapping a libSQL database.
///
/// Opening is cheap and sequential reopen within one process is supported;
/// the update and read paths each open their own handle.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`, applying pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConftrackError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ConftrackError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| ConftrackError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    ConftrackError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Insert-or-update a conference keyed by `remote_id`.
    ///
    /// `run_timestamp` is the single per-invocation timestamp; it becomes
    /// `date_added` only when the record is first inserted.
    pub async fn upsert_conference(
        &self,
        conf: &Conference,
        run_timestamp: NaiveDateTime,
    ) -> Result<UpsertOutcome> {
        let existing = self.get_conference(conf.remote_id).await?;

        if existing.is_none() {
            self.conn
                .execute(
                    "INSERT INTO conferences
                       (remote_id, title, abstract, location, start_date, end_date, url, date_added)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        conf.remote_id,
                        conf.title.as_str(),
                        conf.abstract_text.as_str(),
                        conf.location.as_str(),
                        encode_datetime(conf.start),
                        encode_datetime(conf.end),
                        conf.url.as_str(),
                        encode_datetime(run_timestamp),
                    ],
                )
                .await
                .map_err(|e| ConftrackError::Storage(e.to_string()))?;
            tracing::debug!(remote_id = conf.remote_id, "inserted conference");
            return Ok(UpsertOutcome::Inserted);
        }

        // date_added deliberately absent from the SET list
        self.conn
            .execute(
                "UPDATE conferences
                 SET title = ?1, abstract = ?2, location = ?3,
                     start_date = ?4, end_date = ?5, url = ?6
                 WHERE remote_id = ?7",
                params![
                    conf.title.as_str(),
                    conf.abstract_text.as_str(),
                    conf.location.as_str(),
                    encode_datetime(conf.start),
                    encode_datetime(conf.end),
                    conf.url.as_str(),
                    conf.remote_id,
                ],
            )
            .await
            .map_err(|e| ConftrackError::Storage(e.to_string()))?;
        tracing::debug!(remote_id = conf.remote_id, "updated conference");
        Ok(UpsertOutcome::Updated)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get a single conference by its upstream identifier.
    pub async fn get_conference(&self, remote_id: i64) -> Result<Option<StoredConference>> {
        let mut rows = self
            .conn
            .query(
                "SELECT remote_id, title, abstract, location, start_date, end_date, url, date_added
                 FROM conferences WHERE remote_id = ?1",
                params![remote_id],
            )
            .await
            .map_err(|e| ConftrackError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_stored(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(ConftrackError::Storage(e.to_string())),
        }
    }

    /// Search conferences overlapping the inclusive `[start, end]` window.
    ///
    /// A record matches iff (`start` absent OR `record.end >= start`) AND
    /// (`end` absent OR `record.start <= end`) — interval overlap, not point
    /// containment. Results come back in `start_date` order; the query
    /// engine re-sorts by nearness.
    pub async fn search_conferences(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<StoredConference>> {
        let start_bound = start.map(encode_datetime);
        let end_bound = end.map(encode_datetime);

        let mut rows = self
            .conn
            .query(
                "SELECT remote_id, title, abstract, location, start_date, end_date, url, date_added
                 FROM conferences
                 WHERE (?1 IS NULL OR end_date >= ?1)
                   AND (?2 IS NULL OR start_date <= ?2)
                 ORDER BY start_date",
                params![start_bound, end_bound],
            )
            .await
            .map_err(|e| ConftrackError::Storage(e.to_string()))?;

        // A failure while streaming rows is fatal; returning the rows read
        // so far would present a silently incomplete listing.
        let mut results = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => results.push(row_to_stored(&row)?),
                Ok(None) => break,
                Err(e) => return Err(ConftrackError::Storage(e.to_string())),
            }
        }
        Ok(results)
    }

    /// Total number of stored conferences.
    pub async fn count_conferences(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM conferences", params![])
            .await
            .map_err(|e| ConftrackError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n as u64)
                .map_err(|e| ConftrackError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(ConftrackError::Storage(e.to_string())),
        }
    }
}

/// Convert a database row to a [`StoredConference`].
fn row_to_stored(row: &libsql::Row) -> Result<StoredConference> {
    let get_text = |idx: i32| -> Result<String> {
        row.get::<String>(idx)
            .map_err(|e| ConftrackError::Storage(e.to_string()))
    };

    Ok(StoredConference {
        conference: Conference {
            remote_id: row
                .get::<i64>(0)
                .map_err(|e| ConftrackError::Storage(e.to_string()))?,
            title: get_text(1)?,
            abstract_text: get_text(2)?,
            location: get_text(3)?,
            start: conftrack_shared::decode_datetime(&get_text(4)?)?,
            end: conftrack_shared::decode_datetime(&get_text(5)?)?,
            url: get_text(6)?,
        },
        date_added: conftrack_shared::decode_datetime(&get_text(7)?)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::*;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let tmp = std::env::temp_dir().join(format!(
            "conftrack_test_{}_{nanos}.db",
            std::process::id()
        ));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample(remote_id: i64) -> Conference {
        Conference {
            remote_id,
            title: format!("Conference {remote_id}"),
            abstract_text: "On gravitation.".into(),
            location: "Potsdam, Germany".into(),
            start: dt(2026, 6, 1),
            end: dt(2026, 6, 5),
            url: format!("https://example.org/{remote_id}"),
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        assert_eq!(storage.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn sequential_reopen() {
        let tmp = std::env::temp_dir().join(format!(
            "conftrack_reopen_{}.db",
            std::process::id()
        ));
        let run_ts = dt(2026, 8, 27);

        let first = Storage::open(&tmp).await.expect("first open");
        first
            .upsert_conference(&sample(1), run_ts)
            .await
            .expect("upsert");
        drop(first);

        // Same file, fresh handle — the update/read paths do exactly this.
        let second = Storage::open(&tmp).await.expect("second open");
        assert_eq!(second.get_schema_version().await, 1);
        assert_eq!(second.count_conferences().await.unwrap(), 1);

        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn upsert_inserts_then_updates() {
        let storage = test_storage().await;
        let run_ts = dt(2026, 8, 27);

        let outcome = storage.upsert_conference(&sample(7), run_ts).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let mut changed = sample(7);
        changed.title = "Renamed Conference".into();
        changed.location = "Online".into();
        let outcome = storage
            .upsert_conference(&changed, run_ts + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let stored = storage.get_conference(7).await.unwrap().expect("stored");
        assert_eq!(stored.conference.title, "Renamed Conference");
        assert_eq!(stored.conference.location, "Online");
        // date_added keeps the first run's timestamp
        assert_eq!(stored.date_added, run_ts);
    }

    #[tokio::test]
    async fn idempotent_reupsert_keeps_one_record() {
        let storage = test_storage().await;
        let run_ts = dt(2026, 8, 27);
        let conf = sample(42);

        storage.upsert_conference(&conf, run_ts).await.unwrap();
        let first = storage.get_conference(42).await.unwrap().unwrap();

        storage.upsert_conference(&conf, run_ts).await.unwrap();
        let second = storage.get_conference(42).await.unwrap().unwrap();

        assert_eq!(storage.count_conferences().await.unwrap(), 1);
        assert_eq!(first.date_added, second.date_added);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn one_record_per_remote_id() {
        let storage = test_storage().await;
        let run_ts = dt(2026, 8, 27);

        for id in [1, 2, 1, 3, 2, 1] {
            storage.upsert_conference(&sample(id), run_ts).await.unwrap();
        }
        assert_eq!(storage.count_conferences().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn search_surfaces_row_errors_instead_of_truncating() {
        let storage = test_storage().await;
        let run_ts = dt(2026, 8, 27);

        storage.upsert_conference(&sample(1), run_ts).await.unwrap();

        // Damage a row behind the store's back; the search must fail loudly
        // rather than return whatever decoded cleanly before the damage.
        storage
            .conn
            .execute(
                "INSERT INTO conferences
                   (remote_id, title, abstract, location, start_date, end_date, url, date_added)
                 VALUES (2, 'Damaged', '', 'Nowhere', 'garbage', 'garbage', 'u', 'garbage')",
                params![],
            )
            .await
            .unwrap();

        let err = storage
            .search_conferences(None, None)
            .await
            .expect_err("damaged row must be a storage error");
        assert!(matches!(err, ConftrackError::Storage(_)));
    }

    #[tokio::test]
    async fn range_overlap_semantics() {
        let storage = test_storage().await;
        let run_ts = dt(2024, 2, 1);

        let mut conf = sample(9);
        conf.start = dt(2024, 3, 1);
        conf.end = dt(2024, 3, 3);
        storage.upsert_conference(&conf, run_ts).await.unwrap();

        // Lower bound inside the interval: overlap, included.
        let hits = storage
            .search_conferences(Some(dt(2024, 3, 2)), None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // Upper bound before the interval starts: excluded.
        let hits = storage
            .search_conferences(None, Some(dt(2024, 2, 28)))
            .await
            .unwrap();
        assert!(hits.is_empty());

        // Inclusive bounds: a bound exactly on an endpoint still matches.
        let hits = storage
            .search_conferences(Some(dt(2024, 3, 3)), Some(dt(2024, 3, 1)))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        // No bounds: everything.
        let hits = storage.search_conferences(None, None).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
