//! SQL migration definitions for the conference database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as a batch. Schema
//! evolution is append-only: new fields arrive as new columns in later
//! migrations, existing columns are never redefined.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: conferences keyed by remote_id",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per upstream conference. remote_id is the reconciliation key;
-- datetimes are TEXT in %Y-%m-%dT%H:%M:%S so range predicates compare
-- lexicographically.
CREATE TABLE IF NOT EXISTS conferences (
    remote_id  INTEGER PRIMARY KEY,
    title      TEXT NOT NULL,
    abstract   TEXT NOT NULL,
    location   TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date   TEXT NOT NULL,
    url        TEXT NOT NULL,
    date_added TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conferences_start ON conferences(start_date);
CREATE INDEX IF NOT EXISTS idx_conferences_end ON conferences(end_date);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
