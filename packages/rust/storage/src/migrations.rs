//! SQL migration definitions for the PolicyTracker database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed as a batch.

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
        description: "Initial schema: bills keyed by (congress, number, bill_type)",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Enriched bill records. The natural key carries the uniqueness
-- constraint the upsert relies on; `id` is the storage-assigned identity.
CREATE TABLE IF NOT EXISTS bills (
    id                     TEXT PRIMARY KEY,
    congress               INTEGER NOT NULL,
    number                 TEXT NOT NULL,
    bill_type              TEXT NOT NULL,
    title                  TEXT NOT NULL,
    latest_action          TEXT,
    last_updated           TEXT NOT NULL,
    tags_json              TEXT NOT NULL,
    easy_summary           TEXT,
    effectiveness_analysis TEXT,
    created_at             TEXT NOT NULL,
    UNIQUE(congress, number, bill_type)
);

CREATE INDEX IF NOT EXISTS idx_bills_last_updated ON bills(last_updated);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
