//! libSQL storage layer for enriched bill records.
//!
//! The [`Storage`] struct wraps a local libSQL database holding one
//! document per bill, matched on the natural key `(congress, number,
//! bill_type)`. It serves two roles for the pipeline:
//!
//! - enrichment lookup: [`Storage::find_bill`] is the point read that
//!   decides which generated fields still need computing. A failed read
//!   is a [`PolicyTrackerError::Storage`] — never `Ok(None)` — so an
//!   outage aborts the run instead of silently re-paying for generation.
//! - idempotent upsert: [`Storage::upsert_bill`] replaces every
//!   normalized field while preserving the storage-assigned `id`.

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};

use policytracker_shared::{BillKey, EnrichedBill, PolicyTrackerError, Result, Tag};

/// Primary storage handle wrapping a libSQL database.
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
            std::fs::create_dir_all(parent).map_err(|e| PolicyTrackerError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;

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
                    PolicyTrackerError::Storage(format!(
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
    // Bill operations
    // -----------------------------------------------------------------------

    /// Point read by natural key.
    ///
    /// `Ok(None)` means the bill was genuinely never stored; storage
    /// trouble surfaces as `Err` so the caller can abort the run.
    pub async fn find_bill(&self, key: &BillKey) -> Result<Option<EnrichedBill>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, congress, number, bill_type, title, latest_action, last_updated,
                        tags_json, easy_summary, effectiveness_analysis, created_at
                 FROM bills WHERE congress = ?1 AND number = ?2 AND bill_type = ?3",
                params![key.congress as i64, key.number.as_str(), key.bill_type.as_str()],
            )
            .await
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_bill(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(PolicyTrackerError::Storage(e.to_string())),
        }
    }

    /// Upsert a bill record matched on its natural key.
    ///
    /// Every normalized field is replaced; `id` and `created_at` survive
    /// from the first insert so the storage identity stays stable.
    pub async fn upsert_bill(&self, bill: &EnrichedBill) -> Result<()> {
        let tags_json = serde_json::to_string(&bill.tags)
            .map_err(|e| PolicyTrackerError::Storage(format!("tags serialization: {e}")))?;

        self.conn
            .execute(
                "INSERT INTO bills (id, congress, number, bill_type, title, latest_action,
                                    last_updated, tags_json, easy_summary, effectiveness_analysis,
                                    created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(congress, number, bill_type) DO UPDATE SET
                   title = excluded.title,
                   latest_action = excluded.latest_action,
                   last_updated = excluded.last_updated,
                   tags_json = excluded.tags_json,
                   easy_summary = excluded.easy_summary,
                   effectiveness_analysis = excluded.effectiveness_analysis",
                params![
                    bill.id.as_str(),
                    bill.congress as i64,
                    bill.number.as_str(),
                    bill.bill_type.as_str(),
                    bill.title.as_str(),
                    bill.latest_action.as_deref(),
                    bill.last_updated.to_rfc3339(),
                    tags_json.as_str(),
                    bill.easy_summary.as_deref(),
                    bill.effectiveness_analysis.as_deref(),
                    bill.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;
        Ok(())
    }

    /// List all stored bills, most recently updated first.
    pub async fn list_bills(&self) -> Result<Vec<EnrichedBill>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, congress, number, bill_type, title, latest_action, last_updated,
                        tags_json, easy_summary, effectiveness_analysis, created_at
                 FROM bills ORDER BY last_updated DESC",
                params![],
            )
            .await
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_bill(&row)?);
        }
        Ok(results)
    }

    /// Get one bill by its storage-assigned identity.
    pub async fn get_bill(&self, id: &str) -> Result<Option<EnrichedBill>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, congress, number, bill_type, title, latest_action, last_updated,
                        tags_json, easy_summary, effectiveness_analysis, created_at
                 FROM bills WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_bill(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(PolicyTrackerError::Storage(e.to_string())),
        }
    }

    /// Count stored bills.
    pub async fn count_bills(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM bills", params![])
            .await
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n as u64)
                .map_err(|e| PolicyTrackerError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(PolicyTrackerError::Storage(e.to_string())),
        }
    }
}

/// Convert a database row into an [`EnrichedBill`].
fn row_to_bill(row: &libsql::Row) -> Result<EnrichedBill> {
    let tags_json: String = row
        .get(7)
        .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;
    let tags: Vec<Tag> = serde_json::from_str(&tags_json)
        .map_err(|e| PolicyTrackerError::Storage(format!("invalid tags_json: {e}")))?;

    Ok(EnrichedBill {
        id: row
            .get::<String>(0)
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?,
        congress: row
            .get::<u32>(1)
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?,
        number: row
            .get::<String>(2)
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?,
        bill_type: row
            .get::<String>(3)
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?,
        title: row
            .get::<String>(4)
            .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?,
        latest_action: row.get::<String>(5).ok(),
        last_updated: parse_timestamp(row, 6)?,
        tags,
        easy_summary: row.get::<String>(8).ok(),
        effectiveness_analysis: row.get::<String>(9).ok(),
        created_at: parse_timestamp(row, 10)?,
    })
}

fn parse_timestamp(row: &libsql::Row, idx: i32) -> Result<DateTime<Utc>> {
    let s: String = row
        .get(idx)
        .map_err(|e| PolicyTrackerError::Storage(e.to_string()))?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PolicyTrackerError::Storage(format!("invalid timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> (Storage, std::path::PathBuf) {
        let tmp = std::env::temp_dir().join(format!("pt_test_{}.db", Uuid::now_v7()));
        let storage = Storage::open(&tmp).await.expect("open test db");
        (storage, tmp)
    }

    fn sample_bill(number: &str, title: &str) -> EnrichedBill {
        EnrichedBill {
            id: EnrichedBill::new_id(),
            congress: 118,
            number: number.into(),
            bill_type: "HR".into(),
            title: title.into(),
            latest_action: Some("Referred to committee.".into()),
            last_updated: Utc.with_ymd_and_hms(2024, 4, 16, 0, 0, 0).unwrap(),
            tags: vec![Tag::Finance, Tag::Health],
            easy_summary: Some("A summary.".into()),
            effectiveness_analysis: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn find_bill_absent_is_none() {
        let (storage, tmp) = test_storage().await;
        let key = BillKey {
            congress: 118,
            number: "1".into(),
            bill_type: "HR".into(),
        };
        assert!(storage.find_bill(&key).await.unwrap().is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn upsert_and_find_roundtrip() {
        let (storage, tmp) = test_storage().await;
        let bill = sample_bill("42", "Tax Relief Act");
        storage.upsert_bill(&bill).await.unwrap();

        let found = storage.find_bill(&bill.key()).await.unwrap().unwrap();
        assert_eq!(found.id, bill.id);
        assert_eq!(found.title, "Tax Relief Act");
        assert_eq!(found.tags, vec![Tag::Finance, Tag::Health]);
        assert_eq!(found.easy_summary.as_deref(), Some("A summary."));
        assert!(found.effectiveness_analysis.is_none());
        assert_eq!(found.last_updated, bill.last_updated);
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn upsert_same_key_replaces_fields_keeps_id() {
        let (storage, tmp) = test_storage().await;

        let first = sample_bill("42", "Old Title");
        storage.upsert_bill(&first).await.unwrap();

        let mut second = sample_bill("42", "New Title");
        second.easy_summary = Some("Updated summary.".into());
        second.effectiveness_analysis = Some("An analysis.".into());
        storage.upsert_bill(&second).await.unwrap();

        assert_eq!(storage.count_bills().await.unwrap(), 1);

        let found = storage.find_bill(&first.key()).await.unwrap().unwrap();
        // id from the first insert wins, everything else from the second
        assert_eq!(found.id, first.id);
        assert_eq!(found.title, "New Title");
        assert_eq!(found.easy_summary.as_deref(), Some("Updated summary."));
        assert_eq!(found.effectiveness_analysis.as_deref(), Some("An analysis."));
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn upsert_can_null_generated_fields() {
        // The pipeline carries prior values forward itself; the upsert
        // faithfully writes whatever record it is handed.
        let (storage, tmp) = test_storage().await;

        let first = sample_bill("7", "Some Act");
        storage.upsert_bill(&first).await.unwrap();

        let mut second = sample_bill("7", "Some Act");
        second.easy_summary = None;
        storage.upsert_bill(&second).await.unwrap();

        let found = storage.find_bill(&first.key()).await.unwrap().unwrap();
        assert!(found.easy_summary.is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn distinct_keys_are_distinct_documents() {
        let (storage, tmp) = test_storage().await;

        storage.upsert_bill(&sample_bill("1", "First")).await.unwrap();
        storage.upsert_bill(&sample_bill("2", "Second")).await.unwrap();

        let mut senate = sample_bill("1", "Senate Twin");
        senate.bill_type = "S".into();
        storage.upsert_bill(&senate).await.unwrap();

        assert_eq!(storage.count_bills().await.unwrap(), 3);
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn list_orders_by_last_updated_desc() {
        let (storage, tmp) = test_storage().await;

        let mut older = sample_bill("1", "Older");
        older.last_updated = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = sample_bill("2", "Newer");
        newer.last_updated = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        storage.upsert_bill(&older).await.unwrap();
        storage.upsert_bill(&newer).await.unwrap();

        let bills = storage.list_bills().await.unwrap();
        assert_eq!(bills[0].title, "Newer");
        assert_eq!(bills[1].title, "Older");
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn get_bill_by_storage_id() {
        let (storage, tmp) = test_storage().await;

        let bill = sample_bill("42", "Findable Act");
        storage.upsert_bill(&bill).await.unwrap();

        let found = storage.get_bill(&bill.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Findable Act");
        assert!(storage.get_bill("no-such-id").await.unwrap().is_none());
        let _ = std::fs::remove_file(&tmp);
    }

    #[tokio::test]
    async fn migrations_are_idempotent_across_opens() {
        let tmp = std::env::temp_dir().join(format!("pt_test_{}.db", Uuid::now_v7()));
        {
            let storage = Storage::open(&tmp).await.unwrap();
            storage.upsert_bill(&sample_bill("9", "Persistent")).await.unwrap();
        }
        let storage = Storage::open(&tmp).await.unwrap();
        assert_eq!(storage.count_bills().await.unwrap(), 1);
        let _ = std::fs::remove_file(&tmp);
    }
}
