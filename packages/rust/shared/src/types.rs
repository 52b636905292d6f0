//! Core domain types for PolicyTracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// Topic label attached to a bill by the keyword classifier.
///
/// Serialized names match the document store ("National Security", not
/// "NationalSecurity") so stored records stay readable as plain JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Finance,
    Health,
    Education,
    #[serde(rename = "National Security")]
    NationalSecurity,
    Technology,
    General,
}

impl Tag {
    /// Human-readable label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finance => "Finance",
            Self::Health => "Health",
            Self::Education => "Education",
            Self::NationalSecurity => "National Security",
            Self::Technology => "Technology",
            Self::General => "General",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BillKey
// ---------------------------------------------------------------------------

/// Natural key identifying a bill: (congress, number, type).
///
/// Distinct from the storage-assigned record id. All upserts and cache
/// lookups match on this tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillKey {
    /// Congressional session, e.g. 118.
    pub congress: u32,
    /// Bill number within the session, kept as the API's string form.
    pub number: String,
    /// Bill type, e.g. "HR" or "S".
    pub bill_type: String,
}

impl std::fmt::Display for BillKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}{}", self.congress, self.bill_type, self.number)
    }
}

// ---------------------------------------------------------------------------
// Bill (source record)
// ---------------------------------------------------------------------------

/// A bill as fetched from the legislative source, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    /// Natural key fields.
    pub congress: u32,
    pub number: String,
    pub bill_type: String,
    /// Official bill title.
    pub title: String,
    /// Latest-action text; absent for bills with no recorded action yet.
    pub latest_action: Option<String>,
    /// When the source last updated this record.
    pub update_date: DateTime<Utc>,
}

impl Bill {
    /// The bill's natural key.
    pub fn key(&self) -> BillKey {
        BillKey {
            congress: self.congress,
            number: self.number.clone(),
            bill_type: self.bill_type.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// EnrichedBill (persisted record)
// ---------------------------------------------------------------------------

/// The enriched record owned by the pipeline and persisted in storage.
///
/// `title`, `latest_action`, `last_updated`, and `tags` are refreshed on
/// every run. `easy_summary` and `effectiveness_analysis` are monotonic:
/// once non-null they are carried forward and never regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedBill {
    /// Storage-assigned identity (UUID v7), stable across upserts.
    pub id: String,
    pub congress: u32,
    pub number: String,
    pub bill_type: String,
    pub title: String,
    /// Summary-of-latest-action text, copied verbatim from the source.
    pub latest_action: Option<String>,
    pub last_updated: DateTime<Utc>,
    /// Topic labels, recomputed every run (never cached).
    pub tags: Vec<Tag>,
    /// Plain-language summary; null if generation has not yet succeeded.
    pub easy_summary: Option<String>,
    /// Effectiveness analysis; null if generation has not yet succeeded.
    pub effectiveness_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EnrichedBill {
    /// Generate a fresh storage identity for a first insert.
    pub fn new_id() -> String {
        Uuid::now_v7().to_string()
    }

    /// The record's natural key.
    pub fn key(&self) -> BillKey {
        BillKey {
            congress: self.congress,
            number: self.number.clone(),
            bill_type: self.bill_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_serializes_with_display_names() {
        let json = serde_json::to_string(&vec![Tag::NationalSecurity, Tag::Finance]).unwrap();
        assert_eq!(json, r#"["National Security","Finance"]"#);

        let parsed: Vec<Tag> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![Tag::NationalSecurity, Tag::Finance]);
    }

    #[test]
    fn bill_key_display() {
        let key = BillKey {
            congress: 118,
            number: "42".into(),
            bill_type: "HR".into(),
        };
        assert_eq!(key.to_string(), "118-HR42");
    }

    #[test]
    fn bill_key_extraction() {
        let bill = Bill {
            congress: 118,
            number: "3076".into(),
            bill_type: "S".into(),
            title: "A bill".into(),
            latest_action: None,
            update_date: Utc::now(),
        };
        let key = bill.key();
        assert_eq!(key.congress, 118);
        assert_eq!(key.number, "3076");
        assert_eq!(key.bill_type, "S");
    }
}
