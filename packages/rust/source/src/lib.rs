//! Congress.gov API client: fetches the page of most recently updated bills.
//!
//! One ingest run pulls a single bounded batch (`fetch_recent`), sorted by
//! update date descending, exactly as the upstream `/v3/bill` listing
//! endpoint serves it. The API may return fewer bills than requested.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use policytracker_shared::{Bill, PolicyTrackerError, Result};

/// Default timeout in seconds for source API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!("PolicyTracker/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types (matching the Congress.gov JSON schema)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct BillListing {
    #[serde(default)]
    bills: Vec<WireBill>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBill {
    congress: u32,
    number: String,
    #[serde(rename = "type")]
    bill_type: String,
    title: String,
    latest_action: Option<WireLatestAction>,
    update_date: String,
}

#[derive(Debug, Deserialize)]
struct WireLatestAction {
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// CongressClient
// ---------------------------------------------------------------------------

/// HTTP client for the Congress.gov bill listing API.
pub struct CongressClient {
    client: Client,
    base_url: String,
    api_key: String,
    congress: u32,
}

impl CongressClient {
    /// Create a client for the given API origin, key, and session number.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, congress: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PolicyTrackerError::SourceFetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            congress,
        })
    }

    /// Fetch up to `limit` of the most recently updated bills.
    ///
    /// Any network, auth, or parse failure here is fatal to the run —
    /// there is no partial batch to fall back on.
    #[instrument(skip(self), fields(congress = self.congress))]
    pub async fn fetch_recent(&self, limit: u32) -> Result<Vec<Bill>> {
        let url = format!("{}/v3/bill", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("congress", &self.congress.to_string()),
                ("sort", "updateDate"),
                ("order", "desc"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PolicyTrackerError::SourceFetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PolicyTrackerError::SourceFetch(format!(
                "{url}: HTTP {status}"
            )));
        }

        let listing: BillListing = response
            .json()
            .await
            .map_err(|e| PolicyTrackerError::SourceFetch(format!("{url}: invalid response: {e}")))?;

        let mut bills = Vec::with_capacity(listing.bills.len());
        for wire in listing.bills {
            match parse_update_date(&wire.update_date) {
                Ok(update_date) => bills.push(Bill {
                    congress: wire.congress,
                    number: wire.number,
                    bill_type: wire.bill_type,
                    title: wire.title,
                    latest_action: wire.latest_action.and_then(|a| a.text),
                    update_date,
                }),
                Err(e) => {
                    warn!(number = %wire.number, error = %e, "skipping bill with unparseable updateDate");
                }
            }
        }

        info!(requested = limit, received = bills.len(), "fetched recent bills");
        Ok(bills)
    }
}

/// Parse the API's `updateDate`, which arrives either as a full RFC 3339
/// timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_update_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| PolicyTrackerError::validation(format!("invalid date: {raw}")))?;
        return Ok(midnight.and_utc());
    }

    Err(PolicyTrackerError::validation(format!(
        "unparseable updateDate: {raw}"
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
