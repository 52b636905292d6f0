//! End-to-end ingestion pipeline: fetch → enrich → upsert.
//!
//! One call to [`run_ingest`] is one batch run. Bills are processed one at
//! a time (the two generation calls for a bill run concurrently with each
//! other); each completed upsert is durable, so cancelling between bills
//! never corrupts state, and re-running over unchanged source data
//! converges without issuing new generation calls.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument, warn};

use policytracker_enrich::{Enricher, TextGenerator, classify};
use policytracker_shared::{EnrichedBill, Result};
use policytracker_source::CongressClient;
use policytracker_storage::Storage;

// ---------------------------------------------------------------------------
// Config, report, progress
// ---------------------------------------------------------------------------

/// Configuration for a single ingest run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Maximum number of bills to pull from the source.
    pub limit: u32,
}

/// Counters for a completed ingest run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Bills returned by the source.
    pub fetched: usize,
    /// Bills successfully upserted into storage.
    pub upserted: usize,
    /// Summaries newly generated this run.
    pub summaries_generated: usize,
    /// Analyses newly generated this run.
    pub analyses_generated: usize,
    /// Bills that hit a per-bill failure (generation or upsert).
    pub failures: usize,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each bill begins processing.
    fn bill_started(&self, key: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &IngestReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn bill_started(&self, _key: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &IngestReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run one ingest batch.
///
/// Per bill: look up the prior record by natural key, generate only the
/// missing enrichment fields, recompute tags, and upsert the normalized
/// record. A per-bill failure is counted and logged without aborting the
/// rest of the batch; a source or storage-lookup failure aborts the run.
#[instrument(skip_all, fields(limit = config.limit))]
pub async fn run_ingest(
    config: &IngestConfig,
    source: &CongressClient,
    generator: &dyn TextGenerator,
    storage: &Storage,
    progress: &dyn ProgressReporter,
) -> Result<IngestReport> {
    let start = Instant::now();

    progress.phase("Fetching recent bills");
    let bills = source.fetch_recent(config.limit).await?;

    let mut report = IngestReport {
        fetched: bills.len(),
        ..Default::default()
    };

    info!(fetched = bills.len(), "processing batch");

    let enricher = Enricher::new(generator);
    let total = bills.len();

    for (i, bill) in bills.iter().enumerate() {
        let key = bill.key();
        progress.bill_started(&key.to_string(), i + 1, total);

        // A lookup failure means storage is unreachable; abort rather than
        // mistake it for "never stored" and pay for regeneration.
        let prior = storage.find_bill(&key).await?;

        let action_text = bill.latest_action.clone().unwrap_or_default();

        let prior_summary = prior.as_ref().and_then(|p| p.easy_summary.clone());
        let prior_analysis = prior.as_ref().and_then(|p| p.effectiveness_analysis.clone());
        let need_summary = prior_summary.is_none();
        let need_analysis = prior_analysis.is_none();

        // The two generations are independent; run them concurrently and
        // let both settle before this bill's upsert.
        let (easy_summary, effectiveness_analysis) = tokio::join!(
            async {
                if need_summary {
                    enricher.summarize(&bill.title, &action_text).await
                } else {
                    prior_summary.clone()
                }
            },
            async {
                if need_analysis {
                    enricher.analyze_effectiveness(&bill.title, &action_text).await
                } else {
                    prior_analysis.clone()
                }
            },
        );

        let mut bill_failed = false;
        if need_summary {
            if easy_summary.is_some() {
                report.summaries_generated += 1;
            } else {
                bill_failed = true;
            }
        }
        if need_analysis {
            if effectiveness_analysis.is_some() {
                report.analyses_generated += 1;
            } else {
                bill_failed = true;
            }
        }

        let record = EnrichedBill {
            id: prior
                .as_ref()
                .map(|p| p.id.clone())
                .unwrap_or_else(EnrichedBill::new_id),
            congress: bill.congress,
            number: bill.number.clone(),
            bill_type: bill.bill_type.clone(),
            title: bill.title.clone(),
            latest_action: bill.latest_action.clone(),
            last_updated: bill.update_date,
            tags: classify(&bill.title, &action_text),
            easy_summary,
            effectiveness_analysis,
            created_at: prior.as_ref().map(|p| p.created_at).unwrap_or_else(Utc::now),
        };

        match storage.upsert_bill(&record).await {
            Ok(()) => {
                report.upserted += 1;
                info!(key = %key, tags = ?record.tags, "saved bill");
            }
            Err(e) => {
                warn!(key = %key, error = %e, "upsert failed, continuing with remaining bills");
                bill_failed = true;
            }
        }

        if bill_failed {
            report.failures += 1;
        }
    }

    report.elapsed = start.elapsed();
    progress.done(&report);

    info!(
        fetched = report.fetched,
        upserted = report.upserted,
        summaries = report.summaries_generated,
        analyses = report.analyses_generated,
        failures = report.failures,
        elapsed_ms = report.elapsed.as_millis(),
        "ingest run complete"
    );

    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
