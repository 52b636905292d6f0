//! Core pipeline orchestration for PolicyTracker.
//!
//! This crate ties together the legislative source client, the enrichment
//! layer, and storage into the end-to-end ingest workflow ([`run_ingest`]).

pub mod pipeline;

pub use pipeline::{IngestConfig, IngestReport, ProgressReporter, SilentProgress, run_ingest};
