//! Shared types, error model, and configuration for PolicyTracker.
//!
//! This crate is the foundation depended on by all other PolicyTracker crates.
//! It provides:
//! - [`PolicyTrackerError`] — the unified error type
//! - Domain types ([`Bill`], [`BillKey`], [`EnrichedBill`], [`Tag`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CongressConfig, DefaultsConfig, GeminiConfig, api_key_from_env, config_dir,
    config_file_path, expand_path, init_config, load_config, load_config_from,
};
pub use error::{PolicyTrackerError, Result};
pub use types::{Bill, BillKey, EnrichedBill, Tag};
