//! Error types for PolicyTracker.
//!
//! Library crates use [`PolicyTrackerError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all PolicyTracker operations.
#[derive(Debug, thiserror::Error)]
pub enum PolicyTrackerError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/auth failure against the legislative source API.
    ///
    /// Fatal to an ingest run: without a source batch there is nothing
    /// to process, so this is never downgraded to a per-bill failure.
    #[error("source fetch error: {0}")]
    SourceFetch(String),

    /// Generative-text service failure (quota, auth, network, or a
    /// response we cannot parse a candidate out of).
    #[error("generation error: {0}")]
    Generation(String),

    /// Database or storage layer error.
    ///
    /// Must never be conflated with "no prior record" — a lookup that
    /// fails aborts the run instead of triggering paid regeneration.
    #[error("storage error: {0}")]
    Storage(String),

    /// Data validation error (bad timestamp, invalid record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PolicyTrackerError>;

impl PolicyTrackerError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
