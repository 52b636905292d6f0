//! Enrichment layer: keyword topic tagging and generated-text fields.
//!
//! [`tags::classify`] is pure and recomputed on every run; the generated
//! fields go through [`Enricher`], which wraps any [`TextGenerator`]
//! (production: [`GeminiClient`]) and converts service failures into
//! absent values so one bad call never poisons a batch.

pub mod enricher;
pub mod gemini;
pub mod tags;

pub use enricher::Enricher;
pub use gemini::{GeminiClient, TextGenerator};
pub use tags::classify;
