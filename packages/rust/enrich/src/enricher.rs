//! Prompt construction and failure-isolating wrappers around the generator.
//!
//! The two operations are independent: neither reads the other's result,
//! they may run in either order or concurrently, and a failure in one
//! leaves the other (and the rest of the record) untouched.

use tracing::{info, warn};

use crate::gemini::TextGenerator;

/// Builds prompts and downgrades generation failures to "absent".
pub struct Enricher<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> Enricher<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    /// Generate a plain-language summary, or `None` on any service failure.
    pub async fn summarize(&self, title: &str, official_summary: &str) -> Option<String> {
        info!(%title, "generating summary");

        let prompt = format!(
            "You are a non-partisan policy analyst.\n\
             Summarize the following US bill for a general audience in one paragraph.\n\
             Explain what the bill does, not its history or status.\n\
             \n\
             BILL TITLE: \"{title}\"\n\
             OFFICIAL SUMMARY: \"{official_summary}\"\n\
             \n\
             SIMPLE SUMMARY:\n"
        );

        self.run(&prompt, "summary").await
    }

    /// Generate an effectiveness analysis, or `None` on any service failure.
    pub async fn analyze_effectiveness(&self, title: &str, official_summary: &str) -> Option<String> {
        info!(%title, "generating effectiveness analysis");

        let prompt = format!(
            "You are a non-partisan policy analyst with access to peer-reviewed research \
             from sources like the Congressional Budget Office, RAND Corporation, academic \
             journals, and other unbiased studies.\n\
             \n\
             Analyze the effectiveness of the following US bill:\n\
             - How effective is it at achieving its stated goals, based on evidence?\n\
             - What are potential unintended impacts (positive or negative)?\n\
             - Is it the most effective method to achieve those goals, per best known \
             research? Suggest alternatives if relevant.\n\
             \n\
             BILL TITLE: \"{title}\"\n\
             OFFICIAL SUMMARY: \"{official_summary}\"\n\
             \n\
             EFFECTIVENESS ANALYSIS:\n"
        );

        self.run(&prompt, "analysis").await
    }

    /// Submit a prompt, trimming the response and absorbing failures.
    async fn run(&self, prompt: &str, kind: &str) -> Option<String> {
        match self.generator.generate(prompt).await {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    warn!(kind, "generator returned empty text");
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) => {
                warn!(kind, error = %e, "generation failed, leaving field absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use policytracker_shared::{PolicyTrackerError, Result};
    use std::sync::Mutex;

    /// Records every prompt it receives; fails when `fail` is set.
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        response: String,
        fail: bool,
    }

    impl RecordingGenerator {
        fn ok(response: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                response: response.into(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                response: String::new(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(PolicyTrackerError::Generation("stub failure".into()))
            } else {
                Ok(self.response.clone())
            }
        }
    }

    #[tokio::test]
    async fn summarize_embeds_inputs_verbatim() {
        let generator = RecordingGenerator::ok("  the summary  ");
        let enricher = Enricher::new(&generator);

        let result = enricher
            .summarize("Student Loan Reform Act", "refers to education funding")
            .await;

        assert_eq!(result.as_deref(), Some("the summary"));

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("BILL TITLE: \"Student Loan Reform Act\""));
        assert!(prompts[0].contains("OFFICIAL SUMMARY: \"refers to education funding\""));
        assert!(prompts[0].contains("SIMPLE SUMMARY:"));
    }

    #[tokio::test]
    async fn analysis_uses_its_own_prompt() {
        let generator = RecordingGenerator::ok("the analysis");
        let enricher = Enricher::new(&generator);

        let result = enricher
            .analyze_effectiveness("Tax Relief Act", "passed committee")
            .await;

        assert_eq!(result.as_deref(), Some("the analysis"));

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("EFFECTIVENESS ANALYSIS:"));
        assert!(prompts[0].contains("Congressional Budget Office"));
        assert!(!prompts[0].contains("SIMPLE SUMMARY:"));
    }

    #[tokio::test]
    async fn generation_failure_becomes_absent() {
        let generator = RecordingGenerator::failing();
        let enricher = Enricher::new(&generator);

        assert!(enricher.summarize("Any Act", "").await.is_none());
        assert!(enricher.analyze_effectiveness("Any Act", "").await.is_none());
    }

    #[tokio::test]
    async fn empty_response_becomes_absent() {
        let generator = RecordingGenerator::ok("   \n  ");
        let enricher = Enricher::new(&generator);

        assert!(enricher.summarize("Any Act", "").await.is_none());
    }
}
