//! Gemini `generateContent` REST client.
//!
//! The generation service is rate-limited and metered; callers must check
//! the enrichment cache before invoking it (see the pipeline's carry-forward
//! rules). Every request carries a bounded timeout — a timed-out call is a
//! generation failure, not a batch abort.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use policytracker_shared::{PolicyTrackerError, Result};

/// Default timeout in seconds for generation requests. Generation is slow;
/// give it more room than ordinary API calls.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("PolicyTracker/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Seam between the enrichment logic and the generation service.
///
/// Production uses [`GeminiClient`]; tests substitute stubs that return
/// fixed text or fail on demand.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text from a prompt. Fails with
    /// [`PolicyTrackerError::Generation`] on quota, auth, network, or
    /// malformed-response conditions.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Wire types (matching the generativelanguage.googleapis.com schema)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// HTTP client for the Gemini generation API.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client for the given API origin, model ID, and key.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                PolicyTrackerError::Generation(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| PolicyTrackerError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PolicyTrackerError::Generation(format!(
                "HTTP {status}: {}",
                truncate_body(&body)
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PolicyTrackerError::Generation(format!("invalid response: {e}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                PolicyTrackerError::Generation("response contained no candidate text".into())
            })?;

        debug!(chars = text.len(), "generation succeeded");
        Ok(text)
    }
}

/// Cap an error-response body for the error message. The body is arbitrary
/// external text, so the cut must land on a char boundary.
fn truncate_body(body: &str) -> &str {
    const MAX_BYTES: usize = 200;
    if body.len() <= MAX_BYTES {
        return body;
    }
    let mut end = MAX_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
