//! Text-generation adapter.
//!
//! Sends the user's utterance plus the fixed persona instruction to the
//! external completion backend and extracts the first candidate's text.
//! One call per turn; no retry, no caching.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mentormate_core::config::GenerationConfig;

/// Errors from the text-generation backend.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("no candidates in response")]
    NoCandidates,
}

/// Client for the text-generation backend.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate the mentor's reply to `text` under the given persona
    /// instruction.
    async fn generate(&self, text: &str, persona: &str) -> Result<String, GenerationError>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Generation client backed by the external completion HTTP API.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl HttpGenerationClient {
    /// Build a client from config. The API key is passed separately so it
    /// never lives in the serializable config.
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, text: &str, persona: &str) -> Result<String, GenerationError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
            system_instruction: Content {
                parts: vec![Part { text: persona }],
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Transport("request timed out".to_string())
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Transport(format!("invalid response body: {}", e)))?;

        let first = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerationError::NoCandidates)?;

        let reply = first
            .content
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(GenerationError::NoCandidates);
        }

        Ok(reply)
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scripted generation client for tests and offline runs.
///
/// Counts calls so tests can assert that validation short-circuits before
/// the adapter is reached.
pub struct MockGenerationClient {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl MockGenerationClient {
    /// A client that always returns the given reply.
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A client that simulates a candidate-less upstream response.
    pub fn empty() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `generate` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(&self, _text: &str, _persona: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(GenerationError::NoCandidates),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
