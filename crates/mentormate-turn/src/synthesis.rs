//! Speech-synthesis adapter.
//!
//! Requests a fixed voice/model rendition of the mentor's reply from the
//! external synthesis backend and returns the raw compressed audio bytes.
//! One call per turn; no retry, no caching.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use mentormate_core::config::SynthesisConfig;

/// Errors from the speech-synthesis backend.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("upstream returned empty audio")]
    EmptyAudio,
}

/// Client for the speech-synthesis backend.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Synthesize speech for the mentor's reply text.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError>;
}

// =============================================================================
// HTTP implementation
// =============================================================================

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Synthesis client backed by the external speech HTTP API.
pub struct HttpSynthesisClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    voice: String,
    format: String,
    api_key: String,
}

impl HttpSynthesisClient {
    /// Build a client from config. The API key is passed separately so it
    /// never lives in the serializable config.
    pub fn new(config: &SynthesisConfig, api_key: String) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Transport(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            format: config.format.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl SynthesisClient for HttpSynthesisClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let request = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: &self.format,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Transport("request timed out".to_string())
                } else {
                    SynthesisError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;

        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        Ok(bytes.to_vec())
    }
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scripted synthesis client for tests and offline runs.
pub struct MockSynthesisClient {
    audio: Option<Vec<u8>>,
    calls: AtomicUsize,
}

impl MockSynthesisClient {
    /// A client that always returns the given audio bytes.
    pub fn returning(audio: Vec<u8>) -> Self {
        Self {
            audio: Some(audio),
            calls: AtomicUsize::new(0),
        }
    }

    /// A client that simulates an empty-body upstream response.
    pub fn failing() -> Self {
        Self {
            audio: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `synthesize` was invoked.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisClient for MockSynthesisClient {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.audio {
            Some(audio) => Ok(audio.clone()),
            None => Err(SynthesisError::EmptyAudio),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
