//! Core `VisionModel` trait and `GeminiClient` implementation.
//!
//! `GeminiClient` calls the Generative Language `generateContent` endpoint
//! with one user turn: the feature instruction followed by the inline PNG.
//! Connection details come from [`VisionConfig`]; the key from [`Secrets`].
//!
//! There is no retry, no fallback and no response cache: a failure is
//! returned to the dispatcher as-is, and two identical calls are two requests.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::codec::EncodedPayload;
use crate::config::{Secrets, VisionConfig};
use crate::vision::wire::{GenerateContentRequest, GenerateContentResponse};

// ---------------------------------------------------------------------------
// VisionError
// ---------------------------------------------------------------------------

/// Errors that can occur while invoking the hosted model.
#[derive(Debug, Clone, Error)]
pub enum VisionError {
    /// HTTP transport or connection error.
    #[error("model request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("model request timed out")]
    Timeout,

    /// The API rejected the key.
    #[error("model rejected credentials (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// Any other non-success HTTP status.
    #[error("model returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON or had no text.
    #[error("malformed model response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for VisionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VisionError::Timeout
        } else {
            VisionError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// VisionModel trait
// ---------------------------------------------------------------------------

/// Async trait for hosted multimodal models.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn VisionModel>`.
///
/// # Arguments
/// * `instruction` – one of the constants in [`crate::vision::prompt`].
/// * `image`       – the base64 PNG built for this request.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn describe(&self, instruction: &str, image: &EncodedPayload)
        -> Result<String, VisionError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

pub struct GeminiClient {
    client: reqwest::Client,
    config: VisionConfig,
    secrets: Secrets,
}

impl GeminiClient {
    /// Build a client from application config and startup secrets.
    ///
    /// With `timeout_secs = None` the client waits indefinitely.
    pub fn new(config: &VisionConfig, secrets: Secrets) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
            secrets,
        }
    }

    /// Replace the underlying HTTP client.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// `{base_url}/v1beta/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn describe(
        &self,
        instruction: &str,
        image: &EncodedPayload,
    ) -> Result<String, VisionError> {
        let body = GenerateContentRequest::single_turn(instruction, image);

        log::info!(
            "vision: requesting {} ({} base64 bytes)",
            self.config.model,
            image.as_str().len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.secrets.api_key())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VisionError::Auth {
                    status: status.as_u16(),
                    message,
                },
                _ => VisionError::Status {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let raw = response.text().await?;
        parse_response(&raw)
    }
}

/// Extract the first candidate's text, verbatim.
pub fn parse_response(raw: &str) -> Result<String, VisionError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|e| VisionError::Parse(e.to_string()))?;

    let Some(candidate) = parsed.candidates.first() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "none given".into());
        return Err(VisionError::Parse(format!(
            "no candidates returned (block reason: {reason})"
        )));
    };

    candidate.text().ok_or_else(|| {
        VisionError::Parse(format!(
            "candidate has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })
}

// ---------------------------------------------------------------------------
// MockVisionModel  (test only)
// ---------------------------------------------------------------------------

/// Test double that records `(instruction, payload)` for every call.
#[cfg(test)]
pub struct MockVisionModel {
    result: Result<String, VisionError>,
    calls: std::sync::Mutex<Vec<(String, EncodedPayload)>>,
}

#[cfg(test)]
impl MockVisionModel {
    pub fn ok(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: Default::default(),
        }
    }

    pub fn network_failure() -> Self {
        Self {
            result: Err(VisionError::Request("connection refused".into())),
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> Vec<(String, EncodedPayload)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl VisionModel for MockVisionModel {
    async fn describe(
        &self,
        instruction: &str,
        image: &EncodedPayload,
    ) -> Result<String, VisionError> {
        self.calls
            .lock()
            .unwrap()
            .push((instruction.to_string(), image.clone()));
        self.result.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
