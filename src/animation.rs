//! Decorative loading animation.
//!
//! The indicator is driven by a remote Lottie JSON asset.  Only the header is
//! used (frame rate, in/out points, canvas size); the layers themselves are
//! not rendered.  Every failure here is non-fatal: the caller logs it and the
//! UI shows a plain spinner instead.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::AnimationConfig;

/// Size at which the indicator is drawn, in logical pixels.
pub const DISPLAY_WIDTH: f32 = 300.0;
pub const DISPLAY_HEIGHT: f32 = 200.0;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Why the animation could not be loaded.
#[derive(Debug, Clone, Error)]
pub enum AnimationFetchError {
    #[error("animation request failed: {0}")]
    Request(String),

    #[error("animation asset returned HTTP {0}")]
    Status(u16),

    #[error("animation asset is not valid Lottie JSON: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AnimationFetchError {
    fn from(e: reqwest::Error) -> Self {
        AnimationFetchError::Request(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct LottieHeader {
    #[serde(rename = "fr")]
    frame_rate: f32,
    #[serde(rename = "ip")]
    in_point: f32,
    #[serde(rename = "op")]
    out_point: f32,
    #[serde(rename = "w")]
    width: u32,
    #[serde(rename = "h")]
    height: u32,
    #[serde(rename = "nm", default)]
    name: Option<String>,
}

/// Timing and geometry of a fetched animation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingAnimation {
    pub name: Option<String>,
    pub frame_rate: f32,
    pub in_point: f32,
    pub out_point: f32,
    pub width: u32,
    pub height: u32,
}

impl LoadingAnimation {
    /// Parse the header fields of a Lottie document.
    pub fn from_json(raw: &str) -> Result<Self, AnimationFetchError> {
        let header: LottieHeader =
            serde_json::from_str(raw).map_err(|e| AnimationFetchError::Parse(e.to_string()))?;
        if header.frame_rate <= 0.0 || header.out_point <= header.in_point {
            return Err(AnimationFetchError::Parse(format!(
                "degenerate timing fr={} ip={} op={}",
                header.frame_rate, header.in_point, header.out_point
            )));
        }
        Ok(Self {
            name: header.name,
            frame_rate: header.frame_rate,
            in_point: header.in_point,
            out_point: header.out_point,
            width: header.width,
            height: header.height,
        })
    }

    /// Length of one loop in seconds.
    pub fn loop_secs(&self) -> f32 {
        (self.out_point - self.in_point) / self.frame_rate
    }

    /// Position within the current loop, `0.0 .. 1.0`.
    pub fn phase_at(&self, elapsed_secs: f32) -> f32 {
        (elapsed_secs.max(0.0) / self.loop_secs()).fract()
    }

    /// Canvas aspect ratio (width / height), `1.0` for a zero-height canvas.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Anything that can produce the loading animation.
#[async_trait]
pub trait AnimationSource: Send + Sync {
    async fn fetch(&self) -> Result<LoadingAnimation, AnimationFetchError>;
}

/// Fetches the Lottie asset with a single unauthenticated GET.
pub struct LottieLoader {
    client: reqwest::Client,
    url: String,
}

impl LottieLoader {
    pub fn from_config(config: &AnimationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: config.url.clone(),
        }
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl AnimationSource for LottieLoader {
    async fn fetch(&self) -> Result<LoadingAnimation, AnimationFetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AnimationFetchError::Status(status.as_u16()));
        }
        let raw = response.text().await?;
        LoadingAnimation::from_json(&raw)
    }
}
