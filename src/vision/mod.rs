//! Hosted multimodal model client.
//!
//! This module provides:
//! * [`VisionModel`]: async trait implemented by model backends.
//! * [`GeminiClient`]: Generative Language `generateContent` backend.
//! * [`prompt`]: the fixed instruction for each vision feature.
//! * [`VisionError`]: error variants for model invocation.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use perceiva::codec::{decode, encode_payload, UploadedImage};
//! use perceiva::config::{AppConfig, Secrets};
//! use perceiva::vision::{prompt, GeminiClient, VisionModel};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let secrets = Secrets::from_env(&config.vision).unwrap();
//!     let client = GeminiClient::new(&config.vision, secrets);
//!
//!     let upload = UploadedImage::from_path("street.png").unwrap();
//!     let payload = encode_payload(&decode(&upload).unwrap()).unwrap();
//!
//!     let text = client
//!         .describe(prompt::SCENE_UNDERSTANDING, &payload)
//!         .await
//!         .unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod client;
pub mod prompt;
pub mod wire;

pub use client::{parse_response, GeminiClient, VisionError, VisionModel};

#[cfg(test)]
pub use client::MockVisionModel;
