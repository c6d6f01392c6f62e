//! Configuration module for Perceiva.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each external
//! collaborator, `AppPaths` for cross-platform data directories, TOML
//! persistence via `AppConfig::load` / `AppConfig::save`, and `Secrets` for
//! the environment-held API key.

pub mod paths;
pub mod secrets;
pub mod settings;

pub use paths::AppPaths;
pub use secrets::{Secrets, SecretsError};
pub use settings::{AnimationConfig, AppConfig, OcrConfig, SpeechConfig, UiConfig, VisionConfig};
