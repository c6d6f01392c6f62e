//! Text-to-speech synthesis via a local engine.
//!
//! # Overview
//!
//! [`SpeechSynthesizer`] turns text into a single audio artifact on disk.
//! There is exactly one artifact slot: every call overwrites the file written
//! by the previous call, so callers must not run two syntheses at once.
//!
//! [`EspeakSynthesizer`] is the production implementation (`espeak-ng`
//! subprocess).  Rate and volume are fixed at [`SPEECH_RATE_WPM`] and
//! [`SPEECH_VOLUME`].

pub mod espeak;

pub use espeak::EspeakSynthesizer;

#[cfg(test)]
pub use espeak::MockSynthesizer;

use std::path::PathBuf;

use thiserror::Error;

/// Speaking rate in words per minute.
pub const SPEECH_RATE_WPM: u32 = 150;

/// Output volume, `0.0 ..= 1.0` of the engine's nominal level.
pub const SPEECH_VOLUME: f32 = 1.0;

/// Errors that can arise during synthesis.
#[derive(Debug, Clone, Error)]
pub enum SynthesisError {
    /// Nothing to speak.
    #[error("no text to speak")]
    EmptyText,

    /// The engine executable could not be located or started.
    #[error("speech engine unavailable ({cmd}): {reason}")]
    EngineUnavailable { cmd: String, reason: String },

    /// The engine ran but reported failure.
    #[error("speech engine failed: {0}")]
    EngineFailed(String),

    /// The artifact could not be written or is missing afterwards.
    #[error("cannot write audio file {path}: {reason}")]
    Write { path: String, reason: String },
}

/// The audio file produced by the most recent synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl SpeechArtifact {
    pub fn mime_type(&self) -> &'static str {
        "audio/wav"
    }
}

/// Object-safe, thread-safe interface for speech engines.
///
/// # Contract
///
/// - Empty or whitespace-only `text` returns [`SynthesisError::EmptyText`].
/// - A successful call leaves a non-empty file at [`SpeechArtifact::path`].
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<SpeechArtifact, SynthesisError>;
}

// Compile-time assertion: Box<dyn SpeechSynthesizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechSynthesizer>) {}
};
