//! Text extraction via a local OCR engine.
//!
//! [`TextExtractor`] is the interface used by the dispatcher.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn TextExtractor>` and called from `spawn_blocking`.
//!
//! [`TesseractExtractor`] is the production implementation; it shells out to
//! the `tesseract` executable configured in [`crate::config::OcrConfig`].

pub mod tesseract;

pub use tesseract::{normalize_output, TesseractExtractor};

#[cfg(test)]
pub use tesseract::MockTextExtractor;

use image::DynamicImage;
use thiserror::Error;

/// Errors that can arise while extracting text.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The engine executable could not be located or started.
    #[error("OCR engine unavailable ({cmd}): {reason}")]
    Unavailable { cmd: String, reason: String },

    /// The bitmap could not be handed to the engine.
    #[error("cannot prepare image for OCR: {0}")]
    Input(String),

    /// The engine ran but reported failure.
    #[error("OCR engine failed: {0}")]
    Failed(String),
}

/// Object-safe, thread-safe interface for OCR engines.
///
/// # Contract
///
/// An image without any recognizable text yields `Ok(String::new())`, never an
/// error.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

// Compile-time assertion: Box<dyn TextExtractor> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn TextExtractor>) {}
};
