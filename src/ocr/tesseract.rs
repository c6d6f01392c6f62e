//! `tesseract` subprocess backend.
//!
//! The bitmap is piped in as PNG (`tesseract stdin stdout -l <lang>`), so no
//! temporary files are written.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use image::DynamicImage;

use super::{OcrError, TextExtractor};
use crate::codec::to_png_bytes;
use crate::config::OcrConfig;

/// Production OCR engine that invokes the configured `tesseract` executable.
#[derive(Debug, Clone)]
pub struct TesseractExtractor {
    cmd: PathBuf,
    language: String,
}

impl TesseractExtractor {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            cmd: config.tesseract_cmd.clone(),
            language: config.language.clone(),
        }
    }

    fn unavailable(&self, reason: impl ToString) -> OcrError {
        OcrError::Unavailable {
            cmd: self.cmd.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl TextExtractor for TesseractExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let png = to_png_bytes(image).map_err(|e| OcrError::Input(e.to_string()))?;

        let mut child = Command::new(&self.cmd)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        // The engine reads all of stdin before it writes anything, so the
        // write can complete before stdout is drained.
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| OcrError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Failed(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }
        write_result.map_err(|e| OcrError::Failed(format!("cannot write image to engine: {e}")))?;

        let text = normalize_output(&output.stdout);
        log::debug!("ocr: extracted {} chars", text.chars().count());
        Ok(text)
    }
}

/// Decode engine output and strip the trailing page break and whitespace.
///
/// A page with no text comes back as `""`.
pub fn normalize_output(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .trim_end_matches(|c: char| c == '\u{c}' || c.is_whitespace())
        .to_string()
}

// ---------------------------------------------------------------------------
// MockTextExtractor  (test only)
// ---------------------------------------------------------------------------

/// Test double returning a fixed result and counting invocations.
#[cfg(test)]
pub struct MockTextExtractor {
    result: Result<String, OcrError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockTextExtractor {
    pub fn ok(text: &str) -> Self {
        Self {
            result: Ok(text.to_string()),
            calls: Default::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            result: Err(OcrError::Unavailable {
                cmd: "tesseract".into(),
                reason: "not found".into(),
            }),
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl TextExtractor for MockTextExtractor {
    fn extract(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.result.clone()
    }
}
