//! `espeak-ng` subprocess backend.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{SpeechArtifact, SpeechSynthesizer, SynthesisError, SPEECH_RATE_WPM, SPEECH_VOLUME};
use crate::config::SpeechConfig;

/// Production speech engine; a fresh `espeak-ng` process per call.
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    cmd: PathBuf,
    voice: Option<String>,
    output: PathBuf,
}

impl EspeakSynthesizer {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            cmd: config.engine_cmd.clone(),
            voice: config.voice.clone(),
            output: config.output_file.clone(),
        }
    }

    /// Location of the single artifact slot.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Command-line arguments for one synthesis; text is fed on stdin.
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = vec![
            "-s".to_string(),
            SPEECH_RATE_WPM.to_string(),
            "-a".to_string(),
            amplitude(SPEECH_VOLUME).to_string(),
        ];
        if let Some(voice) = &self.voice {
            args.push("-v".into());
            args.push(voice.clone());
        }
        args.push("-w".into());
        args.push(self.output.display().to_string());
        args.push("--stdin".into());
        args
    }

    fn write_error(&self, reason: impl ToString) -> SynthesisError {
        SynthesisError::Write {
            path: self.output.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Remove the previous artifact so a failed run cannot leave it behind
    /// looking fresh.
    fn clear_slot(&self) -> Result<(), SynthesisError> {
        match std::fs::remove_file(&self.output) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.write_error(e)),
        }
    }
}

/// Map a `0.0 ..= 1.0` volume onto espeak's amplitude scale (100 = nominal).
fn amplitude(volume: f32) -> u32 {
    (volume.clamp(0.0, 2.0) * 100.0).round() as u32
}

impl SpeechSynthesizer for EspeakSynthesizer {
    fn synthesize(&self, text: &str) -> Result<SpeechArtifact, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        if let Some(parent) = self.output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        self.clear_slot()?;

        let mut child = Command::new(&self.cmd)
            .args(self.engine_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SynthesisError::EngineUnavailable {
                cmd: self.cmd.display().to_string(),
                reason: e.to_string(),
            })?;

        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| SynthesisError::EngineFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SynthesisError::EngineFailed(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }
        // A clean exit is authoritative; the file check below decides.
        if let Err(e) = write_result {
            log::warn!("speech: engine closed stdin early: {e}");
        }

        let size_bytes = match std::fs::metadata(&self.output) {
            Ok(meta) if meta.len() > 0 => meta.len(),
            Ok(_) => return Err(self.write_error("engine produced an empty file")),
            Err(e) => return Err(self.write_error(e)),
        };

        log::info!(
            "speech: wrote {} ({} bytes)",
            self.output.display(),
            size_bytes
        );

        Ok(SpeechArtifact {
            path: self.output.clone(),
            size_bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test only)
// ---------------------------------------------------------------------------

/// Test double that honours the empty-text contract and records every call.
#[cfg(test)]
pub struct MockSynthesizer {
    fail: bool,
    spoken: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockSynthesizer {
    pub fn ok() -> Self {
        Self {
            fail: false,
            spoken: Default::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            spoken: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.spoken.lock().unwrap().len()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SpeechSynthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str) -> Result<SpeechArtifact, SynthesisError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }
        if self.fail {
            return Err(SynthesisError::EngineFailed("mock failure".into()));
        }
        Ok(SpeechArtifact {
            path: PathBuf::from("text-to-speech-local.wav"),
            size_bytes: text.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn synth_with(cmd: &str, output: PathBuf) -> EspeakSynthesizer {
        EspeakSynthesizer::from_config(&SpeechConfig {
            engine_cmd: PathBuf::from(cmd),
            voice: None,
            output_file: output,
        })
    }

    #[test]
    fn args_carry_fixed_rate_and_volume() {
        let synth = synth_with("espeak-ng", PathBuf::from("/tmp/out.wav"));
        let args = synth.engine_args();
        assert_eq!(
            args,
            vec!["-s", "150", "-a", "100", "-w", "/tmp/out.wav", "--stdin"]
        );
    }

    #[test]
    fn voice_is_passed_when_configured() {
        let synth = EspeakSynthesizer::from_config(&SpeechConfig {
            engine_cmd: PathBuf::from("espeak-ng"),
            voice: Some("en-gb".into()),
            output_file: PathBuf::from("out.wav"),
        });
        let args = synth.engine_args();
        let pos = args.iter().position(|a| a == "-v").expect("-v present");
        assert_eq!(args[pos + 1], "en-gb");
    }

    #[test]
    fn amplitude_scale() {
        assert_eq!(amplitude(1.0), 100);
        assert_eq!(amplitude(0.5), 50);
        assert_eq!(amplitude(-1.0), 0);
    }

    #[test]
    fn empty_text_is_rejected_without_running_engine() {
        let dir = tempdir().expect("temp dir");
        let synth = synth_with("/nonexistent/espeak", dir.path().join("out.wav"));
        assert!(matches!(synth.synthesize(""), Err(SynthesisError::EmptyText)));
        assert!(matches!(
            synth.synthesize(" \n\t"),
            Err(SynthesisError::EmptyText)
        ));
    }

    #[test]
    fn missing_engine_is_unavailable() {
        let dir = tempdir().expect("temp dir");
        let synth = synth_with("/nonexistent/espeak", dir.path().join("out.wav"));
        assert!(matches!(
            synth.synthesize("hello"),
            Err(SynthesisError::EngineUnavailable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn failing_engine_is_reported() {
        let dir = tempdir().expect("temp dir");
        let synth = synth_with("false", dir.path().join("out.wav"));
        assert!(matches!(
            synth.synthesize("hello"),
            Err(SynthesisError::EngineFailed(_))
        ));
    }

    /// An engine that exits cleanly without writing the file must not yield
    /// an artifact, and the stale artifact from an earlier run is removed.
    #[cfg(unix)]
    #[test]
    fn engine_that_writes_nothing_is_a_write_error() {
        let dir = tempdir().expect("temp dir");
        let out = dir.path().join("nested").join("out.wav");
        std::fs::create_dir_all(out.parent().unwrap()).unwrap();
        std::fs::write(&out, b"stale").unwrap();

        let synth = synth_with("true", out.clone());
        assert!(matches!(
            synth.synthesize("hello"),
            Err(SynthesisError::Write { .. })
        ));
        assert!(!out.exists());
    }
}
