//! Speaker output via `cpal`.
//!
//! [`AudioPlayer`] wraps the cpal host/device lifecycle for the default
//! output device.  [`AudioPlayer::play`] returns a [`PlaybackHandle`] that
//! keeps the stream alive; dropping it stops playback.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

use super::resample::{downmix_to_mono, resample_linear, spread_channels};
use super::wav::WavClip;

/// Errors from loading or playing the speech artifact.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no output device found on the default audio host")]
    NoDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported audio file: {0}")]
    Format(String),

    #[error("cannot read {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// RAII guard for a playing clip.
pub struct PlaybackHandle {
    _stream: cpal::Stream,
    finished: Arc<AtomicBool>,
    duration_secs: f32,
}

impl PlaybackHandle {
    /// `true` once every sample has been handed to the device.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }
}

/// Default output device wrapper.
pub struct AudioPlayer {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioPlayer {
    /// Open the system default output device at its preferred config.
    pub fn new() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;

        let supported = device.default_output_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        log::debug!("output device ready: {sample_rate} Hz, {channels} ch");
        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    /// Start playing `clip` from the beginning.
    pub fn play(&self, clip: &WavClip) -> Result<PlaybackHandle, PlaybackError> {
        let samples = prepare_for_device(clip, self.sample_rate, self.channels);
        let duration_secs = clip.duration_secs();

        let cursor = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(samples.is_empty()));
        let done = Arc::clone(&finished);

        let stream = self.device.build_output_stream(
            &self.config,
            move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let start = cursor.load(Ordering::Relaxed);
                let end = (start + out.len()).min(samples.len());
                let n = end - start;
                out[..n].copy_from_slice(&samples[start..end]);
                out[n..].fill(0.0);
                cursor.store(end, Ordering::Relaxed);
                if end == samples.len() {
                    done.store(true, Ordering::Relaxed);
                }
            },
            |err: cpal::StreamError| {
                log::error!("cpal output stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        Ok(PlaybackHandle {
            _stream: stream,
            finished,
            duration_secs,
        })
    }
}

/// Convert a clip to the device's rate and channel layout.
fn prepare_for_device(clip: &WavClip, rate: u32, channels: u16) -> Vec<f32> {
    let mono = downmix_to_mono(&clip.samples, clip.channels);
    let resampled = resample_linear(&mono, clip.sample_rate, rate);
    spread_channels(&resampled, channels)
}
