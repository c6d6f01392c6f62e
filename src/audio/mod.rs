//! Local playback of the synthesized speech artifact.
//!
//! ```text
//! WAV file → read_wav → WavClip → downmix/resample → cpal output stream
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use perceiva::audio::{read_wav, AudioPlayer};
//!
//! let clip = read_wav("text-to-speech-local.wav".as_ref()).unwrap();
//! let player = AudioPlayer::new().unwrap();
//! let handle = player.play(&clip).unwrap(); // drop handle → stops playback
//! while !handle.is_finished() {
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! ```

pub mod playback;
pub mod resample;
pub mod wav;

pub use playback::{AudioPlayer, PlaybackError, PlaybackHandle};
pub use resample::{downmix_to_mono, resample_linear, spread_channels};
pub use wav::{parse_wav, read_wav, WavClip};
