//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Secrets are never stored here; see [`super::Secrets`].

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// VisionConfig
// ---------------------------------------------------------------------------

/// Settings for the hosted multimodal model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,
    /// Model identifier (e.g. `"gemini-1.5-pro"`).
    pub model: String,
    /// Name of the environment variable that holds the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.  `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-1.5-pro".into(),
            api_key_env: "GOOGLE_API_KEY".into(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

/// Settings for the local OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Path to the `tesseract` executable.  A bare name is looked up on
    /// `PATH`.
    pub tesseract_cmd: PathBuf,
    /// Tesseract language code(s), e.g. `"eng"` or `"eng+deu"`.
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the local speech engine.
///
/// Rate and volume are deliberately absent: they are fixed by
/// [`crate::speech::SPEECH_RATE_WPM`] and [`crate::speech::SPEECH_VOLUME`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Path to the `espeak-ng` (or compatible `espeak`) executable.
    pub engine_cmd: PathBuf,
    /// Optional voice name passed as `-v`.  `None` uses the engine default.
    pub voice: Option<String>,
    /// The single artifact slot; overwritten on every synthesis.
    pub output_file: PathBuf,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine_cmd: PathBuf::from("espeak-ng"),
            voice: None,
            output_file: AppPaths::new().speech_file,
        }
    }
}

// ---------------------------------------------------------------------------
// AnimationConfig
// ---------------------------------------------------------------------------

/// Settings for the decorative loading animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Fetch the remote asset at all.
    pub enabled: bool,
    /// URL of the Lottie JSON asset.
    pub url: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://assets1.lottiefiles.com/packages/lf20_vykpwt8b.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// egui window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Initial window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
    /// Maximum edge length of the uploaded-image preview.
    pub preview_max_px: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (760.0, 820.0),
            preview_max_px: 480.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use perceiva::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hosted model settings.
    pub vision: VisionConfig,
    /// OCR engine settings.
    pub ocr: OcrConfig,
    /// Speech engine settings.
    pub speech: SpeechConfig,
    /// Loading animation settings.
    pub animation: AnimationConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// On first run the defaults are written there so they can be edited.
    pub fn load() -> Result<Self> {
        Self::load_or_init(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path`, or write the defaults there when it does not exist.
    pub fn load_or_init(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        config.save_to(path)?;
        log::info!("wrote default settings to {}", path.display());
        Ok(config)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
