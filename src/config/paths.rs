//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\perceiva\
//!   macOS:   ~/Library/Application Support/perceiva/
//!   Linux:   ~/.config/perceiva/
//!
//! Data dir (synthesized speech):
//!   Windows: %LOCALAPPDATA%\perceiva\
//!   macOS:   ~/Library/Application Support/perceiva/
//!   Linux:   ~/.local/share/perceiva/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for generated artifacts.
    pub data_dir: PathBuf,
    /// Default location of the speech artifact.
    pub speech_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "perceiva";

    /// File name of the single speech artifact slot.
    pub const SPEECH_FILE_NAME: &'static str = "text-to-speech-local.wav";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let speech_file = data_dir.join(Self::SPEECH_FILE_NAME);

        Self {
            config_dir,
            settings_file,
            data_dir,
            speech_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
