//! Process-environment secrets.
//!
//! The model API key is never written to `settings.toml`.  It is read once at
//! startup from the variable named by [`VisionConfig::api_key_env`]; a missing
//! or blank value is fatal.

use thiserror::Error;

use super::VisionConfig;

/// Startup-time secret lookup failure.
#[derive(Debug, Error, PartialEq)]
pub enum SecretsError {
    #[error("API key not found! Please set the {0} environment variable.")]
    MissingApiKey(String),
}

/// Credentials resolved at startup and passed down explicitly.
#[derive(Clone)]
pub struct Secrets {
    api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Read the API key from the process environment.
    ///
    /// Call [`dotenvy::dotenv`] beforehand to pick up a local `.env` file.
    pub fn from_env(config: &VisionConfig) -> Result<Self, SecretsError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    /// Resolve the API key through an arbitrary lookup function.
    pub fn from_lookup<F>(config: &VisionConfig, lookup: F) -> Result<Self, SecretsError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(&config.api_key_env) {
            Some(key) if !key.trim().is_empty() => Ok(Self {
                api_key: key.trim().to_string(),
            }),
            _ => Err(SecretsError::MissingApiKey(config.api_key_env.clone())),
        }
    }

    /// Construct directly from a known key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_an_error() {
        let config = VisionConfig::default();
        let err = Secrets::from_lookup(&config, |_| None).unwrap_err();
        assert_eq!(err, SecretsError::MissingApiKey("GOOGLE_API_KEY".into()));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn blank_key_is_an_error() {
        let config = VisionConfig::default();
        assert!(Secrets::from_lookup(&config, |_| Some("   ".into())).is_err());
    }

    #[test]
    fn lookup_uses_configured_variable_name() {
        let config = VisionConfig {
            api_key_env: "PERCEIVA_KEY".into(),
            ..VisionConfig::default()
        };
        let secrets = Secrets::from_lookup(&config, |name| {
            assert_eq!(name, "PERCEIVA_KEY");
            Some("abc123\n".into())
        })
        .unwrap();
        assert_eq!(secrets.api_key(), "abc123");
    }

    #[test]
    fn debug_output_redacts_key() {
        let secrets = Secrets::with_api_key("super-secret");
        let rendered = format!("{secrets:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
