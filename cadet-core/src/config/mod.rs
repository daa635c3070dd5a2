//! Configuration management for cadet-compass.
//!
//! Secrets come from environment variables, settings from a TOML file.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - backend credential (optional)
//! - `OPENAI_MODEL` - model override (optional)
//!
//! ## Settings (TOML File)
//! Located at `~/.config/cadet-compass/config.toml`:
//! ```toml
//! [gateway]
//! host = "127.0.0.1"
//! port = 8888
//!
//! [model]
//! model = "gpt-5-mini"
//! max_output_tokens = 700
//!
//! [knowledge]
//! sources = ["./data/knowledge.json"]
//! ```

mod secrets;
mod settings;

pub use secrets::Secrets;
pub use settings::{
    ClientSettings, GatewaySettings, KnowledgeSettings, LimitSettings, LoggingSettings,
    ModelSettings, Settings, SettingsError,
};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Model identifier is empty")]
    EmptyModel,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// A missing backend credential is allowed; only unreadable settings or
    /// an empty model identifier are errors.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let settings = Settings::load()?;
        let config = Self { secrets, settings };

        if config.model_id().is_empty() {
            return Err(ConfigError::EmptyModel);
        }

        Ok(config)
    }

    /// Effective model identifier (`OPENAI_MODEL` wins over the settings file).
    pub fn model_id(&self) -> &str {
        self.secrets
            .openai_model
            .as_deref()
            .unwrap_or(self.settings.model.model.trim())
    }

    /// Get the backend API key (if configured).
    pub fn openai_api_key(&self) -> Option<&str> {
        self.secrets.openai_api_key.as_deref()
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        self.settings.bind_addr()
    }

    /// Get the size limits.
    pub fn limits(&self) -> LimitSettings {
        self.settings.limits
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
