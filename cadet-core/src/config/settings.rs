//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in the XDG config directory
//! (~/.config/cadet-compass/config.toml).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# cadet-compass configuration file
# Located at: ~/.config/cadet-compass/config.toml
#
# This file contains non-sensitive configuration.
# Secrets are loaded from environment variables:
#   - OPENAI_API_KEY (without it the gateway answers 501 and clients use local guidance)
#   - OPENAI_MODEL   (optional, overrides [model].model)

[gateway]
host = "127.0.0.1"
port = 8888

[model]
base_url = "https://api.openai.com/v1"
model = "gpt-5-mini"
max_output_tokens = 700
# Some models reject sampling parameters; only set this when supported.
# temperature = 0.2

[knowledge]
# Tried in order; the first file or URL that parses wins.
sources = [
  "./data/knowledge.json",
  "./site/data/knowledge.json",
  "./docs/data/knowledge.json",
]

[client]
gateway_url = "http://127.0.0.1:8888/api/chat"
timeout_seconds = 60

[limits]
max_message_chars = 2000
max_prior_chars = 12000
max_detail_chars = 900

[logging]
level = "info"
"#;

/// Settings loaded from the TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Gateway server configuration
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Remote model backend configuration
    #[serde(default)]
    pub model: ModelSettings,

    /// Local knowledge base sources
    #[serde(default)]
    pub knowledge: KnowledgeSettings,

    /// Advisory client configuration
    #[serde(default)]
    pub client: ClientSettings,

    /// Input and diagnostic size limits
    #[serde(default)]
    pub limits: LimitSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Gateway server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Host to bind to
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

/// Remote model backend settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelSettings {
    /// Base URL of the Responses API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model_id")]
    pub model: String,

    /// Output token budget; answers hitting it come back truncated
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature, omitted from requests when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Backend request timeout in seconds
    #[serde(default = "default_model_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Knowledge base settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KnowledgeSettings {
    /// Candidate sources (paths or http(s) URLs) in priority order
    #[serde(default = "default_knowledge_sources")]
    pub sources: Vec<String>,
}

/// Advisory client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    /// Full URL of the gateway advisory route
    #[serde(default = "default_client_gateway_url")]
    pub gateway_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_client_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Size limits, counted in characters
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LimitSettings {
    /// Longer messages are truncated, not rejected
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Continuation context keeps this many trailing characters
    #[serde(default = "default_max_prior_chars")]
    pub max_prior_chars: usize,

    /// Upstream error bodies are cut to this length
    #[serde(default = "default_max_detail_chars")]
    pub max_detail_chars: usize,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8888
}

fn default_model_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model_id() -> String {
    "gpt-5-mini".to_string()
}

fn default_max_output_tokens() -> u32 {
    700
}

fn default_model_timeout_seconds() -> u64 {
    60
}

fn default_knowledge_sources() -> Vec<String> {
    vec![
        "./data/knowledge.json".to_string(),
        "./site/data/knowledge.json".to_string(),
        "./docs/data/knowledge.json".to_string(),
    ]
}

fn default_client_gateway_url() -> String {
    "http://127.0.0.1:8888/api/chat".to_string()
}

fn default_client_timeout_seconds() -> u64 {
    60
}

fn default_max_message_chars() -> usize {
    2000
}

fn default_max_prior_chars() -> usize {
    12000
}

fn default_max_detail_chars() -> usize {
    900
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: default_model_base_url(),
            model: default_model_id(),
            max_output_tokens: default_max_output_tokens(),
            temperature: None,
            timeout_seconds: default_model_timeout_seconds(),
        }
    }
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            sources: default_knowledge_sources(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            gateway_url: default_client_gateway_url(),
            timeout_seconds: default_client_timeout_seconds(),
        }
    }
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            max_prior_chars: default_max_prior_chars(),
            max_detail_chars: default_max_detail_chars(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("Creating default configuration at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    ///
    /// Uses `$CADET_COMPASS_CONFIG_DIR/config.toml` when set, otherwise the
    /// XDG config directory: `~/.config/cadet-compass/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("CADET_COMPASS_CONFIG_DIR") {
            return Ok(PathBuf::from(override_dir).join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("cadet-compass");

        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TOML)?;
        Ok(())
    }

    /// Get the HTTP bind address for the gateway.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}
