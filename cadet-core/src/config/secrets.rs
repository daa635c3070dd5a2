//! Secrets configuration loaded from environment variables only.
//!
//! API keys must never be written to the TOML settings file.

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,

    /// Model override (env: OPENAI_MODEL)
    pub openai_model: Option<String>,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Also loads a `.env` file if present (development convenience).
    /// A missing key is not an error: the gateway reports itself as not
    /// configured and clients fall back to local guidance.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_env_inner()
    }

    pub(crate) fn from_env_inner() -> Self {
        Self {
            openai_api_key: non_blank_var("OPENAI_API_KEY"),
            openai_model: non_blank_var("OPENAI_MODEL"),
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
