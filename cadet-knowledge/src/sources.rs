//! Candidate locations for the knowledge base document.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::{KnowledgeBase, KnowledgeDocument};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A place the knowledge document may be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeSource {
    File(PathBuf),
    Url(String),
}

impl KnowledgeSource {
    /// `http://` and `https://` locations are URLs, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Fetch and parse this source.
    pub async fn load(&self, client: &reqwest::Client) -> KnowledgeResult<KnowledgeBase> {
        let body = match self {
            Self::File(path) => tokio::fs::read(path).await?,
            Self::Url(url) => {
                let response = client.get(url).timeout(FETCH_TIMEOUT).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(KnowledgeError::HttpStatus(status.as_u16()));
                }
                response.bytes().await?.to_vec()
            }
        };
        let document: KnowledgeDocument = serde_json::from_slice(&body)?;
        Ok(document.into_base())
    }
}

impl std::fmt::Display for KnowledgeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}
