use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::KnowledgeBase;
use crate::sources::KnowledgeSource;

/// Session-scoped, memoized access to the knowledge base.
///
/// The first successful load is cached for the lifetime of the store. A load
/// where every source fails is not cached, so a later call retries.
#[derive(Debug)]
pub struct KnowledgeStore {
    sources: Vec<KnowledgeSource>,
    client: reqwest::Client,
    cache: OnceCell<Arc<KnowledgeBase>>,
}

impl KnowledgeStore {
    pub fn new(sources: Vec<KnowledgeSource>) -> Self {
        Self {
            sources,
            client: reqwest::Client::new(),
            cache: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &KnowledgeSettings) -> Self {
        Self::new(
            settings
                .sources
                .iter()
                .map(|location| KnowledgeSource::parse(location))
                .collect(),
        )
    }

    /// A store that is already loaded with `base` and never reads a source.
    pub fn preloaded(base: KnowledgeBase) -> Self {
        Self {
            sources: Vec::new(),
            client: reqwest::Client::new(),
            cache: OnceCell::new_with(Some(Arc::new(base))),
        }
    }

    pub fn sources(&self) -> &[KnowledgeSource] {
        &self.sources
    }

    /// Whether a knowledge base has been cached.
    pub fn is_loaded(&self) -> bool {
        self.cache.initialized()
    }

    /// Return the knowledge base, loading it on first use.
    ///
    /// Never fails: when no source can be read the result is an empty base.
    pub async fn load(&self) -> Arc<KnowledgeBase> {
        match self.cache.get_or_try_init(|| self.load_first_source()).await {
            Ok(base) => Arc::clone(base),
            Err(e) => {
                warn!("Knowledge base unavailable, using empty base: {}", e);
                Arc::new(KnowledgeBase::empty())
            }
        }
    }

    async fn load_first_source(&self) -> KnowledgeResult<Arc<KnowledgeBase>> {
        for source in &self.sources {
            match source.load(&self.client).await {
                Ok(base) => {
                    info!("Loaded {} knowledge entries from {}", base.len(), source);
                    return Ok(Arc::new(base));
                }
                Err(e) => {
                    warn!("Skipping knowledge source {}: {}", source, e);
                }
            }
        }
        Err(KnowledgeError::NoSource)
    }
}
