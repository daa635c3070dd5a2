/// Failures while reading a single knowledge source.
///
/// These never leave the store: a failing source is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no candidate source could be loaded")]
    NoSource,
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
