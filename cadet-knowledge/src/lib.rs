//! Local knowledge base for cadet-compass: loading, keyword scoring, and the
//! fallback replies served when the remote channel is unavailable.

pub mod errors;
pub mod fallback;
pub mod models;
pub mod score;
pub mod sources;
pub mod store;

pub use cadet_core::config::KnowledgeSettings;
pub use errors::{KnowledgeError, KnowledgeResult};
pub use fallback::{
    GUIDANCE_HEADER, NEED_MORE_DETAIL, VERIFICATION_RULE, fallback_reply, render_guidance,
};
pub use models::{KnowledgeBase, KnowledgeDocument, KnowledgeEntry, ScoredCandidate};
pub use score::{MAX_CANDIDATES, score, top_candidates};
pub use sources::KnowledgeSource;
pub use store::KnowledgeStore;
