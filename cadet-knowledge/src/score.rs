//! Deterministic keyword scoring over the knowledge base.

use crate::models::{KnowledgeBase, KnowledgeEntry, ScoredCandidate};

/// At most this many entries are quoted in a fallback reply.
pub const MAX_CANDIDATES: usize = 3;

const KEYWORD_WEIGHT: u32 = 2;
const TOPIC_WEIGHT: u32 = 1;

/// Score every entry against `question`, highest first.
///
/// The sort is stable, so ties keep knowledge-base order.
pub fn score<'a>(question: &str, base: &'a KnowledgeBase) -> Vec<ScoredCandidate<'a>> {
    let question = question.to_lowercase();
    let mut scored: Vec<ScoredCandidate<'a>> = base
        .entries()
        .iter()
        .map(|entry| ScoredCandidate {
            entry,
            score: score_entry(&question, entry),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// The entries worth quoting: up to [`MAX_CANDIDATES`] with a positive score.
pub fn top_candidates<'a>(question: &str, base: &'a KnowledgeBase) -> Vec<ScoredCandidate<'a>> {
    score(question, base)
        .into_iter()
        .take(MAX_CANDIDATES)
        .filter(|candidate| candidate.score > 0)
        .collect()
}

/// `question` must already be lowercase.
fn score_entry(question: &str, entry: &KnowledgeEntry) -> u32 {
    let keyword_hits = entry
        .keywords
        .iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty() && question.contains(keyword.as_str()))
        .count() as u32;

    // A topic that is also a keyword was already counted above.
    let topic = entry.topic.trim().to_lowercase();
    let topic_is_keyword = entry
        .keywords
        .iter()
        .any(|keyword| keyword.trim().to_lowercase() == topic);
    let topic_hit = !topic.is_empty() && !topic_is_keyword && question.contains(topic.as_str());

    keyword_hits * KEYWORD_WEIGHT + if topic_hit { TOPIC_WEIGHT } else { 0 }
}
