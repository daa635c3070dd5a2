//! Local-channel reply templates.

use crate::models::{KnowledgeBase, ScoredCandidate};
use crate::score::top_candidates;

/// Returned when no entry matches the question.
pub const NEED_MORE_DETAIL: &str = "I can help, but I need one more detail: your grade (8–12) and your target pathway (academy / ROTC / enlistment / guard).\n\nIn the meantime: use the 8–12 Roadmap page and verify requirements on official pages.";

pub const GUIDANCE_HEADER: &str =
    "Here is guidance based on the Cadet Compass local knowledge base:\n\n";

pub const VERIFICATION_RULE: &str = "Verification rule: requirements and deadlines can change. Use official links in Student Toolkit to confirm.";

/// Build the local reply for `question`. Never fails.
pub fn fallback_reply(question: &str, base: &KnowledgeBase) -> String {
    render_guidance(&top_candidates(question, base))
}

/// Render selected candidates as bullet guidance, or ask for more detail when
/// there are none.
pub fn render_guidance(candidates: &[ScoredCandidate<'_>]) -> String {
    if candidates.is_empty() {
        return NEED_MORE_DETAIL.to_string();
    }

    let mut out = String::from(GUIDANCE_HEADER);
    for candidate in candidates {
        out.push_str("• ");
        out.push_str(&candidate.entry.answer);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(VERIFICATION_RULE);
    out
}
