use serde::{Deserialize, Serialize};

/// One topic of the static knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub answer: String,
}

impl KnowledgeEntry {
    pub fn new(
        topic: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            answer: answer.into(),
        }
        .normalized()
    }

    /// Drop blank and case-insensitively repeated keywords, keeping the first spelling.
    fn normalized(mut self) -> Self {
        let mut seen: Vec<String> = Vec::with_capacity(self.keywords.len());
        self.keywords.retain(|keyword| {
            let folded = keyword.trim().to_lowercase();
            if folded.is_empty() || seen.contains(&folded) {
                return false;
            }
            seen.push(folded);
            true
        });
        self
    }
}

/// On-disk / on-wire knowledge source format: `{ "items": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeDocument {
    pub items: Vec<KnowledgeEntry>,
}

impl KnowledgeDocument {
    pub fn into_base(self) -> KnowledgeBase {
        KnowledgeBase::new(self.items)
    }
}

/// Ordered, immutable collection of knowledge entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Entries without an answer are dropped; nothing could be shown for them.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|entry| !entry.answer.trim().is_empty())
            .map(KnowledgeEntry::normalized)
            .collect();
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An entry with its score for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    pub entry: &'a KnowledgeEntry,
    pub score: u32,
}
