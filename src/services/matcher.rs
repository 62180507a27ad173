//! Knowledge base matching.
//!
//! Matching is literal bidirectional substring containment over the
//! normalized input, evaluated in knowledge base declaration order. The first
//! entry that matches wins; there is no scoring.

use std::sync::Arc;

use crate::models::knowledge::{KnowledgeBase, KnowledgeEntry};
use crate::services::normalizer::normalize;

/// Outcome of resolving a user question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Reply text to deliver.
    pub text: String,
    /// Position of the matched entry, `None` for the fallback answer.
    pub entry_index: Option<usize>,
}

impl Answer {
    pub fn is_fallback(&self) -> bool {
        self.entry_index.is_none()
    }
}

/// Resolves raw user text into an answer.
pub trait AnswerMatcher: Send + Sync {
    fn resolve(&self, raw: &str) -> Answer;
}

/// Returns the first entry whose key contains the input or is contained by it.
///
/// `normalized` must already have gone through [`normalize`].
pub fn find_entry<'a>(normalized: &str, kb: &'a KnowledgeBase) -> Option<(usize, &'a KnowledgeEntry)> {
    kb.iter()
        .enumerate()
        .find(|(_, entry)| normalized.contains(entry.key.as_str()) || entry.key.contains(normalized))
}

/// Answer text for already-normalized input, or `fallback` when nothing matches.
pub fn match_answer<'a>(normalized: &str, kb: &'a KnowledgeBase, fallback: &'a str) -> &'a str {
    find_entry(normalized, kb)
        .map(|(_, entry)| entry.answer.as_str())
        .unwrap_or(fallback)
}

/// Matcher over a fixed knowledge base.
pub struct KnowledgeMatcher {
    knowledge: Arc<KnowledgeBase>,
    fallback_answer: String,
}

impl KnowledgeMatcher {
    pub fn new(knowledge: Arc<KnowledgeBase>, fallback_answer: impl Into<String>) -> Self {
        Self {
            knowledge,
            fallback_answer: fallback_answer.into(),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn fallback_answer(&self) -> &str {
        &self.fallback_answer
    }
}

impl AnswerMatcher for KnowledgeMatcher {
    fn resolve(&self, raw: &str) -> Answer {
        let normalized = normalize(raw);
        match find_entry(&normalized, &self.knowledge) {
            Some((index, entry)) => {
                tracing::debug!("Matched knowledge entry {} ({:?})", index, entry.key);
                Answer {
                    text: entry.answer.clone(),
                    entry_index: Some(index),
                }
            }
            None => {
                tracing::debug!("No knowledge entry matched {:?}, using fallback", normalized);
                Answer {
                    text: self.fallback_answer.clone(),
                    entry_index: None,
                }
            }
        }
    }
}

/// 创建匹配服务
pub fn create_answer_matcher(
    knowledge: Arc<KnowledgeBase>,
    fallback_answer: impl Into<String>,
) -> Arc<dyn AnswerMatcher> {
    Arc::new(KnowledgeMatcher::new(knowledge, fallback_answer))
}
