//! Validation, recategorization and deduplication of question candidates

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::taxonomy::Category;

/// A validated FAQ question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCandidate {
    pub category: Category,
    pub question: String,
}

impl QuestionCandidate {
    pub fn new(category: Category, question: impl Into<String>) -> Self {
        Self {
            category,
            question: question.into(),
        }
    }

    /// Identity used for deduplication.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.category, &self.question)
    }
}

/// `(category, lower-cased question)` identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    category: Category,
    question: String,
}

impl DedupKey {
    pub fn new(category: Category, question: &str) -> Self {
        Self {
            category,
            question: question.trim().to_lowercase(),
        }
    }
}

/// Accumulates accepted questions up to a limit, rejecting duplicates.
#[derive(Debug)]
pub struct QuestionSet {
    limit: usize,
    seen: HashSet<DedupKey>,
    items: Vec<QuestionCandidate>,
}

impl QuestionSet {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::with_capacity(limit),
            items: Vec::with_capacity(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.items.len())
    }

    pub fn contains(&self, candidate: &QuestionCandidate) -> bool {
        self.seen.contains(&candidate.dedup_key())
    }

    /// Accept a candidate unless the set is full or already holds its key.
    pub fn insert(&mut self, candidate: QuestionCandidate) -> bool {
        if self.is_full() {
            return false;
        }
        if !self.seen.insert(candidate.dedup_key()) {
            return false;
        }
        self.items.push(candidate);
        true
    }

    pub fn into_vec(self) -> Vec<QuestionCandidate> {
        self.items
    }
}

/// Coerce one raw record into a candidate, or `None` when it has the wrong shape.
pub fn normalize_candidate(raw: &Value) -> Option<QuestionCandidate> {
    let obj = raw.as_object()?;

    let category = match obj.get("category") {
        None | Some(Value::Null) => Category::DEFAULT,
        Some(Value::String(s)) => Category::normalize(s),
        Some(other) => Category::normalize(&other.to_string()),
    };

    let question = obj.get("question")?.as_str()?.trim();
    if question.is_empty() {
        return None;
    }

    Some(QuestionCandidate::new(category, question))
}

/// Feed raw records into `set` in order until it fills; returns how many were accepted.
pub fn normalize_into(set: &mut QuestionSet, raw: &[Value]) -> usize {
    let mut accepted = 0;
    for item in raw {
        if set.is_full() {
            break;
        }
        match normalize_candidate(item) {
            Some(candidate) => {
                if set.insert(candidate) {
                    accepted += 1;
                }
            }
            None => tracing::trace!("Skipping malformed candidate: {}", item),
        }
    }
    accepted
}

/// Normalize raw records into at most `limit` unique candidates.
pub fn normalize(raw: &[Value], limit: usize) -> Vec<QuestionCandidate> {
    let mut set = QuestionSet::new(limit);
    normalize_into(&mut set, raw);
    set.into_vec()
}
