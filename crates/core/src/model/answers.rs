use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers picked by the user, keyed by 0-based question index.
///
/// Sparse until every question has been answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<usize, String>);

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the answer for `index`, replacing any earlier pick.
    pub fn record(&mut self, index: usize, answer: impl Into<String>) {
        self.0.insert(index, answer.into());
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.0.contains_key(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(idx, answer)| (*idx, answer.as_str()))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_twice_overwrites() {
        let mut answers = AnswerMap::new();
        answers.record(2, "first");
        answers.record(2, "second");
        assert_eq!(answers.get(2), Some("second"));
        assert_eq!(answers.len(), 1);
        assert!(!answers.is_answered(0));
    }

    #[test]
    fn serializes_as_index_keyed_object() {
        let mut answers = AnswerMap::new();
        answers.record(0, "A");
        answers.record(3, "B");
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"0":"A","3":"B"}"#);
        let back: AnswerMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, answers);
    }
}
