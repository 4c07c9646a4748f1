//! Per-run memory of multiple-choice answers.

use std::collections::HashMap;

/// Answers keyed by token and candidate list. A skip is stored as `None` so
/// the same question is not asked twice in one run.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    answers: HashMap<(String, Vec<String>), Option<String>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(answer)` on a hit, where `answer` may itself be a cached skip.
    pub fn get(&self, token: &str, candidates: &[String]) -> Option<&Option<String>> {
        self.answers.get(&(token.to_string(), candidates.to_vec()))
    }

    pub fn insert(&mut self, token: &str, candidates: &[String], answer: Option<String>) {
        self.answers
            .entry((token.to_string(), candidates.to_vec()))
            .or_insert(answer);
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        vec!["--a".to_string(), "--b".to_string()]
    }

    #[test]
    fn keyed_by_token_and_candidates() {
        let mut cache = ResolutionCache::new();
        cache.insert("--t", &candidates(), Some("--b".to_string()));

        assert_eq!(cache.get("--t", &candidates()), Some(&Some("--b".to_string())));
        assert_eq!(cache.get("--t", &["--a".to_string()]), None);
        assert_eq!(cache.get("--u", &candidates()), None);
    }

    #[test]
    fn skips_are_remembered() {
        let mut cache = ResolutionCache::new();
        cache.insert("--t", &candidates(), None);
        assert_eq!(cache.get("--t", &candidates()), Some(&None));
    }

    #[test]
    fn first_answer_sticks() {
        let mut cache = ResolutionCache::new();
        cache.insert("--t", &candidates(), Some("--a".to_string()));
        cache.insert("--t", &candidates(), Some("--b".to_string()));
        assert_eq!(cache.get("--t", &candidates()), Some(&Some("--a".to_string())));
        assert_eq!(cache.len(), 1);
    }
}
