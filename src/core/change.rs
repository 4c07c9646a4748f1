//! Change records reported per file.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub original: String,
    pub replacement: String,
    pub occurrence_count: usize,
}

impl Change {
    pub fn replace(original: &str, replacement: &str, occurrence_count: usize) -> Self {
        Self {
            kind: ChangeKind::Replace,
            original: original.to_string(),
            replacement: replacement.to_string(),
            occurrence_count,
        }
    }
}

/// One change per distinct (original, replacement) pair, in first-seen
/// order, with counts summed.
#[derive(Debug, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, original: &str, replacement: &str, count: usize) {
        if count == 0 {
            return;
        }
        match self
            .changes
            .iter_mut()
            .find(|c| c.original == original && c.replacement == replacement)
        {
            Some(existing) => existing.occurrence_count += count,
            None => self.changes.push(Change::replace(original, replacement, count)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_vec(self) -> Vec<Change> {
        self.changes
    }
}
