//! Input validation primitives.
//!
//! Replace verbose `ok_or_else` + `Error::validation_invalid_argument` chains.

use crate::error::{Error, Result};

/// Require a string to be non-empty after trimming.
///
/// Returns a reference to the trimmed string on success.
pub fn require_non_empty<'a>(value: &'a str, field: &str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(Error::validation_invalid_argument(field, message, None, None))
    } else {
        Ok(trimmed)
    }
}

/// Collects validation problems so a caller can report all of them at once.
#[derive(Debug, Default)]
pub struct Problems {
    items: Vec<String>,
}

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, problem: impl Into<String>) {
        self.items.push(problem.into());
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Render as a bulleted list under `heading`.
    pub fn render(&self, heading: &str) -> String {
        let mut out = format!("{}:", heading);
        for item in &self.items {
            out.push_str("\n  - ");
            out.push_str(item);
        }
        out
    }
}
