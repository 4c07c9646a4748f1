//! Batch window parsing for the `--batch SIZE-NUMBER` flag.

use crate::error::{Error, Result};

/// A half-open window `[start, end)` into the discovered file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchWindow {
    pub start: usize,
    pub end: usize,
}

/// Parse `SIZE-NUMBER` (e.g. `50-2` selects files 51 through 100).
pub fn parse_batch_range(range: &str, total_files: usize) -> Result<BatchWindow> {
    let invalid = |problem: String| {
        Error::validation_invalid_argument("batch", problem, Some(range.to_string()), None)
    };

    let (size, number) = range
        .trim()
        .split_once('-')
        .ok_or_else(|| invalid("Invalid batch format. Use SIZE-NUMBER (e.g., 50-1)".to_string()))?;

    let parse = |s: &str| -> Result<usize> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(
                "Invalid batch format. Use SIZE-NUMBER (e.g., 50-1)".to_string(),
            ));
        }
        s.parse::<usize>()
            .map_err(|_| invalid(format!("Batch value out of range: {}", s)))
    };

    let size = parse(size)?;
    let number = parse(number)?;

    if size == 0 || number == 0 {
        return Err(invalid(
            "Batch size and batch number must be positive integers".to_string(),
        ));
    }

    let start = (number - 1).saturating_mul(size);
    if start >= total_files {
        return Err(invalid(format!(
            "Batch {} is out of range. Total files: {}",
            number, total_files
        )));
    }

    Ok(BatchWindow {
        start,
        end: start.saturating_add(size).min(total_files),
    })
}
