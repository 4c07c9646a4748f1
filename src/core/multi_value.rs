//! Composite (multi-value) property splitting and reconstruction.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::core::matcher::replace_precise_masked;
use crate::core::syntax::{normalize_property_name, strip_comments, Syntax};

/// Properties whose values are whitespace-separated positional lists.
const MULTI_VALUE_PROPERTIES: &[&str] = &[
    "margin",
    "margin-block",
    "margin-inline",
    "padding",
    "padding-block",
    "padding-inline",
    "border",
    "border-top",
    "border-right",
    "border-bottom",
    "border-left",
    "border-width",
    "border-style",
    "border-color",
    "border-radius",
    "box-shadow",
    "text-shadow",
    "background",
    "background-position",
    "background-size",
    "transform",
    "transition",
    "animation",
    "gap",
    "inset",
];

pub fn is_multi_value_property(name: &str) -> bool {
    let normalized = normalize_property_name(name);
    MULTI_VALUE_PROPERTIES.contains(&normalized.as_str())
}

/// Whether a declaration should be decomposed into positional sub-values.
pub fn should_split(name: &str, value: &str) -> bool {
    is_multi_value_property(name)
        && value.contains(char::is_whitespace)
        && split_spans(value).len() > 1
}

/// Byte ranges of the whitespace-separated parts of `value`.
///
/// Whitespace inside parentheses or quotes does not separate parts, so
/// `rgba(0, 0, 0, 0.5)` and `var(--a, 1px)` stay whole.
pub fn split_spans(value: &str) -> Vec<Range<usize>> {
    let bytes = value.as_bytes();
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => {
                quote = Some(b);
                start.get_or_insert(i);
            }
            b'(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            b')' => depth = depth.saturating_sub(1),
            _ if b.is_ascii_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    spans.push(s..i);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        spans.push(s..bytes.len());
    }

    spans
}

/// Part ranges of a source value that may hold comments. Comments count as
/// separators, never as parts.
pub fn code_spans(value: &str, syntax: Syntax) -> Vec<Range<usize>> {
    split_spans(&strip_comments(value, syntax))
}

/// Rebuild `original` with the parts at the given indices replaced.
///
/// Separators between parts, comments included, are kept byte for byte.
/// Each replacement is passed through [`normalize_wrapper`] against the part
/// it replaces.
pub fn reconstruct(
    original: &str,
    syntax: Syntax,
    replacements: &BTreeMap<usize, String>,
) -> String {
    if replacements.is_empty() {
        return original.to_string();
    }

    let mut out = String::with_capacity(original.len());
    let mut last = 0;
    for (idx, range) in code_spans(original, syntax).into_iter().enumerate() {
        out.push_str(&original[last..range.start]);
        let part = &original[range.clone()];
        match replacements.get(&idx) {
            Some(replacement) => out.push_str(&normalize_wrapper(part, replacement)),
            None => out.push_str(part),
        }
        last = range.end;
    }
    out.push_str(&original[last..]);
    out
}

/// Keep a replaced part in the same `var()` form as the part it replaces.
///
/// A bare custom property replacing `var(...)` is wrapped; a `var(--x)`
/// replacing a bare custom property is unwrapped. Anything else is kept.
pub fn normalize_wrapper(original_part: &str, replacement: &str) -> String {
    if is_var_wrapped(original_part) && replacement.starts_with("--") {
        return format!("var({})", replacement);
    }
    if original_part.starts_with("--") && is_var_wrapped(replacement) {
        let inner = &replacement[4..replacement.len() - 1];
        if inner.starts_with("--") && !inner.contains(',') {
            return inner.trim().to_string();
        }
    }
    replacement.to_string()
}

/// Replace `token` inside `value` through the boundary-safe matcher.
///
/// Occurrences inside comments are left alone. When the replacement is
/// already a `var()` expression and the token is a bare name, `var(token)`
/// is collapsed into the replacement instead of being nested as
/// `var(var(...))`.
pub fn replace_in_value(value: &str, token: &str, replacement: &str, syntax: Syntax) -> String {
    let mut result = value.to_string();
    if is_var_wrapped(replacement) && !is_var_wrapped(token) {
        let wrapped = format!("var({})", token);
        let mask = strip_comments(&result, syntax);
        result = replace_precise_masked(&result, &mask, &wrapped, replacement);
    }
    let mask = strip_comments(&result, syntax);
    replace_precise_masked(&result, &mask, token, replacement)
}

pub fn is_var_wrapped(value: &str) -> bool {
    value.starts_with("var(") && value.ends_with(')')
}
