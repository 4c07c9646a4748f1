//! Object-literal style parser for program code (`style={{ ... }}`,
//! `const styles = { ... }`, style maps passed to CSS-in-JS helpers).
//!
//! This is a heuristic scan, not a JavaScript parser. A balanced `{...}`
//! span is treated as a style object only when it references a custom
//! property, is not a type declaration or an interpolated template, and
//! carries at least one declaration that looks like CSS.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use super::{build_properties, PropertyValue, Rule, SourceSpan};
use crate::core::syntax::{
    normalize_property_name, scan_declarations, strip_comments, window_before, Blocks, Syntax,
};

/// Markers in the text before a `{` that mean it opens a type, not a value.
const NON_STYLE_CONTEXTS: &[&str] = &[
    "interface ",
    "type ",
    "Record<",
    "CSSProperties",
    "React.FC",
    "React.Component",
    "styled.",
];

const CONTEXT_WINDOW: usize = 100;
const PATH_WINDOW: usize = 200;

/// Known style property names in kebab-case; camelCase keys are normalized
/// before lookup.
const CSS_PROPERTIES: &[&str] = &[
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "color",
    "background-color",
    "background",
    "border",
    "border-color",
    "border-width",
    "border-style",
    "border-radius",
    "font-size",
    "font-weight",
    "font-family",
    "line-height",
    "letter-spacing",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "display",
    "position",
    "top",
    "right",
    "bottom",
    "left",
    "flex",
    "flex-direction",
    "flex-wrap",
    "justify-content",
    "align-items",
    "gap",
    "opacity",
    "z-index",
    "overflow",
    "text-align",
    "text-decoration",
    "box-shadow",
    "outline",
    "fill",
    "stroke",
    "cursor",
    "user-select",
    "transition",
    "transform",
    "animation",
];

const CSS_KEYWORDS: &[&str] = &["auto", "none", "inherit", "initial", "unset"];

pub fn parse(text: &str) -> Vec<Rule> {
    let stripped = strip_comments(text, Syntax::Script);
    let blocks = Blocks::scan(&stripped, Syntax::Script);
    let mut rules = Vec::new();

    for block in blocks.iter() {
        let span_text = &stripped[block.start..=block.end];
        if !span_text.contains("var(--") {
            continue;
        }
        if span_text.contains('`') && span_text.contains("${") {
            continue;
        }
        let context = window_before(&stripped, block.start, CONTEXT_WINDOW);
        if NON_STYLE_CONTEXTS.iter().any(|marker| context.contains(marker)) {
            continue;
        }

        let interior = block.start + 1..block.end;
        let mut properties = Vec::new();
        let mut container: Option<String> = None;

        for decl in scan_declarations(&stripped, interior, &blocks, Syntax::Script) {
            let raw = &stripped[decl.value.clone()];
            if is_expression(raw) {
                continue;
            }
            let (value, value_span) = clean_value(raw, decl.value.clone());
            if !is_css_property(&decl.name) && !looks_like_css_value(&value.to_string()) {
                continue;
            }
            let path = container.get_or_insert_with(|| object_path(&stripped, block.start));
            properties.extend(build_properties(text, &decl.name, value, value_span, path));
        }

        if let Some(container_id) = container {
            rules.push(Rule {
                container_id,
                properties,
                source_span: SourceSpan::from_range(text, block.start..block.end + 1),
            });
        }
    }

    rules
}

/// Values that are code rather than style: arrow functions, conditionals and
/// type annotations.
fn is_expression(raw: &str) -> bool {
    if raw.contains("=>") || raw.contains('?') || raw.contains("&&") || raw.contains("||") {
        return true;
    }
    raw.contains(':')
        && (raw.contains("string") || raw.contains("number") || raw.contains("boolean"))
}

/// Strip quotes or backticks and read numeric literals.
///
/// Returns the value and the span of its text in the source, inside any
/// quotes.
fn clean_value(raw: &str, span: Range<usize>) -> (PropertyValue, Range<usize>) {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if matches!(first, b'\'' | b'"' | b'`') && bytes[bytes.len() - 1] == first {
            let inner = &raw[1..raw.len() - 1];
            return (
                PropertyValue::Str(inner.to_string()),
                span.start + 1..span.end - 1,
            );
        }
    }

    if numeric_literal().is_match(raw) {
        if let Ok(n) = raw.parse::<f64>() {
            return (PropertyValue::Num(n), span);
        }
    }

    (PropertyValue::Str(raw.to_string()), span)
}

fn numeric_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)$").unwrap())
}

pub(crate) fn is_numeric_literal(value: &str) -> bool {
    numeric_literal().is_match(value)
}

/// Known property in either naming convention.
pub fn is_css_property(name: &str) -> bool {
    let normalized = normalize_property_name(name);
    CSS_PROPERTIES.contains(&normalized.as_str())
}

/// Custom property reference, unit-suffixed number, color function, hex
/// color or global keyword.
pub fn looks_like_css_value(value: &str) -> bool {
    static UNIT: OnceLock<Regex> = OnceLock::new();
    let unit = UNIT.get_or_init(|| {
        Regex::new(r"(?:^|[\s(,])-?(?:\d+\.?\d*|\.\d+)(?:px|rem|em|%|vh|vw)(?:$|[\s),])").unwrap()
    });

    let trimmed = value.trim();
    trimmed.contains("var(--")
        || unit.is_match(trimmed)
        || trimmed.starts_with("rgb")
        || trimmed.starts_with("hsl")
        || trimmed.starts_with('#')
        || CSS_KEYWORDS.contains(&trimmed)
}

/// Name of the object opened at `open`: the assigned variable, the key it
/// sits under, or a member assignment target. Falls back to `anonymous`.
fn object_path(stripped: &str, open: usize) -> String {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]*)?=\s*$").unwrap(),
            Regex::new(r#"['"]?([A-Za-z_$][\w$-]*)['"]?\s*:\s*$"#).unwrap(),
            Regex::new(r"([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*=\s*$").unwrap(),
        ]
    });

    let head = window_before(stripped, open, PATH_WINDOW);
    patterns
        .iter()
        .find_map(|re| re.captures(head))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}
