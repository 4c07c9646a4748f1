//! Heuristic extraction of style declarations from source text.
//!
//! - `css` - stylesheet rule blocks (`.css`, `.scss`, `.sass`)
//! - `css_in_js` - object-literal style declarations in program code

pub mod css;
pub mod css_in_js;

use serde::Serialize;
use std::fmt;
use std::ops::Range;

use crate::core::multi_value;
use crate::core::syntax::{line_col, Syntax};

/// Location of a property (or sub-value) in the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceSpan {
    pub fn from_range(text: &str, range: Range<usize>) -> Self {
        let (line, column) = line_col(text, range.start);
        Self {
            start: range.start,
            end: range.end,
            line,
            column,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Num(f64),
}

impl PropertyValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, PropertyValue::Num(_))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => write!(f, "{}", s),
            PropertyValue::Num(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub property_name: String,
    pub value: PropertyValue,
    /// Selector or object path of the enclosing rule.
    pub container_path: String,
    /// Span of this value, or of this sub-value for a composite.
    pub source_span: SourceSpan,
    /// Span of the whole declared value, which is what gets rewritten.
    pub value_span: Range<usize>,
    pub is_multi_value: bool,
    pub original_composite_value: Option<String>,
    pub position_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub container_id: String,
    pub properties: Vec<Property>,
    pub source_span: SourceSpan,
}

/// Parse `text` with the parser matching the file name.
pub fn parse_for_path(path: &str, text: &str) -> Vec<Rule> {
    match Syntax::for_path(path) {
        Syntax::Css => css::parse(text),
        Syntax::Scss => css::parse_scss(text),
        Syntax::Script => css_in_js::parse(text),
    }
}

/// Turn one declaration into properties, splitting composites.
///
/// `value_span` locates the unquoted value in `text`.
pub(crate) fn build_properties(
    text: &str,
    name: &str,
    value: PropertyValue,
    value_span: Range<usize>,
    container: &str,
) -> Vec<Property> {
    let whole = Property {
        property_name: name.to_string(),
        value: value.clone(),
        container_path: container.to_string(),
        source_span: SourceSpan::from_range(text, value_span.clone()),
        value_span: value_span.clone(),
        is_multi_value: false,
        original_composite_value: None,
        position_index: None,
    };

    let PropertyValue::Str(raw) = &value else {
        return vec![whole];
    };
    if !multi_value::should_split(name, raw) {
        return vec![whole];
    }

    multi_value::split_spans(raw)
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            let absolute = value_span.start + part.start..value_span.start + part.end;
            Property {
                property_name: name.to_string(),
                value: PropertyValue::Str(raw[part].to_string()),
                container_path: container.to_string(),
                source_span: SourceSpan::from_range(text, absolute),
                value_span: value_span.clone(),
                is_multi_value: true,
                original_composite_value: Some(raw.clone()),
                position_index: Some(idx),
            }
        })
        .collect()
}
