//! Stylesheet parser: selector blocks and their declarations.

use super::{build_properties, PropertyValue, Rule, SourceSpan};
use crate::core::syntax::{scan_declarations, strip_comments, Blocks, Syntax};

/// Parse plain CSS.
pub fn parse(text: &str) -> Vec<Rule> {
    parse_with(text, Syntax::Css)
}

/// Parse SCSS or Sass, which also allow `//` line comments.
pub fn parse_scss(text: &str) -> Vec<Rule> {
    parse_with(text, Syntax::Scss)
}

fn parse_with(text: &str, syntax: Syntax) -> Vec<Rule> {
    let stripped = strip_comments(text, syntax);
    let blocks = Blocks::scan(&stripped, syntax);
    let mut rules = Vec::new();

    for block in blocks.iter() {
        let interior = block.start + 1..block.end;
        let decls = scan_declarations(&stripped, interior, &blocks, syntax);
        if decls.is_empty() {
            continue;
        }

        let selector = selector_before(&stripped, block.start, syntax);
        let properties = decls
            .iter()
            .flat_map(|decl| {
                let value = stripped[decl.value.clone()].to_string();
                build_properties(
                    text,
                    &decl.name,
                    PropertyValue::Str(value),
                    decl.value.clone(),
                    &selector,
                )
            })
            .collect();

        rules.push(Rule {
            container_id: selector,
            properties,
            source_span: SourceSpan::from_range(text, block.start..block.end + 1),
        });
    }

    rules
}

/// Text between the previous `;`, `{` or `}` and the block's `{`.
///
/// SCSS `#{...}` interpolations are part of the selector.
fn selector_before(stripped: &str, open: usize, syntax: Syntax) -> String {
    let bytes = stripped.as_bytes();
    let mut i = open;
    let start = loop {
        if i == 0 {
            break 0;
        }
        i -= 1;
        match bytes[i] {
            b'}' if syntax == Syntax::Scss => match interpolation_start(bytes, i) {
                Some(hash) => i = hash,
                None => break i + 1,
            },
            b';' | b'{' | b'}' => break i + 1,
            _ => {}
        }
    };
    stripped[start..open]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Offset of the `#` opening the interpolation closed at `close`.
fn interpolation_start(bytes: &[u8], close: usize) -> Option<usize> {
    let open = bytes[..close].iter().rposition(|&b| b == b'{' || b == b'}')?;
    (bytes[open] == b'{' && open > 0 && bytes[open - 1] == b'#').then(|| open - 1)
}
