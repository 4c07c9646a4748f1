//! Shared scanning primitives for the stylesheet and object-literal parsers.
//!
//! Both parsers work on a comment-stripped copy of the source whose byte
//! offsets equal the original's, so every span found here can be used to
//! rewrite the original text directly.

use heck::ToKebabCase;
use std::ops::Range;

/// Host syntax of a source file. Decides quoting, comment and separator rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Css,
    Scss,
    Script,
}

impl Syntax {
    /// `.css` is plain CSS, `.scss`/`.sass` allow `//` comments, everything
    /// else is treated as program code holding style objects.
    pub fn for_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".css") {
            Syntax::Css
        } else if lower.ends_with(".scss") || lower.ends_with(".sass") {
            Syntax::Scss
        } else {
            Syntax::Script
        }
    }

    /// Comment rules for a declared value on its own. Style values in program
    /// code are CSS text, where `//` belongs to a URL.
    pub fn value_syntax(self) -> Syntax {
        match self {
            Syntax::Script => Syntax::Css,
            other => other,
        }
    }

    fn is_quote(&self, b: u8) -> bool {
        match self {
            Syntax::Css | Syntax::Scss => b == b'"' || b == b'\'',
            Syntax::Script => b == b'"' || b == b'\'' || b == b'`',
        }
    }

    fn is_separator(&self, b: u8) -> bool {
        match self {
            Syntax::Css | Syntax::Scss => b == b';',
            Syntax::Script => b == b',' || b == b';',
        }
    }

    fn has_line_comments(&self) -> bool {
        matches!(self, Syntax::Scss | Syntax::Script)
    }
}

// ============================================================================
// Comments and strings
// ============================================================================

/// Blank out every comment byte with a space, keeping newlines, so offsets and
/// line numbers in the result match the input.
pub fn strip_comments(text: &str, syntax: Syntax) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut paren_depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if syntax.is_quote(b) {
            i = skip_string(bytes, i);
            continue;
        }

        match b {
            b'(' => paren_depth += 1,
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = find_from(bytes, i + 2, b"*/")
                    .map(|p| p + 2)
                    .unwrap_or(bytes.len());
                blank(&mut out, i..end);
                i = end;
                continue;
            }
            // Unquoted url(http://...) in SCSS is not a comment.
            b'/' if bytes.get(i + 1) == Some(&b'/')
                && syntax.has_line_comments()
                && (syntax == Syntax::Script || paren_depth == 0) =>
            {
                let end = find_from(bytes, i, b"\n").unwrap_or(bytes.len());
                blank(&mut out, i..end);
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| text.to_string())
}

/// Index just past the string literal starting at `start`.
///
/// Single and double quoted strings stop at an unescaped newline so a stray
/// apostrophe cannot swallow the rest of the file.
pub(crate) fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' if quote != b'`' => return j,
            c if c == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn blank(out: &mut [u8], range: Range<usize>) {
    for b in &mut out[range] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// Balanced `{`/`}` pairs of a stripped source, ordered by opening offset.
///
/// Unbalanced braces are dropped rather than reported.
#[derive(Debug, Default)]
pub struct Blocks {
    pairs: Vec<Range<usize>>,
}

impl Blocks {
    pub fn scan(stripped: &str, syntax: Syntax) -> Self {
        let bytes = stripped.as_bytes();
        let mut stack = Vec::new();
        let mut pairs = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];
            if syntax.is_quote(b) {
                i = skip_string(bytes, i);
                continue;
            }
            if let Some(end) = interpolation_end(bytes, i, syntax) {
                i = end;
                continue;
            }
            match b {
                b'{' => stack.push(i),
                b'}' => {
                    if let Some(open) = stack.pop() {
                        pairs.push(open..i);
                    }
                }
                _ => {}
            }
            i += 1;
        }

        pairs.sort_by_key(|r| r.start);
        Self { pairs }
    }

    /// Each range runs from the `{` offset to the matching `}` offset.
    pub fn iter(&self) -> impl Iterator<Item = &Range<usize>> {
        self.pairs.iter()
    }

    pub fn close_of(&self, open: usize) -> Option<usize> {
        self.pairs
            .binary_search_by_key(&open, |r| r.start)
            .ok()
            .map(|idx| self.pairs[idx].end)
    }
}

/// Index just past a SCSS `#{...}` interpolation starting at `start`.
///
/// Interpolations are part of a value or selector, never a block.
pub(crate) fn interpolation_end(bytes: &[u8], start: usize, syntax: Syntax) -> Option<usize> {
    if syntax != Syntax::Scss || bytes[start] != b'#' || bytes.get(start + 1) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    for (j, &b) in bytes.iter().enumerate().skip(start + 1) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j + 1);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Declarations
// ============================================================================

/// One `name: value` entry found directly inside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    /// Trimmed raw value, quotes included.
    pub value: Range<usize>,
}

/// Split the direct interior of a block into declarations.
///
/// Nested blocks end the entry in progress and are skipped whole, so a nested
/// selector or an object-valued key never yields a declaration. A trailing
/// entry without a terminator is still accepted.
pub fn scan_declarations(
    stripped: &str,
    interior: Range<usize>,
    blocks: &Blocks,
    syntax: Syntax,
) -> Vec<Declaration> {
    let bytes = stripped.as_bytes();
    let mut decls = Vec::new();
    let mut entry_start = interior.start;
    let mut depth = 0usize;
    let mut i = interior.start;

    while i < interior.end {
        let b = bytes[i];

        if syntax.is_quote(b) {
            i = skip_string(bytes, i).min(interior.end);
            continue;
        }
        if let Some(end) = interpolation_end(bytes, i, syntax) {
            i = end.min(interior.end);
            continue;
        }

        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'{' => {
                i = blocks
                    .close_of(i)
                    .map(|close| close + 1)
                    .unwrap_or(interior.end);
                entry_start = i;
                depth = 0;
                continue;
            }
            _ if depth == 0 && syntax.is_separator(b) => {
                decls.extend(parse_entry(stripped, entry_start..i, syntax));
                entry_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if entry_start < interior.end {
        decls.extend(parse_entry(stripped, entry_start..interior.end, syntax));
    }

    decls
}

fn parse_entry(stripped: &str, range: Range<usize>, syntax: Syntax) -> Option<Declaration> {
    let bytes = stripped.as_bytes();
    let colon = top_level_colon(bytes, range.clone(), syntax)?;

    let name_range = trim_range(stripped, range.start..colon);
    let raw_name = &stripped[name_range.clone()];
    let name = match syntax {
        Syntax::Script => unquote_key(raw_name)?,
        Syntax::Css | Syntax::Scss => raw_name,
    };
    if !is_valid_property_name(name, syntax) {
        return None;
    }

    let value = trim_range(stripped, colon + 1..range.end);
    if value.is_empty() {
        return None;
    }

    Some(Declaration {
        name: name.to_string(),
        value,
    })
}

fn top_level_colon(bytes: &[u8], range: Range<usize>, syntax: Syntax) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = range.start;
    while i < range.end {
        let b = bytes[i];
        if syntax.is_quote(b) {
            // A quoted key is allowed before the colon.
            i = skip_string(bytes, i);
            continue;
        }
        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn unquote_key(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    match bytes.first() {
        Some(&q) if q == b'\'' || q == b'"' => {
            if raw.len() >= 2 && bytes[raw.len() - 1] == q {
                Some(&raw[1..raw.len() - 1])
            } else {
                None
            }
        }
        _ => Some(raw),
    }
}

fn is_valid_property_name(name: &str, syntax: Syntax) -> bool {
    if name.is_empty() {
        return false;
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
    match syntax {
        Syntax::Css | Syntax::Scss => {
            name.chars().all(allowed) && !name.starts_with(|c: char| c.is_ascii_digit())
        }
        Syntax::Script => name.chars().all(allowed),
    }
}

// ============================================================================
// Offsets and names
// ============================================================================

/// Shrink `range` so it excludes surrounding whitespace.
pub fn trim_range(text: &str, range: Range<usize>) -> Range<usize> {
    let slice = &text[range.clone()];
    let start = range.start + (slice.len() - slice.trim_start().len());
    let end = range.end - (slice.len() - slice.trim_end().len());
    if start >= end {
        start..start
    } else {
        start..end
    }
}

/// 1-based line and column (in chars) of a byte offset.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = floor_char_boundary(text, offset.min(text.len()));
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = text[line_start..offset].chars().count() + 1;
    (line, column)
}

/// Up to `max_bytes` of text ending at `end`, cut on a char boundary.
pub fn window_before(text: &str, end: usize, max_bytes: usize) -> &str {
    let end = floor_char_boundary(text, end.min(text.len()));
    let mut start = end.saturating_sub(max_bytes);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..end]
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Convention-free property key: `backgroundColor`, `background-color` and
/// `BACKGROUND_COLOR` all become `background-color`.
pub fn normalize_property_name(name: &str) -> String {
    name.to_kebab_case()
}

pub fn property_names_match(a: &str, b: &str) -> bool {
    normalize_property_name(a) == normalize_property_name(b)
}
