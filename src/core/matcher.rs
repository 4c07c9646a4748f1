//! Boundary-safe token matching.
//!
//! Every component that asks "does this value contain this token" goes through
//! here. A match is rejected when the byte before it is a word character
//! (`[A-Za-z0-9_]`) or the byte after it is alphanumeric or a hyphen, so
//! `--x-50` never matches inside `--x-500` or `--x-50-alt`.

/// Byte offsets of every boundary-safe, non-overlapping occurrence of `token`.
pub fn find_token_matches(text: &str, token: &str) -> Vec<usize> {
    let text_bytes = text.as_bytes();
    let token_len = token.len();
    let text_len = text_bytes.len();
    let mut matches = Vec::new();

    if token_len == 0 || token_len > text_len {
        return matches;
    }

    let mut start = 0;
    while start <= text_len - token_len {
        let Some(pos) = text[start..].find(token) else {
            break;
        };
        let abs = start + pos;
        let end = abs + token_len;

        let left_ok = abs == 0 || !is_word_byte(text_bytes[abs - 1]);
        let right_ok = end >= text_len || !is_trailing_ident_byte(text_bytes[end]);

        if left_ok && right_ok {
            matches.push(abs);
            start = end;
        } else {
            // Step over one whole char so slicing stays on a char boundary.
            let step = text[abs..].chars().next().map(char::len_utf8).unwrap_or(1);
            start = abs + step;
        }
    }

    matches
}

/// Number of boundary-safe occurrences of `token` in `text`.
pub fn count_occurrences(text: &str, token: &str) -> usize {
    find_token_matches(text, token).len()
}

pub fn contains_token(text: &str, token: &str) -> bool {
    !find_token_matches(text, token).is_empty()
}

/// Replace every boundary-safe occurrence of `token` with `replacement`.
pub fn replace_precise(text: &str, token: &str, replacement: &str) -> String {
    replace_precise_masked(text, text, token, replacement)
}

/// Like [`replace_precise`], but occurrences are found in `mask`, a copy of
/// `text` of equal length whose comments are blanked. Bytes outside the
/// matches, comments included, come from `text`.
pub fn replace_precise_masked(text: &str, mask: &str, token: &str, replacement: &str) -> String {
    debug_assert_eq!(text.len(), mask.len());
    let matches = find_token_matches(mask, token);
    if matches.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for pos in matches {
        out.push_str(&text[last..pos]);
        out.push_str(replacement);
        last = pos + token.len();
    }
    out.push_str(&text[last..]);
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_trailing_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_token_does_not_match_inside_longer() {
        assert_eq!(count_occurrences("var(--x-500)", "--x-50"), 0);
        assert_eq!(count_occurrences("var(--x-50-alt)", "--x-50"), 0);
        assert_eq!(replace_precise("var(--x-500)", "--x-50", "--y"), "var(--x-500)");
    }

    #[test]
    fn matches_inside_var_wrapper() {
        assert_eq!(count_occurrences("var(--x-50)", "--x-50"), 1);
        assert_eq!(replace_precise("var(--x-50)", "--x-50", "--y-50"), "var(--y-50)");
    }

    #[test]
    fn rejects_word_char_before_match() {
        assert_eq!(count_occurrences("a--x", "--x"), 0);
        assert_eq!(count_occurrences("_16px", "16px"), 0);
        assert_eq!(count_occurrences(" 16px", "16px"), 1);
    }

    #[test]
    fn underscore_after_match_is_allowed() {
        assert_eq!(count_occurrences("--x_suffix", "--x"), 1);
    }

    #[test]
    fn counts_every_occurrence() {
        let value = "var(--s) var(--s) 0 var(--s)";
        assert_eq!(count_occurrences(value, "var(--s)"), 3);
        assert_eq!(
            replace_precise(value, "var(--s)", "var(--t)"),
            "var(--t) var(--t) 0 var(--t)"
        );
    }

    #[test]
    fn masked_replace_skips_blanked_regions() {
        let text = "var(--a) /* --a */ 0";
        let mask = "var(--a)           0";
        assert_eq!(
            replace_precise_masked(text, mask, "--a", "--bb"),
            "var(--bb) /* --a */ 0"
        );
    }

    #[test]
    fn empty_token_never_matches() {
        assert!(find_token_matches("anything", "").is_empty());
        assert!(!contains_token("", "--x"));
    }

    #[test]
    fn handles_multibyte_text_around_rejected_match() {
        let text = "é--x-5é --x-5";
        assert_eq!(count_occurrences(text, "--x-5"), 2);
        assert_eq!(count_occurrences("--x-50é", "--x-5"), 0);
    }

    #[test]
    fn hex_colors_match_as_whole_values() {
        assert_eq!(count_occurrences("#fff", "#fff"), 1);
        assert_eq!(count_occurrences("#ffffff", "#fff"), 0);
    }
}
