//! Value migration resolver: decides what every mapped token occurrence
//! becomes and rewrites the file text.
//!
//! Composite (multi-value) declarations are resolved first, part by part,
//! and rebuilt as a whole. Every other declaration is then resolved entry
//! by entry in table order. Edits are collected per declaration value and
//! applied to the original text from end to start.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use crate::core::cache::ResolutionCache;
use crate::core::change::{Change, ChangeSet};
use crate::core::interaction::{
    ChoiceOption, ChoiceRequest, CodePreview, Interaction, LogLevel, ProgressInfo,
};
use crate::core::mapping::{Mapping, MappingEntry, MappingTable, Replacement};
use crate::core::matcher::{contains_token, count_occurrences, find_token_matches};
use crate::core::multi_value::{code_spans, reconstruct, replace_in_value};
use crate::core::parser::{self, css_in_js::is_numeric_literal, PropertyValue, Rule};
use crate::core::syntax::{strip_comments, Syntax};
use crate::error::{Error, Result};

/// Everything a resolution pass may consult besides the text itself.
pub struct ResolveContext<'a> {
    pub file_path: &'a str,
    /// Whether multiple-choice replacements may be put to the user.
    pub interactive: bool,
    pub interaction: &'a mut dyn Interaction,
    pub cache: &'a mut ResolutionCache,
    pub progress: Option<ProgressInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub data: String,
    pub changes: Vec<Change>,
}

impl Resolution {
    pub fn unchanged(text: &str) -> Self {
        Self {
            data: text.to_string(),
            changes: Vec::new(),
        }
    }
}

/// One declaration value that may be rewritten. `original` and `working`
/// hold source bytes, comments included.
struct Target<'r> {
    property_name: &'r str,
    span: Range<usize>,
    original: String,
    working: String,
    numeric: bool,
    composite: bool,
}

/// Parse `text` by the context's file name, then resolve.
pub fn resolve_file(table: &MappingTable, text: &str, ctx: &mut ResolveContext) -> Resolution {
    let rules = parser::parse_for_path(ctx.file_path, text);
    resolve(table, &rules, text, ctx)
}

/// Resolve `table` against the parsed `rules` of `text`.
///
/// Never fails: on error the original text comes back with no changes and
/// the error is logged.
pub fn resolve(
    table: &MappingTable,
    rules: &[Rule],
    text: &str,
    ctx: &mut ResolveContext,
) -> Resolution {
    match try_resolve(table, rules, text, ctx) {
        Ok(resolution) => resolution,
        Err(err) => {
            ctx.interaction.log(
                &format!("Error processing CSS values: {}", err),
                LogLevel::Error,
            );
            Resolution::unchanged(text)
        }
    }
}

fn try_resolve(
    table: &MappingTable,
    rules: &[Rule],
    text: &str,
    ctx: &mut ResolveContext,
) -> Result<Resolution> {
    let syntax = Syntax::for_path(ctx.file_path).value_syntax();
    let mut targets = collect_targets(rules, text);
    let mut changes = ChangeSet::new();

    for target in targets.iter_mut().filter(|t| t.composite) {
        resolve_composite(table, target, text, syntax, ctx, &mut changes)?;
    }

    for entry in table.entries() {
        for target in targets.iter_mut().filter(|t| !t.composite) {
            resolve_value(entry, target, text, syntax, ctx, &mut changes)?;
        }
    }

    Ok(Resolution {
        data: apply_edits(text, &targets),
        changes: changes.into_vec(),
    })
}

/// One target per declared value, in file order. Sub-values of a composite
/// collapse into a single target covering the whole value.
fn collect_targets<'r>(rules: &'r [Rule], text: &str) -> Vec<Target<'r>> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for prop in rules.iter().flat_map(|r| r.properties.iter()) {
        if !seen.insert(prop.value_span.start) {
            continue;
        }
        // Parsed values have their comments blanked; rewrite from the source.
        let original = match &prop.value {
            PropertyValue::Num(n) => n.to_string(),
            PropertyValue::Str(_) => text
                .get(prop.value_span.clone())
                .map(str::to_string)
                .unwrap_or_else(|| prop.value.to_string()),
        };
        targets.push(Target {
            property_name: &prop.property_name,
            span: prop.value_span.clone(),
            working: original.clone(),
            original,
            numeric: prop.value.is_numeric(),
            composite: prop.is_multi_value,
        });
    }

    targets.sort_by_key(|t| t.span.start);
    targets
}

// ============================================================================
// Passes
// ============================================================================

fn resolve_composite(
    table: &MappingTable,
    target: &mut Target,
    text: &str,
    syntax: Syntax,
    ctx: &mut ResolveContext,
    changes: &mut ChangeSet,
) -> Result<()> {
    // Tokens that span several parts can only match the value as a whole.
    for entry in table.entries().iter().filter(|e| spans_parts(&e.token)) {
        resolve_value(entry, target, text, syntax, ctx, changes)?;
    }

    let base = target.working.clone();
    let mut parts: Vec<String> = code_spans(&base, syntax)
        .into_iter()
        .map(|range| base[range].to_string())
        .collect();
    let mut replaced = BTreeMap::new();

    for entry in table.entries().iter().filter(|e| !spans_parts(&e.token)) {
        let hits: Vec<usize> = (0..parts.len())
            .filter(|&idx| contains_token(&strip_comments(&parts[idx], syntax), &entry.token))
            .collect();
        if hits.is_empty() {
            continue;
        }

        let offset = occurrence_offset(target, &entry.token, syntax);
        let Some(replacement) = replacement_for(entry, target.property_name, offset, text, ctx)?
        else {
            continue;
        };
        if replacement == entry.token {
            continue;
        }

        let mut count = 0;
        for idx in hits {
            count += count_occurrences(&strip_comments(&parts[idx], syntax), &entry.token);
            parts[idx] = replace_in_value(&parts[idx], &entry.token, &replacement, syntax);
            replaced.insert(idx, parts[idx].clone());
        }
        changes.record(&entry.token, &replacement, count);
    }

    target.working = reconstruct(&base, syntax, &replaced);
    Ok(())
}

fn resolve_value(
    entry: &MappingEntry,
    target: &mut Target,
    text: &str,
    syntax: Syntax,
    ctx: &mut ResolveContext,
    changes: &mut ChangeSet,
) -> Result<()> {
    let code = strip_comments(&target.working, syntax);
    if !contains_token(&code, &entry.token) {
        return Ok(());
    }

    let offset = occurrence_offset(target, &entry.token, syntax);
    let Some(replacement) = replacement_for(entry, target.property_name, offset, text, ctx)? else {
        return Ok(());
    };
    if replacement == entry.token {
        return Ok(());
    }

    let count = count_occurrences(&code, &entry.token);
    target.working = replace_in_value(&target.working, &entry.token, &replacement, syntax);
    changes.record(&entry.token, &replacement, count);
    Ok(())
}

fn spans_parts(token: &str) -> bool {
    token.contains(char::is_whitespace)
}

/// Absolute offset of the first occurrence of `token` in the target's
/// original value, or the value start when it was introduced by an earlier
/// replacement.
fn occurrence_offset(target: &Target, token: &str, syntax: Syntax) -> usize {
    let within = find_token_matches(&strip_comments(&target.original, syntax), token)
        .first()
        .copied()
        .unwrap_or(0);
    target.span.start + within
}

// ============================================================================
// Replacement selection
// ============================================================================

fn replacement_for(
    entry: &MappingEntry,
    property_name: &str,
    offset: usize,
    text: &str,
    ctx: &mut ResolveContext,
) -> Result<Option<String>> {
    match &entry.mapping {
        Mapping::Replace(replacement) => Ok(Some(replacement.clone())),
        Mapping::Conditional(options) => {
            // First matching option wins.
            let Some(option) = options.iter().find(|o| o.matches_property(property_name)) else {
                return Ok(None);
            };
            match &option.replace {
                Replacement::One(replacement) => Ok(Some(replacement.clone())),
                Replacement::Choice(candidates) => {
                    choose(&entry.token, candidates, property_name, offset, text, ctx)
                }
            }
        }
    }
}

fn choose(
    token: &str,
    candidates: &[String],
    property_name: &str,
    offset: usize,
    text: &str,
    ctx: &mut ResolveContext,
) -> Result<Option<String>> {
    if let Some(cached) = ctx.cache.get(token, candidates) {
        let cached = cached.clone();
        ctx.interaction.log(
            &format!(
                "Using cached choice for \"{}\": {}",
                token,
                cached.as_deref().unwrap_or("skip")
            ),
            LogLevel::Debug,
        );
        return Ok(cached);
    }

    if !ctx.interactive {
        ctx.interaction.log(
            &format!(
                "Non-interactive mode: skipping replacement for \"{}\" in property \"{}\" (requires user choice)",
                token, property_name
            ),
            LogLevel::Info,
        );
        return Ok(None);
    }

    let request = ChoiceRequest {
        question: format!(
            "Multiple replacement options for \"{}\" in property \"{}\":",
            token, property_name
        ),
        options: candidates
            .iter()
            .enumerate()
            .map(|(idx, value)| ChoiceOption {
                value: value.clone(),
                label: value.clone(),
                description: format!("Option {}", idx + 1),
            })
            .collect(),
        allow_skip: true,
        code_preview: Some(CodePreview::build(text, ctx.file_path, offset, token.len())),
        progress: ctx.progress.clone(),
    };

    let answer = ctx.interaction.ask_choice(&request)?;
    if let Some(value) = &answer {
        if !candidates.contains(value) {
            return Err(Error::interaction_failed(format!(
                "'{}' is not one of the offered replacements for \"{}\"",
                value, token
            )));
        }
    }

    ctx.cache.insert(token, candidates, answer.clone());
    if answer.is_none() {
        ctx.interaction
            .log(&format!("Skipped replacement for \"{}\"", token), LogLevel::Info);
    }
    Ok(answer)
}

// ============================================================================
// Rewriting
// ============================================================================

fn apply_edits(text: &str, targets: &[Target]) -> String {
    let mut edits: Vec<(Range<usize>, String)> = targets
        .iter()
        .filter(|t| t.working != t.original)
        .map(|t| (t.span.clone(), render(t)))
        .collect();

    // End to start, so earlier offsets stay valid.
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

    let mut out = text.to_string();
    let mut floor = usize::MAX;
    for (range, value) in edits {
        if range.end > floor {
            continue;
        }
        floor = range.start;
        out.replace_range(range, &value);
    }
    out
}

/// A bare numeric literal that became a non-number is quoted.
fn render(target: &Target) -> String {
    if target.numeric && !is_numeric_literal(&target.working) {
        format!("'{}'", target.working)
    } else {
        target.working.clone()
    }
}
