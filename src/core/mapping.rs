//! Typed mapping tables, resolved once from step configuration.
//!
//! A mapping value in configuration is either a replacement string or an
//! object with an `options` list. Each option names the properties it
//! applies to (`ifProp`) and what to replace with: one string, or a list of
//! candidates that needs a choice.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::syntax::property_names_match;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    One(String),
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalOption {
    /// Property names this option applies to. Empty applies to all.
    pub if_prop: Vec<String>,
    pub replace: Replacement,
}

impl ConditionalOption {
    pub fn matches_property(&self, property_name: &str) -> bool {
        self.if_prop.is_empty()
            || self
                .if_prop
                .iter()
                .any(|p| property_names_match(p, property_name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    Replace(String),
    Conditional(Vec<ConditionalOption>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub token: String,
    pub mapping: Mapping,
}

/// Ordered token mappings. Order is the key order of the source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

// ============================================================================
// Raw configuration shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawConditional {
    options: Vec<RawOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOption {
    #[serde(default)]
    if_prop: Option<RawIfProp>,
    replace: RawReplacement,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIfProp {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReplacement {
    One(String),
    Many(Vec<String>),
}

impl MappingTable {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    /// Build from a `{ token: mapping }` object.
    pub fn from_mappings(mappings: &Map<String, Value>) -> Result<Self> {
        let mut entries = Vec::with_capacity(mappings.len());
        for (token, value) in mappings {
            if token.is_empty() {
                return Err(Error::mapping_invalid(token, "token cannot be empty"));
            }
            entries.push(MappingEntry {
                token: token.clone(),
                mapping: parse_mapping(token, value)?,
            });
        }
        Ok(Self { entries })
    }

    /// Build from a `css-values` / `style-values` step config.
    ///
    /// Accepts `{ mappings }`, `{ styleValues: { mappings } }`,
    /// `{ cssValues: { mappings } }` and `{ cssValues: { ... } }`.
    pub fn from_step_config(config: &Value) -> Result<Self> {
        let mappings = locate_mappings(config).ok_or_else(|| {
            Error::config_invalid_value(
                "mappings",
                None,
                "css-values step requires a 'mappings' object",
            )
        })?;
        Self::from_mappings(mappings)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn locate_mappings(config: &Value) -> Option<&Map<String, Value>> {
    if let Some(style) = config.get("styleValues") {
        return style.get("mappings").and_then(Value::as_object);
    }
    if let Some(css) = config.get("cssValues") {
        return match css.get("mappings") {
            Some(mappings) => mappings.as_object(),
            None => css.as_object(),
        };
    }
    config.get("mappings").and_then(Value::as_object)
}

fn parse_mapping(token: &str, value: &Value) -> Result<Mapping> {
    match value {
        Value::String(s) => Ok(Mapping::Replace(s.clone())),
        Value::Object(obj) if obj.contains_key("options") => {
            let raw: RawConditional = serde_json::from_value(value.clone())
                .map_err(|e| Error::mapping_invalid(token, e.to_string()))?;
            if raw.options.is_empty() {
                return Err(Error::mapping_invalid(token, "options list is empty"));
            }
            let options = raw
                .options
                .into_iter()
                .map(|opt| normalize_option(token, opt))
                .collect::<Result<Vec<_>>>()?;
            Ok(Mapping::Conditional(options))
        }
        other => Err(Error::mapping_invalid(
            token,
            format!(
                "expected a replacement string or an object with 'options', got {}",
                json_type_name(other)
            ),
        )),
    }
}

fn normalize_option(token: &str, raw: RawOption) -> Result<ConditionalOption> {
    let if_prop = match raw.if_prop {
        None => Vec::new(),
        Some(RawIfProp::One(p)) => vec![p],
        Some(RawIfProp::Many(props)) => props,
    };
    let replace = match raw.replace {
        RawReplacement::One(r) => Replacement::One(r),
        RawReplacement::Many(mut candidates) => match candidates.len() {
            0 => return Err(Error::mapping_invalid(token, "replacement choice list is empty")),
            1 => Replacement::One(candidates.remove(0)),
            _ => Replacement::Choice(candidates),
        },
    };
    Ok(ConditionalOption { if_prop, replace })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// simple-replace
// ============================================================================

/// Literal search/replace pairs for the `simple-replace` plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleMappings {
    pub pairs: Vec<(String, String)>,
}

impl SimpleMappings {
    pub fn from_step_config(config: &Value) -> Result<Self> {
        let mappings = config
            .get("mappings")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                Error::config_invalid_value(
                    "mappings",
                    None,
                    "simple-replace step requires a 'mappings' object",
                )
            })?;

        let mut pairs = Vec::with_capacity(mappings.len());
        for (search, replacement) in mappings {
            if search.is_empty() {
                return Err(Error::mapping_invalid(search, "token cannot be empty"));
            }
            let replacement = replacement.as_str().ok_or_else(|| {
                Error::mapping_invalid(
                    search,
                    format!(
                        "simple-replace expects a string, got {}",
                        json_type_name(replacement)
                    ),
                )
            })?;
            pairs.push((search.clone(), replacement.to_string()));
        }
        Ok(Self { pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserves_document_order() {
        let config: Value = serde_json::from_str(
            r#"{"mappings": {"--z": "--a", "--a": "--b", "--m": "--c"}}"#,
        )
        .unwrap();
        let table = MappingTable::from_step_config(&config).unwrap();
        let tokens: Vec<&str> = table.entries().iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["--z", "--a", "--m"]);
    }

    #[test]
    fn parses_all_three_shapes() {
        let config = json!({
            "mappings": {
                "--plain": "--new",
                "--cond": { "options": [
                    { "ifProp": ["color"], "replace": "--fg" },
                    { "ifProp": ["background-color"], "replace": ["--bg-1", "--bg-2"] }
                ]}
            }
        });
        let table = MappingTable::from_step_config(&config).unwrap();
        assert_eq!(table.entries()[0].mapping, Mapping::Replace("--new".to_string()));
        let Mapping::Conditional(options) = &table.entries()[1].mapping else {
            panic!("expected conditional mapping");
        };
        assert_eq!(options[0].replace, Replacement::One("--fg".to_string()));
        assert_eq!(
            options[1].replace,
            Replacement::Choice(vec!["--bg-1".to_string(), "--bg-2".to_string()])
        );
    }

    #[test]
    fn single_candidate_choice_becomes_one() {
        let config = json!({ "mappings": { "--t": { "options": [
            { "ifProp": ["color"], "replace": ["--only"] }
        ]}}});
        let table = MappingTable::from_step_config(&config).unwrap();
        let Mapping::Conditional(options) = &table.entries()[0].mapping else {
            panic!("expected conditional mapping");
        };
        assert_eq!(options[0].replace, Replacement::One("--only".to_string()));
    }

    #[test]
    fn empty_choice_list_is_invalid() {
        let config = json!({ "mappings": { "--t": { "options": [
            { "ifProp": ["color"], "replace": [] }
        ]}}});
        let err = MappingTable::from_step_config(&config).unwrap_err();
        assert_eq!(err.code.as_str(), "mapping.invalid");
        assert_eq!(err.details["token"], "--t");
    }

    #[test]
    fn wrong_types_are_invalid() {
        let config = json!({ "mappings": { "--t": 42 } });
        let err = MappingTable::from_step_config(&config).unwrap_err();
        assert!(err.message.contains("a number"));

        let config = json!({ "mappings": { "--t": { "options": [] } } });
        assert!(MappingTable::from_step_config(&config).is_err());
    }

    #[test]
    fn accepts_nested_config_shapes() {
        for config in [
            json!({ "styleValues": { "mappings": { "--a": "--b" } } }),
            json!({ "cssValues": { "mappings": { "--a": "--b" } } }),
            json!({ "cssValues": { "--a": "--b" } }),
        ] {
            let table = MappingTable::from_step_config(&config).unwrap();
            assert_eq!(table.len(), 1);
        }
        assert!(MappingTable::from_step_config(&json!({})).is_err());
    }

    #[test]
    fn if_prop_matching() {
        let any = ConditionalOption {
            if_prop: vec![],
            replace: Replacement::One("x".into()),
        };
        assert!(any.matches_property("anything"));

        let bg = ConditionalOption {
            if_prop: vec!["background-color".into()],
            replace: Replacement::One("x".into()),
        };
        assert!(bg.matches_property("backgroundColor"));
        assert!(!bg.matches_property("color"));
    }

    #[test]
    fn if_prop_accepts_single_string() {
        let config = json!({ "mappings": { "--t": { "options": [
            { "ifProp": "color", "replace": "--fg" }
        ]}}});
        let table = MappingTable::from_step_config(&config).unwrap();
        let Mapping::Conditional(options) = &table.entries()[0].mapping else {
            panic!("expected conditional mapping");
        };
        assert_eq!(options[0].if_prop, vec!["color".to_string()]);
    }

    #[test]
    fn simple_mappings_require_strings() {
        let ok = SimpleMappings::from_step_config(&json!({ "mappings": { "foo": "bar" } })).unwrap();
        assert_eq!(ok.pairs, vec![("foo".to_string(), "bar".to_string())]);

        let err = SimpleMappings::from_step_config(&json!({ "mappings": { "foo": 1 } })).unwrap_err();
        assert_eq!(err.code.as_str(), "mapping.invalid");
    }
}
