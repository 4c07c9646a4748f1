//! Built-in migration plugins.

use serde::Serialize;
use serde_json::Value;

use crate::core::change::{Change, ChangeSet};
use crate::core::interaction::LogLevel;
use crate::core::mapping::{MappingTable, SimpleMappings};
use crate::core::resolver::{self, Resolution, ResolveContext};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plugin {
    SimpleReplace,
    CssValues,
    StyleValues,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
}

impl Plugin {
    pub const ALL: [Plugin; 3] = [Plugin::SimpleReplace, Plugin::CssValues, Plugin::StyleValues];

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| Error::plugin_not_found(name, &Self::names()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Plugin::SimpleReplace => "simple-replace",
            Plugin::CssValues => "css-values",
            Plugin::StyleValues => "style-values",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Plugin::SimpleReplace => "Literal search and replace of every occurrence",
            Plugin::CssValues => "Context-aware design token replacement in CSS and CSS-in-JS",
            Plugin::StyleValues => "Alias of css-values",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Plugin::name).collect()
    }

    pub fn catalog() -> Vec<PluginInfo> {
        Self::ALL
            .iter()
            .map(|p| PluginInfo {
                name: p.name(),
                description: p.description(),
            })
            .collect()
    }

    /// Run this plugin over `text` with the step's `config`.
    ///
    /// A malformed `css-values` table is logged and leaves the text as is;
    /// a malformed `simple-replace` config is an error.
    pub fn apply(&self, text: &str, config: &Value, ctx: &mut ResolveContext) -> Result<Resolution> {
        match self {
            Plugin::SimpleReplace => {
                let mappings = SimpleMappings::from_step_config(config)?;
                Ok(simple_replace(text, &mappings))
            }
            Plugin::CssValues | Plugin::StyleValues => match MappingTable::from_step_config(config) {
                Ok(table) => Ok(resolver::resolve_file(&table, text, ctx)),
                Err(err) => {
                    ctx.interaction.log(
                        &format!("Error processing CSS values: {}", err),
                        LogLevel::Error,
                    );
                    Ok(Resolution::unchanged(text))
                }
            },
        }
    }
}

/// Literal replace-all, pair by pair in table order.
pub fn simple_replace(text: &str, mappings: &SimpleMappings) -> Resolution {
    let mut data = text.to_string();
    let mut changes = ChangeSet::new();

    for (search, replacement) in &mappings.pairs {
        let count = data.matches(search.as_str()).count();
        if count > 0 {
            data = data.replace(search.as_str(), replacement);
            changes.record(search, replacement, count);
        }
    }

    Resolution {
        data,
        changes: changes.into_vec(),
    }
}

/// Changes of one file as a log line each.
pub fn describe_changes(changes: &[Change], file: &str) -> Vec<String> {
    changes
        .iter()
        .map(|c| {
            format!(
                "Replaced {} occurrence(s) of '{}' with '{}' in {}",
                c.occurrence_count, c.original, c.replacement, file
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::ResolutionCache;
    use crate::core::interaction::ScriptedInteraction;
    use serde_json::json;

    #[test]
    fn names_round_trip() {
        for plugin in Plugin::ALL {
            assert_eq!(Plugin::from_name(plugin.name()).unwrap(), plugin);
        }
    }

    #[test]
    fn unknown_plugin_lists_available() {
        let err = Plugin::from_name("nope").unwrap_err();
        assert_eq!(err.code.as_str(), "plugin.not_found");
        assert!(err.hints[0].message.contains("simple-replace"));
    }

    #[test]
    fn simple_replace_is_literal() {
        let mappings = SimpleMappings {
            pairs: vec![("foo".to_string(), "bar".to_string())],
        };
        let result = simple_replace("foo food foo", &mappings);
        assert_eq!(result.data, "bar bard bar");
        assert_eq!(result.changes, vec![Change::replace("foo", "bar", 3)]);
    }

    #[test]
    fn malformed_css_values_config_is_logged_not_raised() {
        let mut ui = ScriptedInteraction::non_interactive();
        let mut cache = ResolutionCache::new();
        let mut ctx = ResolveContext {
            file_path: "a.css",
            interactive: false,
            interaction: &mut ui,
            cache: &mut cache,
            progress: None,
        };
        let text = ".a { color: var(--a); }";
        let config = json!({ "mappings": { "--a": 1 } });
        let result = Plugin::CssValues.apply(text, &config, &mut ctx).unwrap();
        assert_eq!(result.data, text);
        assert_eq!(ui.logs_at(LogLevel::Error).len(), 1);
    }

    #[test]
    fn style_values_accepts_nested_shape() {
        let mut ui = ScriptedInteraction::non_interactive();
        let mut cache = ResolutionCache::new();
        let mut ctx = ResolveContext {
            file_path: "a.css",
            interactive: false,
            interaction: &mut ui,
            cache: &mut cache,
            progress: None,
        };
        let config = json!({ "styleValues": { "mappings": { "--a": "--b" } } });
        let result = Plugin::StyleValues
            .apply(".a { color: var(--a); }", &config, &mut ctx)
            .unwrap();
        assert_eq!(result.data, ".a { color: var(--b); }");
    }

    #[test]
    fn describes_changes_for_logs() {
        let lines = describe_changes(&[Change::replace("a", "b", 2)], "x.css");
        assert_eq!(lines, vec!["Replaced 2 occurrence(s) of 'a' with 'b' in x.css"]);
    }
}
