//! Migration configuration: loading, validation and defaults.
//!
//! Configuration files may be JSON, TOML or YAML, chosen by extension. The
//! document is validated as a whole before it is deserialized, so every
//! problem is reported at once.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::core::discovery::matches_any;
use crate::error::{Error, Result};
use crate::utils::io;
use crate::utils::validation::{require_non_empty, Problems};

pub const DEFAULT_CONFIG_FILE: &str = "tokenshift.config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigratorConfig {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub migrations: Vec<MigrationStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationStep {
    pub name: String,
    pub plugin: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl MigrationStep {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Step-level include/exclude filter on a file path.
    pub fn applies_to(&self, path: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_empty() && !matches_any(include, path) {
                return false;
            }
        }
        match &self.exclude {
            Some(exclude) => !matches_any(exclude, path),
            None => true,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
    Yaml,
}

fn format_for(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "toml" => Some(Format::Toml),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(path).into_owned());
    PathBuf::from(expanded)
}

/// Load and validate a configuration file.
pub fn load_config(path: &str) -> Result<MigratorConfig> {
    let path_str = require_non_empty(path, "config", "Configuration path cannot be empty")?;
    let resolved = expand_path(path_str);
    let display = resolved.display().to_string();

    if !resolved.exists() {
        return Err(Error::config_not_found(display));
    }
    let format = format_for(&resolved).ok_or_else(|| Error::config_unsupported_format(&display))?;

    let content = io::read_file(&resolved, "read config")?;
    let document = parse_document(&content, format).map_err(|e| Error::config_invalid_json(&display, e))?;

    validate_config(&document)?;

    serde_json::from_value(document).map_err(|e| Error::config_invalid_json(display, e))
}

fn parse_document(content: &str, format: Format) -> std::result::Result<Value, String> {
    match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yml::from_str(content).map_err(|e| e.to_string()),
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check the raw document, collecting every problem before failing.
pub fn validate_config(document: &Value) -> Result<()> {
    let mut problems = Problems::new();

    let Some(root) = document.as_object() else {
        problems.push("configuration must be an object");
        return Err(invalid(&problems));
    };

    match root.get("include") {
        None => problems.push("missing required field: 'include'"),
        Some(value) => check_patterns(value, "include", true, &mut problems),
    }
    if let Some(value) = root.get("exclude") {
        check_patterns(value, "exclude", false, &mut problems);
    }

    match root.get("migrations") {
        None => problems.push("missing required field: 'migrations'"),
        Some(Value::Array(steps)) if steps.is_empty() => {
            problems.push("field 'migrations' cannot be empty")
        }
        Some(Value::Array(steps)) => {
            for (idx, step) in steps.iter().enumerate() {
                check_step(idx, step, &mut problems);
            }
        }
        Some(_) => problems.push("field 'migrations' must be an array"),
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(invalid(&problems))
    }
}

fn invalid(problems: &Problems) -> Error {
    let mut err = Error::config_invalid_value(
        "config",
        None,
        problems.render("Invalid configuration"),
    );
    err.details["problems"] = json!(problems.items());
    err
}

fn check_patterns(value: &Value, field: &str, required: bool, problems: &mut Problems) {
    match value.as_array() {
        Some(items) if items.iter().all(Value::is_string) => {
            if required && items.is_empty() {
                problems.push(format!("field '{}' cannot be empty", field));
            }
        }
        _ => problems.push(format!("field '{}' must be an array of strings", field)),
    }
}

fn check_step(idx: usize, step: &Value, problems: &mut Problems) {
    let prefix = format!("migration step at index {}", idx);
    let Some(obj) = step.as_object() else {
        problems.push(format!("{}: must be an object", prefix));
        return;
    };

    for field in ["name", "plugin"] {
        match obj.get(field).and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => {}
            Some(_) => problems.push(format!("{}: field '{}' cannot be empty", prefix, field)),
            None => problems.push(format!("{}: missing required field '{}'", prefix, field)),
        }
    }

    if !obj.get("config").is_some_and(Value::is_object) {
        problems.push(format!("{}: field 'config' must be an object", prefix));
    }
    if obj.get("enabled").is_some_and(|v| !v.is_boolean()) {
        problems.push(format!("{}: field 'enabled' must be a boolean", prefix));
    }
    for field in ["include", "exclude"] {
        if let Some(value) = obj.get(field) {
            check_patterns(value, &format!("{}: {}", prefix, field), false, problems);
        }
    }
}

// ============================================================================
// Defaults and templates
// ============================================================================

pub const TEMPLATES: &[&str] = &["default"];

pub fn default_config() -> MigratorConfig {
    MigratorConfig {
        include: vec!["**/*.*".to_string()],
        exclude: vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()],
        migrations: vec![MigrationStep {
            name: "Replace deprecated tokens".to_string(),
            plugin: "simple-replace".to_string(),
            config: json!({ "mappings": { "foo": "bar" } }),
            include: None,
            exclude: None,
            enabled: None,
        }],
    }
}

pub fn template(name: &str) -> Result<MigratorConfig> {
    match name {
        "default" => Ok(default_config()),
        other => Err(Error::validation_invalid_argument(
            "template",
            format!("Unknown template: {}", other),
            Some(other.to_string()),
            Some(TEMPLATES.iter().map(|t| t.to_string()).collect()),
        )),
    }
}

/// Write `config` as pretty JSON, refusing to overwrite an existing file.
pub fn write_new_config(path: &Path, config: &MigratorConfig) -> Result<()> {
    if path.exists() {
        return Err(Error::validation_invalid_argument(
            "config",
            format!("Configuration file already exists: {}", path.display()),
            Some(path.display().to_string()),
            None,
        ));
    }
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize config".to_string())))?;
    io::write_file(path, &format!("{}\n", content), "write config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapping::MappingTable;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn loads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "c.json",
            r#"{"include":["**/*.css"],"migrations":[{"name":"n","plugin":"css-values","config":{"mappings":{}}}]}"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.include, vec!["**/*.css"]);
        assert!(config.exclude.is_empty());
        assert!(config.migrations[0].is_enabled());
    }

    #[test]
    fn loads_toml_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = write(
            dir.path(),
            "c.toml",
            "include = [\"**/*.css\"]\n\n[[migrations]]\nname = \"n\"\nplugin = \"css-values\"\nenabled = false\n\n[migrations.config.mappings]\n\"--z\" = \"--a\"\n\"--a\" = \"--b\"\n",
        );
        let config = load_config(&toml_path).unwrap();
        assert!(!config.migrations[0].is_enabled());
        assert_eq!(config.migrations[0].config["mappings"]["--a"], "--b");

        let table = MappingTable::from_step_config(&config.migrations[0].config).unwrap();
        let tokens: Vec<&str> = table.entries().iter().map(|e| e.token.as_str()).collect();
        assert_eq!(tokens, vec!["--z", "--a"]);

        let yaml_path = write(
            dir.path(),
            "c.yml",
            "include:\n  - \"**/*.scss\"\nmigrations:\n  - name: n\n    plugin: simple-replace\n    config:\n      mappings:\n        foo: bar\n        baz: qux\n",
        );
        let config = load_config(&yaml_path).unwrap();
        assert_eq!(config.include, vec!["**/*.scss"]);
        assert_eq!(config.migrations[0].plugin, "simple-replace");
        let keys: Vec<&str> = config.migrations[0].config["mappings"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["foo", "baz"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_config("/nonexistent/tokenshift.config.json").unwrap_err();
        assert_eq!(err.code.as_str(), "config.not_found");
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.ini", "x");
        let err = load_config(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.unsupported_format");
    }

    #[test]
    fn syntax_errors_are_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.json", "{ nope");
        let err = load_config(&path).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn validation_reports_every_problem() {
        let document = json!({
            "include": [],
            "migrations": [
                { "plugin": "css-values", "config": {} },
                { "name": "x", "plugin": "", "config": [] },
                "bad"
            ]
        });
        let err = validate_config(&document).unwrap_err();
        let problems: Vec<String> =
            serde_json::from_value(err.details["problems"].clone()).unwrap();
        assert_eq!(
            problems,
            vec![
                "field 'include' cannot be empty",
                "migration step at index 0: missing required field 'name'",
                "migration step at index 1: field 'plugin' cannot be empty",
                "migration step at index 1: field 'config' must be an object",
                "migration step at index 2: must be an object",
            ]
        );
        assert!(err.message.starts_with("Invalid configuration:\n  - "));
    }

    #[test]
    fn validation_requires_top_level_fields() {
        let err = validate_config(&json!({})).unwrap_err();
        assert!(err.message.contains("missing required field: 'include'"));
        assert!(err.message.contains("missing required field: 'migrations'"));
    }

    #[test]
    fn default_config_is_valid() {
        let document = serde_json::to_value(default_config()).unwrap();
        validate_config(&document).unwrap();
        assert_eq!(document["migrations"][0]["name"], "Replace deprecated tokens");
    }

    #[test]
    fn step_filters() {
        let mut step = default_config().migrations.remove(0);
        assert!(step.applies_to("src/a.css"));

        step.include = Some(vec!["**/*.css".to_string()]);
        step.exclude = Some(vec!["**/legacy/**".to_string()]);
        assert!(step.applies_to("src/a.css"));
        assert!(!step.applies_to("src/a.tsx"));
        assert!(!step.applies_to("src/legacy/a.css"));
    }

    #[test]
    fn write_new_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        write_new_config(&path, &default_config()).unwrap();
        let err = write_new_config(&path, &default_config()).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
    }

    #[test]
    fn unknown_template_is_rejected() {
        assert!(template("default").is_ok());
        assert!(template("fancy").is_err());
    }
}
