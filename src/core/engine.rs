//! Migration engine: runs the configured steps over files, one at a time.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::cache::ResolutionCache;
use crate::core::change::Change;
use crate::core::config::{MigrationStep, MigratorConfig};
use crate::core::interaction::{Interaction, LogLevel, ProgressInfo};
use crate::core::plugin::{describe_changes, Plugin};
use crate::core::resolver::ResolveContext;
use crate::error::Result;
use crate::utils::io;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Compute changes without writing files.
    pub dry_run: bool,
    /// Allow multiple-choice prompts, when the interaction supports them.
    pub interactive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationResult {
    pub file_path: String,
    pub success: bool,
    pub changes: Vec<Change>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationResult {
    pub fn total_changes(&self) -> usize {
        self.changes.iter().map(|c| c.occurrence_count).sum()
    }
}

pub struct MigrationEngine<'a> {
    options: EngineOptions,
    interaction: &'a mut dyn Interaction,
    cache: ResolutionCache,
}

impl<'a> MigrationEngine<'a> {
    pub fn new(options: EngineOptions, interaction: &'a mut dyn Interaction) -> Self {
        Self {
            options,
            interaction,
            cache: ResolutionCache::new(),
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    /// Process `paths` strictly in order, so later files see earlier answers.
    pub fn process_files(&mut self, paths: &[PathBuf], config: &MigratorConfig) -> Vec<MigrationResult> {
        let total = paths.len();
        log_status!("migrate", "Processing {} file(s)...", total);

        paths
            .iter()
            .enumerate()
            .map(|(idx, path)| {
                let progress = ProgressInfo {
                    current_file: idx + 1,
                    total_files: total,
                    current_file_name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string()),
                };
                self.process_file(path, config, Some(progress))
            })
            .collect()
    }

    pub fn process_file(
        &mut self,
        path: &Path,
        config: &MigratorConfig,
        progress: Option<ProgressInfo>,
    ) -> MigrationResult {
        let file_path = path.display().to_string();
        match self.try_process_file(path, &file_path, &config.migrations, progress) {
            Ok(changes) => MigrationResult {
                file_path,
                success: true,
                changes,
                error: None,
            },
            Err(err) => {
                self.interaction.log(
                    &format!("Failed to process {}: {}", file_path, err),
                    LogLevel::Error,
                );
                MigrationResult {
                    file_path,
                    success: false,
                    changes: Vec::new(),
                    error: Some(err.message),
                }
            }
        }
    }

    fn try_process_file(
        &mut self,
        path: &Path,
        file_path: &str,
        steps: &[MigrationStep],
        progress: Option<ProgressInfo>,
    ) -> Result<Vec<Change>> {
        let mut data = io::read_file(path, "read source file")?;
        let mut changes = Vec::new();
        let match_path = file_path.replace('\\', "/");
        let interactive = self.options.interactive && self.interaction.is_interactive();

        for step in steps {
            if !step.is_enabled() {
                self.interaction
                    .log(&format!("Skipping disabled step: {}", step.name), LogLevel::Debug);
                continue;
            }
            if !step.applies_to(&match_path) {
                continue;
            }

            let plugin = Plugin::from_name(&step.plugin)?;
            let mut ctx = ResolveContext {
                file_path,
                interactive,
                interaction: &mut *self.interaction,
                cache: &mut self.cache,
                progress: progress.clone(),
            };
            let output = plugin.apply(&data, &step.config, &mut ctx)?;

            for line in describe_changes(&output.changes, file_path) {
                self.interaction.log(&line, LogLevel::Debug);
            }
            data = output.data;
            changes.extend(output.changes);
        }

        if !changes.is_empty() && !self.options.dry_run {
            io::write_file_atomic(path, &data, "write migrated file")?;
            log_status!("migrate", "Wrote {}", file_path);
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_config;
    use crate::core::interaction::ScriptedInteraction;
    use serde_json::json;
    use std::fs;

    fn css_config(mappings: serde_json::Value) -> MigratorConfig {
        MigratorConfig {
            include: vec!["**/*.css".to_string()],
            exclude: vec![],
            migrations: vec![MigrationStep {
                name: "tokens".to_string(),
                plugin: "css-values".to_string(),
                config: json!({ "mappings": mappings }),
                include: None,
                exclude: None,
                enabled: None,
            }],
        }
    }

    #[test]
    fn writes_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a { color: var(--old); }").unwrap();

        let mut ui = ScriptedInteraction::non_interactive();
        let mut engine = MigrationEngine::new(EngineOptions::default(), &mut ui);
        let result = engine.process_file(&path, &css_config(json!({ "--old": "--new" })), None);

        assert!(result.success);
        assert_eq!(result.total_changes(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), ".a { color: var(--new); }");
    }

    #[test]
    fn dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a { color: var(--old); }").unwrap();

        let mut ui = ScriptedInteraction::non_interactive();
        let options = EngineOptions {
            dry_run: true,
            interactive: false,
        };
        let mut engine = MigrationEngine::new(options, &mut ui);
        let result = engine.process_file(&path, &css_config(json!({ "--old": "--new" })), None);

        assert_eq!(result.changes.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), ".a { color: var(--old); }");
    }

    #[test]
    fn steps_chain_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a { color: var(--foo); }").unwrap();

        let mut config = default_config();
        config.migrations.push(css_config(json!({ "--bar": "--baz" })).migrations.remove(0));

        let mut ui = ScriptedInteraction::non_interactive();
        let mut engine = MigrationEngine::new(EngineOptions::default(), &mut ui);
        let result = engine.process_file(&path, &config, None);

        assert_eq!(result.changes.len(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), ".a { color: var(--baz); }");
    }

    #[test]
    fn disabled_and_filtered_steps_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a { color: var(--foo); }").unwrap();

        let mut config = default_config();
        config.migrations[0].enabled = Some(false);
        let mut filtered = css_config(json!({ "--foo": "--x" })).migrations.remove(0);
        filtered.include = Some(vec!["**/*.tsx".to_string()]);
        config.migrations.push(filtered);

        let mut ui = ScriptedInteraction::non_interactive();
        let mut engine = MigrationEngine::new(EngineOptions::default(), &mut ui);
        let result = engine.process_file(&path, &config, None);

        assert!(result.success);
        assert!(result.changes.is_empty());
        assert_eq!(ui.logs_at(LogLevel::Debug), vec!["Skipping disabled step: Replace deprecated tokens"]);
    }

    #[test]
    fn unknown_plugin_fails_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a {}").unwrap();

        let mut config = default_config();
        config.migrations[0].plugin = "nope".to_string();

        let mut ui = ScriptedInteraction::non_interactive();
        let mut engine = MigrationEngine::new(EngineOptions::default(), &mut ui);
        let result = engine.process_file(&path, &config, None);

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Plugin not found: nope"));
    }

    #[test]
    fn missing_file_fails_without_panicking() {
        let mut ui = ScriptedInteraction::non_interactive();
        let mut engine = MigrationEngine::new(EngineOptions::default(), &mut ui);
        let result = engine.process_file(Path::new("/nonexistent/a.css"), &default_config(), None);
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[test]
    fn interactive_option_off_overrides_capable_interaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.css");
        fs::write(&path, ".a { color: var(--t); }").unwrap();
        let config = css_config(json!({ "--t": { "options": [{ "replace": ["--a", "--b"] }] } }));

        let mut ui = ScriptedInteraction::with_answers([Some("--a".to_string())]);
        let mut engine = MigrationEngine::new(EngineOptions::default(), &mut ui);
        let result = engine.process_file(&path, &config, None);

        assert!(result.changes.is_empty());
        assert!(ui.requests.is_empty());
    }

    #[test]
    fn answers_carry_across_files_with_progress() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.css");
        let b = dir.path().join("b.css");
        fs::write(&a, ".a { color: var(--t); }").unwrap();
        fs::write(&b, ".b { color: var(--t); }").unwrap();
        let config = css_config(json!({ "--t": { "options": [{ "replace": ["--a", "--b"] }] } }));

        let mut ui = ScriptedInteraction::with_answers([Some("--b".to_string())]);
        let options = EngineOptions {
            dry_run: false,
            interactive: true,
        };
        let mut engine = MigrationEngine::new(options, &mut ui);
        let results = engine.process_files(&[a.clone(), b.clone()], &config);
        assert_eq!(engine.cache().len(), 1);

        assert!(results.iter().all(|r| r.success && r.changes.len() == 1));
        assert_eq!(fs::read_to_string(&b).unwrap(), ".b { color: var(--b); }");
        assert_eq!(ui.requests.len(), 1);
        let progress = ui.requests[0].progress.as_ref().unwrap();
        assert_eq!((progress.current_file, progress.total_files), (1, 2));
        assert_eq!(progress.current_file_name, "a.css");
    }
}
