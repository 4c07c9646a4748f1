use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use tokenshift::args::parse_batch_range;
use tokenshift::config::{self, DEFAULT_CONFIG_FILE};
use tokenshift::discovery::discover_files;
use tokenshift::log_status;
use tokenshift::{EngineOptions, Error, MigrationEngine, MigrationResult};

use super::CmdResult;
use crate::tty::TerminalInteraction;

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Configuration file (.json, .toml, .yaml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Log every change
    #[arg(short, long)]
    pub verbose: bool,

    /// Report changes without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; ambiguous replacements are skipped
    #[arg(long)]
    pub no_interactive: bool,

    /// Process one batch of the discovered files, as SIZE-NUMBER (e.g. 50-2)
    #[arg(long, value_name = "SIZE-NUMBER")]
    pub batch: Option<String>,

    /// Migrate a single file instead of the configured patterns
    #[arg(long, value_name = "PATH")]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub command: &'static str,
    pub files: Vec<MigrationResult>,
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_changes: usize,
    pub dry_run: bool,
}

pub fn run(args: MigrateArgs) -> CmdResult<MigrateOutput> {
    let config = config::load_config(&args.config)?;

    let mut files = match &args.file {
        Some(file) => {
            let path = config::expand_path(file);
            if !path.is_file() {
                return Err(Error::validation_invalid_argument(
                    "file",
                    format!("File not found: {}", path.display()),
                    Some(file.clone()),
                    None,
                ));
            }
            vec![path]
        }
        None => discover_files(Path::new(""), &config.include, &config.exclude)?,
    };

    if let Some(range) = &args.batch {
        let window = parse_batch_range(range, files.len())?;
        files = files[window.start..window.end].to_vec();
        log_status!(
            "migrate",
            "Batch {}: files {}-{}",
            range,
            window.start + 1,
            window.end
        );
    }

    let results = migrate_files(&files, &config, &args);

    let successful = results.iter().filter(|r| r.success).count();
    let failed = results.len() - successful;
    let total_changes = results.iter().map(MigrationResult::total_changes).sum();
    let exit_code = if failed > 0 { 1 } else { 0 };

    Ok((
        MigrateOutput {
            command: "migrate",
            total_files: results.len(),
            files: results,
            successful,
            failed,
            total_changes,
            dry_run: args.dry_run,
        },
        exit_code,
    ))
}

fn migrate_files(
    files: &[PathBuf],
    config: &config::MigratorConfig,
    args: &MigrateArgs,
) -> Vec<MigrationResult> {
    let mut interaction = TerminalInteraction::new(!args.no_interactive, args.verbose);
    let options = EngineOptions {
        dry_run: args.dry_run,
        interactive: !args.no_interactive,
    };
    let mut engine = MigrationEngine::new(options, &mut interaction);
    engine.process_files(files, config)
}
