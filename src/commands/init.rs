use clap::Args;
use serde::Serialize;

use tokenshift::config::{self, DEFAULT_CONFIG_FILE};
use tokenshift::log_status;

use super::CmdResult;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Configuration template to start from
    #[arg(long, default_value = "default")]
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub command: &'static str,
    pub path: String,
    pub template: String,
    pub created: bool,
}

pub fn run(args: InitArgs) -> CmdResult<InitOutput> {
    let config = config::template(&args.template)?;
    let path = config::expand_path(&args.config);

    config::write_new_config(&path, &config)?;
    log_status!("init", "Wrote {}", path.display());

    Ok((
        InitOutput {
            command: "init",
            path: path.display().to_string(),
            template: args.template,
            created: true,
        },
        0,
    ))
}
