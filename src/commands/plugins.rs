use clap::Args;
use serde::Serialize;

use tokenshift::plugin::{Plugin, PluginInfo};

use super::CmdResult;

#[derive(Args, Debug)]
pub struct PluginsArgs {}

#[derive(Debug, Serialize)]
pub struct PluginsOutput {
    pub command: &'static str,
    pub plugins: Vec<PluginInfo>,
}

pub fn run(_args: PluginsArgs) -> CmdResult<PluginsOutput> {
    Ok((
        PluginsOutput {
            command: "plugins",
            plugins: Plugin::catalog(),
        },
        0,
    ))
}
