use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{init, migrate, plugins};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "tokenshift")]
#[command(version = VERSION)]
#[command(about = "Migrate design-token references in CSS, SCSS and CSS-in-JS sources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Init(init::InitArgs),
    /// Run the configured migrations over the matching files
    Migrate(migrate::MigrateArgs),
    /// List built-in plugins
    Plugins(plugins::PluginsArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
