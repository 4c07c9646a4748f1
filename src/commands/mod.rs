pub type CmdResult<T> = tokenshift::Result<(T, i32)>;

pub mod init;
pub mod migrate;
pub mod plugins;

macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (tokenshift::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Init(args) => dispatch!(args, init),
        crate::Commands::Migrate(args) => dispatch!(args, migrate),
        crate::Commands::Plugins(args) => dispatch!(args, plugins),
    }
}
