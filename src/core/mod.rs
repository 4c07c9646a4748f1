// Public modules
pub mod cache;
pub mod change;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod mapping;
pub mod matcher;
pub mod multi_value;
pub mod parser;
pub mod plugin;
pub mod resolver;
pub mod syntax;

// Re-export common types for convenience
pub use change::Change;
pub use engine::{EngineOptions, MigrationEngine, MigrationResult};
pub use error::{Error, ErrorCode, Result};
pub use interaction::{Interaction, LogLevel};
pub use mapping::MappingTable;
