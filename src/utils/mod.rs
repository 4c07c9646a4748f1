//! Generic utility primitives with zero domain knowledge.
//!
//! - `args` - Batch window parsing
//! - `io` - File I/O with consistent error handling
//! - `validation` - Input validation helpers

pub mod args;
pub mod io;
pub mod validation;
