//! Generic utility primitives with zero domain knowledge.
//!
//! - `args` - CLI argument normalization
//! - `command` - Command execution with error handling
//! - `validation` - Input validation helpers

pub mod args;
pub mod command;
pub mod validation;
