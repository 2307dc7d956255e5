// Public modules
pub mod config;
pub mod docker;
pub mod error;
pub mod git;
pub mod release;
pub mod version;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
