//! Input validation primitives.
//!
//! Replaces verbose `ok_or_else` + `Error::validation_missing_argument` chains
//! for flags that must be present.

use crate::error::{Error, Result};

/// Require an Option to contain a value, naming the missing flag otherwise.
///
/// ```ignore
/// let version = validation::require(args.build_version, "-BUILD_VERSION")?;
/// ```
pub fn require<T>(opt: Option<T>, flag: &str) -> Result<T> {
    opt.ok_or_else(|| Error::validation_missing_argument(vec![flag.to_string()]))
}

/// Require a string flag to be present and not blank.
///
/// The value is returned untouched; passwords may legitimately carry
/// surrounding whitespace.
pub fn require_non_empty(opt: Option<String>, flag: &str) -> Result<String> {
    require(opt.filter(|value| !value.trim().is_empty()), flag)
}
