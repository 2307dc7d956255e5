//! Build version validation.
//!
//! A build version is used verbatim as the docker image tag and as the git tag
//! name, so it is checked once up front and carried as a [`Version`].

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Three dot-separated components of one to three ASCII digits.
static STRICT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").unwrap());

/// Historical pattern: empty components allowed, separators match any
/// character, and `\d` matches any Unicode decimal digit.
static LEGACY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{0,3}.\d{0,3}.\d{0,3}$").unwrap());

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionPattern {
    #[default]
    Strict,
    Legacy,
}

impl VersionPattern {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            VersionPattern::Legacy
        } else {
            VersionPattern::Strict
        }
    }

    fn regex(&self) -> &'static Regex {
        match self {
            VersionPattern::Strict => &*STRICT_PATTERN,
            VersionPattern::Legacy => &*LEGACY_PATTERN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a raw build version against `pattern`.
pub fn parse(raw: &str, pattern: VersionPattern) -> Result<Version> {
    if !pattern.regex().is_match(raw) {
        return Err(Error::validation_invalid_argument(
            "version",
            format!("{} is not valid.", raw),
            Some(raw.to_string()),
            Some(vec![
                "Valid versions examples: \"123.123.123\", \"1.2.3\", \"1.2.123\"".to_string(),
            ]),
        ));
    }

    Ok(Version(raw.to_string()))
}
