use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::version::VersionPattern;

/// File looked up in the working directory when no explicit config is given.
pub const CONFIG_FILE: &str = "release.json";

/// Root configuration structure for release.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Images built (and published) in order.
    #[serde(default = "default_images")]
    pub images: Vec<ImageConfig>,

    #[serde(default = "default_docker_program")]
    pub docker_program: String,

    #[serde(default = "default_git_program")]
    pub git_program: String,

    /// Build context passed to `docker build`, relative to the working directory.
    #[serde(default = "default_build_context")]
    pub build_context: String,

    /// Accept versions with the historical loose pattern.
    #[serde(default)]
    pub legacy_version_pattern: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub name: String,
    pub dockerfile: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            images: default_images(),
            docker_program: default_docker_program(),
            git_program: default_git_program(),
            build_context: default_build_context(),
            legacy_version_pattern: false,
        }
    }
}

impl ReleaseConfig {
    pub fn version_pattern(&self) -> VersionPattern {
        VersionPattern::from_legacy_flag(self.legacy_version_pattern)
    }

    fn validate(self) -> Result<Self> {
        if self.images.is_empty() {
            return Err(Error::config_invalid_value(
                "images",
                None,
                "At least one image must be configured",
            ));
        }

        for image in &self.images {
            if image.name.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    "images.name",
                    Some(image.name.clone()),
                    "Image name cannot be empty",
                ));
            }
            if image.dockerfile.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    "images.dockerfile",
                    Some(image.dockerfile.clone()),
                    format!("Dockerfile for '{}' cannot be empty", image.name),
                ));
            }
        }

        for (key, value) in [
            ("dockerProgram", &self.docker_program),
            ("gitProgram", &self.git_program),
            ("buildContext", &self.build_context),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    key,
                    Some(value.clone()),
                    "Value cannot be empty",
                ));
            }
        }

        Ok(self)
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_images() -> Vec<ImageConfig> {
    vec![
        ImageConfig {
            name: "item-tracker-api".to_string(),
            dockerfile: "Dockerfile_api".to_string(),
        },
        ImageConfig {
            name: "item-tracker-web".to_string(),
            dockerfile: "Dockerfile_web".to_string(),
        },
    ]
}

fn default_docker_program() -> String {
    "docker".to_string()
}

fn default_git_program() -> String {
    "git".to_string()
}

fn default_build_context() -> String {
    ".".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load `release.json` from the working directory.
/// A missing file yields built-in defaults; an unreadable or invalid one is an error.
pub fn load(working_dir: &Path) -> Result<ReleaseConfig> {
    let path = working_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(builtin_defaults());
    }
    load_config_from_file(&path)
}

/// Load an explicitly requested config file. The file must exist.
pub fn load_from(path: &Path) -> Result<ReleaseConfig> {
    if !path.exists() {
        return Err(Error::internal_io(
            format!("Config file not found: {}", path.display()),
            Some(format!("read {}", path.display())),
        ));
    }
    load_config_from_file(path)
}

fn load_config_from_file(path: &Path) -> Result<ReleaseConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("read {}", path.display()))))?;

    let config: ReleaseConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    config.validate()
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> ReleaseConfig {
    ReleaseConfig::default()
}
