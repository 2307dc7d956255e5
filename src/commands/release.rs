use clap::Args;
use std::path::{Path, PathBuf};

use item_tracker_release::command::{DryRunRunner, ProcessRunner};
use item_tracker_release::config::{self, ReleaseConfig};
use item_tracker_release::docker::Registry;
use item_tracker_release::release::{self, ReleaseRequest, ReleaseResult};
use item_tracker_release::{validation, version, Error, Result};

use super::CmdResult;

// Flag names as users type them; used in missing-argument errors.
const BUILD_VERSION_FLAG: &str = "-BUILD_VERSION";
const DOCKER_REGISTRY_FLAG: &str = "-DOCKER_REGISTRY";
const DOCKER_REGISTRY_USERNAME_FLAG: &str = "-DOCKER_REGISTRY_USERNAME";
const DOCKER_REGISTRY_PASSWORD_FLAG: &str = "-DOCKER_REGISTRY_PASSWORD";

#[derive(Args, Debug, Default)]
pub struct ReleaseArgs {
    /// Version to build and tag, e.g. 1.2.3 (also -BUILD_VERSION)
    #[arg(long, value_name = "VERSION")]
    pub build_version: Option<String>,

    /// Push the images and the version tag (also -PUBLISH)
    #[arg(long)]
    pub publish: bool,

    /// Registry host to publish to (also -DOCKER_REGISTRY)
    #[arg(long, value_name = "HOST")]
    pub docker_registry: Option<String>,

    /// Registry username (also -DOCKER_REGISTRY_USERNAME)
    #[arg(long, value_name = "USER")]
    pub docker_registry_username: Option<String>,

    /// Registry password (also -DOCKER_REGISTRY_PASSWORD)
    #[arg(
        long,
        value_name = "PASSWORD",
        env = "DOCKER_REGISTRY_PASSWORD",
        hide_env_values = true
    )]
    pub docker_registry_password: Option<String>,

    /// Directory to build in (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<String>,

    /// Release config file (defaults to release.json in the working directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Print the commands without executing them
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ReleaseArgs) -> CmdResult<ReleaseResult> {
    let working_dir = resolve_working_dir(args.workdir.as_deref())?;
    let config = load_config(&working_dir, args.config.as_deref())?;
    let request = build_request(&args, &config)?;

    let result = if args.dry_run {
        release::run(&request, &config, &DryRunRunner::new(&working_dir))?
    } else {
        release::run(&request, &config, &ProcessRunner::new(&working_dir))?
    };

    Ok((result, 0))
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn resolve_working_dir(workdir: Option<&str>) -> Result<PathBuf> {
    let path = match workdir {
        Some(dir) => expand_path(dir),
        None => std::env::current_dir().map_err(|e| {
            Error::internal_io(e.to_string(), Some("resolve current directory".to_string()))
        })?,
    };

    if !path.is_dir() {
        return Err(Error::validation_invalid_argument(
            "workdir",
            format!("{} is not a directory", path.display()),
            Some(path.display().to_string()),
            None,
        ));
    }

    Ok(path)
}

fn load_config(working_dir: &Path, explicit: Option<&str>) -> Result<ReleaseConfig> {
    match explicit {
        Some(path) => config::load_from(&expand_path(path)),
        None => config::load(working_dir),
    }
}

/// Turn parsed flags into a release request. Every required flag that is
/// absent is reported by its flag name.
fn build_request(args: &ReleaseArgs, config: &ReleaseConfig) -> Result<ReleaseRequest> {
    let raw_version = validation::require_non_empty(args.build_version.clone(), BUILD_VERSION_FLAG)?;
    let version = version::parse(&raw_version, config.version_pattern())?;

    if !args.publish {
        return Ok(ReleaseRequest {
            version,
            publish: None,
        });
    }

    let registry = Registry {
        host: validation::require_non_empty(args.docker_registry.clone(), DOCKER_REGISTRY_FLAG)?,
        username: validation::require_non_empty(
            args.docker_registry_username.clone(),
            DOCKER_REGISTRY_USERNAME_FLAG,
        )?,
        password: validation::require_non_empty(
            args.docker_registry_password.clone(),
            DOCKER_REGISTRY_PASSWORD_FLAG,
        )?,
    };

    Ok(ReleaseRequest {
        version,
        publish: Some(registry),
    })
}
