//! Docker image build and registry publishing.

use serde::Serialize;

use crate::command::{CommandRunner, CommandSpec};
use crate::config::{ImageConfig, ReleaseConfig};
use crate::error::Result;
use crate::version::Version;

/// Registry coordinates and credentials for a publish.
#[derive(Clone, PartialEq, Eq)]
pub struct Registry {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltImage {
    /// Local reference, `<name>:<version>`.
    pub image: String,
    pub dockerfile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedImage {
    pub local: String,
    pub versioned: String,
    pub latest: String,
}

pub fn local_reference(name: &str, version: &Version) -> String {
    format!("{}:{}", name, version)
}

pub fn remote_reference(registry: &str, name: &str, tag: &str) -> String {
    format!("{}/{}:{}", registry, name, tag)
}

pub fn build_command(config: &ReleaseConfig, image: &str, dockerfile: &str) -> CommandSpec {
    CommandSpec::new(&config.docker_program).args([
        "build",
        "-t",
        image,
        "--force-rm",
        "-f",
        dockerfile,
        config.build_context.as_str(),
    ])
}

pub fn login_command(config: &ReleaseConfig, registry: &Registry) -> CommandSpec {
    CommandSpec::new(&config.docker_program)
        .args(["login", "--username", registry.username.as_str(), "--password"])
        .secret_arg(&registry.password)
        .arg(&registry.host)
}

/// Build one image as `<name>:<version>`.
pub fn build(
    runner: &dyn CommandRunner,
    config: &ReleaseConfig,
    image: &ImageConfig,
    version: &Version,
) -> Result<BuiltImage> {
    let reference = local_reference(&image.name, version);
    log_status!("build", "Building {} docker image", reference);

    runner.run(&build_command(config, &reference, &image.dockerfile))?;

    Ok(BuiltImage {
        image: reference,
        dockerfile: image.dockerfile.clone(),
    })
}

/// Log into the registry, then tag and push `<name>:<version>` under both the
/// version and `latest`.
///
/// Any earlier session is logged out first. A failed logout aborts like any
/// other command.
pub fn publish(
    runner: &dyn CommandRunner,
    config: &ReleaseConfig,
    name: &str,
    version: &Version,
    registry: &Registry,
) -> Result<PublishedImage> {
    let docker = config.docker_program.as_str();

    runner.run(&CommandSpec::new(docker).arg("logout"))?;
    runner.run(&login_command(config, registry))?;

    let local = local_reference(name, version);
    let versioned = remote_reference(&registry.host, name, version.as_str());
    let latest = remote_reference(&registry.host, name, "latest");

    runner.run(&CommandSpec::new(docker).args(["tag", local.as_str(), versioned.as_str()]))?;
    runner.run(&CommandSpec::new(docker).args(["tag", local.as_str(), latest.as_str()]))?;
    runner.run(&CommandSpec::new(docker).args(["image", "push", versioned.as_str()]))?;
    runner.run(&CommandSpec::new(docker).args(["image", "push", latest.as_str()]))?;

    log_status!("publish", "Docker image {} published", versioned);

    Ok(PublishedImage {
        local,
        versioned,
        latest,
    })
}
