//! Release orchestration.
//!
//! Builds every configured image, and when publishing: checks the working
//! tree, pushes each image under its version and `latest`, then tags the
//! repository with the version. Each step is a hard gate; nothing already
//! pushed is rolled back when a later step fails.

use serde::Serialize;

use crate::command::CommandRunner;
use crate::config::ReleaseConfig;
use crate::docker::{self, BuiltImage, PublishedImage, Registry};
use crate::error::Result;
use crate::git;
use crate::version::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub version: Version,
    /// `None` stops after the local builds.
    pub publish: Option<Registry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishSummary {
    pub registry: String,
    pub images: Vec<PublishedImage>,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub version: Version,
    pub working_dir: String,
    pub images: Vec<BuiltImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<PublishSummary>,
    pub dry_run: bool,
    pub finished_at: String,
}

pub fn run(
    request: &ReleaseRequest,
    config: &ReleaseConfig,
    runner: &dyn CommandRunner,
) -> Result<ReleaseResult> {
    log_status!("release", "Working directory {}", runner.working_dir().display());

    let images = config
        .images
        .iter()
        .map(|image| docker::build(runner, config, image, &request.version))
        .collect::<Result<Vec<_>>>()?;

    let published = match &request.publish {
        Some(registry) => Some(publish(request, config, runner, registry)?),
        None => None,
    };

    log_status!("release", "DONE");

    Ok(ReleaseResult {
        version: request.version.clone(),
        working_dir: runner.working_dir().display().to_string(),
        images,
        published,
        dry_run: runner.is_dry_run(),
        finished_at: chrono::Utc::now().to_rfc3339(),
    })
}

fn publish(
    request: &ReleaseRequest,
    config: &ReleaseConfig,
    runner: &dyn CommandRunner,
    registry: &Registry,
) -> Result<PublishSummary> {
    git::ensure_clean_working_tree(runner, config)?;

    log_status!("publish", "Publishing to {}", registry.host);
    let images = config
        .images
        .iter()
        .map(|image| docker::publish(runner, config, &image.name, &request.version, registry))
        .collect::<Result<Vec<_>>>()?;

    let remotes: Vec<String> = images.iter().map(|i| i.versioned.clone()).collect();
    let tag = git::create_release_tag(runner, config, &request.version, &remotes)?;
    git::push_tags(runner, config)?;
    log_status!("git", "git {} tag pushed", tag);

    Ok(PublishSummary {
        registry: registry.host.clone(),
        images,
        tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DryRunRunner;
    use crate::version::{self, VersionPattern};

    fn request(publish: Option<Registry>) -> ReleaseRequest {
        ReleaseRequest {
            version: version::parse("2.0.1", VersionPattern::Strict).unwrap(),
            publish,
        }
    }

    #[test]
    fn dry_run_reports_every_image() {
        let runner = DryRunRunner::new("/src");
        let result = run(&request(None), &ReleaseConfig::default(), &runner).unwrap();

        assert!(result.dry_run);
        assert!(result.published.is_none());
        assert_eq!(result.working_dir, "/src");
        assert_eq!(result.images[0].image, "item-tracker-api:2.0.1");
        assert_eq!(result.images[1].image, "item-tracker-web:2.0.1");
    }

    #[test]
    fn dry_run_publish_summarizes_remotes() {
        let runner = DryRunRunner::new("/src");
        let registry = Registry {
            host: "reg.example".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
        };
        let result = run(&request(Some(registry)), &ReleaseConfig::default(), &runner).unwrap();

        let published = result.published.unwrap();
        assert_eq!(published.registry, "reg.example");
        assert_eq!(published.tag, "2.0.1");
        assert_eq!(published.images[0].versioned, "reg.example/item-tracker-api:2.0.1");
        assert_eq!(published.images[1].latest, "reg.example/item-tracker-web:latest");
    }

    #[test]
    fn result_serializes_without_credentials() {
        let runner = DryRunRunner::new("/src");
        let registry = Registry {
            host: "reg.example".to_string(),
            username: "u".to_string(),
            password: "s3cret".to_string(),
        };
        let result = run(&request(Some(registry)), &ReleaseConfig::default(), &runner).unwrap();
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.contains("\"dryRun\":true"));
        assert!(json.contains("\"version\":\"2.0.1\""));
        assert!(!json.contains("s3cret"));
    }
}
