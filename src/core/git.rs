use crate::command::{CommandRunner, CommandSpec};
use crate::config::ReleaseConfig;
use crate::error::{Error, Result};
use crate::version::Version;

// ============================================================================
// Low-level Git Primitives (runner-based)
// ============================================================================

/// Fail unless `git status --porcelain` reports nothing.
pub fn ensure_clean_working_tree(runner: &dyn CommandRunner, config: &ReleaseConfig) -> Result<()> {
    let status = runner.run(&CommandSpec::new(&config.git_program).args(["status", "--porcelain"]))?;

    if status.is_empty() {
        return Ok(());
    }

    let changes = status
        .output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect();

    Err(Error::git_dirty_working_tree(
        runner.working_dir().display().to_string(),
        changes,
    ))
}

/// Tag message: the version followed by every published image, one per line.
pub fn release_tag_message(version: &Version, images: &[String]) -> String {
    let mut message = format!("{}\n", version);
    for image in images {
        message.push_str(image);
        message.push('\n');
    }
    message
}

/// Create an annotated tag named after the version.
pub fn create_release_tag(
    runner: &dyn CommandRunner,
    config: &ReleaseConfig,
    version: &Version,
    images: &[String],
) -> Result<String> {
    let tag = version.as_str();
    let message = release_tag_message(version, images);
    runner.run(&CommandSpec::new(&config.git_program).args(["tag", "-a", tag, "-m", message.as_str()]))?;
    Ok(tag.to_string())
}

/// Push all local tags to the default remote.
pub fn push_tags(runner: &dyn CommandRunner, config: &ReleaseConfig) -> Result<()> {
    runner.run(&CommandSpec::new(&config.git_program).args(["push", "--tags"]))?;
    Ok(())
}
