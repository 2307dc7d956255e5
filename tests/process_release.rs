//! Drives a full publish through real processes, with stub `docker` and `git`
//! executables that append their arguments to a log file.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use item_tracker_release::command::ProcessRunner;
use item_tracker_release::config::ReleaseConfig;
use item_tracker_release::docker::Registry;
use item_tracker_release::release::{self, ReleaseRequest};
use item_tracker_release::version::{self, VersionPattern};
use item_tracker_release::ErrorCode;

fn write_stub(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

fn request() -> ReleaseRequest {
    ReleaseRequest {
        version: version::parse("1.2.3", VersionPattern::Strict).unwrap(),
        publish: Some(Registry {
            host: "reg.example".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
        }),
    }
}

// One test per binary: writing executables while other test threads fork can
// fail with ETXTBSY.
#[test]
fn publish_through_stub_executables() {
    let bin = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    let log = bin.path().join("calls.log");
    let log = log.display();

    let docker = write_stub(bin.path(), "docker", &format!("echo \"docker $*\" >> {log}"));
    let clean_git = write_stub(bin.path(), "git", &format!("echo \"git $1 $2\" >> {log}"));
    let dirty_git = write_stub(
        bin.path(),
        "git-dirty",
        "if [ \"$1\" = status ]; then echo ' M Dockerfile_api'; fi",
    );
    let failing_docker = write_stub(bin.path(), "docker-fail", "echo 'no such image' >&2; exit 7");

    // Clean tree: every step runs, in order.
    let config = ReleaseConfig {
        docker_program: docker.clone(),
        git_program: clean_git,
        ..ReleaseConfig::default()
    };
    let runner = ProcessRunner::new(work.path());
    let result = release::run(&request(), &config, &runner).unwrap();
    assert_eq!(result.published.unwrap().tag, "1.2.3");

    let calls = fs::read_to_string(bin.path().join("calls.log")).unwrap();
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(lines[0], "docker build -t item-tracker-api:1.2.3 --force-rm -f Dockerfile_api .");
    assert_eq!(lines[1], "docker build -t item-tracker-web:1.2.3 --force-rm -f Dockerfile_web .");
    assert_eq!(lines[2], "git status --porcelain");
    assert_eq!(lines[3], "docker logout");
    assert_eq!(lines[4], "docker login --username u --password p reg.example");
    assert_eq!(lines.last().copied(), Some("git push --tags"));
    assert!(lines.contains(&"git tag -a"));

    // Dirty tree: stops after the status check.
    fs::remove_file(bin.path().join("calls.log")).unwrap();
    let config = ReleaseConfig {
        docker_program: docker,
        git_program: dirty_git,
        ..ReleaseConfig::default()
    };
    let err = release::run(&request(), &config, &runner).unwrap_err();
    assert_eq!(err.code, ErrorCode::GitDirtyWorkingTree);
    let calls = fs::read_to_string(bin.path().join("calls.log")).unwrap();
    assert!(!calls.contains("login"));

    // Failing command: exit code and merged output are reported.
    let config = ReleaseConfig {
        docker_program: failing_docker.clone(),
        ..ReleaseConfig::default()
    };
    let err = release::run(&request(), &config, &runner).unwrap_err();
    assert_eq!(err.code, ErrorCode::CommandFailed);
    assert_eq!(err.details["exitCode"], 7);
    assert_eq!(err.details["output"], "no such image\n");
    assert_eq!(
        err.details["command"],
        format!("{failing_docker} build -t item-tracker-api:1.2.3 --force-rm -f Dockerfile_api .")
    );
}
