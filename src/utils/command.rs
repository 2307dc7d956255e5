//! Command execution primitives with consistent error handling.
//!
//! Every external command goes through a [`CommandRunner`]. The process runner
//! streams combined stdout/stderr to the console line by line while capturing
//! it; the dry-run runner only reports what would have been executed.

use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{CommandFailedDetails, Error, Result};

const REDACTED: &str = "********";

/// A program plus its arguments. Arguments marked secret never appear in
/// logs or error details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    secret_args: Vec<usize>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument that must be redacted from the displayed command line.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    /// Command line as shown to the user: program and arguments joined by
    /// spaces, secrets replaced.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        for (index, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&index) {
                parts.push(REDACTED);
            } else {
                parts.push(arg.as_str());
            }
        }
        parts.join(" ")
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Captured output from command execution.
/// stdout and stderr are merged in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub exit_code: i32,
    pub output: String,
}

impl CapturedOutput {
    pub fn new(exit_code: i32, output: String) -> Self {
        Self { exit_code, output }
    }

    pub fn is_empty(&self) -> bool {
        self.output.trim().is_empty()
    }
}

/// Executes external commands on behalf of the release flow.
pub trait CommandRunner {
    /// Directory every command runs in.
    fn working_dir(&self) -> &Path;

    /// Run a command to completion. A non-zero exit is an error.
    fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput>;

    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Spawns real processes in a fixed working directory.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    working_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        let command_line = spec.display();
        eprintln!("{}", executing_header(&command_line));

        let io_error = |e: io::Error| {
            Error::internal_io(
                format!("Failed to run {}: {}", command_line, e),
                Some(command_line.clone()),
            )
        };

        // One pipe for both streams keeps the output in arrival order.
        let (reader, writer) = io::pipe().map_err(io_error)?;
        let stderr_writer = writer.try_clone().map_err(io_error)?;

        // The temporary Command is dropped at the end of this statement, which
        // closes the parent's copies of the write end.
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer)
            .spawn()
            .map_err(io_error)?;

        let mut output = String::new();
        let streamed = stream_lines(reader, &mut output, |line| eprintln!("{}", line));
        let status = child.wait().map_err(io_error)?;
        streamed.map_err(io_error)?;

        let exit_code = status.code().unwrap_or(-1);
        if !status.success() {
            return Err(Error::command_failed(CommandFailedDetails {
                command: command_line,
                exit_code,
                output,
                working_dir: self.working_dir.display().to_string(),
            }));
        }

        Ok(CapturedOutput::new(exit_code, output))
    }
}

/// Header printed before a command's streamed output.
pub fn executing_header(command_line: &str) -> String {
    format!("Executing command \"{}\"", command_line)
}

/// Reports commands without executing them. Every command "succeeds" with
/// empty output, so a dry run sees a clean working tree.
#[derive(Debug, Clone)]
pub struct DryRunRunner {
    working_dir: PathBuf,
}

impl DryRunRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl CommandRunner for DryRunRunner {
    fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn run(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        eprintln!("[dry-run] {}", spec.display());
        Ok(CapturedOutput::default())
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Read `reader` to the end, handing each line (without its terminator) to
/// `on_line` and appending the raw text to `captured`.
///
/// Invalid UTF-8 is replaced rather than treated as an error; build tools
/// occasionally emit it.
pub fn stream_lines<R: Read>(
    reader: R,
    captured: &mut String,
    mut on_line: impl FnMut(&str),
) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(['\r', '\n']));
        captured.push_str(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn shell(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("docker").args(["image", "push", "reg/app:1.0.0"]);
        assert_eq!(spec.display(), "docker image push reg/app:1.0.0");
    }

    #[test]
    fn display_redacts_secret_args() {
        let spec = CommandSpec::new("docker")
            .args(["login", "--username", "u", "--password"])
            .secret_arg("hunter2")
            .arg("reg.example");
        assert_eq!(
            spec.display(),
            "docker login --username u --password ******** reg.example"
        );
        assert_eq!(spec.args[4], "hunter2");
    }

    #[test]
    fn executing_header_names_redacted_command() {
        let spec = CommandSpec::new("docker")
            .args(["login", "--password"])
            .secret_arg("hunter2");
        assert_eq!(
            executing_header(&spec.display()),
            "Executing command \"docker login --password ********\""
        );
    }

    #[test]
    fn stream_lines_reports_each_line_and_captures_all() {
        let mut captured = String::new();
        let mut lines = Vec::new();
        stream_lines("one\ntwo\r\nthree".as_bytes(), &mut captured, |l| {
            lines.push(l.to_string())
        })
        .unwrap();

        assert_eq!(lines, vec!["one", "two", "three"]);
        assert_eq!(captured, "one\ntwo\r\nthree");
    }

    #[test]
    fn stream_lines_replaces_invalid_utf8() {
        let mut captured = String::new();
        stream_lines(&b"ok \xff\n"[..], &mut captured, |_| {}).unwrap();
        assert_eq!(captured, "ok \u{fffd}\n");
    }

    #[test]
    fn run_captures_concatenated_output() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let result = runner.run(&shell("echo first; echo second")).unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "first\nsecond\n");
    }

    #[test]
    fn run_merges_stderr_into_output() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let result = runner.run(&shell("echo out; echo err 1>&2")).unwrap();
        assert!(result.output.contains("out\n"));
        assert!(result.output.contains("err\n"));
    }

    #[test]
    fn run_uses_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let runner = ProcessRunner::new(dir.path());
        let result = runner.run(&CommandSpec::new("ls")).unwrap();
        assert!(result.output.contains("marker.txt"));
    }

    #[test]
    fn run_fails_with_command_line_on_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let spec = shell("echo boom; exit 3");
        let err = runner.run(&spec).unwrap_err();

        assert_eq!(err.code, ErrorCode::CommandFailed);
        assert_eq!(err.details["command"], spec.display());
        assert_eq!(err.details["exitCode"], 3);
        assert_eq!(err.details["output"], "boom\n");
        assert!(err.message.contains(&spec.display()));
    }

    #[test]
    fn run_fails_with_invalid_command() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(dir.path());
        let err = runner
            .run(&CommandSpec::new("nonexistent_command_xyz"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalIoError);
    }

    #[test]
    fn dry_run_never_executes() {
        let runner = DryRunRunner::new("/nonexistent");
        let result = runner.run(&shell("exit 1")).unwrap();
        assert!(result.is_empty());
        assert_eq!(runner.working_dir(), Path::new("/nonexistent"));
    }
}
