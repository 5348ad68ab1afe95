//! Subprocess execution with dual-channel failure detection.
//!
//! Every SCM and build command goes through [`CommandExecutor`]. The child's
//! stdout and stderr are drained by two independent tokio tasks so that a full
//! pipe on one channel can never stall the other, and both buffers are joined
//! before the call returns.
//!
//! Failure is decided on two channels:
//! - the exit code, fatal only for strict requests (otherwise logged as a warning)
//! - substring patterns searched in both captured streams, always fatal

use crate::error::{ExecError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// A single command invocation
#[derive(Debug, Clone, Default)]
pub struct ExecRequest {
    /// Program followed by its arguments
    pub command: Vec<String>,
    /// Working directory, inherited when `None`
    pub directory: Option<PathBuf>,
    /// Environment entries overlaid on the inherited environment
    pub env: HashMap<String, String>,
    /// Treat a nonzero exit code as fatal
    pub strict: bool,
    /// Substrings that mark the command as failed when seen in either stream
    pub fail_patterns: Vec<String>,
    /// Message used instead of the default when a pattern matches
    pub error_message: Option<String>,
}

impl ExecRequest {
    /// Create a request from a program and its arguments
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Run the command inside `directory`
    pub fn current_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Overlay environment entries
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Fail on any nonzero exit code
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Fail when any of `patterns` appears in stdout or stderr
    pub fn fail_on(mut self, patterns: &[&str]) -> Self {
        self.fail_patterns
            .extend(patterns.iter().map(|p| p.to_string()));
        self
    }

    /// Message reported when a failure pattern matches
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Command line rendered for logs and error messages
    pub fn display(&self) -> String {
        self.command.join(" ")
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Entire stdout
    pub stdout: String,
    /// Entire stderr
    pub stderr: String,
}

/// Runs external commands and classifies their outcome
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    /// Create an executor
    pub fn new() -> Self {
        Self
    }

    /// Run `request` and return its stdout on success
    pub async fn execute(&self, request: &ExecRequest) -> Result<String> {
        let command_line = request.display();
        let output = self.run(request).await?;

        log::info!(
            "Running [{}] produced output: [{}]",
            command_line,
            output.stdout.trim()
        );

        if output.code != Some(0) {
            let stderr = output.stderr.trim().to_string();
            if request.strict {
                return Err(ExecError::NonZeroExit {
                    command: command_line,
                    code: output.code,
                    stderr,
                }
                .into());
            }
            log::warn!("Running [{}] produced an error: [{}]", command_line, stderr);
        }

        if let Some(pattern) = first_matching_pattern(&request.fail_patterns, &output) {
            log::debug!("Failure pattern '{}' matched for [{}]", pattern, command_line);
            let message = request.error_message.clone().unwrap_or_else(|| {
                format!(
                    "Failed to run [{}] - [{}][{}]",
                    command_line, output.stdout, output.stderr
                )
            });
            return Err(ExecError::FailurePattern {
                command: command_line,
                message,
            }
            .into());
        }

        Ok(output.stdout)
    }

    /// Spawn the process and capture both streams without classifying them
    pub async fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        let command_line = request.display();
        let (program, args) = request.command.split_first().ok_or_else(|| {
            ExecError::SpawnFailed {
                command: command_line.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            }
        })?;

        // Resolve against the parent's PATH so an overridden PATH cannot hide the program.
        let resolved = which::which(program).map_err(|source| ExecError::ProgramNotFound {
            program: program.clone(),
            source,
        })?;

        log::info!(
            "Running [{}] in [{}]",
            command_line,
            request
                .directory
                .as_deref()
                .map(Path::display)
                .map(|d| d.to_string())
                .unwrap_or_else(|| ".".to_string())
        );

        let mut command = Command::new(resolved);
        command
            .args(args)
            .envs(&request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(directory) = &request.directory {
            command.current_dir(directory);
        }

        let mut child = command.spawn().map_err(|source| ExecError::SpawnFailed {
            command: command_line.clone(),
            source,
        })?;

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = child.wait().await.map_err(|source| ExecError::SpawnFailed {
            command: command_line.clone(),
            source,
        })?;

        let stdout = join_reader(stdout_reader, &command_line).await?;
        let stderr = join_reader(stderr_reader, &command_line).await?;

        Ok(ExecOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Read a child stream to the end on its own task
fn drain<R>(stream: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut buffer).await?;
        }
        Ok(buffer)
    })
}

async fn join_reader(
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
    command_line: &str,
) -> Result<String> {
    let bytes = handle
        .await
        .map_err(|e| ExecError::ReaderFailed {
            command: command_line.to_string(),
            reason: e.to_string(),
        })?
        .map_err(|e| ExecError::ReaderFailed {
            command: command_line.to_string(),
            reason: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn first_matching_pattern<'a>(patterns: &'a [String], output: &ExecOutput) -> Option<&'a str> {
    patterns
        .iter()
        .find(|p| output.stdout.contains(p.as_str()) || output.stderr.contains(p.as_str()))
        .map(String::as_str)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ExecRequest {
        ExecRequest::new(["sh", "-c", script])
    }

    #[tokio::test]
    async fn supplied_envs_are_taken() {
        let out = CommandExecutor::new()
            .execute(&ExecRequest::new(["env"]).envs([("TEST_RELEASE", "1234")]))
            .await
            .unwrap();
        assert!(out.lines().any(|l| l == "TEST_RELEASE=1234"));
    }

    #[tokio::test]
    async fn system_envs_are_merged() {
        let out = CommandExecutor::new()
            .execute(&ExecRequest::new(["env"]))
            .await
            .unwrap();
        assert!(out.lines().any(|l| l.starts_with("PATH=")));
    }

    #[tokio::test]
    async fn supplied_envs_overwrite_system_envs() {
        let out = CommandExecutor::new()
            .execute(&ExecRequest::new(["env"]).envs([("PATH", "1234")]))
            .await
            .unwrap();
        assert!(out.lines().any(|l| l == "PATH=1234"));
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_warning_unless_strict() {
        let executor = CommandExecutor::new();
        let out = executor.execute(&sh("echo partial; exit 3")).await.unwrap();
        assert_eq!(out.trim(), "partial");

        let err = executor
            .execute(&sh("echo oops >&2; exit 3").strict())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit code Some(3)"), "{message}");
        assert!(message.contains("oops"), "{message}");
    }

    #[tokio::test]
    async fn failure_pattern_wins_over_clean_exit() {
        let err = CommandExecutor::new()
            .execute(&sh("echo 'fatal: tag already exists' >&2; exit 0").fail_on(&["already exists"]))
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to run [sh -c"), "{message}");
        assert!(message.contains("fatal: tag already exists"), "{message}");
    }

    #[tokio::test]
    async fn custom_error_message_is_used() {
        let err = CommandExecutor::new()
            .execute(
                &sh("echo '[rejected]'")
                    .fail_on(&["[rejected]"])
                    .error_message("Failed to push to remote"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to push to remote");
    }

    #[tokio::test]
    async fn large_output_on_both_streams_does_not_block() {
        let script = "i=0; while [ $i -lt 20000 ]; do echo out-$i; echo err-$i >&2; i=$((i+1)); done";
        let output = CommandExecutor::new().run(&sh(script)).await.unwrap();
        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout.lines().count(), 20000);
        assert_eq!(output.stderr.lines().count(), 20000);
    }

    #[tokio::test]
    async fn working_directory_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let out = CommandExecutor::new()
            .execute(&ExecRequest::new(["pwd"]).current_dir(dir.path()))
            .await
            .unwrap();
        let reported = std::fs::canonicalize(out.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn missing_program_is_reported() {
        let err = CommandExecutor::new()
            .execute(&ExecRequest::new(["definitely-not-a-real-program-xyz"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Exec(ExecError::ProgramNotFound { .. })
        ));
    }
}
