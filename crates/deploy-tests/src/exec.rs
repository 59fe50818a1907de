//! Narrow external-command executor.
//!
//! Every check that shells out (`git`, `docker-compose`) goes through the
//! [`CommandRunner`] trait so unit tests can substitute a scripted fake for
//! the real process spawner.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Default timeout for external commands that should return quickly.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One external command invocation: program, args, working directory, bound.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl CommandRequest {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn in_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// External-command failures, each carrying the program for context.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Executor seam for external commands.
///
/// Kept deliberately narrow (request in, stdout/stderr out) so checkers stay
/// generic over the runner and the test suite can script outcomes.
pub trait CommandRunner {
    fn run(
        &self,
        request: CommandRequest,
    ) -> impl Future<Output = Result<CommandOutput, ExecError>> + Send;
}

impl<R: CommandRunner + Sync> CommandRunner for &R {
    fn run(
        &self,
        request: CommandRequest,
    ) -> impl Future<Output = Result<CommandOutput, ExecError>> + Send {
        (**self).run(request)
    }
}

/// Production runner backed by `tokio::process` with a hard timeout.
///
/// The child is killed on timeout via `kill_on_drop`, so a wedged
/// `docker-compose build` cannot hang the suite indefinitely.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, request: CommandRequest) -> Result<CommandOutput, ExecError> {
        debug!(program = %request.program, args = ?request.args, "running external command");

        let mut command = tokio::process::Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &request.cwd {
            command.current_dir(cwd);
        }

        let output = tokio::time::timeout(request.timeout, command.output())
            .await
            .map_err(|_| ExecError::Timeout {
                program: request.program.clone(),
                timeout: request.timeout,
            })?
            .map_err(|source| ExecError::Spawn {
                program: request.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                program: request.program,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_runner_captures_stdout() {
        let output = SystemRunner
            .run(CommandRequest::new("sh", &["-c", "echo hello"]))
            .await
            .expect("echo should succeed");

        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_system_runner_reports_nonzero_exit() {
        let err = SystemRunner
            .run(CommandRequest::new("sh", &["-c", "echo nope >&2; exit 3"]))
            .await
            .expect_err("non-zero exit should fail");

        match err {
            ExecError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("nope"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_system_runner_reports_spawn_failure() {
        let err = SystemRunner
            .run(CommandRequest::new("definitely-not-a-real-binary", &[]))
            .await
            .expect_err("missing binary should fail to spawn");

        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_system_runner_enforces_timeout() {
        let err = SystemRunner
            .run(
                CommandRequest::new("sh", &["-c", "sleep 5"])
                    .with_timeout(Duration::from_millis(100)),
            )
            .await
            .expect_err("sleep should be killed by the timeout");

        assert!(matches!(err, ExecError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_system_runner_honors_cwd() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = SystemRunner
            .run(CommandRequest::new("sh", &["-c", "pwd"]).in_dir(dir.path()))
            .await
            .expect("pwd should succeed");

        // Compare canonicalized paths: tempdirs may sit behind symlinks.
        let reported = std::fs::canonicalize(output.stdout.trim()).expect("canonicalize pwd");
        let expected = std::fs::canonicalize(dir.path()).expect("canonicalize tempdir");
        assert_eq!(reported, expected);
    }
}
