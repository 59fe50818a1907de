//! Compose manifest completeness and container stack lifecycle.
//!
//! The manifest check is textual: every service needs its block and a build
//! context pointing at its submodule. [`ComposeStack`] drives the real
//! `docker-compose` binary through the [`CommandRunner`] seam for the build
//! and up/down assertions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::exec::{CommandOutput, CommandRequest, CommandRunner, ExecError};

/// Compose manifest path relative to the checkout root.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Service block names the manifest must define.
pub const COMPOSE_SERVICES: [&str; 4] = ["capabilities", "discord", "sms", "email"];

/// Full no-cache builds of four images take a while.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(300);

/// Bound for up/ps/down, which should each return quickly.
const LIFECYCLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed warm-up before container health status is trusted.
pub const HEALTH_WARMUP: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("docker-compose.yml is missing service block `{0}:`")]
    MissingService(String),

    #[error("docker-compose.yml is missing build context `./coachartie_{0}`")]
    MissingContext(String),

    #[error("docker-compose {action} failed: {source}")]
    Command {
        action: &'static str,
        #[source]
        source: ExecError,
    },

    #[error("stack reports unhealthy containers:\n{0}")]
    Unhealthy(String),
}

/// Assert the compose manifest declares every service with its build context.
pub fn check_manifest(root: &Path) -> Result<(), ComposeError> {
    let path = root.join(COMPOSE_FILE);
    let manifest = std::fs::read_to_string(&path).map_err(|source| ComposeError::Io {
        path: COMPOSE_FILE.to_string(),
        source,
    })?;

    for service in COMPOSE_SERVICES {
        if !manifest.contains(&format!("{service}:")) {
            return Err(ComposeError::MissingService(service.to_string()));
        }
        if !manifest.contains(&format!("context: ./coachartie_{service}")) {
            return Err(ComposeError::MissingContext(service.to_string()));
        }
    }
    Ok(())
}

/// Drives `docker-compose` against one checkout.
pub struct ComposeStack<R> {
    root: PathBuf,
    runner: R,
    warmup: Duration,
}

impl<R: CommandRunner> ComposeStack<R> {
    pub fn new(root: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            root: root.into(),
            runner,
            warmup: HEALTH_WARMUP,
        }
    }

    /// Shorten the warm-up wait; unit tests cannot afford the real 30s.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    async fn compose(
        &self,
        action: &'static str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, ComposeError> {
        self.runner
            .run(
                CommandRequest::new("docker-compose", args)
                    .in_dir(&self.root)
                    .with_timeout(timeout),
            )
            .await
            .map_err(|source| ComposeError::Command { action, source })
    }

    /// `docker-compose build --no-cache` with the long build timeout.
    pub async fn build(&self) -> Result<(), ComposeError> {
        info!("building stack from scratch (no cache)");
        self.compose("build", &["build", "--no-cache"], BUILD_TIMEOUT)
            .await?;
        Ok(())
    }

    pub async fn up(&self) -> Result<(), ComposeError> {
        self.compose("up", &["up", "-d"], LIFECYCLE_TIMEOUT).await?;
        Ok(())
    }

    pub async fn ps(&self) -> Result<String, ComposeError> {
        let output = self.compose("ps", &["ps"], LIFECYCLE_TIMEOUT).await?;
        Ok(output.stdout)
    }

    pub async fn down(&self) -> Result<(), ComposeError> {
        self.compose("down", &["down"], LIFECYCLE_TIMEOUT).await?;
        Ok(())
    }

    /// Start the stack, wait out the warm-up, and assert no container reports
    /// unhealthy. The stack is torn down whether the health assertion passes
    /// or fails; a failed `up` leaves nothing to tear down.
    pub async fn run_health_cycle(&self) -> Result<(), ComposeError> {
        self.up().await?;

        info!(warmup = ?self.warmup, "waiting for container health checks");
        tokio::time::sleep(self.warmup).await;

        let health = self.check_healthy().await;
        let teardown = self.down().await;

        health?;
        teardown
    }

    async fn check_healthy(&self) -> Result<(), ComposeError> {
        let status = self.ps().await?;
        if status.contains("unhealthy") {
            return Err(ComposeError::Unhealthy(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::FakeRunner;

    const GOOD_MANIFEST: &str = "services:
  capabilities:
    build:
      context: ./coachartie_capabilities
  discord:
    build:
      context: ./coachartie_discord
  sms:
    build:
      context: ./coachartie_sms
  email:
    build:
      context: ./coachartie_email
";

    fn write_manifest(root: &Path, contents: &str) {
        std::fs::write(root.join(COMPOSE_FILE), contents).expect("write manifest");
    }

    #[test]
    fn test_complete_manifest_passes() {
        let root = tempfile::tempdir().expect("tempdir");
        write_manifest(root.path(), GOOD_MANIFEST);

        check_manifest(root.path()).expect("complete manifest passes");
    }

    #[test]
    fn test_missing_service_block_is_named() {
        let root = tempfile::tempdir().expect("tempdir");
        write_manifest(root.path(), &GOOD_MANIFEST.replace("sms:", "mms:"));

        let err = check_manifest(root.path()).expect_err("missing block should fail");
        match err {
            ComposeError::MissingService(service) => assert_eq!(service, "sms"),
            other => panic!("expected MissingService, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_build_context_is_named() {
        let root = tempfile::tempdir().expect("tempdir");
        write_manifest(
            root.path(),
            &GOOD_MANIFEST.replace("context: ./coachartie_email", "image: email:latest"),
        );

        let err = check_manifest(root.path()).expect_err("missing context should fail");
        match err {
            ComposeError::MissingContext(service) => assert_eq!(service, "email"),
            other => panic!("expected MissingContext, got {other:?}"),
        }
    }

    #[test]
    fn test_absent_manifest_fails() {
        let root = tempfile::tempdir().expect("tempdir");

        let err = check_manifest(root.path()).expect_err("absent manifest should fail");
        assert!(matches!(err, ComposeError::Io { .. }));
    }

    #[tokio::test]
    async fn test_health_cycle_tears_down_on_success() {
        let runner = FakeRunner::new(vec![
            FakeRunner::stdout(""),                        // up -d
            FakeRunner::stdout("capabilities  Up (healthy)"), // ps
            FakeRunner::stdout(""),                        // down
        ]);
        let stack =
            ComposeStack::new("/tmp/checkout", &runner).with_warmup(Duration::from_millis(1));

        stack.run_health_cycle().await.expect("healthy stack passes");

        let seen = runner.seen_commands();
        assert_eq!(
            seen,
            vec![
                "docker-compose up -d",
                "docker-compose ps",
                "docker-compose down",
            ]
        );
    }

    #[tokio::test]
    async fn test_health_cycle_tears_down_on_unhealthy_stack() {
        let runner = FakeRunner::new(vec![
            FakeRunner::stdout(""),
            FakeRunner::stdout("sms  Restarting (unhealthy)"),
            FakeRunner::stdout(""),
        ]);
        let stack =
            ComposeStack::new("/tmp/checkout", &runner).with_warmup(Duration::from_millis(1));

        let err = stack
            .run_health_cycle()
            .await
            .expect_err("unhealthy container should fail");
        assert!(matches!(err, ComposeError::Unhealthy(_)));

        // Teardown must still have happened.
        assert!(runner
            .seen_commands()
            .contains(&"docker-compose down".to_string()));
    }

    #[tokio::test]
    async fn test_health_cycle_surfaces_failed_up() {
        let runner = FakeRunner::new(vec![FakeRunner::failure("docker-compose", 1)]);
        let stack =
            ComposeStack::new("/tmp/checkout", &runner).with_warmup(Duration::from_millis(1));

        let err = stack
            .run_health_cycle()
            .await
            .expect_err("failed up should fail");
        match err {
            ComposeError::Command { action, .. } => assert_eq!(action, "up"),
            other => panic!("expected Command, got {other:?}"),
        }

        // Nothing was started, so nothing is torn down.
        assert_eq!(runner.seen_commands(), vec!["docker-compose up -d"]);
    }
}
