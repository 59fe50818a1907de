//! Git submodule presence and freshness checks.
//!
//! Each deployable service lives in its own submodule. Presence is a pure
//! filesystem check; freshness shells out to `git` through the
//! [`CommandRunner`] seam to compare the checked-out revision against the
//! remote tip.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::exec::{CommandRequest, CommandRunner, ExecError};

/// The fixed set of service submodules a deployable checkout must carry.
pub const SUBMODULES: [&str; 4] = [
    "coachartie_capabilities",
    "coachartie_discord",
    "coachartie_sms",
    "coachartie_email",
];

/// Remote branch the freshness check compares against.
///
/// Known limitation: a submodule tracking a different default branch will be
/// reported as behind even when it is current.
pub const REMOTE_BRANCH: &str = "main";

/// Fetch can hit the network, so it gets a generous bound.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum SubmoduleError {
    #[error("missing submodule: {0}")]
    Missing(String),

    #[error("submodule not initialized: {0}")]
    NotInitialized(String),

    #[error("submodule {name} is behind remote: HEAD {local} != origin/{branch} {remote}")]
    BehindRemote {
        name: String,
        local: String,
        remote: String,
        branch: &'static str,
    },

    #[error("failed to check submodule {name}: {source}")]
    Git {
        name: String,
        #[source]
        source: ExecError,
    },
}

/// Assert the submodule directory exists and has been initialized.
///
/// `.git` is a file for submodules and a directory for plain clones; either
/// counts as initialized.
pub fn check_presence(root: &Path, name: &str) -> Result<(), SubmoduleError> {
    let dir = root.join(name);
    if !dir.exists() {
        return Err(SubmoduleError::Missing(name.to_string()));
    }
    if !dir.join(".git").exists() {
        return Err(SubmoduleError::NotInitialized(name.to_string()));
    }
    Ok(())
}

/// Currently checked-out revision of the submodule.
pub async fn head_revision<R: CommandRunner>(
    runner: &R,
    root: &Path,
    name: &str,
) -> Result<String, SubmoduleError> {
    let output = runner
        .run(CommandRequest::new("git", &["rev-parse", "HEAD"]).in_dir(root.join(name)))
        .await
        .map_err(|source| SubmoduleError::Git {
            name: name.to_string(),
            source,
        })?;
    Ok(output.stdout.trim().to_string())
}

/// Tip of the remote default branch, after fetching.
pub async fn remote_revision<R: CommandRunner>(
    runner: &R,
    root: &Path,
    name: &str,
) -> Result<String, SubmoduleError> {
    let dir = root.join(name);

    runner
        .run(
            CommandRequest::new("git", &["fetch", "origin"])
                .in_dir(&dir)
                .with_timeout(FETCH_TIMEOUT),
        )
        .await
        .map_err(|source| SubmoduleError::Git {
            name: name.to_string(),
            source,
        })?;

    let reference = format!("origin/{REMOTE_BRANCH}");
    let output = runner
        .run(CommandRequest::new("git", &["rev-parse", &reference]).in_dir(&dir))
        .await
        .map_err(|source| SubmoduleError::Git {
            name: name.to_string(),
            source,
        })?;
    Ok(output.stdout.trim().to_string())
}

/// Assert the submodule's HEAD matches the remote default-branch tip.
pub async fn check_freshness<R: CommandRunner>(
    runner: &R,
    root: &Path,
    name: &str,
) -> Result<(), SubmoduleError> {
    let local = head_revision(runner, root, name).await?;
    let remote = remote_revision(runner, root, name).await?;

    if local != remote {
        return Err(SubmoduleError::BehindRemote {
            name: name.to_string(),
            local,
            remote,
            branch: REMOTE_BRANCH,
        });
    }
    Ok(())
}
