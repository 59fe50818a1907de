//! Dockerfile validity rules per service.
//!
//! All four services must ship a build file. The TypeScript services
//! additionally need the full install/build/prune sequence, and must never
//! install prod-only dependencies up front: `npm install --omit=dev` before
//! `npm run build` strips the compiler the build needs, which has shipped
//! broken before.

use std::path::Path;

use thiserror::Error;

/// How one service is built from its submodule.
#[derive(Debug, Clone)]
pub struct ServiceBuild {
    pub name: &'static str,
    /// Dockerfile path relative to the checkout root. Case is preserved from
    /// the deployed layout (capabilities uses lower-case `dockerfile`).
    pub dockerfile: &'static str,
    /// TypeScript services get the full content rules, not just existence.
    pub typescript: bool,
}

/// The four deployable services and their build files.
pub const SERVICES: [ServiceBuild; 4] = [
    ServiceBuild {
        name: "capabilities",
        dockerfile: "coachartie_capabilities/dockerfile",
        typescript: false,
    },
    ServiceBuild {
        name: "discord",
        dockerfile: "coachartie_discord/Dockerfile",
        typescript: false,
    },
    ServiceBuild {
        name: "sms",
        dockerfile: "coachartie_sms/Dockerfile",
        typescript: true,
    },
    ServiceBuild {
        name: "email",
        dockerfile: "coachartie_email/Dockerfile",
        typescript: true,
    },
];

/// Install/build/prune steps every TypeScript Dockerfile must contain.
const REQUIRED_STEPS: [&str; 3] = ["npm install", "npm run build", "npm prune --omit=dev"];

/// Regression guard: prod-only install before the build step.
const FORBIDDEN_STEP: &str = "npm install --omit=dev";

#[derive(Debug, Error)]
pub enum DockerfileError {
    #[error("missing Dockerfile: {0}")]
    Missing(String),

    #[error("{path} is missing required step `{step}`")]
    MissingStep { path: String, step: &'static str },

    #[error("{path} contains forbidden `{step}`: prod-only install runs before the build")]
    ForbiddenStep { path: String, step: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Validate one service's Dockerfile against the rules above.
pub fn check_dockerfile(root: &Path, service: &ServiceBuild) -> Result<(), DockerfileError> {
    let path = root.join(service.dockerfile);
    if !path.exists() {
        return Err(DockerfileError::Missing(service.dockerfile.to_string()));
    }

    if !service.typescript {
        return Ok(());
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| DockerfileError::Io {
        path: service.dockerfile.to_string(),
        source,
    })?;

    for step in REQUIRED_STEPS {
        if !contents.contains(step) {
            return Err(DockerfileError::MissingStep {
                path: service.dockerfile.to_string(),
                step,
            });
        }
    }

    if contents.contains(FORBIDDEN_STEP) {
        return Err(DockerfileError::ForbiddenStep {
            path: service.dockerfile.to_string(),
            step: FORBIDDEN_STEP,
        });
    }

    Ok(())
}
