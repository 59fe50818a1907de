//! Package manifest checks for the service submodules.
//!
//! Every checked submodule must ship a parseable `package.json`. The
//! TypeScript services additionally need a `build` script and a `typescript`
//! dev dependency, or the Dockerfile build sequence has nothing to run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Submodules whose manifests are validated.
pub const MANIFEST_SUBMODULES: [&str; 3] = [
    "coachartie_capabilities",
    "coachartie_sms",
    "coachartie_email",
];

/// Subset that must declare the TypeScript build tooling.
pub const TYPESCRIPT_SUBMODULES: [&str; 2] = ["coachartie_sms", "coachartie_email"];

/// The slice of `package.json` this suite cares about.
#[derive(Debug, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("missing package.json: {0}/package.json")]
    Missing(String),

    #[error("invalid package.json in {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing build script in {0}")]
    MissingBuildScript(String),

    #[error("missing typescript dev dependency in {0}")]
    MissingTypescript(String),

    #[error("failed to read package.json in {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Validate one submodule's `package.json`.
pub fn check_package_manifest(root: &Path, name: &str) -> Result<PackageManifest, ManifestError> {
    let path = root.join(name).join("package.json");
    if !path.exists() {
        return Err(ManifestError::Missing(name.to_string()));
    }

    let contents = std::fs::read_to_string(&path).map_err(|source| ManifestError::Io {
        name: name.to_string(),
        source,
    })?;
    let manifest: PackageManifest =
        serde_json::from_str(&contents).map_err(|source| ManifestError::Parse {
            name: name.to_string(),
            source,
        })?;

    if TYPESCRIPT_SUBMODULES.contains(&name) {
        if !manifest.scripts.contains_key("build") {
            return Err(ManifestError::MissingBuildScript(name.to_string()));
        }
        if !manifest.dev_dependencies.contains_key("typescript") {
            return Err(ManifestError::MissingTypescript(name.to_string()));
        }
    }

    Ok(manifest)
}
