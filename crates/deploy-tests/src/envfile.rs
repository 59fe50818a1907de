//! Environment file completeness.
//!
//! Only key presence is checked; values are deployment secrets and are not
//! validated here.

use std::path::Path;

use thiserror::Error;

/// Environment file path relative to the checkout root.
pub const ENV_FILE: &str = ".env";

/// Variables every deployment must define.
pub const REQUIRED_VARS: [&str; 4] = [
    "SUPABASE_URL",
    "SUPABASE_API_KEY",
    "DISCORD_BOT_TOKEN",
    "WEBHOOK_PASSPHRASE",
];

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("missing .env file in {0}")]
    Missing(String),

    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("failed to read .env: {0}")]
    Io(#[source] std::io::Error),
}

/// Assert the env file exists and names every required variable.
pub fn check_env_file(root: &Path) -> Result<(), EnvFileError> {
    let path = root.join(ENV_FILE);
    if !path.exists() {
        return Err(EnvFileError::Missing(root.display().to_string()));
    }

    let contents = std::fs::read_to_string(&path).map_err(EnvFileError::Io)?;

    for var in REQUIRED_VARS {
        if !contents.contains(var) {
            return Err(EnvFileError::MissingVar(var));
        }
    }
    Ok(())
}
