//! Deployment Configuration Validation Suite
//!
//! This crate validates that a CoachArtie checkout and its git submodules are
//! in a deployable, internally consistent state: submodules present and up to
//! date, Dockerfiles correct, compose manifest complete, environment file
//! populated, and (optionally) that the container stack actually builds and
//! starts healthy.
//!
//! # Features
//!
//! - `config`: Fast static checks against the local checkout (seconds)
//! - `remote`: Submodule freshness against origin (needs network)
//! - `stack`: Real `docker-compose` build and up/down cycle (needs Docker, minutes)
//! - `all`: Enable all test categories
//!
//! # Prerequisites
//!
//! 1. A CoachArtie checkout with submodules initialized
//! 2. `git` in PATH (`remote` tests), `docker-compose` in PATH (`stack` tests)
//! 3. `COACHARTIE_ROOT` pointing at the checkout (defaults to the current directory)
//!
//! # Usage
//!
//! ```bash
//! # Runs 0 deploy-tests (no default features)
//! cargo test
//!
//! # Static config checks only (seconds)
//! cargo test -p deploy-tests --features config
//!
//! # Pre-deploy validation - full suite (10min+)
//! cargo test -p deploy-tests --features all
//! ```

use std::path::PathBuf;

pub mod compose;
pub mod dockerfile;
pub mod envfile;
pub mod exec;
pub mod manifest;
pub mod submodule;

/// Root of the checkout under validation.
///
/// Reads `COACHARTIE_ROOT`, defaulting to the current directory so the suite
/// can run in-place from the stack repository.
pub fn stack_root() -> PathBuf {
    std::env::var("COACHARTIE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
