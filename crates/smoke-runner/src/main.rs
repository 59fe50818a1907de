//! E2E smoke-test runner for the CoachArtie stack.
//!
//! Probes the health endpoint of every deployed service, then exercises the
//! capability listing, capability execution, and chat endpoints of the
//! capabilities service. Exit code 0 when every probe passes, 1 on any
//! failure or setup error, 130 when interrupted.

mod config;
mod probe;
mod report;

use config::StackConfig;
use probe::ProbeRunner;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smoke_runner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StackConfig::from_env();
    debug!(services = config.services.len(), "loaded stack configuration");

    let runner = match ProbeRunner::new(config) {
        Ok(runner) => runner,
        Err(err) => {
            report::fatal(&format!("Smoke run failed to start: {err}"));
            std::process::exit(1);
        }
    };

    let code = tokio::select! {
        summary = runner.run_all() => {
            if summary.all_passed() { 0 } else { 1 }
        }
        _ = tokio::signal::ctrl_c() => {
            report::interrupted("Smoke run interrupted");
            130
        }
    };

    std::process::exit(code);
}
