//! Sequential HTTP probes against the deployed stack.
//!
//! Every probe swallows its own transport and parsing errors into a
//! [`ProbeResult`] so one dead service never hides the state of the others.
//! Probes run strictly one at a time, which keeps the console output in a
//! deterministic order at the cost of a few seconds on a four-service stack.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::StackConfig;
use crate::report::{self, ProbeResult, RunSummary};

/// Per-request timeout. A health endpoint that takes longer than this is
/// treated as down.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from setting up the probe runner itself. Individual probes never
/// return errors; they fold failures into their result.
#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Task execution request accepted by `POST /api/task/execute`.
#[derive(Debug, Serialize)]
pub struct ExecuteRequest {
    pub capability: String,
    pub action: String,
    pub params: serde_json::Value,
    #[serde(rename = "respondTo")]
    pub respond_to: RespondTo,
}

/// Callback-routing descriptor telling the stack where a queued task's
/// result should be delivered.
#[derive(Debug, Serialize)]
pub struct RespondTo {
    pub channel: String,
    pub details: RespondDetails,
}

#[derive(Debug, Serialize)]
pub struct RespondDetails {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "channelId")]
    pub channel_id: String,
}

impl ExecuteRequest {
    /// The canned calculate task used to exercise the execution pipeline.
    pub fn calculate_smoke() -> Self {
        Self {
            capability: "calculate".to_string(),
            action: "compute".to_string(),
            params: serde_json::json!({ "expression": "2 + 2" }),
            respond_to: RespondTo {
                channel: "test".to_string(),
                details: RespondDetails {
                    kind: "test".to_string(),
                    channel_id: "smoke-test".to_string(),
                },
            },
        }
    }
}

/// Chat request accepted by `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response of the capability listing endpoint. The array is optional; a
/// listing without it is an empty deployment, not an error.
#[derive(Debug, Default, Deserialize)]
struct CapabilityListing {
    #[serde(default)]
    capabilities: Option<Vec<serde_json::Value>>,
}

/// Acknowledgement body of the execution endpoint. Execution is
/// fire-and-forget, so the body shape is advisory only.
#[derive(Debug, Default, Deserialize)]
struct ExecuteAck {
    message: Option<String>,
}

/// Runs the fixed probe battery against one stack configuration.
pub struct ProbeRunner {
    client: Client,
    config: StackConfig,
}

impl ProbeRunner {
    pub fn new(config: StackConfig) -> Result<Self, SmokeError> {
        let client = Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// GET `{base_url}/health`; pass iff the status is 2xx.
    ///
    /// Prints its status line immediately so output interleaves with probe
    /// execution order.
    pub async fn check_health(&self, name: &'static str, base_url: &str) -> ProbeResult {
        let url = format!("{base_url}/health");
        debug!(%url, "probing health endpoint");

        let result = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                ProbeResult::pass(name, format!("{name} health check passed"))
            }
            Ok(response) => ProbeResult::fail(
                name,
                format!("{name} health check failed: {}", response.status().as_u16()),
            ),
            Err(err) => ProbeResult::fail(name, format!("{name} health check failed: {err}")),
        };

        report::print_result(&result);
        result
    }

    /// GET the capability listing; pass on any 2xx, reporting how many
    /// capabilities the service advertises (malformed body counts as zero).
    pub async fn check_capability_listing(&self) -> ProbeResult {
        let url = format!("{}/api/task/capabilities", self.config.capabilities_url);
        debug!(%url, "probing capability listing");

        let result = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let count = response
                    .json::<CapabilityListing>()
                    .await
                    .ok()
                    .and_then(|listing| listing.capabilities)
                    .map(|caps| caps.len())
                    .unwrap_or(0);
                ProbeResult::pass(
                    "capability listing",
                    format!("capabilities service lists {count} capabilities"),
                )
            }
            Ok(response) => ProbeResult::fail(
                "capability listing",
                format!("capability listing failed: {}", response.status().as_u16()),
            ),
            Err(err) => {
                ProbeResult::fail("capability listing", format!("capability listing failed: {err}"))
            }
        };

        report::print_result(&result);
        result
    }

    /// POST a calculate task to the execution endpoint.
    ///
    /// Execution is queued asynchronously, so any 2xx acceptance passes
    /// regardless of the response body.
    pub async fn check_capability_execution(&self) -> ProbeResult {
        let url = format!("{}/api/task/execute", self.config.capabilities_url);
        debug!(%url, "probing capability execution");

        let request = ExecuteRequest::calculate_smoke();
        let result = match self.client.post(&url).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                let message = response
                    .json::<ExecuteAck>()
                    .await
                    .ok()
                    .and_then(|ack| ack.message)
                    .unwrap_or_else(|| "queued".to_string());
                ProbeResult::pass(
                    "capability execution",
                    format!("calculate capability executed: {message}"),
                )
            }
            Ok(response) => ProbeResult::fail(
                "capability execution",
                format!("calculate capability failed: {}", response.status().as_u16()),
            ),
            Err(err) => ProbeResult::fail(
                "capability execution",
                format!("calculate capability failed: {err}"),
            ),
        };

        report::print_result(&result);
        result
    }

    /// POST an authenticated chat message; any 2xx passes.
    pub async fn check_chat(&self) -> ProbeResult {
        let url = format!("{}/api/chat", self.config.capabilities_url);
        debug!(%url, "probing chat endpoint");

        let request = ChatRequest {
            message: "Hello from the smoke test".to_string(),
            user_id: "smoke-test-user".to_string(),
        };
        let result = match self
            .client
            .post(&url)
            .bearer_auth("test")
            .json(&request)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                ProbeResult::pass("chat", "chat endpoint responded".to_string())
            }
            Ok(response) => ProbeResult::fail(
                "chat",
                format!("chat endpoint failed: {}", response.status().as_u16()),
            ),
            Err(err) => ProbeResult::fail("chat", format!("chat endpoint failed: {err}")),
        };

        report::print_result(&result);
        result
    }

    /// Run the full battery: health checks for every service, then the three
    /// functional probes. Returns the tally for the exit-code decision.
    pub async fn run_all(&self) -> RunSummary {
        report::banner("Starting CoachArtie smoke tests");
        let mut summary = RunSummary::default();

        report::section("Service health checks");
        for service in &self.config.services {
            let result = self.check_health(service.name, &service.base_url).await;
            summary.record(&result);
        }

        println!();
        report::section("Core functionality");

        let result = self.check_capability_listing().await;
        summary.record(&result);

        let result = self.check_capability_execution().await;
        summary.record(&result);

        let result = self.check_chat().await;
        summary.record(&result);

        report::print_summary(&summary);
        summary
    }
}
