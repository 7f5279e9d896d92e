//! HTTP liveness probing.
//!
//! Every discovered subdomain gets exactly one GET. Requests run
//! concurrently up to a fixed ceiling; each request's outcome is captured on
//! its own so a failing host never disturbs its siblings.

use crate::error::{Result, ScanError};
use async_trait::async_trait;
use futures::future::join_all;
use recon_core::{ProbeConfig, Subdomain};
use reqwest::{redirect, Client};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Status codes that qualify a host for harvesting and the report.
pub const REPORTABLE_STATUS_CODES: [u16; 2] = [200, 301];

/// Result of probing one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The host answered with this status (after redirects)
    Live(u16),
    /// The probe was cancelled before the host answered
    Dead,
    /// Timeout, connection or DNS failure
    Error(String),
}

impl ProbeOutcome {
    /// Whether this outcome survives into the report.
    #[must_use]
    pub fn reportable_status(&self) -> Option<u16> {
        match self {
            Self::Live(code) if REPORTABLE_STATUS_CODES.contains(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(code) => write!(f, "status code {code}"),
            Self::Dead => write!(f, "no answer before cancellation"),
            Self::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// One probed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub subdomain: Subdomain,
    pub outcome: ProbeOutcome,
}

/// A host that passed the status filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSubdomain {
    pub subdomain: Subdomain,
    pub status_code: u16,
}

/// Classifies one host.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `subdomain` and report what happened. Must not panic on
    /// network failure.
    async fn probe(&self, subdomain: &Subdomain) -> ProbeOutcome;
}

/// Production prober issuing plain HTTP GET requests.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    scheme: String,
}

impl HttpProber {
    /// Build a prober from the probe settings.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .pool_max_idle_per_host(config.max_concurrency)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            scheme: config.scheme.clone(),
        })
    }

    /// URL requested for `subdomain`.
    #[must_use]
    pub fn probe_url(&self, subdomain: &Subdomain) -> String {
        format!("{}://{}", self.scheme, subdomain)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, subdomain: &Subdomain) -> ProbeOutcome {
        match self.client.get(self.probe_url(subdomain)).send().await {
            Ok(response) => ProbeOutcome::Live(response.status().as_u16()),
            Err(e) => {
                let err = ScanError::Probe {
                    subdomain: subdomain.to_string(),
                    reason: describe_request_error(&e),
                };
                debug!("{}", err);
                ProbeOutcome::Error(err.to_string())
            }
        }
    }
}

fn describe_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else if err.is_redirect() {
        format!("too many redirects: {err}")
    } else {
        err.to_string()
    }
}

/// Probe every subdomain once, at most `max_concurrency` at a time.
///
/// The returned vector is index-aligned with `subdomains` regardless of the
/// order in which requests complete. Tasks still waiting or in flight when
/// `cancel` fires resolve to `Dead`.
pub async fn probe_all(
    prober: &dyn Prober,
    subdomains: &[Subdomain],
    max_concurrency: usize,
    cancel: &CancellationToken,
) -> Vec<ProbeResult> {
    info!("Checking HTTP status for {} subdomains...", subdomains.len());

    let permits = Semaphore::new(max_concurrency.max(1));
    let tasks = subdomains.iter().map(|subdomain| {
        let permits = &permits;
        async move {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => ProbeOutcome::Dead,
                outcome = async {
                    match permits.acquire().await {
                        Ok(_permit) => prober.probe(subdomain).await,
                        Err(_) => ProbeOutcome::Error("probe pool closed".to_string()),
                    }
                } => outcome,
            };
            ProbeResult {
                subdomain: subdomain.clone(),
                outcome,
            }
        }
    });

    join_all(tasks).await
}

/// Keep hosts whose outcome is reportable, logging the rest.
pub fn filter_live(results: Vec<ProbeResult>) -> Vec<LiveSubdomain> {
    results
        .into_iter()
        .filter_map(|result| {
            match &result.outcome {
                ProbeOutcome::Live(code) => {
                    info!("Subdomain {} returned status code {}", result.subdomain, code);
                }
                ProbeOutcome::Dead => {
                    debug!("{} not checked: {}", result.subdomain, result.outcome);
                }
                ProbeOutcome::Error(_) => {
                    warn!("Error checking {}: {}", result.subdomain, result.outcome);
                }
            }
            result
                .outcome
                .reportable_status()
                .map(|status_code| LiveSubdomain {
                    subdomain: result.subdomain,
                    status_code,
                })
        })
        .collect()
}
