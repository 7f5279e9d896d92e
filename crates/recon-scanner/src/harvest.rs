//! URL harvesting for live hosts.
//!
//! Each host gets its own task that runs both harvest tools and returns a
//! `HarvestResult` carrying the host key, so results are paired by
//! construction rather than by position in a flattened task list.

use crate::probe::LiveSubdomain;
use crate::runner::ProcessRunner;
use futures::future::join_all;
use recon_core::{Subdomain, ToolCommand};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Both harvest captures for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestResult {
    /// Host the URLs belong to
    pub subdomain: Subdomain,
    /// Archived URLs
    pub wayback_urls: Vec<String>,
    /// Parameterized URLs as printed on stdout
    pub param_urls: Vec<String>,
}

/// Harvest results keyed by host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestOutput {
    /// Host to archived URLs
    pub wayback: BTreeMap<Subdomain, Vec<String>>,
    /// Host to parameterized URLs captured from stdout
    pub params: BTreeMap<Subdomain, Vec<String>>,
}

impl FromIterator<HarvestResult> for HarvestOutput {
    fn from_iter<T: IntoIterator<Item = HarvestResult>>(iter: T) -> Self {
        let mut output = Self::default();
        for result in iter {
            output
                .wayback
                .insert(result.subdomain.clone(), result.wayback_urls);
            output.params.insert(result.subdomain, result.param_urls);
        }
        output
    }
}

/// The two tools run per host.
#[derive(Debug, Clone, Copy)]
pub struct HarvestTools<'a> {
    /// Archived-URL harvester
    pub wayback: &'a ToolCommand,
    /// Parameter-discovery harvester
    pub params: &'a ToolCommand,
}

/// Harvest every live host concurrently.
pub async fn harvest_hosts(
    runner: &dyn ProcessRunner,
    tools: HarvestTools<'_>,
    hosts: &[LiveSubdomain],
    cancel: &CancellationToken,
) -> HarvestOutput {
    info!(
        "Fetching URLs from {} and {} for {} subdomains...",
        tools.wayback.program,
        tools.params.program,
        hosts.len()
    );

    let tasks = hosts
        .iter()
        .map(|host| harvest_host(runner, tools, &host.subdomain, cancel));

    join_all(tasks).await.into_iter().collect()
}

async fn harvest_host(
    runner: &dyn ProcessRunner,
    tools: HarvestTools<'_>,
    subdomain: &Subdomain,
    cancel: &CancellationToken,
) -> HarvestResult {
    let target = subdomain.as_str();
    let wayback_args = tools.wayback.args_for(target);
    let params_args = tools.params.args_for(target);
    let (wayback_urls, param_urls) = tokio::join!(
        runner.run(&tools.wayback.program, &wayback_args, cancel),
        runner.run(&tools.params.program, &params_args, cancel),
    );

    info!(
        "Fetched URLs for subdomain {}: {} from {}, {} from {}",
        subdomain,
        wayback_urls.len(),
        tools.wayback.program,
        param_urls.len(),
        tools.params.program
    );

    HarvestResult {
        subdomain: subdomain.clone(),
        wayback_urls,
        param_urls,
    }
}
