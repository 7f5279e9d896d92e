//! Subdomain discovery via two enumerators.

use crate::runner::ProcessRunner;
use recon_core::{Domain, Subdomain, ToolCommand};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Run both enumerators concurrently and return the union of their output.
///
/// Lines that cannot name a host are dropped. The set is sorted, which keeps
/// the report stable across runs.
pub async fn discover_subdomains(
    runner: &dyn ProcessRunner,
    enumerators: [&ToolCommand; 2],
    domain: &Domain,
    cancel: &CancellationToken,
) -> BTreeSet<Subdomain> {
    let [first, second] = enumerators;
    info!(
        "Finding subdomains for {} using {} and {}...",
        domain, first.program, second.program
    );

    let first_args = first.args_for(domain.as_str());
    let second_args = second.args_for(domain.as_str());
    let (first_lines, second_lines) = tokio::join!(
        runner.run(&first.program, &first_args, cancel),
        runner.run(&second.program, &second_args, cancel),
    );

    info!("Subdomains found by {}: {}", first.program, first_lines.len());
    info!("Subdomains found by {}: {}", second.program, second_lines.len());

    merge_enumerations([first_lines, second_lines])
}

/// Set-union of enumerator outputs.
pub fn merge_enumerations<I>(outputs: I) -> BTreeSet<Subdomain>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut merged = BTreeSet::new();
    for line in outputs.into_iter().flatten() {
        match Subdomain::parse(&line) {
            Some(subdomain) => {
                merged.insert(subdomain);
            }
            None => debug!("Ignoring enumerator line {:?}", line),
        }
    }
    merged
}
