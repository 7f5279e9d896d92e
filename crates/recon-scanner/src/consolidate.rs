//! Consolidation of the parameter harvester's side-effect files.
//!
//! The parameter tool writes `<host>.txt` into a shared results directory in
//! addition to printing on stdout. The directory scan is rebuilt from file
//! contents alone; which capture the report uses is decided by
//! [`ParamSource`].

use crate::error::ScanError;
use recon_core::{ParamSource, Subdomain};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Extension of result files written by the parameter tool.
const RESULT_EXTENSION: &str = "txt";

/// Rebuild host -> URLs from every `*.txt` file in `results_dir`.
///
/// A missing directory yields an empty map. Unreadable files are skipped.
pub async fn consolidate_results_dir(results_dir: &Path) -> BTreeMap<Subdomain, Vec<String>> {
    info!("Consolidating results from {}...", results_dir.display());

    let mut consolidated = BTreeMap::new();

    let mut entries = match fs::read_dir(results_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Results directory {} does not exist", results_dir.display());
            return consolidated;
        }
        Err(e) => {
            warn!(
                "{}",
                ScanError::Consolidation {
                    path: results_dir.to_path_buf(),
                    source: e,
                }
            );
            return consolidated;
        }
    };

    let mut paths = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => paths.push(entry.path()),
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to list {}: {}", results_dir.display(), e);
                break;
            }
        }
    }
    // read_dir order is platform-dependent; sorting makes collisions resolve
    // the same way on every run.
    paths.sort();

    for path in paths {
        if path.extension().and_then(|ext| ext.to_str()) != Some(RESULT_EXTENSION) {
            continue;
        }

        let Some(subdomain) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(Subdomain::parse)
        else {
            debug!("Skipping result file with unusable name: {:?}", path);
            continue;
        };

        match fs::read_to_string(&path).await {
            Ok(contents) => {
                let urls: Vec<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                info!(
                    "Consolidated {} URLs for subdomain {} from {}",
                    urls.len(),
                    subdomain,
                    path.display()
                );
                if let Some(previous) = consolidated.insert(subdomain.clone(), urls) {
                    warn!(
                        "{} replaces {} earlier URLs for {} from a file differing only in case",
                        path.display(),
                        previous.len(),
                        subdomain
                    );
                }
            }
            Err(e) => warn!("{}", ScanError::Consolidation { path, source: e }),
        }
    }

    consolidated
}

/// Pick the authoritative parameter capture and log where the two disagree.
pub fn reconcile_param_captures(
    source: ParamSource,
    captured: BTreeMap<Subdomain, Vec<String>>,
    scanned: BTreeMap<Subdomain, Vec<String>>,
) -> BTreeMap<Subdomain, Vec<String>> {
    let hosts: BTreeSet<&Subdomain> = captured.keys().chain(scanned.keys()).collect();
    for host in hosts {
        let from_stdout = captured.get(host).map_or(0, Vec::len);
        let from_dir = scanned.get(host).map_or(0, Vec::len);
        if captured.get(host) != scanned.get(host) {
            warn!(
                "Parameter captures differ for {}: {} URLs on stdout, {} in results directory (using {})",
                host, from_stdout, from_dir, source
            );
        }
    }

    match source {
        ParamSource::ResultsDir => scanned,
        ParamSource::Stdout => captured,
    }
}
