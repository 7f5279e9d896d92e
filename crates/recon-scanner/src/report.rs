//! The scan report returned to callers and written to disk.

use crate::error::Result;
use crate::probe::LiveSubdomain;
use recon_core::{Domain, Subdomain};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;

/// Consolidated result of one scan.
///
/// The domain is not part of the serialized shape; it names the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Scan target
    #[serde(skip)]
    pub domain: Domain,
    /// Hosts that answered 200 or 301, in probe order
    #[serde(rename = "subdomains_with_status")]
    pub live_subdomains: Vec<LiveSubdomain>,
    /// Archived URLs per live host
    pub wayback_data: BTreeMap<Subdomain, Vec<String>>,
    /// Parameterized URLs per host, from the authoritative capture
    pub paramspider_data: BTreeMap<Subdomain, Vec<String>>,
}

impl ScanReport {
    /// Render the report as the on-disk artifact: JSON indented by four spaces.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}
