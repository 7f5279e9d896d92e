//! Shared types used across the recon pipeline.
//!
//! `Domain` is the validated scan target; `Subdomain` is one candidate host
//! as reported by an enumeration tool.

use crate::error::ReconError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a DNS name.
const MAX_DOMAIN_LEN: usize = 253;

/// One DNS label: alphanumerics, `_` and inner `-`, at most 63 characters.
const LABEL: &str = r"[a-z0-9_](?:[a-z0-9_-]{0,61}[a-z0-9_])?";

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:{LABEL}\.)*{LABEL}$"))
        .expect("domain regex is hardcoded and valid")
});

/// A DNS name with an optional `:port`.
static HOST_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:{LABEL}\.)*{LABEL}(?::[0-9]{{1,5}})?$"))
        .expect("host regex is hardcoded and valid")
});

/// Newtype for the scan target with validation.
///
/// The domain is handed to external tools as an argument and names the
/// report file, so it must be a plain DNS name: no leading `-`, no path
/// separators, no whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Create a new `Domain` from user input.
    ///
    /// Input is trimmed, lowercased and stripped of a trailing dot.
    ///
    /// # Errors
    /// Returns a validation error if the input is blank or not a DNS name.
    pub fn new(input: impl AsRef<str>) -> Result<Self, ReconError> {
        let normalized = normalize_host(input.as_ref());

        if normalized.is_empty() {
            return Err(ReconError::Validation("Domain is required".to_string()));
        }

        if normalized.len() > MAX_DOMAIN_LEN {
            return Err(ReconError::Validation(format!(
                "invalid domain: must be at most {MAX_DOMAIN_LEN} characters, got {}",
                normalized.len()
            )));
        }

        if !DOMAIN_PATTERN.is_match(&normalized) {
            return Err(ReconError::Validation(format!(
                "invalid domain: must be a DNS name, got '{normalized}'"
            )));
        }

        Ok(Self(normalized))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One candidate host produced by discovery.
///
/// Ordering and equality are on the normalized host string, so the same
/// host reported by two tools with different casing collapses to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subdomain(String);

impl Subdomain {
    /// Parse one line of enumerator output.
    ///
    /// Returns `None` for lines that are not a DNS name with an optional
    /// `:port`. Hosts are later passed to tools as arguments, so anything
    /// shaped like a flag is rejected here.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let host = normalize_host(line);
        if host.len() > MAX_DOMAIN_LEN + ":65535".len() || !HOST_PATTERN.is_match(&host) {
            return None;
        }
        Some(Self(host))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subdomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn normalize_host(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_ascii_lowercase()
}
