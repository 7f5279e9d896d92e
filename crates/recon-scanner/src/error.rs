use std::path::PathBuf;
use thiserror::Error;

/// Failures raised inside the pipeline.
///
/// Everything except `Serialization` is produced at a task boundary, logged,
/// and turned into a degraded value (empty output, `Error` outcome) before it
/// can reach a sibling task or the caller.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("tool {tool} failed: {reason}")]
    ToolExecution { tool: String, reason: String },

    #[error("{operation} cancelled")]
    Cancelled { operation: String },

    #[error("probe of {subdomain} failed: {reason}")]
    Probe { subdomain: String, reason: String },

    #[error("failed to read results from {path}: {source}")]
    Consolidation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
