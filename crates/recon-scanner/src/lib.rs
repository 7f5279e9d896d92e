//! Recon Scanner - reconnaissance pipeline orchestration.
//!
//! This crate drives one scan of a target domain: subdomain discovery through
//! two external enumerators, HTTP liveness probing, URL harvesting for live
//! hosts, consolidation of a harvester's result files, and persistence of the
//! final report.
//!
//! # Features
//!
//! - Concurrent fan-out inside every stage with order-preserving gathers
//! - A single global ceiling on in-flight probe requests
//! - Per-task failure isolation: failures degrade to empty or dropped results
//! - Optional per-stage deadlines with cancellation of in-flight tasks
//!
//! # Example
//!
//! ```rust,ignore
//! use recon_core::{AppConfig, Domain};
//! use recon_scanner::{ScanContext, ScanPipeline};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let pipeline = ScanPipeline::from_config(Arc::new(AppConfig::default()))?;
//! let ctx = ScanContext::new(Domain::new("example.com")?, &CancellationToken::new());
//! let report = pipeline.run(&ctx).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod consolidate;
pub mod context;
pub mod discovery;
#[allow(missing_docs)]
pub mod error;
pub mod harvest;
pub mod orchestrator;
pub mod persist;
#[allow(missing_docs)]
pub mod probe;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use consolidate::{consolidate_results_dir, reconcile_param_captures};
pub use context::{ScanContext, Stage};
pub use discovery::{discover_subdomains, merge_enumerations};
pub use error::{Result, ScanError};
pub use harvest::{harvest_hosts, HarvestOutput, HarvestResult, HarvestTools};
pub use orchestrator::ScanPipeline;
pub use persist::ReportStore;
pub use probe::{
    filter_live, probe_all, HttpProber, LiveSubdomain, ProbeOutcome, ProbeResult, Prober,
    REPORTABLE_STATUS_CODES,
};
pub use report::ScanReport;
pub use runner::{ProcessRunner, TokioProcessRunner};
