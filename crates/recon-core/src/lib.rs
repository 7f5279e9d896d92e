//! Recon Core - Foundation crate for the recon pipeline.
//!
//! This crate provides shared types, error handling and configuration
//! management that the scanner and server crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Validated newtypes (`Domain`, `Subdomain`)
//!
//! # Example
//!
//! ```rust
//! use recon_core::{AppConfig, Domain};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let domain = Domain::new("Example.com")?;
//!
//! assert_eq!(domain.as_str(), "example.com");
//! assert_eq!(config.probe.max_concurrency, 100);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, OutputConfig, ParamSource, PipelineConfig, ProbeConfig, ServerConfig,
    StderrPolicy, ToolCommand, ToolsConfig,
};
pub use error::{ConfigError, ConfigResult, ReconError};
pub use types::{Domain, Subdomain};
