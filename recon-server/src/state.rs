//! Application state shared by every request.

use recon_core::AppConfig;
use recon_scanner::ScanPipeline;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// State handed to each handler.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline shared by concurrent scans
    pub pipeline: Arc<ScanPipeline>,

    /// Root token; cancelled on shutdown so in-flight scans wind down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create state around an existing pipeline.
    pub fn new(pipeline: Arc<ScanPipeline>, shutdown: CancellationToken) -> Self {
        Self { pipeline, shutdown }
    }

    /// Build the production pipeline from configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(
        config: Arc<AppConfig>,
        shutdown: CancellationToken,
    ) -> recon_scanner::Result<Self> {
        let pipeline = ScanPipeline::from_config(config)?;
        tracing::info!(
            "Reports will be written to {}",
            pipeline.store().work_dir().display()
        );
        Ok(Self::new(Arc::new(pipeline), shutdown))
    }
}
