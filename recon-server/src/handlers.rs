//! Request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use recon_core::Domain;
use recon_scanner::{ScanContext, ScanReport};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of `POST /scan`.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Target domain; absent and blank are both rejected
    #[serde(default)]
    pub domain: Option<String>,
}

/// Body of a successful `POST /scan`.
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    /// Always "Scan completed"
    pub message: &'static str,
    /// The full report
    pub data: ScanReport,
}

/// Health check.
pub async fn health() -> &'static str {
    "ok"
}

/// Run a full scan of the requested domain and return its report.
///
/// The scan runs inside the request; the response is sent once the report
/// has been built and persisted.
pub async fn scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Json(request) = payload?;
    let domain = Domain::new(request.domain.unwrap_or_default())?;

    let ctx = ScanContext::new(domain, &state.shutdown);
    info!("Scan {} requested for {}", ctx.run_id, ctx.domain);
    let report = state.pipeline.run(&ctx).await?;

    Ok(Json(ScanResponse {
        message: "Scan completed",
        data: report,
    }))
}
