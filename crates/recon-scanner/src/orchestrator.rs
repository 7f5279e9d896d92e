//! Scan pipeline orchestration.
//!
//! This module provides the `ScanPipeline`, which drives one scan through
//! discovery, probing, harvesting, consolidation and persistence. Stages run
//! strictly in that order; fan-out happens inside each stage.

use crate::consolidate::{consolidate_results_dir, reconcile_param_captures};
use crate::context::{ScanContext, Stage};
use crate::discovery::discover_subdomains;
use crate::error::Result;
use crate::harvest::{harvest_hosts, HarvestTools};
use crate::persist::ReportStore;
use crate::probe::{filter_live, probe_all, HttpProber, Prober};
use crate::report::ScanReport;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use recon_core::AppConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

/// Runs scans against the configured tools and prober.
///
/// The pipeline holds no per-run state, so one instance can serve concurrent
/// scans; everything run-specific lives in the [`ScanContext`].
pub struct ScanPipeline {
    config: Arc<AppConfig>,
    runner: Arc<dyn ProcessRunner>,
    prober: Arc<dyn Prober>,
    store: ReportStore,
}

impl ScanPipeline {
    /// Create a pipeline from explicit collaborators.
    #[must_use]
    pub fn new(
        config: Arc<AppConfig>,
        runner: Arc<dyn ProcessRunner>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        let store = ReportStore::new(config.output.work_dir.clone());
        Self {
            config,
            runner,
            prober,
            store,
        }
    }

    /// Create a pipeline using real processes and HTTP.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self> {
        let runner = Arc::new(TokioProcessRunner::new(config.tools.stderr_policy));
        let prober = Arc::new(HttpProber::new(&config.probe)?);
        Ok(Self::new(config, runner, prober))
    }

    /// Where the report for the run's domain is written.
    #[must_use]
    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Execute a full scan.
    ///
    /// Stage failures never surface here; they degrade to empty or dropped
    /// results. The only error is a report that cannot be serialized.
    pub async fn run(&self, ctx: &ScanContext) -> Result<ScanReport> {
        let span = info_span!("scan", run_id = %ctx.run_id, domain = %ctx.domain);
        self.run_stages(ctx).instrument(span).await
    }

    async fn run_stages(&self, ctx: &ScanContext) -> Result<ScanReport> {
        let tools = &self.config.tools;
        info!(
            "Starting subdomain discovery and data collection for {}...",
            ctx.domain
        );

        let token = ctx.stage_token();
        let discovered = self
            .bounded(
                Stage::Discovery,
                &token,
                discover_subdomains(
                    self.runner.as_ref(),
                    [&tools.subfinder, &tools.assetfinder],
                    &ctx.domain,
                    &token,
                ),
            )
            .await;
        let discovered: Vec<_> = discovered.into_iter().collect();
        info!("Found {} subdomains.", discovered.len());

        let token = ctx.stage_token();
        let probed = self
            .bounded(
                Stage::Probe,
                &token,
                probe_all(
                    self.prober.as_ref(),
                    &discovered,
                    self.config.probe.max_concurrency,
                    &token,
                ),
            )
            .await;
        let live = filter_live(probed);
        info!("{} of {} subdomains are live.", live.len(), discovered.len());

        let token = ctx.stage_token();
        let harvested = self
            .bounded(
                Stage::Harvest,
                &token,
                harvest_hosts(
                    self.runner.as_ref(),
                    HarvestTools {
                        wayback: &tools.waybackurls,
                        params: &tools.paramspider,
                    },
                    &live,
                    &token,
                ),
            )
            .await;

        let scanned = consolidate_results_dir(&tools.results_dir).await;
        let paramspider_data =
            reconcile_param_captures(self.config.output.param_source, harvested.params, scanned);

        let report = ScanReport {
            domain: ctx.domain.clone(),
            live_subdomains: live,
            wayback_data: harvested.wayback,
            paramspider_data,
        };

        let rendered = report.to_json_pretty()?;
        self.store.persist(&ctx.domain, &rendered).await;

        info!(
            "Scan of {} completed: {} live subdomains, {} hosts with archived URLs, {} with parameters",
            ctx.domain,
            report.live_subdomains.len(),
            report.wayback_data.len(),
            report.paramspider_data.len()
        );
        Ok(report)
    }

    /// Await `stage`, cancelling `token` if the stage outlives its deadline.
    ///
    /// After cancellation the stage is still awaited: its tasks observe the
    /// token, degrade, and the partial result is returned.
    async fn bounded<F>(&self, stage: Stage, token: &CancellationToken, fut: F) -> F::Output
    where
        F: Future,
    {
        let Some(limit) = self.stage_timeout(stage) else {
            return fut.await;
        };

        tokio::pin!(fut);
        tokio::select! {
            output = &mut fut => output,
            () = tokio::time::sleep(limit) => {
                warn!("{} stage exceeded {:?}, cancelling in-flight tasks", stage, limit);
                token.cancel();
                fut.await
            }
        }
    }

    fn stage_timeout(&self, stage: Stage) -> Option<Duration> {
        let pipeline = &self.config.pipeline;
        match stage {
            Stage::Discovery => pipeline.discovery_timeout(),
            Stage::Probe => pipeline.probe_stage_timeout(),
            Stage::Harvest => pipeline.harvest_timeout(),
        }
    }
}
