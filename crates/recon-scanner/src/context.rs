//! Per-run scan context.

use recon_core::Domain;
use std::fmt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// State owned by a single scan run.
///
/// Built once per request and passed by reference into every stage. The
/// cancellation token is a child of the caller's token, so cancelling the
/// caller (e.g. server shutdown) reaches every in-flight task of the run.
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Identifier attached to every log line of the run
    pub run_id: Uuid,
    /// Scan target
    pub domain: Domain,
    cancel: CancellationToken,
}

impl ScanContext {
    /// Create a context for `domain` whose cancellation follows `parent`.
    #[must_use]
    pub fn new(domain: Domain, parent: &CancellationToken) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            domain,
            cancel: parent.child_token(),
        }
    }

    /// Token for one stage. Cancelling it leaves the rest of the run intact.
    #[must_use]
    pub fn stage_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Subdomain enumeration
    Discovery,
    /// HTTP liveness probing
    Probe,
    /// URL harvesting for live hosts
    Harvest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Probe => write!(f, "probe"),
            Self::Harvest => write!(f, "harvest"),
        }
    }
}
