//! Report persistence.

use crate::error::{Result, ScanError};
use recon_core::Domain;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Writes `<domain>.json` artifacts into a working directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    work_dir: PathBuf,
}

impl ReportStore {
    /// Create a store rooted at `work_dir`.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Directory artifacts are written to.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the artifact for `domain`.
    #[must_use]
    pub fn path_for(&self, domain: &Domain) -> PathBuf {
        self.work_dir.join(format!("{domain}.json"))
    }

    /// Replace the artifact for `domain` with `contents`.
    ///
    /// Contents are written to a sibling temp file and renamed over the
    /// target, so readers see either the previous or the new report.
    pub async fn write(&self, domain: &Domain, contents: &[u8]) -> Result<PathBuf> {
        let target = self.path_for(domain);
        let staging = self
            .work_dir
            .join(format!(".{domain}.json.{}.tmp", Uuid::new_v4().simple()));

        let persisted = async {
            fs::create_dir_all(&self.work_dir).await?;
            fs::write(&staging, contents).await?;
            fs::rename(&staging, &target).await
        }
        .await;

        match persisted {
            Ok(()) => Ok(target),
            Err(source) => {
                discard_staging(&staging).await;
                Err(ScanError::Persistence {
                    path: target,
                    source,
                })
            }
        }
    }

    /// Best-effort write: failures are logged and otherwise ignored.
    pub async fn persist(&self, domain: &Domain, contents: &[u8]) {
        info!("Storing data in {}...", self.path_for(domain).display());
        match self.write(domain, contents).await {
            Ok(path) => info!(
                "Data for {} has been successfully stored in {}.",
                domain,
                path.display()
            ),
            Err(e) => error!("Error writing JSON file: {}", e),
        }
    }
}

async fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!("Failed to remove {}: {}", staging.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn domain() -> Domain {
        Domain::new("ex.com").expect("valid domain")
    }

    #[tokio::test]
    async fn test_write_replaces_previous_artifact() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = ReportStore::new(tmp.path());

        store
            .write(&domain(), b"{\"first\": true, \"padding\": \"xxxxxxxxxxxx\"}")
            .await
            .expect("first write");
        let path = store
            .write(&domain(), b"{\"second\": true}")
            .await
            .expect("second write");

        assert_eq!(path, tmp.path().join("ex.com.json"));
        let contents = std::fs::read_to_string(&path).expect("read artifact");
        assert_eq!(contents, "{\"second\": true}");

        // No staging files left behind
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .expect("list dir")
            .map(|e| e.expect("entry").file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn test_write_creates_work_dir() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = ReportStore::new(tmp.path().join("reports"));

        let path = store.write(&domain(), b"{}").await.expect("write");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_write_failure_is_persistence_error() {
        let tmp = TempDir::new().expect("create temp dir");
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        let store = ReportStore::new(&blocker);

        let err = store.write(&domain(), b"{}").await.unwrap_err();
        assert!(matches!(err, ScanError::Persistence { .. }));

        // persist() only logs
        store.persist(&domain(), b"{}").await;
    }
}
