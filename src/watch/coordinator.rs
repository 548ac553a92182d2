use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::detection::{ChangeDetector, Clock, DetectError, Differ, FetchError, Fetcher};
use crate::retention::{self, NotifyOutcome};
use crate::store::{SnapshotStore, StoreError};
use crate::types::{ChangeVerdict, IdentityError, ResourceIdentity};
use crate::watch::{Notifier, NotifyError};

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Invalid locator: {0}")]
    InvalidLocator(#[from] IdentityError),
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Notification failed: {0}")]
    Notify(#[from] NotifyError),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<DetectError> for WatchError {
    fn from(e: DetectError) -> Self {
        match e {
            DetectError::Fetch(e) => WatchError::Fetch(e),
            DetectError::Storage(e) => WatchError::Storage(e),
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub identity: ResourceIdentity,
    pub verdict: ChangeVerdict,
    /// Bucket of this run's capture; removed again if `verdict` is unchanged,
    /// unless the bucket already held the baseline.
    pub capture: PathBuf,
    pub deleted: Vec<PathBuf>,
}

impl RunReport {
    /// Write the report as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let f = fs::File::create(path)?;
        serde_json::to_writer_pretty(&f, self)?;
        f.sync_all()
    }
}

/// Sequences one watch run: identify, detect, notify, reconcile.
///
/// WatchCoordinator is single-threaded and non-reentrant per identity.
pub struct WatchCoordinator<F, D, C, N> {
    detector: ChangeDetector<F, D, C>,
    notifier: N,
}

impl<F, D, C, N> WatchCoordinator<F, D, C, N>
where
    F: Fetcher,
    D: Differ,
    C: Clock,
    N: Notifier,
{
    pub fn new(store: SnapshotStore, fetcher: F, differ: D, clock: C, notifier: N) -> Self {
        Self {
            detector: ChangeDetector::new(store, fetcher, differ, clock),
            notifier,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        self.detector.store()
    }

    pub fn run(&self, locator: &str) -> Result<RunReport, WatchError> {
        // 1. Identify (no storage I/O before this succeeds)
        let identity = ResourceIdentity::identify(locator)?;
        tracing::info!(
            locator,
            label = identity.label(),
            fingerprint = identity.fingerprint(),
            "watching"
        );

        // 2. Detect; on failure nothing is reconciled
        let detection = self.detector.detect(&identity)?;

        // 3. Notify only on change
        let (outcome, notify_error) = match &detection.verdict {
            ChangeVerdict::Changed(diff) => match self.notifier.notify(&identity, diff) {
                Ok(()) => (NotifyOutcome::Delivered, None),
                Err(e) => {
                    tracing::error!(error = %e, "notification failed, keeping captures");
                    (NotifyOutcome::Failed, Some(e))
                }
            },
            ChangeVerdict::NoPriorCapture => {
                tracing::info!("no prior capture, seeding history");
                (NotifyOutcome::NotAttempted, None)
            }
            ChangeVerdict::Unchanged => {
                tracing::info!("no change");
                (NotifyOutcome::NotAttempted, None)
            }
        };

        // 4. Reconcile
        let deleted = retention::apply(self.store(), &detection, outcome)?;

        if let Some(e) = notify_error {
            return Err(e.into());
        }

        Ok(RunReport {
            identity,
            verdict: detection.verdict,
            capture: detection.capture.location,
            deleted: deleted.into_iter().map(|c| c.location).collect(),
        })
    }
}
