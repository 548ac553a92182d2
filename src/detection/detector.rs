use thiserror::Error;

use crate::detection::{Clock, Differ, FetchError, Fetcher};
use crate::store::{Capture, SnapshotStore, StoreError};
use crate::types::{ChangeVerdict, ResourceIdentity};

#[derive(Debug, Error)]
pub enum DetectError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result of one detection cycle.
#[derive(Debug, Clone)]
pub struct Detection {
    /// The settled capture the new one was compared against.
    pub prior: Option<Capture>,
    /// Captures between `prior` and `capture` whose change was never
    /// confirmed as notified.
    pub pending: Vec<Capture>,
    pub capture: Capture,
    /// Content of a settled capture that already occupied this minute's
    /// bucket. It is the baseline when nothing older exists; `capture`
    /// shares its bucket and `prior` is `None`.
    pub replaced: Option<Vec<u8>>,
    pub verdict: ChangeVerdict,
}

impl Detection {
    /// Whether the new capture was written over the baseline's bucket.
    pub fn reuses_baseline(&self) -> bool {
        self.replaced.is_some()
    }
}

/// Captures a resource and compares it with its history.
///
/// A settled history holds exactly one capture. Anything newer than the
/// oldest capture is left over from a failed notification, so the oldest
/// capture before `now` is the comparison baseline. A retry after a failed
/// notification therefore reproduces the same diff.
///
/// When the only capture sits in the current minute's bucket, its content is
/// read before the fetch overwrites it and serves as the baseline.
pub struct ChangeDetector<F, D, C> {
    store: SnapshotStore,
    fetcher: F,
    differ: D,
    clock: C,
}

impl<F, D, C> ChangeDetector<F, D, C>
where
    F: Fetcher,
    D: Differ,
    C: Clock,
{
    pub fn new(store: SnapshotStore, fetcher: F, differ: D, clock: C) -> Self {
        Self {
            store,
            fetcher,
            differ,
            clock,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn detect(&self, identity: &ResourceIdentity) -> Result<Detection, DetectError> {
        let now = self.clock.now();

        // 1. Prior state, strictly older than the bucket about to be written
        let mut earlier = self.store.captures_before(identity, now)?;
        let prior = if earlier.is_empty() {
            None
        } else {
            Some(earlier.remove(0))
        };
        let pending = earlier;

        match &prior {
            Some(p) => tracing::debug!(
                path = %p.location.display(),
                pending = pending.len(),
                "found prior capture"
            ),
            None => tracing::debug!(identity = %identity.dir_name(), "no prior capture"),
        }

        // 2. Allocate and fill the new capture
        let capture = self.store.new_capture_location(identity, now)?;
        let replaced = if prior.is_none() && capture.is_populated() {
            tracing::debug!(
                path = %capture.location.display(),
                "settled capture in current bucket, using it as baseline"
            );
            Some(capture.read_content()?)
        } else {
            None
        };
        self.fetcher
            .fetch(identity.locator(), &capture.content_path())?;

        // 3. Compare
        let old = match (&prior, &replaced) {
            (Some(p), _) => Some(p.read_content()?),
            (None, Some(content)) => Some(content.clone()),
            (None, None) => None,
        };
        let verdict = match old {
            None => ChangeVerdict::NoPriorCapture,
            Some(old) => {
                let new = capture.read_content()?;
                ChangeVerdict::from_diff(self.differ.diff(&old, &new))
            }
        };

        tracing::info!(
            identity = %identity.dir_name(),
            capture = %capture.location.display(),
            changed = verdict.is_changed(),
            "detection complete"
        );

        Ok(Detection {
            prior,
            pending,
            capture,
            replaced,
            verdict,
        })
    }
}
