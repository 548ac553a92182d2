// A Capture is a handle, never a writer:
// content is written by a Fetcher into content_path()
// and only ever removed by the store as a whole bucket.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::store::StoreError;
use crate::types::ResourceIdentity;

/// One point-in-time snapshot of a watched resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub identity: ResourceIdentity,
    /// Minute granularity; this is the ordering key within a history.
    pub timestamp: DateTime<Utc>,
    /// The timestamped bucket directory owning this capture.
    pub location: PathBuf,
}

impl Capture {
    /// Path of the content file inside the bucket.
    pub fn content_path(&self) -> PathBuf {
        self.location.join(self.identity.label())
    }

    pub fn is_populated(&self) -> bool {
        self.content_path().is_file()
    }

    pub fn read_content(&self) -> Result<Vec<u8>, StoreError> {
        let path = self.content_path();
        std::fs::read(&path).map_err(|source| StoreError::Io { path, source })
    }
}
