use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use thiserror::Error;

use crate::store::Capture;
use crate::types::ResourceIdentity;

/// Bucket directory names, e.g. `2020-09-26-0937`.
pub const BUCKET_FORMAT: &str = "%Y-%m-%d-%H%M";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_at(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Owns the on-disk history of every watched resource.
///
/// Layout: `root/label_fingerprint/YYYY-MM-DD-HHMM/label`.
/// Ordering is taken from the bucket name, never from filesystem metadata.
///
/// No locking is done here; runs against the same identity must be
/// serialized by whoever invokes them.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn history_dir(&self, identity: &ResourceIdentity) -> PathBuf {
        self.root.join(identity.dir_name())
    }

    /// All populated captures of an identity, oldest first.
    ///
    /// A missing history directory is an empty history, not an error.
    pub fn history(&self, identity: &ResourceIdentity) -> Result<Vec<Capture>, StoreError> {
        let dir = self.history_dir(identity);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_at(&dir)(e)),
        };

        let mut captures = Vec::new();
        for entry in entries {
            let entry = entry.map_err(io_at(&dir))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let Some(timestamp) = entry.file_name().to_str().and_then(parse_bucket) else {
                tracing::warn!(path = %path.display(), "skipping unrecognised bucket");
                continue;
            };

            let capture = Capture {
                identity: identity.clone(),
                timestamp,
                location: path,
            };

            // Buckets left behind by a failed fetch hold no content.
            if !capture.is_populated() {
                tracing::warn!(path = %capture.location.display(), "skipping empty bucket");
                continue;
            }

            captures.push(capture);
        }

        captures.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(captures)
    }

    /// The capture with the greatest timestamp, if any.
    pub fn latest_capture(&self, identity: &ResourceIdentity) -> Result<Option<Capture>, StoreError> {
        Ok(self.history(identity)?.pop())
    }

    /// Captures whose bucket is strictly older than the bucket of `instant`,
    /// oldest first.
    pub fn captures_before(
        &self,
        identity: &ResourceIdentity,
        instant: DateTime<Utc>,
    ) -> Result<Vec<Capture>, StoreError> {
        let instant = truncate_to_minute(instant);
        let mut captures = self.history(identity)?;
        captures.retain(|c| c.timestamp < instant);
        Ok(captures)
    }

    /// Allocate the bucket for a capture taken at `now`.
    ///
    /// Re-allocating within the same minute reuses the existing bucket.
    pub fn new_capture_location(
        &self,
        identity: &ResourceIdentity,
        now: DateTime<Utc>,
    ) -> Result<Capture, StoreError> {
        let timestamp = truncate_to_minute(now);
        let location = self.history_dir(identity).join(bucket_name(timestamp));

        if !location.exists() {
            tracing::debug!(path = %location.display(), "creating capture bucket");
        }
        fs::create_dir_all(&location).map_err(io_at(&location))?;

        Ok(Capture {
            identity: identity.clone(),
            timestamp,
            location,
        })
    }

    /// Put `content` back into a capture's bucket, replacing what a fetch wrote.
    pub fn restore_content(&self, capture: &Capture, content: &[u8]) -> Result<(), StoreError> {
        let path = capture.content_path();
        write_atomically(&path, content).map_err(io_at(&path))?;
        tracing::info!(path = %path.display(), "restored capture content");
        Ok(())
    }

    /// Remove a capture's whole bucket. Deleting a missing capture is a no-op.
    pub fn delete(&self, capture: &Capture) -> Result<(), StoreError> {
        match fs::remove_dir_all(&capture.location) {
            Ok(()) => {
                tracing::info!(path = %capture.location.display(), "removed capture");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_at(&capture.location)(e)),
        }
    }
}

/// Write to a sibling temp file, fsync, then rename over `destination`.
/// Readers never see a partially written file.
pub fn write_atomically(destination: &Path, content: &[u8]) -> io::Result<()> {
    let mut temp_name = destination.as_os_str().to_owned();
    temp_name.push(".part");
    let temp_path = PathBuf::from(temp_name);

    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    fs::rename(&temp_path, destination)
}

pub fn bucket_name(timestamp: DateTime<Utc>) -> String {
    timestamp.format(BUCKET_FORMAT).to_string()
}

pub fn parse_bucket(name: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(name, BUCKET_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts - Duration::seconds(i64::from(ts.second())) - Duration::nanoseconds(i64::from(ts.nanosecond()))
}
