#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sitewatch::detection::{Clock, FetchError, Fetcher};
use sitewatch::types::ResourceIdentity;
use sitewatch::watch::{Notifier, NotifyError};

pub const LOCATOR: &str = "http://example.com/a";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 9, 26, 9, 37, 0).unwrap()
}

/// Serves whatever content it was last given; fails while `failing` is set.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    content: Rc<RefCell<Vec<u8>>>,
    failing: Rc<Cell<bool>>,
    calls: Rc<Cell<usize>>,
    seal_bucket: Rc<Cell<bool>>,
    last_destination: Rc<RefCell<Option<PathBuf>>>,
}

impl ScriptedFetcher {
    pub fn serving(content: &str) -> Self {
        let f = Self::default();
        f.serve(content);
        f
    }

    pub fn serve(&self, content: &str) {
        *self.content.borrow_mut() = content.as_bytes().to_vec();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Make each bucket read-only once its content is written.
    pub fn set_seal_bucket(&self, seal: bool) {
        self.seal_bucket.set(seal);
    }

    /// Make the last written bucket writable again.
    pub fn unseal(&self) {
        if let Some(destination) = self.last_destination.borrow().as_deref() {
            set_mode(destination.parent().unwrap(), 0o755);
        }
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.get() {
            return Err(FetchError::Unavailable(locator.to_string()));
        }
        fs::write(destination, &*self.content.borrow()).map_err(|source| FetchError::Write {
            path: destination.to_path_buf(),
            source,
        })?;
        *self.last_destination.borrow_mut() = Some(destination.to_path_buf());
        if self.seal_bucket.get() {
            set_mode(destination.parent().unwrap(), 0o555);
        }
        Ok(())
    }
}

/// Records every notification; rejects them while `failing` is set.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Rc<RefCell<Vec<(ResourceIdentity, String)>>>,
    attempts: Rc<Cell<usize>>,
    failing: Rc<Cell<bool>>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }

    pub fn sent(&self) -> Vec<(ResourceIdentity, String)> {
        self.sent.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, identity: &ResourceIdentity, diff: &str) -> Result<(), NotifyError> {
        self.attempts.set(self.attempts.get() + 1);
        if self.failing.get() {
            return Err(NotifyError::Rejected("smtp unavailable".into()));
        }
        self.sent
            .borrow_mut()
            .push((identity.clone(), diff.to_string()));
        Ok(())
    }
}

/// A clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.now.set(self.now.get() + Duration::minutes(minutes));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) {}

/// Whether a read-only directory actually refuses writes here. Root ignores
/// directory permissions, so tests relying on them bail out.
#[cfg(unix)]
pub fn permissions_enforced(scratch: &Path) -> bool {
    let sealed = scratch.join("sealed");
    fs::create_dir(&sealed).unwrap();
    set_mode(&sealed, 0o555);
    let refused = fs::write(sealed.join("x"), b"x").is_err();
    set_mode(&sealed, 0o755);
    fs::remove_dir_all(&sealed).unwrap();
    refused
}
