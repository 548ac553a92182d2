//! Change watcher for remote resources.
//!
//! `sitewatch` fetches a resource, stores the capture in a dated history,
//! compares it with the previous settled capture and notifies when the
//! content differs. Captures that revealed a change are kept until the
//! notification is confirmed, so a failed run can be retried with the same
//! comparison.
//!
//! Scheduling is left to the caller (cron, systemd timers, ...); each run
//! handles a single locator.

pub mod config;
pub mod detection;
pub mod logging;
pub mod retention;
pub mod store;
pub mod types;
pub mod watch;
