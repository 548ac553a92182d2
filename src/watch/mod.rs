pub mod coordinator;
pub mod notify;

pub use coordinator::{RunReport, WatchCoordinator, WatchError};
pub use notify::{CommandNotifier, Notification, Notifier, NotifyError, StdoutNotifier};
