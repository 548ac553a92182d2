pub mod policy;

pub use policy::{apply, NotifyOutcome, RetentionPlan};
