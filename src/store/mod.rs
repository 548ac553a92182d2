pub mod capture;
pub mod snapshot_store;

pub use capture::Capture;
pub use snapshot_store::{
    bucket_name, parse_bucket, write_atomically, SnapshotStore, StoreError, BUCKET_FORMAT,
};
