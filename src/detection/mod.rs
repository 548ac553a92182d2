pub mod clock;
pub mod detector;
pub mod diff;
pub mod fetch;

pub use clock::{Clock, SystemClock};
pub use detector::{ChangeDetector, DetectError, Detection};
pub use diff::{Differ, LineDiffer};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
