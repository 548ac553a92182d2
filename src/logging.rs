//! Logging initialization.
//!
//! Single entry point for installing the tracing subscriber.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output
    Development,
    /// JSON structured output, for scheduled runs feeding a log collector
    Production,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG` overrides the default filter of `sitewatch=info`.
/// Logs go to stderr so stdout stays free for notifications and reports.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sitewatch=info"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        // try_init: a subscriber installed by an embedding program wins
        let _ = match profile {
            Profile::Development => builder.try_init(),
            Profile::Production => builder.json().try_init(),
        };
    });
}
