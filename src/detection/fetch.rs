use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::FetchConfig;
use crate::store::write_atomically;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status} fetching {locator}")]
    Status { locator: String, status: u16 },
    #[error("Could not write fetched content to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Resource unavailable: {0}")]
    Unavailable(String),
}

/// Retrieves a resource and writes its content to `destination`.
pub trait Fetcher {
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str, &Path) -> Result<(), FetchError>,
{
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError> {
        self(locator, destination)
    }
}

/// Blocking HTTP(S) fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, locator: &str, destination: &Path) -> Result<(), FetchError> {
        tracing::debug!(locator, "fetching");
        let response = self.client.get(locator).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes()?;
        write_atomically(destination, &body).map_err(|source| FetchError::Write {
            path: destination.to_path_buf(),
            source,
        })
    }
}
