use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of hex characters of the locator digest kept in the fingerprint.
pub const FINGERPRINT_LEN: usize = 16;

// Optional scheme, optional "www.", then the first run of word characters.
// Searched anywhere in the locator, not anchored.
static LABEL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://)?(www\.)?(\w+)").expect("label pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Locator is empty")]
    Empty,
    #[error("No host-like token found in locator: {0}")]
    NoLabel(String),
}

/// Stable key for one watch history, derived from the locator alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    locator: String,
    label: String,
    fingerprint: String,
}

impl ResourceIdentity {
    /// Derive the identity of a locator.
    ///
    /// The fingerprint is computed over the exact locator bytes, so two
    /// locators that share a label still land in different histories.
    pub fn identify(locator: &str) -> Result<Self, IdentityError> {
        if locator.trim().is_empty() {
            return Err(IdentityError::Empty);
        }

        let label = LABEL_PATTERN
            .captures(locator)
            .and_then(|caps| caps.get(3))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| IdentityError::NoLabel(locator.to_string()))?;

        Ok(ResourceIdentity {
            locator: locator.to_string(),
            label,
            fingerprint: fingerprint(locator),
        })
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Directory name of this identity's history: `label_fingerprint`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.label, self.fingerprint)
    }
}

fn fingerprint(locator: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(locator.as_bytes());

    let hash = hasher.finalize();
    let mut hex = hex::encode(hash);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_skips_scheme_and_www() {
        let id = ResourceIdentity::identify("https://www.example.com/a?b=1").unwrap();
        assert_eq!(id.label(), "example");
    }

    #[test]
    fn label_without_scheme() {
        let id = ResourceIdentity::identify("news.ycombinator.com").unwrap();
        assert_eq!(id.label(), "news");
    }

    #[test]
    fn fingerprint_is_fixed_length_hex() {
        let id = ResourceIdentity::identify("http://example.com/a").unwrap();
        assert_eq!(id.fingerprint().len(), FINGERPRINT_LEN);
        assert!(id.fingerprint().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn rejects_locator_without_word_characters() {
        assert_eq!(
            ResourceIdentity::identify("://"),
            Err(IdentityError::NoLabel("://".into()))
        );
        assert_eq!(ResourceIdentity::identify("  "), Err(IdentityError::Empty));
    }
}
