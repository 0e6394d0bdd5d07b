use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::ConfigError;

/// The registry favorites are synced against
pub const STASHDB_ENDPOINT: &str = "https://stashdb.org/graphql";

/// One stash-box instance configured in Stash (`configuration.general.stashBoxes`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StashBoxCredentials {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

impl StashBoxCredentials {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.endpoint.is_empty() && !self.api_key.is_empty()
    }

    /// API key registered for exactly `endpoint`
    pub fn api_key_for<'a>(boxes: &'a [StashBoxCredentials], endpoint: &str) -> Option<&'a str> {
        boxes
            .iter()
            .filter(|b| b.is_complete())
            .find(|b| b.endpoint == endpoint)
            .map(|b| b.api_key.as_str())
    }
}

/// Pick the credentials for a reconciliation task.
///
/// Explicit task arguments win when both are present; otherwise the StashDB
/// entry from Stash's own stash-box list is used.
pub fn resolve_credentials(
    endpoint: Option<&str>,
    api_key: Option<&str>,
    configured: &[StashBoxCredentials],
) -> Result<StashBoxCredentials, ConfigError> {
    if let (Some(endpoint), Some(api_key)) = (endpoint, api_key) {
        if !endpoint.is_empty() && !api_key.is_empty() {
            debug!("Using stash-box credentials from task arguments");
            return Ok(StashBoxCredentials::new(endpoint, api_key));
        }
    }

    StashBoxCredentials::api_key_for(configured, STASHDB_ENDPOINT)
        .map(|key| StashBoxCredentials::new(STASHDB_ENDPOINT, key))
        .ok_or_else(|| ConfigError::MissingStashBox(STASHDB_ENDPOINT.to_string()))
}
