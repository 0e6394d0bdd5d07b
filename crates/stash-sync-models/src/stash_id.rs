use serde::{Deserialize, Serialize};

/// Link between a local entity and its record in one stash-box registry.
///
/// An id is only meaningful relative to its endpoint, so every lookup in this
/// workspace matches on both halves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StashId {
    pub endpoint: String,
    pub stash_id: String,
}

impl StashId {
    pub fn new(endpoint: impl Into<String>, stash_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            stash_id: stash_id.into(),
        }
    }

    pub fn matches(&self, endpoint: &str, stash_id: &str) -> bool {
        self.endpoint == endpoint && self.stash_id == stash_id
    }

    /// First id whose endpoint URL contains `needle` (e.g. "stashdb.org")
    pub fn for_endpoint_containing<'a>(ids: &'a [StashId], needle: &str) -> Option<&'a str> {
        ids.iter()
            .find(|id| id.endpoint.contains(needle))
            .map(|id| id.stash_id.as_str())
            .filter(|id| !id.is_empty())
    }
}
