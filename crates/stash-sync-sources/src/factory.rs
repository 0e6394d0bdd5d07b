//! Factory for stash-box registry clients.
//!
//! The core decides at runtime which endpoint to talk to (task arguments,
//! configured stash-boxes, or a hooked entity's stash ids), so it receives a
//! factory rather than a ready-made client.

use stash_sync_config::StashBoxCredentials;
use crate::{FavoriteRegistry, SourceError, StashBoxClient};

pub trait RegistryFactory: Send + Sync {
    fn connect(&self, credentials: &StashBoxCredentials) -> Result<Box<dyn FavoriteRegistry>, SourceError>;
}

/// Builds real `StashBoxClient`s
#[derive(Debug, Clone, Copy, Default)]
pub struct StashBoxFactory;

impl RegistryFactory for StashBoxFactory {
    fn connect(&self, credentials: &StashBoxCredentials) -> Result<Box<dyn FavoriteRegistry>, SourceError> {
        Ok(Box::new(StashBoxClient::new(credentials)?))
    }
}
