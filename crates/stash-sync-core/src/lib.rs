pub mod plan;
pub mod favorites;
pub mod tagging;
pub mod bridge;
pub mod plugin;

#[cfg(test)]
pub(crate) mod test_support;

pub use plan::{FavoriteSet, RemoteFavorites, SyncPlan};
pub use favorites::{sync_single_favorite, FavoritesReconciler, SingleSyncOutcome, SyncResult, PAGE_SIZE};
pub use tagging::{ErrorTagger, TagOutcome};
pub use bridge::{classify_add_response, select_movie, AddClassification, UpsertOutcome, WhisparrBridge};
pub use plugin::{run_favorites_plugin, run_whisparr_plugin, PluginReport};
