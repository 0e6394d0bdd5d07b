pub mod traits;
pub mod error;
pub mod factory;
pub mod graphql;
pub mod progress;
pub mod stash;
pub mod stashbox;
pub mod whisparr;

pub use traits::{ApiResponse, EntityPage, FavoriteRegistry, LocalCatalog, MovieManager, RemotePage, StashConfiguration};
pub use error::SourceError;
pub use factory::{RegistryFactory, StashBoxFactory};
pub use progress::{LogProgress, ProgressSink, ProgressTracker, PROGRESS_TARGET};
pub use stash::StashClient;
pub use stashbox::StashBoxClient;
pub use whisparr::WhisparrClient;
