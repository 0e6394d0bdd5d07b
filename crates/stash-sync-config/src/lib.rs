pub mod connection;
pub mod error;
pub mod settings;
pub mod stashbox;

pub use connection::StashConnection;
pub use error::ConfigError;
pub use settings::{FavoritesSettings, WhisparrSettings, FAVORITES_PLUGIN_ID, WHISPARR_PLUGIN_ID};
pub use stashbox::{resolve_credentials, StashBoxCredentials, STASHDB_ENDPOINT};
