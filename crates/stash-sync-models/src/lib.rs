pub mod entity;
pub mod stash_id;
pub mod tag;
pub mod scene;
pub mod movie;
pub mod plugin_input;

pub use entity::{EntityKind, FavoriteEntity};
pub use stash_id::StashId;
pub use tag::Tag;
pub use scene::Scene;
pub use movie::{AddMovieOptions, AddMovieRequest, Movie, QualityProfile, RootFolder};
pub use plugin_input::{HookContext, PluginArgs, PluginInput, ServerConnection, SessionCookie};
