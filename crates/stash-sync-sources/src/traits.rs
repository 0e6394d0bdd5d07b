use async_trait::async_trait;
use serde_json::Value;
use stash_sync_config::StashBoxCredentials;
use stash_sync_models::{AddMovieRequest, EntityKind, FavoriteEntity, QualityProfile, RootFolder, Scene, Tag};
use crate::SourceError;

/// One page of local performers/studios
#[derive(Debug, Clone, Default)]
pub struct EntityPage {
    pub count: usize,
    pub entities: Vec<FavoriteEntity>,
}

/// One page of a stash-box favorites query: the total and the ids on this page
#[derive(Debug, Clone, Default)]
pub struct RemotePage {
    pub count: usize,
    pub ids: Vec<String>,
}

/// The parts of Stash's `configuration` query the plugins read
#[derive(Debug, Clone, Default)]
pub struct StashConfiguration {
    /// `configuration.plugins`, keyed by plugin id
    pub plugins: Value,
    pub stash_boxes: Vec<StashBoxCredentials>,
}

/// Raw HTTP exchange result. `body` holds parsed JSON, or the text as a JSON
/// string when the body isn't JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 200 or 201, the only codes Whisparr uses for a completed create/command
    pub fn is_ok(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    /// Body as text for logs and error messages
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// The local Stash instance
#[async_trait]
pub trait LocalCatalog: Send + Sync {
    /// List entities of `kind`, 1-based `page`. With `favorites_only` the
    /// catalog may filter server-side; callers still check `favorite`.
    async fn list_entities(
        &self,
        kind: EntityKind,
        page: u32,
        per_page: u32,
        favorites_only: bool,
    ) -> Result<EntityPage, SourceError>;

    async fn find_entity(&self, kind: EntityKind, id: &str) -> Result<Option<FavoriteEntity>, SourceError>;

    async fn find_scene(&self, id: &str) -> Result<Option<Scene>, SourceError>;

    /// Tag whose name equals `name` exactly
    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, SourceError>;

    async fn create_tag(&self, name: &str, description: &str) -> Result<Option<Tag>, SourceError>;

    /// Replace the entity's tag list. `Ok(false)` when Stash returned no entity.
    async fn update_entity_tags(
        &self,
        kind: EntityKind,
        entity_id: &str,
        tag_ids: &[String],
    ) -> Result<bool, SourceError>;

    async fn configuration(&self) -> Result<StashConfiguration, SourceError>;
}

/// A stash-box registry (e.g. StashDB)
#[async_trait]
pub trait FavoriteRegistry: Send + Sync {
    fn endpoint(&self) -> &str;

    /// Favorites of `kind`, sorted by name. `None` when the response had no data.
    async fn query_favorites(
        &self,
        kind: EntityKind,
        page: u32,
        per_page: u32,
    ) -> Result<Option<RemotePage>, SourceError>;

    /// Current favorite flag, `None` when the registry doesn't know the id
    async fn find_favorite(&self, kind: EntityKind, stash_id: &str) -> Result<Option<bool>, SourceError>;

    /// Set the favorite flag. `Ok(true)` only when the registry confirmed it.
    async fn set_favorite(&self, kind: EntityKind, stash_id: &str, favorite: bool) -> Result<bool, SourceError>;
}

/// Whisparr's v3 REST API
#[async_trait]
pub trait MovieManager: Send + Sync {
    async fn quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError>;

    async fn root_folders(&self) -> Result<Vec<RootFolder>, SourceError>;

    /// POST a new movie; non-2xx statuses come back as `Ok` for the caller to classify
    async fn add_movie(&self, request: &AddMovieRequest) -> Result<ApiResponse, SourceError>;

    /// `GET /movie?stashId=...`; older builds ignore the filter and return everything
    async fn lookup_movies(&self, stash_id: &str) -> Result<ApiResponse, SourceError>;

    async fn refresh_movie(&self, movie_id: i64) -> Result<ApiResponse, SourceError>;
}
