// In-memory stand-ins for Stash, a stash-box and Whisparr

use async_trait::async_trait;
use serde_json::Value;
use stash_sync_config::StashBoxCredentials;
use stash_sync_models::{
    AddMovieRequest, EntityKind, FavoriteEntity, QualityProfile, RootFolder, Scene, StashId, Tag,
};
use stash_sync_sources::{
    ApiResponse, EntityPage, FavoriteRegistry, LocalCatalog, MovieManager, ProgressSink,
    RegistryFactory, RemotePage, SourceError, StashConfiguration,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const ENDPOINT: &str = "https://stashdb.org/graphql";

pub fn entity(id: &str, favorite: bool, stash_id: &str) -> FavoriteEntity {
    FavoriteEntity {
        id: id.to_string(),
        name: format!("Entity {}", id),
        favorite,
        stash_ids: vec![StashId::new(ENDPOINT, stash_id)],
        tag_ids: Vec::new(),
    }
}

fn graphql_error() -> SourceError {
    SourceError::GraphQl(vec!["boom".to_string()])
}

#[derive(Default)]
pub struct FakeCatalog {
    pub entities: Mutex<HashMap<EntityKind, Vec<FavoriteEntity>>>,
    /// Claimed total per kind; defaults to the number of matching entities
    pub reported_count: Option<usize>,
    /// List calls on this page or later fail
    pub fail_from_page: Option<u32>,
    pub list_calls: Mutex<Vec<(EntityKind, u32, bool)>>,
    pub tags: Mutex<Vec<Tag>>,
    pub created_tags: Mutex<Vec<(String, String)>>,
    pub fail_tag_creation: bool,
    pub tag_updates: Mutex<Vec<(EntityKind, String, Vec<String>)>>,
    pub scenes: Vec<Scene>,
    pub configuration: StashConfiguration,
}

impl FakeCatalog {
    pub fn with_entities(kind: EntityKind, entities: Vec<FavoriteEntity>) -> Self {
        let catalog = FakeCatalog::default();
        catalog
            .entities
            .lock()
            .unwrap()
            .insert(kind, entities);
        catalog
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }

    pub fn entity(&self, kind: EntityKind, id: &str) -> Option<FavoriteEntity> {
        self.entities
            .lock()
            .unwrap()
            .get(&kind)
            .and_then(|list| list.iter().find(|e| e.id == id).cloned())
    }
}

#[async_trait]
impl LocalCatalog for FakeCatalog {
    async fn list_entities(
        &self,
        kind: EntityKind,
        page: u32,
        per_page: u32,
        favorites_only: bool,
    ) -> Result<EntityPage, SourceError> {
        self.list_calls.lock().unwrap().push((kind, page, favorites_only));
        if self.fail_from_page.map_or(false, |from| page >= from) {
            return Err(graphql_error());
        }

        let entities = self.entities.lock().unwrap();
        let matching: Vec<FavoriteEntity> = entities
            .get(&kind)
            .map(|list| {
                list.iter()
                    .filter(|e| !favorites_only || e.favorite)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let start = ((page.max(1) - 1) * per_page) as usize;
        let page_entities = matching
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(EntityPage {
            count: self.reported_count.unwrap_or(matching.len()),
            entities: page_entities,
        })
    }

    async fn find_entity(&self, kind: EntityKind, id: &str) -> Result<Option<FavoriteEntity>, SourceError> {
        Ok(self.entity(kind, id))
    }

    async fn find_scene(&self, id: &str) -> Result<Option<Scene>, SourceError> {
        Ok(self.scenes.iter().find(|s| s.id == id).cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, SourceError> {
        Ok(self.tags.lock().unwrap().iter().find(|t| t.name == name).cloned())
    }

    async fn create_tag(&self, name: &str, description: &str) -> Result<Option<Tag>, SourceError> {
        self.created_tags
            .lock()
            .unwrap()
            .push((name.to_string(), description.to_string()));
        if self.fail_tag_creation {
            return Ok(None);
        }
        let mut tags = self.tags.lock().unwrap();
        let tag = Tag {
            id: format!("tag-{}", tags.len() + 1),
            name: name.to_string(),
        };
        tags.push(tag.clone());
        Ok(Some(tag))
    }

    async fn update_entity_tags(
        &self,
        kind: EntityKind,
        entity_id: &str,
        tag_ids: &[String],
    ) -> Result<bool, SourceError> {
        self.tag_updates
            .lock()
            .unwrap()
            .push((kind, entity_id.to_string(), tag_ids.to_vec()));
        let mut entities = self.entities.lock().unwrap();
        let found = entities
            .get_mut(&kind)
            .and_then(|list| list.iter_mut().find(|e| e.id == entity_id));
        match found {
            Some(entity) => {
                entity.tag_ids = tag_ids.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn configuration(&self) -> Result<StashConfiguration, SourceError> {
        Ok(self.configuration.clone())
    }
}

/// Registry whose favorites list reacts to `set_favorite` calls.
/// Duplicate entries in `favorites` model duplicate favorite markers.
#[derive(Default)]
pub struct FakeRegistry {
    pub endpoint: String,
    pub favorites: Mutex<Vec<String>>,
    /// Ids the registry knows about, with their current flag, for `find_favorite`
    pub known: Mutex<HashMap<String, bool>>,
    /// `set_favorite` returns `Ok(false)` for these
    pub unconfirmed: HashSet<String>,
    /// `set_favorite` returns an error for these
    pub erroring: HashSet<String>,
    pub fail_queries: bool,
    pub query_calls: Mutex<Vec<u32>>,
    pub set_calls: Mutex<Vec<(String, bool)>>,
}

impl FakeRegistry {
    pub fn with_favorites(ids: &[&str]) -> Self {
        FakeRegistry {
            endpoint: ENDPOINT.to_string(),
            favorites: Mutex::new(ids.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn set_calls(&self) -> Vec<(String, bool)> {
        self.set_calls.lock().unwrap().clone()
    }

    pub fn favorites(&self) -> Vec<String> {
        self.favorites.lock().unwrap().clone()
    }
}

#[async_trait]
impl FavoriteRegistry for FakeRegistry {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query_favorites(
        &self,
        _kind: EntityKind,
        page: u32,
        per_page: u32,
    ) -> Result<Option<RemotePage>, SourceError> {
        self.query_calls.lock().unwrap().push(page);
        if self.fail_queries {
            return Err(graphql_error());
        }
        let favorites = self.favorites.lock().unwrap();
        let start = ((page.max(1) - 1) * per_page) as usize;
        Ok(Some(RemotePage {
            count: favorites.len(),
            ids: favorites.iter().skip(start).take(per_page as usize).cloned().collect(),
        }))
    }

    async fn find_favorite(&self, _kind: EntityKind, stash_id: &str) -> Result<Option<bool>, SourceError> {
        Ok(self.known.lock().unwrap().get(stash_id).copied())
    }

    async fn set_favorite(&self, _kind: EntityKind, stash_id: &str, favorite: bool) -> Result<bool, SourceError> {
        self.set_calls
            .lock()
            .unwrap()
            .push((stash_id.to_string(), favorite));
        if self.erroring.contains(stash_id) {
            return Err(graphql_error());
        }
        if self.unconfirmed.contains(stash_id) {
            return Ok(false);
        }

        let mut favorites = self.favorites.lock().unwrap();
        favorites.retain(|id| id != stash_id);
        if favorite {
            favorites.push(stash_id.to_string());
        }
        self.known
            .lock()
            .unwrap()
            .insert(stash_id.to_string(), favorite);
        Ok(true)
    }
}

/// Hands out the same registry for every connect call
pub struct FakeFactory {
    pub registry: Arc<FakeRegistry>,
    pub connected: Mutex<Vec<StashBoxCredentials>>,
}

impl FakeFactory {
    pub fn new(registry: FakeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            connected: Mutex::new(Vec::new()),
        }
    }
}

struct SharedRegistry(Arc<FakeRegistry>, String);

#[async_trait]
impl FavoriteRegistry for SharedRegistry {
    fn endpoint(&self) -> &str {
        &self.1
    }

    async fn query_favorites(&self, kind: EntityKind, page: u32, per_page: u32) -> Result<Option<RemotePage>, SourceError> {
        self.0.query_favorites(kind, page, per_page).await
    }

    async fn find_favorite(&self, kind: EntityKind, stash_id: &str) -> Result<Option<bool>, SourceError> {
        self.0.find_favorite(kind, stash_id).await
    }

    async fn set_favorite(&self, kind: EntityKind, stash_id: &str, favorite: bool) -> Result<bool, SourceError> {
        self.0.set_favorite(kind, stash_id, favorite).await
    }
}

impl RegistryFactory for FakeFactory {
    fn connect(&self, credentials: &StashBoxCredentials) -> Result<Box<dyn FavoriteRegistry>, SourceError> {
        self.connected.lock().unwrap().push(credentials.clone());
        Ok(Box::new(SharedRegistry(
            Arc::clone(&self.registry),
            credentials.endpoint.clone(),
        )))
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub reports: Mutex<Vec<f64>>,
}

impl RecordingProgress {
    pub fn reports(&self) -> Vec<f64> {
        self.reports.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, fraction: f64) {
        self.reports.lock().unwrap().push(fraction);
    }
}

/// Whisparr with canned responses
pub struct FakeMovieManager {
    pub profiles: Vec<QualityProfile>,
    pub folders: Vec<RootFolder>,
    pub add_response: ApiResponse,
    pub lookup_response: ApiResponse,
    pub refresh_response: ApiResponse,
    pub calls: Mutex<Vec<String>>,
    pub added: Mutex<Vec<AddMovieRequest>>,
}

impl FakeMovieManager {
    pub fn new(add_response: ApiResponse) -> Self {
        Self {
            profiles: vec![QualityProfile { id: 4, name: Some("Any".to_string()) }],
            folders: vec![RootFolder { path: "/data/whisparr".to_string(), id: Some(1) }],
            add_response,
            lookup_response: ApiResponse::new(200, Value::Array(Vec::new())),
            refresh_response: ApiResponse::new(201, serde_json::json!({"name": "RefreshMovie"})),
            calls: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MovieManager for FakeMovieManager {
    async fn quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError> {
        self.record("qualityprofile".to_string());
        Ok(self.profiles.clone())
    }

    async fn root_folders(&self) -> Result<Vec<RootFolder>, SourceError> {
        self.record("rootfolder".to_string());
        Ok(self.folders.clone())
    }

    async fn add_movie(&self, request: &AddMovieRequest) -> Result<ApiResponse, SourceError> {
        self.record(format!("add {}", request.stash_id));
        self.added.lock().unwrap().push(request.clone());
        Ok(self.add_response.clone())
    }

    async fn lookup_movies(&self, stash_id: &str) -> Result<ApiResponse, SourceError> {
        self.record(format!("lookup {}", stash_id));
        Ok(self.lookup_response.clone())
    }

    async fn refresh_movie(&self, movie_id: i64) -> Result<ApiResponse, SourceError> {
        self.record(format!("refresh {}", movie_id));
        Ok(self.refresh_response.clone())
    }
}
