use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::Deserialize;
use serde_json::{json, Value};
use stash_sync_config::{StashBoxCredentials, StashConnection};
use stash_sync_models::{EntityKind, FavoriteEntity, Scene, StashId, Tag};
use tracing::{debug, warn};
use crate::graphql::{ErrorSeverity, GraphQlClient};
use crate::stash::queries::{self, local_queries};
use crate::traits::{EntityPage, LocalCatalog, StashConfiguration};
use crate::SourceError;

const UNAUTHORIZED_HINT: &str = "Stash rejected the plugin session; check the server connection handed to the plugin";

#[derive(Debug, Deserialize)]
struct TagRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    favorite: Option<bool>,
    #[serde(default)]
    tags: Option<Vec<TagRef>>,
    #[serde(default)]
    stash_ids: Option<Vec<StashId>>,
}

impl From<RawEntity> for FavoriteEntity {
    fn from(raw: RawEntity) -> Self {
        FavoriteEntity {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            favorite: raw.favorite.unwrap_or(false),
            stash_ids: raw.stash_ids.unwrap_or_default(),
            tag_ids: raw.tags.unwrap_or_default().into_iter().map(|t| t.id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawList {
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawTags {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct RawStashBox {
    #[serde(default)]
    endpoint: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

/// Client for the local Stash GraphQL API
#[derive(Clone)]
pub struct StashClient {
    graphql: GraphQlClient,
}

impl StashClient {
    pub fn new(connection: &StashConnection) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = connection.cookie_header() {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.insert(COOKIE, value);
                }
                Err(e) => warn!("Ignoring unusable Stash session cookie: {}", e),
            }
        }

        let graphql = GraphQlClient::new(
            connection.graphql_url.clone(),
            headers,
            ErrorSeverity::Warn,
            UNAUTHORIZED_HINT,
        )?;
        Ok(Self { graphql })
    }

    pub fn url(&self) -> &str {
        self.graphql.url()
    }
}

#[async_trait]
impl LocalCatalog for StashClient {
    async fn list_entities(
        &self,
        kind: EntityKind,
        page: u32,
        per_page: u32,
        favorites_only: bool,
    ) -> Result<EntityPage, SourceError> {
        let q = local_queries(kind);
        let query = if favorites_only { q.list_favorites } else { q.list_all };
        let variables = json!({ "filter": { "page": page, "per_page": per_page } });

        let Some(mut result) = self
            .graphql
            .query_root::<Value>(query, variables, q.list_root)
            .await?
        else {
            return Ok(EntityPage::default());
        };

        let count = serde_json::from_value::<RawList>(result.clone())
            .ok()
            .and_then(|r| r.count)
            .unwrap_or(0);
        let entities: Vec<RawEntity> = match result.get_mut(q.list_field).map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(list) => serde_json::from_value(list)
                .map_err(|e| SourceError::decode(self.url(), format!("{}: {}", q.list_field, e)))?,
        };

        debug!(kind = %kind, page, count, returned = entities.len(), "Fetched local page");
        Ok(EntityPage {
            count,
            entities: entities.into_iter().map(FavoriteEntity::from).collect(),
        })
    }

    async fn find_entity(&self, kind: EntityKind, id: &str) -> Result<Option<FavoriteEntity>, SourceError> {
        let q = local_queries(kind);
        let raw: Option<RawEntity> = self
            .graphql
            .query_root(q.find_one, json!({ "id": id }), q.find_root)
            .await?;
        Ok(raw.map(FavoriteEntity::from))
    }

    async fn find_scene(&self, id: &str) -> Result<Option<Scene>, SourceError> {
        self.graphql
            .query_root(queries::FIND_SCENE, json!({ "id": id }), "findScene")
            .await
    }

    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, SourceError> {
        let found: Option<RawTags> = self
            .graphql
            .query_root(queries::FIND_TAG_BY_NAME, json!({ "name": name }), "findTags")
            .await?;
        Ok(found.and_then(|r| r.tags.into_iter().next()))
    }

    async fn create_tag(&self, name: &str, description: &str) -> Result<Option<Tag>, SourceError> {
        self.graphql
            .query_root(
                queries::CREATE_TAG,
                json!({ "input": { "name": name, "description": description } }),
                "tagCreate",
            )
            .await
    }

    async fn update_entity_tags(
        &self,
        kind: EntityKind,
        entity_id: &str,
        tag_ids: &[String],
    ) -> Result<bool, SourceError> {
        let q = local_queries(kind);
        let updated: Option<Value> = self
            .graphql
            .query_root(
                q.update_tags,
                json!({ "input": { "id": entity_id, "tag_ids": tag_ids } }),
                q.update_root,
            )
            .await?;
        Ok(updated.is_some())
    }

    async fn configuration(&self) -> Result<StashConfiguration, SourceError> {
        let Some(config) = self
            .graphql
            .query_root::<Value>(queries::CONFIGURATION, json!({}), "configuration")
            .await?
        else {
            return Ok(StashConfiguration {
                plugins: json!({}),
                stash_boxes: Vec::new(),
            });
        };

        let plugins = match config.get("plugins") {
            Some(value) if value.is_object() => value.clone(),
            _ => json!({}),
        };
        let raw_boxes: Vec<RawStashBox> = config
            .pointer("/general/stashBoxes")
            .cloned()
            .filter(|v| !v.is_null())
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| SourceError::decode(self.url(), format!("stashBoxes: {}", e)))?
            .unwrap_or_default();

        Ok(StashConfiguration {
            plugins,
            stash_boxes: raw_boxes
                .into_iter()
                .map(|b| StashBoxCredentials::new(b.endpoint.unwrap_or_default(), b.api_key.unwrap_or_default()))
                .collect(),
        })
    }
}
