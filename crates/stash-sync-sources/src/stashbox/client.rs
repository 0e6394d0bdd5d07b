use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{json, Value};
use stash_sync_config::StashBoxCredentials;
use stash_sync_models::EntityKind;
use tracing::trace;
use crate::graphql::{take_root, ErrorSeverity, GraphQlClient};
use crate::stashbox::queries::remote_queries;
use crate::traits::{FavoriteRegistry, RemotePage};
use crate::SourceError;

const UNAUTHORIZED_HINT: &str = "You need to add a Stash box instance and API Key in your Stash config";

#[derive(Debug, Deserialize)]
struct RemoteEntity {
    id: String,
    #[serde(default)]
    is_favorite: Option<bool>,
}

/// Client for one stash-box GraphQL endpoint, authenticated by API key
#[derive(Clone)]
pub struct StashBoxClient {
    graphql: GraphQlClient,
    endpoint: String,
}

impl StashBoxClient {
    pub fn new(credentials: &StashBoxCredentials) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&credentials.api_key)
            .map_err(|e| SourceError::decode(credentials.endpoint.clone(), format!("invalid API key header: {}", e)))?;
        headers.insert("ApiKey", api_key);

        let graphql = GraphQlClient::new(
            credentials.endpoint.clone(),
            headers,
            ErrorSeverity::Error,
            UNAUTHORIZED_HINT,
        )?;
        Ok(Self {
            graphql,
            endpoint: credentials.endpoint.clone(),
        })
    }
}

#[async_trait]
impl FavoriteRegistry for StashBoxClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query_favorites(
        &self,
        kind: EntityKind,
        page: u32,
        per_page: u32,
    ) -> Result<Option<RemotePage>, SourceError> {
        let q = remote_queries(kind);
        let variables = json!({
            "input": {
                "names": "",
                "is_favorite": true,
                "page": page,
                "per_page": per_page,
                "sort": "NAME",
                "direction": "ASC"
            }
        });

        let Some(mut result) = self
            .graphql
            .query_root::<Value>(q.query_favorites, variables, q.query_root)
            .await?
        else {
            return Ok(None);
        };

        let count = result.get("count").and_then(Value::as_u64).unwrap_or(0) as usize;
        let entities: Vec<RemoteEntity> = take_root(Some(result.take()), q.query_field, &self.endpoint)?
            .unwrap_or_default();
        trace!(kind = %kind, page, count, returned = entities.len(), "Fetched stash-box favorites page");

        Ok(Some(RemotePage {
            count,
            ids: entities.into_iter().map(|e| e.id).collect(),
        }))
    }

    async fn find_favorite(&self, kind: EntityKind, stash_id: &str) -> Result<Option<bool>, SourceError> {
        let q = remote_queries(kind);
        let found: Option<RemoteEntity> = self
            .graphql
            .query_root(q.find_one, json!({ "id": stash_id }), q.find_root)
            .await?;
        Ok(found.map(|e| e.is_favorite.unwrap_or(false)))
    }

    async fn set_favorite(&self, kind: EntityKind, stash_id: &str, favorite: bool) -> Result<bool, SourceError> {
        let q = remote_queries(kind);
        let confirmed: Option<bool> = self
            .graphql
            .query_root(
                q.set_favorite,
                json!({ "id": stash_id, "favorite": favorite }),
                q.favorite_root,
            )
            .await?;
        Ok(confirmed.unwrap_or(false))
    }
}
