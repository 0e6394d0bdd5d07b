use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use stash_sync_models::{AddMovieRequest, QualityProfile, RootFolder};
use tracing::debug;
use crate::traits::{ApiResponse, MovieManager};
use crate::SourceError;

const API_PREFIX: &str = "/api/v3";

/// Client for Whisparr's v3 REST API. Uses reqwest's default timeout.
#[derive(Clone)]
pub struct WhisparrClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl WhisparrClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http
            .get(url)
            .header("Accept", "application/json")
            .header("X-Api-Key", &self.api_key)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.http
            .post(url)
            .header("Content-Type", "application/json")
            .header("X-Api-Key", &self.api_key)
    }

    /// Send and capture status plus body, whatever the status
    async fn exchange(&self, url: &str, request: RequestBuilder) -> Result<ApiResponse, SourceError> {
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::transport(url, e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SourceError::transport(url, e))?;
        debug!(url, status, "Whisparr response");
        Ok(ApiResponse::new(status, parse_body(&text)))
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, SourceError> {
        let url = self.url(path);
        let response = self.exchange(&url, self.get(&url)).await?;
        if response.status != 200 {
            return Err(SourceError::Status {
                url,
                status: response.status,
                body: response.body_text(),
            });
        }
        serde_json::from_value(response.body).map_err(|e| SourceError::decode(url, e))
    }
}

/// JSON when it parses, otherwise the raw text as a JSON string
fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[async_trait]
impl MovieManager for WhisparrClient {
    async fn quality_profiles(&self) -> Result<Vec<QualityProfile>, SourceError> {
        self.get_list("/qualityprofile").await
    }

    async fn root_folders(&self) -> Result<Vec<RootFolder>, SourceError> {
        self.get_list("/rootfolder").await
    }

    async fn add_movie(&self, request: &AddMovieRequest) -> Result<ApiResponse, SourceError> {
        let url = self.url("/movie");
        self.exchange(&url, self.post(&url).json(request)).await
    }

    async fn lookup_movies(&self, stash_id: &str) -> Result<ApiResponse, SourceError> {
        let url = self.url(&format!("/movie?stashId={}", urlencoding::encode(stash_id)));
        self.exchange(&url, self.get(&url)).await
    }

    async fn refresh_movie(&self, movie_id: i64) -> Result<ApiResponse, SourceError> {
        let url = self.url("/command");
        let body = json!({ "name": "RefreshMovie", "movieIds": [movie_id] });
        self.exchange(&url, self.post(&url).json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_strips_trailing_slash() {
        let client = WhisparrClient::new("http://whisparr:6969/", "key");
        assert_eq!(client.url("/movie"), "http://whisparr:6969/api/v3/movie");
    }

    #[test]
    fn test_parse_body_keeps_non_json_text() {
        assert_eq!(parse_body(r#"[{"id": 1}]"#), json!([{"id": 1}]));
        assert_eq!(parse_body("Internal Server Error"), json!("Internal Server Error"));
        assert_eq!(ApiResponse::new(500, json!("plain")).body_text(), "plain");
        assert_eq!(ApiResponse::new(400, json!({"a": 1})).body_text(), r#"{"a":1}"#);
    }
}
