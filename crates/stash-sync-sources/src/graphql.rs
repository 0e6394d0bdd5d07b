use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, trace, warn};
use crate::SourceError;

/// Timeout applied to every Stash and stash-box request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How loudly to report `errors` entries that come back next to a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warn,
    Error,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

/// Minimal GraphQL-over-HTTP client shared by the Stash and stash-box clients.
///
/// A response carrying both `errors` and `data` is logged and the data is
/// still returned; only a response with errors and no data becomes an `Err`.
#[derive(Clone)]
pub struct GraphQlClient {
    http: Client,
    url: String,
    severity: ErrorSeverity,
    unauthorized_hint: &'static str,
}

impl GraphQlClient {
    /// Build a client for `url` sending `headers` with every request.
    /// Certificate checks are off: Stash installs commonly use self-signed certs.
    pub fn new(
        url: impl Into<String>,
        headers: HeaderMap,
        severity: ErrorSeverity,
        unauthorized_hint: &'static str,
    ) -> Result<Self, SourceError> {
        let url = url.into();
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::transport(url.clone(), e))?;
        Ok(Self {
            http,
            url,
            severity,
            unauthorized_hint,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Run `query` and return the raw `data` object, if any
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Option<Value>, SourceError> {
        trace!(url = %self.url, "GraphQL request");
        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| SourceError::transport(self.url.clone(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::transport(self.url.clone(), e))?;
        self.interpret(status, &body)
    }

    /// Map an HTTP status and response body onto the GraphQL result.
    ///
    /// `errors` are logged at this client's severity. Data that comes back
    /// next to errors is still returned.
    fn interpret(&self, status: StatusCode, body: &str) -> Result<Option<Value>, SourceError> {
        if status == StatusCode::UNAUTHORIZED {
            error!(
                "[GraphQL] HTTP Error 401, Unauthorised. {}",
                self.unauthorized_hint
            );
            return Err(SourceError::Unauthorized {
                url: self.url.clone(),
                hint: self.unauthorized_hint,
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body: body.to_string(),
            });
        }

        let parsed: GraphQlResponse =
            serde_json::from_str(body).map_err(|e| SourceError::decode(self.url.clone(), e))?;

        let messages: Vec<String> = parsed
            .errors
            .unwrap_or_default()
            .iter()
            .map(error_message)
            .collect();
        for message in &messages {
            match self.severity {
                ErrorSeverity::Warn => warn!("GraphQL error from {}: {}", self.url, message),
                ErrorSeverity::Error => error!("GraphQL error: {}", message),
            }
        }

        match parsed.data {
            Some(Value::Null) | None if !messages.is_empty() => Err(SourceError::GraphQl(messages)),
            Some(Value::Null) | None => Ok(None),
            Some(data) => Ok(Some(data)),
        }
    }

    /// Run `query` and decode `data[root]`. A missing or null root is `None`.
    pub async fn query_root<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        root: &str,
    ) -> Result<Option<T>, SourceError> {
        let data = self.execute(query, variables).await?;
        take_root(data, root, &self.url)
    }
}

fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}

pub(crate) fn take_root<T: DeserializeOwned>(
    data: Option<Value>,
    root: &str,
    url: &str,
) -> Result<Option<T>, SourceError> {
    let Some(mut data) = data else {
        return Ok(None);
    };
    match data.get_mut(root).map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| SourceError::decode(url, format!("{}: {}", root, e))),
    }
}
