use thiserror::Error;

/// Failure talking to Stash, a stash-box, or Whisparr.
///
/// Callers in the core log these and carry on; nothing here is meant to end a
/// run on its own.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP 401 Unauthorized from {url}. {hint}")]
    Unauthorized { url: String, hint: &'static str },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl SourceError {
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        SourceError::Transport { url: url.into(), source }
    }

    pub fn decode(url: impl Into<String>, message: impl ToString) -> Self {
        SourceError::Decode {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
