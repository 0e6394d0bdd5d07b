use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("plugin settings not found under '{0}'")]
    MissingPluginSettings(String),

    #[error("invalid settings for plugin '{plugin}': {source}")]
    InvalidSettings {
        plugin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing Whisparr settings (URL/API key)")]
    MissingWhisparr,

    #[error("no {0} endpoint configured in Stash. Please configure a stash-box with endpoint {0}")]
    MissingStashBox(String),
}
