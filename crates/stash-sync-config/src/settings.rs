use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use crate::ConfigError;

/// Plugin ids as they appear under `configuration.plugins`
pub const FAVORITES_PLUGIN_ID: &str = "setStashboxFavorites";
pub const WHISPARR_PLUGIN_ID: &str = "whisparrUpdate";

/// Settings of the favorites plugin. Missing settings mean "don't tag errors".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FavoritesSettings {
    #[serde(default, rename = "tagErrors")]
    pub tag_errors: bool,
    #[serde(default, rename = "tagName")]
    pub tag_name: Option<String>,
}

impl FavoritesSettings {
    pub fn from_plugins(plugins: &Value) -> Result<Self, ConfigError> {
        match plugins.get(FAVORITES_PLUGIN_ID) {
            Some(value) if value.is_object() => serde_json::from_value(value.clone())
                .map_err(|source| ConfigError::InvalidSettings {
                    plugin: FAVORITES_PLUGIN_ID.to_string(),
                    source,
                }),
            _ => {
                debug!("No settings stored for {}, using defaults", FAVORITES_PLUGIN_ID);
                Ok(Self::default())
            }
        }
    }

    /// Tag to attach on failed remote updates, when tagging is switched on
    pub fn error_tag_name(&self) -> Option<&str> {
        if !self.tag_errors {
            return None;
        }
        self.tag_name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawWhisparrSettings {
    #[serde(default, rename = "WHISPARR_URL")]
    url: Option<String>,
    #[serde(default, rename = "WHISPARR_API_KEY")]
    api_key: Option<String>,
    #[serde(default, rename = "STASHDB_ENDPOINT_SUBSTR")]
    endpoint_substr: Option<String>,
    #[serde(default, rename = "MONITORED")]
    monitored: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhisparrSettings {
    /// Base URL without trailing slash
    pub url: String,
    pub api_key: String,
    /// Substring a scene's stash-box endpoint must contain to be used
    pub endpoint_substr: String,
    pub monitored: bool,
}

fn default_endpoint_substr() -> String {
    "stashdb.org".to_string()
}

impl WhisparrSettings {
    pub fn from_plugins(plugins: &Value) -> Result<Self, ConfigError> {
        let value = plugins
            .get(WHISPARR_PLUGIN_ID)
            .filter(|v| v.is_object())
            .ok_or_else(|| ConfigError::MissingPluginSettings(WHISPARR_PLUGIN_ID.to_string()))?;

        let raw: RawWhisparrSettings =
            serde_json::from_value(value.clone()).map_err(|source| ConfigError::InvalidSettings {
                plugin: WHISPARR_PLUGIN_ID.to_string(),
                source,
            })?;

        let url = raw
            .url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();
        let api_key = raw.api_key.map(|k| k.trim().to_string()).unwrap_or_default();
        if url.is_empty() || api_key.is_empty() {
            return Err(ConfigError::MissingWhisparr);
        }

        Ok(Self {
            url,
            api_key,
            endpoint_substr: raw
                .endpoint_substr
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_endpoint_substr),
            monitored: raw.monitored.unwrap_or(true),
        })
    }
}
