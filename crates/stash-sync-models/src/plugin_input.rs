use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Document Stash writes to the plugin's stdin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginInput {
    #[serde(default)]
    pub server_connection: ServerConnection,
    #[serde(default)]
    pub args: PluginArgs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConnection {
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub session_cookie: Option<SessionCookie>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionCookie {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Either a hook context (event-driven run) or a task name plus free-form
/// parameters (manual run)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginArgs {
    #[serde(default, rename = "hookContext")]
    pub hook_context: Option<HookContext>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl PluginArgs {
    /// Non-empty string parameter passed to a task
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookContext {
    #[serde(default, rename = "type")]
    pub hook_type: Option<String>,
    /// Stash sends numeric ids here; GraphQL wants them as strings
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub id: Option<String>,
}

fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
