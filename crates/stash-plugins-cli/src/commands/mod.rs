use anyhow::{Context, Result};
use stash_sync_config::StashConnection;
use stash_sync_models::PluginInput;
use stash_sync_sources::StashClient;
use std::path::Path;
use tokio::io::AsyncReadExt;

pub mod favorites;
pub mod whisparr;

/// Read the plugin input document from `path`, or stdin when not given
pub async fn read_plugin_input(path: Option<&Path>) -> Result<PluginInput> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read plugin input from {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read plugin input from stdin")?;
            raw
        }
    };
    parse_plugin_input(&raw)
}

pub fn parse_plugin_input(raw: &str) -> Result<PluginInput> {
    if raw.trim().is_empty() {
        return Ok(PluginInput::default());
    }
    serde_json::from_str(raw).context("Plugin input is not valid JSON")
}

pub(crate) fn stash_client(input: &PluginInput) -> Result<StashClient> {
    let connection = StashConnection::from_server_connection(&input.server_connection);
    tracing::debug!(url = %connection.graphql_url, "Connecting to Stash");
    StashClient::new(&connection).context("Failed to create Stash client")
}
