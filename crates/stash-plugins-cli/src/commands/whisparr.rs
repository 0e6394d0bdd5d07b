use anyhow::Result;
use stash_sync_core::{run_whisparr_plugin, PluginReport};
use stash_sync_models::PluginInput;
use stash_sync_sources::{MovieManager, WhisparrClient};

pub async fn run(input: &PluginInput) -> Result<PluginReport> {
    let catalog = super::stash_client(input)?;
    let report = run_whisparr_plugin(&input.args, &catalog, |settings| {
        Box::new(WhisparrClient::new(settings.url.as_str(), settings.api_key.as_str())) as Box<dyn MovieManager>
    })
    .await;
    Ok(report)
}
