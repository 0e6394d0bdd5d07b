use anyhow::Result;
use stash_sync_core::{run_favorites_plugin, PluginReport};
use stash_sync_models::PluginInput;
use stash_sync_sources::{LogProgress, StashBoxFactory};
use tracing::info;

pub async fn run(input: &PluginInput) -> Result<PluginReport> {
    let catalog = super::stash_client(input)?;
    let report = run_favorites_plugin(&input.args, &catalog, &StashBoxFactory, &LogProgress).await;
    info!("Favorites plugin finished");
    Ok(report)
}
