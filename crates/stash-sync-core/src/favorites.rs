// Favorites reconciliation between the local catalog and a stash-box registry

use chrono::{DateTime, Utc};
use serde::Serialize;
use stash_sync_models::EntityKind;
use stash_sync_sources::{FavoriteRegistry, LocalCatalog, ProgressSink, ProgressTracker};
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};
use crate::plan::{FavoriteSet, RemoteFavorites, SyncPlan};
use crate::tagging::{ErrorTagger, TagOutcome};

/// Page size for both local listings and registry favorite queries
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteAction {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpdate {
    pub stash_id: String,
    pub action: FavoriteAction,
    pub reason: String,
}

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub kind: EntityKind,
    pub endpoint: String,
    pub started_at: DateTime<Utc>,
    pub local_favorites: usize,
    pub remote_favorites: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub deduplicated: Vec<String>,
    pub failed: Vec<FailedUpdate>,
    pub tagged: Vec<String>,
    pub already_in_sync: bool,
    /// Fetch errors that cut a listing short
    pub errors: Vec<String>,
    pub duration_secs: f64,
}

impl SyncResult {
    fn new(kind: EntityKind, endpoint: &str) -> Self {
        Self {
            kind,
            endpoint: endpoint.to_string(),
            started_at: Utc::now(),
            local_favorites: 0,
            remote_favorites: 0,
            added: Vec::new(),
            removed: Vec::new(),
            deduplicated: Vec::new(),
            failed: Vec::new(),
            tagged: Vec::new(),
            already_in_sync: false,
            errors: Vec::new(),
            duration_secs: 0.0,
        }
    }
}

/// Brings one registry's favorites for one entity kind in line with the
/// local catalog.
pub struct FavoritesReconciler<'a> {
    catalog: &'a dyn LocalCatalog,
    registry: &'a dyn FavoriteRegistry,
    progress: &'a dyn ProgressSink,
    error_tag: Option<String>,
}

impl<'a> FavoritesReconciler<'a> {
    pub fn new(
        catalog: &'a dyn LocalCatalog,
        registry: &'a dyn FavoriteRegistry,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            catalog,
            registry,
            progress,
            error_tag: None,
        }
    }

    /// Tag local entities with `name` when their remote update fails
    pub fn with_error_tag(mut self, name: Option<&str>) -> Self {
        self.error_tag = name.map(str::to_string);
        self
    }

    #[instrument(skip(self), fields(endpoint = %self.registry.endpoint()))]
    pub async fn reconcile(&self, kind: EntityKind) -> SyncResult {
        let start = Instant::now();
        let endpoint = self.registry.endpoint().to_string();
        let mut result = SyncResult::new(kind, &endpoint);

        info!("Stashbox endpoint {}", endpoint);
        let local = collect_local_favorites(self.catalog, kind, &endpoint, &mut result.errors).await;
        info!("Stash {} favorite count: {}", kind, local.len());
        result.local_favorites = local.len();

        let tagger = match &self.error_tag {
            Some(name) => {
                info!("Tagging errors with tag \"{}\"", name);
                ErrorTagger::resolve(self.catalog, name).await
            }
            None => {
                info!("Not tagging errors");
                None
            }
        };

        info!("Fetching stashbox favorite {}...", kind.plural());
        let remote = collect_remote_favorites(self.registry, kind, self.progress, &mut result.errors).await;
        info!("Stashbox {} favorite count: {}", kind, remote.len());
        result.remote_favorites = remote.len();

        let plan = SyncPlan::compute(&local, &remote);
        if plan.is_empty() {
            info!("Already in sync!");
            result.already_in_sync = true;
            self.progress.report(1.0);
            result.duration_secs = start.elapsed().as_secs_f64();
            return result;
        }

        info!(
            "{} {} to add, {} to remove, {} duplicates to fix",
            plan.to_add.len(),
            kind.plural(),
            plan.to_remove.len(),
            plan.to_dedupe.len()
        );

        let total_work = plan.total_work();
        let mut completed = 0usize;

        for (ids, action) in [
            (&plan.to_add, FavoriteAction::Add),
            (&plan.to_remove, FavoriteAction::Remove),
        ] {
            let favorite = action == FavoriteAction::Add;
            let mut tracker = ProgressTracker::new(ids.len());
            for stash_id in ids {
                trace!("Setting {} {} favorite={} on {}", kind, stash_id, favorite, endpoint);
                match self.set_favorite(kind, stash_id, favorite).await {
                    Ok(()) => {
                        tracker.record_succeeded();
                        match action {
                            FavoriteAction::Add => result.added.push(stash_id.clone()),
                            FavoriteAction::Remove => result.removed.push(stash_id.clone()),
                        }
                    }
                    Err((category, reason)) => {
                        warn!("Failed to set {} {} favorite={}: {}", kind, stash_id, favorite, reason);
                        tracker.record_failed_with_error(category);
                        result.failed.push(FailedUpdate {
                            stash_id: stash_id.clone(),
                            action,
                            reason,
                        });
                        if let Some(tagger) = &tagger {
                            if let TagOutcome::Tagged { entity_id } =
                                tagger.tag_entity(kind, &endpoint, stash_id).await
                            {
                                result.tagged.push(entity_id);
                            }
                        }
                    }
                }
                completed += 1;
                self.report_apply_progress(completed, total_work);
            }
            match action {
                FavoriteAction::Add => tracker.log_summary("Add favorites"),
                FavoriteAction::Remove => tracker.log_summary("Remove favorites"),
            }
        }

        // Toggled regardless of whether either call succeeds
        for (stash_id, count) in &plan.to_dedupe {
            trace!("Fixing duplicate {} {} ({} markers)", kind, stash_id, count);
            if let Err((_, reason)) = self.set_favorite(kind, stash_id, false).await {
                debug!("Unset during dedupe of {} failed: {}", stash_id, reason);
            }
            if let Err((_, reason)) = self.set_favorite(kind, stash_id, true).await {
                debug!("Set during dedupe of {} failed: {}", stash_id, reason);
            }
            result.deduplicated.push(stash_id.clone());
            completed += 1;
            self.report_apply_progress(completed, total_work);
        }
        if !plan.to_dedupe.is_empty() {
            info!("Fixed {} duplicate {}", plan.to_dedupe.len(), kind.plural());
        }

        self.progress.report(1.0);
        result.duration_secs = start.elapsed().as_secs_f64();
        info!(
            "Favorite {} sync done in {:.1}s: {} added, {} removed, {} failed",
            kind,
            result.duration_secs,
            result.added.len(),
            result.removed.len(),
            result.failed.len()
        );
        result
    }

    /// `Err((category, reason))` when the call failed or wasn't confirmed
    async fn set_favorite(
        &self,
        kind: EntityKind,
        stash_id: &str,
        favorite: bool,
    ) -> Result<(), (&'static str, String)> {
        match self.registry.set_favorite(kind, stash_id, favorite).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(("unconfirmed", "registry did not confirm the update".to_string())),
            Err(e) => Err(("request failed", e.to_string())),
        }
    }

    fn report_apply_progress(&self, completed: usize, total_work: usize) {
        if total_work > 0 {
            self.progress
                .report(completed as f64 / total_work as f64 * 0.5 + 0.5);
        }
    }
}

/// External ids on `endpoint` of every local favorite. A failed page ends the
/// listing with whatever was collected.
pub async fn collect_local_favorites(
    catalog: &dyn LocalCatalog,
    kind: EntityKind,
    endpoint: &str,
    errors: &mut Vec<String>,
) -> FavoriteSet {
    let mut favorites = FavoriteSet::new();
    let mut page = 1u32;
    loop {
        let result = match catalog.list_entities(kind, page, PAGE_SIZE, true).await {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to list local {} page {}: {}", kind.plural(), page, e);
                errors.push(e.to_string());
                break;
            }
        };
        if result.entities.is_empty() {
            break;
        }
        for entity in result.entities.iter().filter(|e| e.favorite) {
            for id in &entity.stash_ids {
                if id.endpoint == endpoint && !id.stash_id.is_empty() {
                    favorites.insert(id.stash_id.clone());
                }
            }
        }
        if (page as usize) * (PAGE_SIZE as usize) >= result.count {
            break;
        }
        page += 1;
    }
    favorites
}

/// Every favorite the registry reports, counting repeats across pages.
/// The page limit comes from the first response and is not revised.
pub async fn collect_remote_favorites(
    registry: &dyn FavoriteRegistry,
    kind: EntityKind,
    progress: &dyn ProgressSink,
    errors: &mut Vec<String>,
) -> RemoteFavorites {
    let mut remote = RemoteFavorites::new();
    let mut max_pages: Option<u32> = None;
    let mut page = 1u32;
    while max_pages.map_or(true, |max| page <= max) {
        let result = match registry.query_favorites(kind, page, PAGE_SIZE).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                warn!("No data in stashbox favorites page {}", page);
                break;
            }
            Err(e) => {
                error!("Failed to query stashbox favorite {}: {}", kind.plural(), e);
                errors.push(e.to_string());
                break;
            }
        };
        let max = *max_pages.get_or_insert_with(|| result.count.div_ceil(PAGE_SIZE as usize) as u32);
        info!("Received page {} of {}", page, max);
        if max > 0 {
            progress.report((page.min(max) as f64 / max as f64) * 0.5);
        }
        for id in result.ids {
            remote.record(id);
        }
        page += 1;
    }
    remote
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SingleSyncOutcome {
    Updated { favorite: bool },
    AlreadyInSync { favorite: bool },
    NotFound,
    EmptyId,
    Failed { reason: String },
}

/// Push one entity's favorite flag to the registry, only when it differs
pub async fn sync_single_favorite(
    registry: &dyn FavoriteRegistry,
    kind: EntityKind,
    stash_id: &str,
    favorite: bool,
) -> SingleSyncOutcome {
    if stash_id.is_empty() {
        warn!("Empty stash id for {}, skipping", kind);
        return SingleSyncOutcome::EmptyId;
    }

    let remote = match registry.find_favorite(kind, stash_id).await {
        Ok(Some(remote)) => remote,
        Ok(None) => {
            warn!("Stashbox {} {} not found", kind, stash_id);
            return SingleSyncOutcome::NotFound;
        }
        Err(e) => {
            error!("Failed to look up stashbox {} {}: {}", kind, stash_id, e);
            return SingleSyncOutcome::Failed { reason: e.to_string() };
        }
    };

    if remote == favorite {
        info!("Stashbox {} {} already in sync (favorite={})", kind, stash_id, favorite);
        return SingleSyncOutcome::AlreadyInSync { favorite };
    }

    info!("Updating stashbox {} {} favorite={}", kind, stash_id, favorite);
    match registry.set_favorite(kind, stash_id, favorite).await {
        Ok(true) => SingleSyncOutcome::Updated { favorite },
        Ok(false) => {
            warn!("Stashbox did not confirm favorite={} for {} {}", favorite, kind, stash_id);
            SingleSyncOutcome::Failed {
                reason: "registry did not confirm the update".to_string(),
            }
        }
        Err(e) => {
            error!("Failed to update stashbox {} {}: {}", kind, stash_id, e);
            SingleSyncOutcome::Failed { reason: e.to_string() }
        }
    }
}
