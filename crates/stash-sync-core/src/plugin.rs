// Entry points for one plugin invocation: route a hook or task to the core

use serde::Serialize;
use stash_sync_config::{
    resolve_credentials, FavoritesSettings, StashBoxCredentials, WhisparrSettings, STASHDB_ENDPOINT,
};
use stash_sync_models::{EntityKind, HookContext, PluginArgs};
use stash_sync_sources::{
    LocalCatalog, MovieManager, ProgressSink, RegistryFactory, StashConfiguration,
};
use tracing::{debug, error, info, warn};
use crate::bridge::{UpsertOutcome, WhisparrBridge};
use crate::favorites::{sync_single_favorite, FavoritesReconciler, SingleSyncOutcome, SyncResult};

/// What one invocation did, printed as the plugin output
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PluginReport {
    Reconciled(SyncResult),
    EntityHook(EntityHookReport),
    Whisparr(WhisparrReport),
    Skipped { reason: String },
    Failed { reason: String },
}

impl PluginReport {
    fn skipped(reason: impl Into<String>) -> Self {
        PluginReport::Skipped { reason: reason.into() }
    }

    fn failed(reason: impl ToString) -> Self {
        PluginReport::Failed { reason: reason.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityHookReport {
    pub kind: EntityKind,
    pub entity_id: String,
    pub favorite: bool,
    pub synced: Vec<StashIdSync>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StashIdSync {
    pub endpoint: String,
    pub stash_id: String,
    pub outcome: SingleSyncOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhisparrReport {
    pub scene_id: String,
    pub outcome: UpsertOutcome,
}

/// Favorites plugin: an update hook syncs one entity, a task reconciles a whole kind
pub async fn run_favorites_plugin(
    args: &PluginArgs,
    catalog: &dyn LocalCatalog,
    factory: &dyn RegistryFactory,
    progress: &dyn ProgressSink,
) -> PluginReport {
    let config = match catalog.configuration().await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to read Stash configuration: {}", e);
            StashConfiguration::default()
        }
    };

    if let Some(hook) = &args.hook_context {
        return run_entity_hook(hook, catalog, factory, &config).await;
    }

    let Some(task) = args.name.as_deref() else {
        warn!("No hook context or task name in plugin input");
        return PluginReport::skipped("no hook context or task name");
    };
    let Some(kind) = EntityKind::from_task_name(task) else {
        warn!("Unknown task \"{}\"", task);
        return PluginReport::skipped(format!("unknown task {}", task));
    };

    let settings = FavoritesSettings::from_plugins(&config.plugins).unwrap_or_else(|e| {
        warn!("{}, not tagging errors", e);
        FavoritesSettings::default()
    });

    let credentials = match resolve_credentials(
        args.param_str("endpoint"),
        args.param_str("api_key"),
        &config.stash_boxes,
    ) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!("{}", e);
            progress.report(1.0);
            return PluginReport::failed(e);
        }
    };

    let registry = match factory.connect(&credentials) {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to connect to {}: {}", credentials.endpoint, e);
            progress.report(1.0);
            return PluginReport::failed(e);
        }
    };

    let result = FavoritesReconciler::new(catalog, registry.as_ref(), progress)
        .with_error_tag(settings.error_tag_name())
        .reconcile(kind)
        .await;
    PluginReport::Reconciled(result)
}

async fn run_entity_hook(
    hook: &HookContext,
    catalog: &dyn LocalCatalog,
    factory: &dyn RegistryFactory,
    config: &StashConfiguration,
) -> PluginReport {
    let hook_type = hook.hook_type.as_deref().unwrap_or_default();
    let Some(kind) = EntityKind::from_update_hook(hook_type) else {
        debug!("Ignoring hook {}", hook_type);
        return PluginReport::skipped(format!("unhandled hook {}", hook_type));
    };
    let Some(entity_id) = hook.id.as_deref() else {
        debug!("Hook {} carried no id", hook_type);
        return PluginReport::skipped("hook without id");
    };

    let entity = match catalog.find_entity(kind, entity_id).await {
        Ok(Some(entity)) => entity,
        Ok(None) => {
            debug!("{} {} not found", kind, entity_id);
            return PluginReport::skipped(format!("{} {} not found", kind, entity_id));
        }
        Err(e) => {
            error!("Failed to load {} {}: {}", kind, entity_id, e);
            return PluginReport::failed(e);
        }
    };
    if entity.stash_ids.is_empty() {
        debug!("{} {} has no stash ids", kind, entity_id);
        return PluginReport::skipped(format!("{} {} has no stash ids", kind, entity_id));
    }

    let mut synced = Vec::new();
    for id in entity.stash_ids.iter().filter(|id| id.endpoint == STASHDB_ENDPOINT) {
        let Some(api_key) = StashBoxCredentials::api_key_for(&config.stash_boxes, &id.endpoint) else {
            warn!("No API key configured for {}", id.endpoint);
            continue;
        };
        let outcome = match factory.connect(&StashBoxCredentials::new(&id.endpoint, api_key)) {
            Ok(registry) => sync_single_favorite(registry.as_ref(), kind, &id.stash_id, entity.favorite).await,
            Err(e) => {
                error!("Failed to connect to {}: {}", id.endpoint, e);
                SingleSyncOutcome::Failed { reason: e.to_string() }
            }
        };
        synced.push(StashIdSync {
            endpoint: id.endpoint.clone(),
            stash_id: id.stash_id.clone(),
            outcome,
        });
    }

    PluginReport::EntityHook(EntityHookReport {
        kind,
        entity_id: entity.id,
        favorite: entity.favorite,
        synced,
    })
}

/// Whisparr plugin: on a scene update hook, add or refresh the scene's movie.
/// `connect` builds the Whisparr client once settings are known.
pub async fn run_whisparr_plugin<F>(
    args: &PluginArgs,
    catalog: &dyn LocalCatalog,
    connect: F,
) -> PluginReport
where
    F: FnOnce(&WhisparrSettings) -> Box<dyn MovieManager>,
{
    let Some(scene_id) = args.hook_context.as_ref().and_then(|hook| hook.id.as_deref()) else {
        info!("No scene id in hook context, nothing to do");
        return PluginReport::skipped("no scene id");
    };

    let config = match catalog.configuration().await {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to read Stash configuration: {}", e);
            return PluginReport::failed(e);
        }
    };
    let settings = match WhisparrSettings::from_plugins(&config.plugins) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return PluginReport::failed(e);
        }
    };

    let scene = match catalog.find_scene(scene_id).await {
        Ok(Some(scene)) => scene,
        Ok(None) => {
            error!("Scene {} not found", scene_id);
            return PluginReport::failed(format!("scene {} not found", scene_id));
        }
        Err(e) => {
            error!("Failed to load scene {}: {}", scene_id, e);
            return PluginReport::failed(e);
        }
    };

    let manager = connect(&settings);
    let outcome = WhisparrBridge::new(manager.as_ref(), &settings)
        .upsert_scene(&scene)
        .await;
    PluginReport::Whisparr(WhisparrReport {
        scene_id: scene.id,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        entity, FakeCatalog, FakeFactory, FakeMovieManager, FakeRegistry, RecordingProgress, ENDPOINT,
    };
    use serde_json::json;
    use stash_sync_models::{Scene, StashId};
    use stash_sync_sources::ApiResponse;

    fn args(value: serde_json::Value) -> PluginArgs {
        serde_json::from_value(value).unwrap()
    }

    fn stashdb_configured() -> StashConfiguration {
        StashConfiguration {
            plugins: json!({}),
            stash_boxes: vec![StashBoxCredentials::new(ENDPOINT, "stashdb-key")],
        }
    }

    #[tokio::test]
    async fn test_task_reconciles_with_configured_stashbox() {
        let mut catalog = FakeCatalog::with_entities(EntityKind::Studio, vec![entity("1", true, "a")]);
        catalog.configuration = stashdb_configured();
        let factory = FakeFactory::new(FakeRegistry::with_favorites(&[]));
        let progress = RecordingProgress::default();

        let report = run_favorites_plugin(
            &args(json!({"name": "favorite_studios_sync"})),
            &catalog,
            &factory,
            &progress,
        )
        .await;

        match report {
            PluginReport::Reconciled(result) => {
                assert_eq!(result.kind, EntityKind::Studio);
                assert_eq!(result.added, vec!["a"]);
            }
            other => panic!("unexpected report {:?}", other),
        }
        assert_eq!(factory.connected.lock().unwrap()[0].api_key, "stashdb-key");
    }

    #[tokio::test]
    async fn test_task_arguments_override_configured_stashbox() {
        let mut catalog = FakeCatalog::default();
        catalog.configuration = stashdb_configured();
        let factory = FakeFactory::new(FakeRegistry::with_favorites(&[]));
        let progress = RecordingProgress::default();

        run_favorites_plugin(
            &args(json!({
                "name": "favorite_performers_sync",
                "endpoint": "https://fansdb.cc/graphql",
                "api_key": "fans-key"
            })),
            &catalog,
            &factory,
            &progress,
        )
        .await;

        let connected = factory.connected.lock().unwrap();
        assert_eq!(connected[0].endpoint, "https://fansdb.cc/graphql");
        assert_eq!(connected[0].api_key, "fans-key");
    }

    #[tokio::test]
    async fn test_task_without_stashbox_fails_softly() {
        let catalog = FakeCatalog::default();
        let factory = FakeFactory::new(FakeRegistry::with_favorites(&[]));
        let progress = RecordingProgress::default();

        let report = run_favorites_plugin(
            &args(json!({"name": "favorite_performers_sync"})),
            &catalog,
            &factory,
            &progress,
        )
        .await;

        assert!(matches!(report, PluginReport::Failed { .. }));
        assert!(factory.connected.lock().unwrap().is_empty());
        assert_eq!(progress.reports(), vec![1.0]);
    }

    #[tokio::test]
    async fn test_performer_hook_syncs_single_entity() {
        let mut performer = entity("5", true, "a");
        performer.stash_ids.push(StashId::new("https://fansdb.cc/graphql", "f"));
        let mut catalog = FakeCatalog::with_entities(EntityKind::Performer, vec![performer]);
        catalog.configuration = stashdb_configured();
        let registry = FakeRegistry::with_favorites(&[]);
        registry.known.lock().unwrap().insert("a".to_string(), false);
        let factory = FakeFactory::new(registry);
        let progress = RecordingProgress::default();

        let report = run_favorites_plugin(
            &args(json!({"hookContext": {"type": "Performer.Update.Post", "id": 5}})),
            &catalog,
            &factory,
            &progress,
        )
        .await;

        match report {
            PluginReport::EntityHook(hook) => {
                assert_eq!(hook.entity_id, "5");
                assert_eq!(hook.synced.len(), 1);
                assert_eq!(hook.synced[0].outcome, SingleSyncOutcome::Updated { favorite: true });
            }
            other => panic!("unexpected report {:?}", other),
        }
        assert_eq!(factory.registry.set_calls(), vec![("a".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_hook_without_api_key_skips_stash_id() {
        let catalog = FakeCatalog::with_entities(EntityKind::Studio, vec![entity("5", true, "a")]);
        let factory = FakeFactory::new(FakeRegistry::with_favorites(&[]));
        let progress = RecordingProgress::default();

        let report = run_favorites_plugin(
            &args(json!({"hookContext": {"type": "Studio.Update.Post", "id": "5"}})),
            &catalog,
            &factory,
            &progress,
        )
        .await;

        match report {
            PluginReport::EntityHook(hook) => assert!(hook.synced.is_empty()),
            other => panic!("unexpected report {:?}", other),
        }
        assert!(factory.connected.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unhandled_hook_is_skipped() {
        let catalog = FakeCatalog::default();
        let factory = FakeFactory::new(FakeRegistry::with_favorites(&[]));
        let progress = RecordingProgress::default();

        let report = run_favorites_plugin(
            &args(json!({"hookContext": {"type": "Scene.Update.Post", "id": 1}})),
            &catalog,
            &factory,
            &progress,
        )
        .await;
        assert!(matches!(report, PluginReport::Skipped { .. }));
    }

    fn whisparr_catalog() -> FakeCatalog {
        FakeCatalog {
            configuration: StashConfiguration {
                plugins: json!({
                    "whisparrUpdate": {
                        "WHISPARR_URL": "http://whisparr:6969/",
                        "WHISPARR_API_KEY": "key"
                    }
                }),
                stash_boxes: Vec::new(),
            },
            scenes: vec![Scene {
                id: "9".to_string(),
                title: Some("Scene".to_string()),
                stash_ids: vec![StashId::new(ENDPOINT, "sid")],
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_whisparr_hook_creates_movie() {
        let catalog = whisparr_catalog();
        let mut seen_url = None;

        let report = run_whisparr_plugin(
            &args(json!({"hookContext": {"type": "Scene.Update.Post", "id": 9}})),
            &catalog,
            |settings| {
                seen_url = Some(settings.url.clone());
                Box::new(FakeMovieManager::new(ApiResponse::new(201, json!({"id": 1}))))
            },
        )
        .await;

        match report {
            PluginReport::Whisparr(report) => {
                assert_eq!(report.scene_id, "9");
                assert!(matches!(report.outcome, UpsertOutcome::Created { .. }));
            }
            other => panic!("unexpected report {:?}", other),
        }
        assert_eq!(seen_url.as_deref(), Some("http://whisparr:6969"));
    }

    #[tokio::test]
    async fn test_whisparr_without_scene_id_does_nothing() {
        let catalog = whisparr_catalog();
        let report = run_whisparr_plugin(&args(json!({})), &catalog, |_| {
            panic!("client must not be built")
        })
        .await;
        assert!(matches!(report, PluginReport::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_whisparr_missing_settings_fails() {
        let mut catalog = whisparr_catalog();
        catalog.configuration.plugins = json!({});

        let report = run_whisparr_plugin(
            &args(json!({"hookContext": {"id": "9"}})),
            &catalog,
            |_| panic!("client must not be built"),
        )
        .await;
        assert!(matches!(report, PluginReport::Failed { .. }));
    }

    #[test]
    fn test_report_serializes_with_result_tag() {
        let report = PluginReport::skipped("nothing to do");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value, json!({"result": "skipped", "reason": "nothing to do"}));
    }
}
