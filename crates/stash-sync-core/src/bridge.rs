//! Creates a Whisparr movie for a Stash scene, or refreshes the one that
//! already exists.
//!
//! Whisparr reports "already exists" either as HTTP 409 or as a 400 whose
//! validation errors carry `errorCode: "MovieExistsValidator"`, sometimes
//! with the existing movie's id attached.

use serde::Serialize;
use serde_json::Value;
use stash_sync_config::WhisparrSettings;
use stash_sync_models::{AddMovieRequest, Movie, Scene, StashId};
use stash_sync_sources::{ApiResponse, MovieManager};
use tracing::{debug, error, info, instrument, warn};

pub const MOVIE_EXISTS_ERROR_CODE: &str = "MovieExistsValidator";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// The scene has no stash id on a matching endpoint
    NoStashId,
    /// No quality profile or root folder to create the movie with
    DefaultsUnavailable { reason: String },
    Created { stash_id: String, http_status: u16 },
    Refreshed { stash_id: String, movie_id: i64 },
    RefreshFailed { stash_id: String, movie_id: i64, reason: String },
    /// Whisparr says it exists but the lookup couldn't find it
    ExistingNotFound { stash_id: String },
    Failed { stash_id: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddClassification {
    Created,
    AlreadyExists { existing_id: Option<i64> },
    Failed,
}

pub fn classify_add_response(response: &ApiResponse) -> AddClassification {
    let exists_entry = exists_error_entry(&response.body);
    match response.status {
        200 | 201 => AddClassification::Created,
        409 => AddClassification::AlreadyExists {
            existing_id: exists_entry.and_then(existing_movie_id),
        },
        400 if exists_entry.is_some() => AddClassification::AlreadyExists {
            existing_id: exists_entry.and_then(existing_movie_id),
        },
        _ => AddClassification::Failed,
    }
}

/// The validation entry reporting `MovieExistsValidator`. Error bodies come
/// as an object or a list of objects.
fn exists_error_entry(body: &Value) -> Option<&Value> {
    let is_exists = |entry: &&Value| {
        entry.get("errorCode").and_then(Value::as_str) == Some(MOVIE_EXISTS_ERROR_CODE)
    };
    match body {
        Value::Array(items) => items.iter().filter(|v| v.is_object()).find(is_exists),
        Value::Object(_) => Some(body).filter(is_exists),
        _ => None,
    }
}

fn existing_movie_id(entry: &Value) -> Option<i64> {
    let id = entry.get("existingMovieId")?;
    id.as_i64().or_else(|| id.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Pick the movie for `stash_id` out of a `GET /movie?stashId=` response.
///
/// Builds that ignore the filter return the whole library, so a multi-record
/// answer is scanned for an exact `foreignId` match.
pub fn select_movie(response: &ApiResponse, stash_id: &str) -> Option<Movie> {
    if response.status != 200 {
        warn!("Movie lookup returned HTTP {}", response.status);
        return None;
    }
    match &response.body {
        Value::Array(records) if records.len() == 1 => parse_movie(&records[0]),
        Value::Array(records) => records
            .iter()
            .filter_map(parse_movie)
            .find(|movie| movie.foreign_id.as_deref() == Some(stash_id)),
        Value::Object(_) if response.body.get("id").is_some() => parse_movie(&response.body),
        _ => None,
    }
}

fn parse_movie(value: &Value) -> Option<Movie> {
    match serde_json::from_value(value.clone()) {
        Ok(movie) => Some(movie),
        Err(e) => {
            debug!("Skipping unreadable movie record: {}", e);
            None
        }
    }
}

pub struct WhisparrBridge<'a> {
    manager: &'a dyn MovieManager,
    endpoint_substr: String,
    monitored: bool,
}

impl<'a> WhisparrBridge<'a> {
    pub fn new(manager: &'a dyn MovieManager, settings: &WhisparrSettings) -> Self {
        Self {
            manager,
            endpoint_substr: settings.endpoint_substr.clone(),
            monitored: settings.monitored,
        }
    }

    #[instrument(skip(self, scene), fields(scene_id = %scene.id))]
    pub async fn upsert_scene(&self, scene: &Scene) -> UpsertOutcome {
        let Some(stash_id) = StashId::for_endpoint_containing(&scene.stash_ids, &self.endpoint_substr) else {
            info!("Scene {} has no stash id matching \"{}\"", scene.id, self.endpoint_substr);
            return UpsertOutcome::NoStashId;
        };
        let stash_id = stash_id.to_string();

        let (quality_profile_id, root_folder) = match self.defaults().await {
            Ok(defaults) => defaults,
            Err(reason) => {
                error!("{}", reason);
                return UpsertOutcome::DefaultsUnavailable { reason };
            }
        };

        let request = AddMovieRequest::new(
            scene.title_or_empty(),
            &stash_id,
            quality_profile_id,
            root_folder,
            self.monitored,
        );
        info!("Adding scene {} to Whisparr as {}", scene.id, stash_id);
        let response = match self.manager.add_movie(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to add movie {}: {}", stash_id, e);
                return UpsertOutcome::Failed { stash_id, reason: e.to_string() };
            }
        };

        match classify_add_response(&response) {
            AddClassification::Created => {
                info!("Added movie {} to Whisparr", stash_id);
                UpsertOutcome::Created { stash_id, http_status: response.status }
            }
            AddClassification::AlreadyExists { existing_id } => {
                info!("Movie {} already exists in Whisparr, refreshing", stash_id);
                let movie_id = match existing_id {
                    Some(id) => Some(id),
                    None => self.lookup_existing(&stash_id).await,
                };
                match movie_id {
                    Some(movie_id) => self.refresh(stash_id, movie_id).await,
                    None => {
                        info!("Could not lookup existing movie {}", stash_id);
                        UpsertOutcome::ExistingNotFound { stash_id }
                    }
                }
            }
            AddClassification::Failed => {
                let body = response.body_text();
                error!("Whisparr rejected movie {}: HTTP {} {}", stash_id, response.status, body);
                UpsertOutcome::Failed {
                    stash_id,
                    reason: format!("HTTP {}: {}", response.status, body),
                }
            }
        }
    }

    /// First quality profile id and first root folder path
    async fn defaults(&self) -> Result<(i64, String), String> {
        let profiles = self
            .manager
            .quality_profiles()
            .await
            .map_err(|e| format!("Failed to load Whisparr quality profiles: {}", e))?;
        let profile = profiles
            .first()
            .ok_or_else(|| "Whisparr has no quality profiles".to_string())?;

        let folders = self
            .manager
            .root_folders()
            .await
            .map_err(|e| format!("Failed to load Whisparr root folders: {}", e))?;
        let folder = folders
            .first()
            .ok_or_else(|| "Whisparr has no root folders".to_string())?;

        Ok((profile.id, folder.path.clone()))
    }

    async fn lookup_existing(&self, stash_id: &str) -> Option<i64> {
        match self.manager.lookup_movies(stash_id).await {
            Ok(response) => select_movie(&response, stash_id).map(|movie| movie.id),
            Err(e) => {
                error!("Failed to look up movie {}: {}", stash_id, e);
                None
            }
        }
    }

    async fn refresh(&self, stash_id: String, movie_id: i64) -> UpsertOutcome {
        match self.manager.refresh_movie(movie_id).await {
            Ok(response) if response.is_ok() => {
                info!("Refreshed Whisparr movie {} ({})", movie_id, stash_id);
                UpsertOutcome::Refreshed { stash_id, movie_id }
            }
            Ok(response) => {
                let reason = format!("HTTP {}: {}", response.status, response.body_text());
                error!("Refresh of movie {} failed: {}", movie_id, reason);
                UpsertOutcome::RefreshFailed { stash_id, movie_id, reason }
            }
            Err(e) => {
                error!("Refresh of movie {} failed: {}", movie_id, e);
                UpsertOutcome::RefreshFailed {
                    stash_id,
                    movie_id,
                    reason: e.to_string(),
                }
            }
        }
    }
}
