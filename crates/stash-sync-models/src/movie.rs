use serde::{Deserialize, Serialize};

/// Movie record as returned by Whisparr's `/api/v3/movie`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub foreign_id: Option<String>,
    #[serde(default)]
    pub stash_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityProfile {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootFolder {
    pub path: String,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieOptions {
    pub monitor: String,
    pub search_for_movie: bool,
}

/// Body of `POST /api/v3/movie`.
///
/// The stash-box id goes out twice: Whisparr builds differ on whether they key
/// movies by `foreignId` or `stashId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieRequest {
    pub title: String,
    pub quality_profile_id: i64,
    pub root_folder_path: String,
    pub monitored: bool,
    pub add_options: AddMovieOptions,
    pub foreign_id: String,
    pub stash_id: String,
}

impl AddMovieRequest {
    pub fn new(
        title: impl Into<String>,
        stash_id: impl Into<String>,
        quality_profile_id: i64,
        root_folder_path: impl Into<String>,
        monitored: bool,
    ) -> Self {
        let stash_id = stash_id.into();
        Self {
            title: title.into(),
            quality_profile_id,
            root_folder_path: root_folder_path.into(),
            monitored,
            add_options: AddMovieOptions {
                monitor: if monitored { "movieOnly" } else { "none" }.to_string(),
                search_for_movie: false,
            },
            foreign_id: stash_id.clone(),
            stash_id,
        }
    }
}
