use serde::{Deserialize, Serialize};
use std::fmt;
use crate::StashId;

/// Kind of entity that carries a favorite flag on both Stash and a stash-box.
///
/// The reconciler is generic over this value; everything that differs between
/// performers and studios (query shapes, field names, mutation names) hangs off
/// it instead of living in two copies of the sync code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Performer,
    Studio,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Performer => "performer",
            EntityKind::Studio => "studio",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Performer => "performers",
            EntityKind::Studio => "studios",
        }
    }

    /// Map a Stash hook type (e.g. "Performer.Update.Post") to the kind it updates
    pub fn from_update_hook(hook_type: &str) -> Option<Self> {
        match hook_type {
            "Performer.Update.Post" => Some(EntityKind::Performer),
            "Studio.Update.Post" => Some(EntityKind::Studio),
            _ => None,
        }
    }

    /// Map a task name from the plugin manifest to the kind it reconciles
    pub fn from_task_name(name: &str) -> Option<Self> {
        match name {
            "favorite_performers_sync" => Some(EntityKind::Performer),
            "favorite_studios_sync" => Some(EntityKind::Studio),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A local performer or studio as seen by the favorites sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub stash_ids: Vec<StashId>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
}

impl FavoriteEntity {
    pub fn has_stash_id(&self, endpoint: &str, stash_id: &str) -> bool {
        self.stash_ids.iter().any(|id| id.matches(endpoint, stash_id))
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|id| id == tag_id)
    }
}
