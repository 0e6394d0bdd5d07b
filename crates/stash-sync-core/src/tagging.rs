// Tags local entities whose remote favorite update failed

use serde::Serialize;
use stash_sync_models::{EntityKind, FavoriteEntity, Tag};
use stash_sync_sources::LocalCatalog;
use tracing::{debug, error, info, warn};
use crate::favorites::PAGE_SIZE;

pub const ERROR_TAG_DESCRIPTION: &str =
    "Created by the Set Stashbox Favorites plugin. Marks performers and studios whose \
     favorite status could not be updated on the stash-box.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TagOutcome {
    Tagged { entity_id: String },
    AlreadyTagged { entity_id: String },
    EntityNotFound,
    Failed { reason: String },
}

/// Holds the resolved error tag for the duration of one reconciliation
pub struct ErrorTagger<'a> {
    catalog: &'a dyn LocalCatalog,
    tag: Tag,
}

impl<'a> ErrorTagger<'a> {
    /// Look the tag up by exact name, creating it when missing. `None` turns
    /// tagging off for the run.
    pub async fn resolve(catalog: &'a dyn LocalCatalog, name: &str) -> Option<ErrorTagger<'a>> {
        match catalog.find_tag_by_name(name).await {
            Ok(Some(tag)) => {
                debug!("Using existing error tag {} ({})", tag.name, tag.id);
                return Some(Self { catalog, tag });
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to look up tag \"{}\": {}", name, e);
                return None;
            }
        }

        info!("Tag \"{}\" missing. Creating...", name);
        match catalog.create_tag(name, ERROR_TAG_DESCRIPTION).await {
            Ok(Some(tag)) => Some(Self { catalog, tag }),
            Ok(None) => {
                error!("Failed to create tag \"{}\". Errors will not be tagged.", name);
                None
            }
            Err(e) => {
                error!("Failed to create tag \"{}\": {}. Errors will not be tagged.", name, e);
                None
            }
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Attach the error tag to the first local entity linked to `stash_id` on `endpoint`
    pub async fn tag_entity(&self, kind: EntityKind, endpoint: &str, stash_id: &str) -> TagOutcome {
        let Some(entity) = find_by_stash_id(self.catalog, kind, endpoint, stash_id).await else {
            warn!("No local {} linked to {} {}, not tagging", kind, endpoint, stash_id);
            return TagOutcome::EntityNotFound;
        };

        if entity.has_tag(&self.tag.id) {
            debug!("{} {} already has tag {}", kind, entity.id, self.tag.name);
            return TagOutcome::AlreadyTagged { entity_id: entity.id };
        }

        let mut tag_ids = entity.tag_ids.clone();
        tag_ids.push(self.tag.id.clone());
        match self.catalog.update_entity_tags(kind, &entity.id, &tag_ids).await {
            Ok(true) => {
                info!("Tagged {} {} ({}) with \"{}\"", kind, entity.id, entity.name, self.tag.name);
                TagOutcome::Tagged { entity_id: entity.id }
            }
            Ok(false) => {
                warn!("Stash returned no {} when tagging {}", kind, entity.id);
                TagOutcome::Failed {
                    reason: format!("{} {} not updated", kind, entity.id),
                }
            }
            Err(e) => {
                error!("Failed to tag {} {}: {}", kind, entity.id, e);
                TagOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}

/// Linear scan of all local entities of `kind` for one linked to `stash_id`.
/// A failed page ends the scan.
pub async fn find_by_stash_id(
    catalog: &dyn LocalCatalog,
    kind: EntityKind,
    endpoint: &str,
    stash_id: &str,
) -> Option<FavoriteEntity> {
    let mut page = 1u32;
    loop {
        let result = match catalog.list_entities(kind, page, PAGE_SIZE, false).await {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to list {} page {}: {}", kind.plural(), page, e);
                return None;
            }
        };
        if result.entities.is_empty() {
            return None;
        }
        if let Some(found) = result
            .entities
            .into_iter()
            .find(|entity| entity.has_stash_id(endpoint, stash_id))
        {
            return Some(found);
        }
        if (page as usize) * (PAGE_SIZE as usize) >= result.count {
            return None;
        }
        page += 1;
    }
}
