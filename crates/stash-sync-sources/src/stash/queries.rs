use stash_sync_models::EntityKind;

/// GraphQL shapes for one entity kind on the local Stash API
pub struct LocalKindQueries {
    /// Root field of the list query (`findPerformers`)
    pub list_root: &'static str,
    /// Array field inside the list result (`performers`)
    pub list_field: &'static str,
    pub find_root: &'static str,
    pub update_root: &'static str,
    pub list_favorites: &'static str,
    pub list_all: &'static str,
    pub find_one: &'static str,
    pub update_tags: &'static str,
}

static PERFORMER: LocalKindQueries = LocalKindQueries {
    list_root: "findPerformers",
    list_field: "performers",
    find_root: "findPerformer",
    update_root: "performerUpdate",
    list_favorites: r#"
query FindFavoritePerformers($filter: FindFilterType) {
  findPerformers(filter: $filter, performer_filter: { filter_favorites: true }) {
    count
    performers { id name favorite tags { id } stash_ids { endpoint stash_id } }
  }
}"#,
    list_all: r#"
query FindPerformers($filter: FindFilterType) {
  findPerformers(filter: $filter) {
    count
    performers { id name favorite tags { id } stash_ids { endpoint stash_id } }
  }
}"#,
    find_one: r#"
query FindPerformer($id: ID!) {
  findPerformer(id: $id) { id name favorite tags { id } stash_ids { endpoint stash_id } }
}"#,
    update_tags: r#"
mutation PerformerUpdate($input: PerformerUpdateInput!) {
  performerUpdate(input: $input) { id }
}"#,
};

// Studios are listed unfiltered and filtered on `favorite` client-side.
static STUDIO: LocalKindQueries = LocalKindQueries {
    list_root: "findStudios",
    list_field: "studios",
    find_root: "findStudio",
    update_root: "studioUpdate",
    list_favorites: r#"
query FindFavoriteStudios($filter: FindFilterType) {
  findStudios(filter: $filter) {
    count
    studios { id name favorite tags { id } stash_ids { endpoint stash_id } }
  }
}"#,
    list_all: r#"
query FindStudios($filter: FindFilterType) {
  findStudios(filter: $filter) {
    count
    studios { id name favorite tags { id } stash_ids { endpoint stash_id } }
  }
}"#,
    find_one: r#"
query FindStudio($id: ID!) {
  findStudio(id: $id) { id name favorite tags { id } stash_ids { endpoint stash_id } }
}"#,
    update_tags: r#"
mutation StudioUpdate($input: StudioUpdateInput!) {
  studioUpdate(input: $input) { id }
}"#,
};

pub fn local_queries(kind: EntityKind) -> &'static LocalKindQueries {
    match kind {
        EntityKind::Performer => &PERFORMER,
        EntityKind::Studio => &STUDIO,
    }
}

pub const FIND_SCENE: &str = r#"
query FindScene($id: ID!) {
  findScene(id: $id) { id title stash_ids { endpoint stash_id } }
}"#;

pub const FIND_TAG_BY_NAME: &str = r#"
query FindTag($name: String!) {
  findTags(tag_filter: { name: { value: $name, modifier: EQUALS } }) {
    tags { id name }
  }
}"#;

pub const CREATE_TAG: &str = r#"
mutation TagCreate($input: TagCreateInput!) {
  tagCreate(input: $input) { id name }
}"#;

pub const CONFIGURATION: &str = r#"
query Configuration {
  configuration {
    plugins
    general { stashBoxes { endpoint api_key } }
  }
}"#;
