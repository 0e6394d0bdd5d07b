use stash_sync_models::EntityKind;

/// GraphQL shapes for one entity kind on a stash-box
pub struct RemoteKindQueries {
    pub query_root: &'static str,
    pub query_field: &'static str,
    pub find_root: &'static str,
    pub favorite_root: &'static str,
    pub query_favorites: &'static str,
    pub find_one: &'static str,
    pub set_favorite: &'static str,
}

static PERFORMER: RemoteKindQueries = RemoteKindQueries {
    query_root: "queryPerformers",
    query_field: "performers",
    find_root: "findPerformer",
    favorite_root: "favoritePerformer",
    query_favorites: r#"
query Performers($input: PerformerQueryInput!) {
  queryPerformers(input: $input) {
    count
    performers { id is_favorite }
  }
}"#,
    find_one: r#"
query FullPerformer($id: ID!) {
  findPerformer(id: $id) { id is_favorite }
}"#,
    set_favorite: r#"
mutation FavoritePerformer($id: ID!, $favorite: Boolean!) {
  favoritePerformer(id: $id, favorite: $favorite)
}"#,
};

static STUDIO: RemoteKindQueries = RemoteKindQueries {
    query_root: "queryStudios",
    query_field: "studios",
    find_root: "findStudio",
    favorite_root: "favoriteStudio",
    query_favorites: r#"
query Studios($input: StudioQueryInput!) {
  queryStudios(input: $input) {
    count
    studios { id is_favorite }
  }
}"#,
    find_one: r#"
query FullStudio($id: ID!) {
  findStudio(id: $id) { id is_favorite }
}"#,
    set_favorite: r#"
mutation FavoriteStudio($id: ID!, $favorite: Boolean!) {
  favoriteStudio(id: $id, favorite: $favorite)
}"#,
};

pub fn remote_queries(kind: EntityKind) -> &'static RemoteKindQueries {
    match kind {
        EntityKind::Performer => &PERFORMER,
        EntityKind::Studio => &STUDIO,
    }
}
