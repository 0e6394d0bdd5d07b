// Set-difference planning for favorites reconciliation

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Insertion-ordered set of stash-box ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    ids: Vec<String>,
    seen: HashSet<String>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was already present
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FavoriteSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Favorites reported by the registry, with how many times each id showed up
/// across all pages. A count above one is a duplicate favorite marker.
#[derive(Debug, Clone, Default)]
pub struct RemoteFavorites {
    ids: FavoriteSet,
    counts: HashMap<String, usize>,
}

impl RemoteFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: impl Into<String>) {
        let id = id.into();
        *self.counts.entry(id.clone()).or_insert(0) += 1;
        self.ids.insert(id);
    }

    pub fn ids(&self) -> &FavoriteSet {
        &self.ids
    }

    pub fn count(&self, id: &str) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids seen more than once, in first-seen order
    pub fn duplicates(&self) -> Vec<(String, usize)> {
        self.ids
            .iter()
            .filter_map(|id| {
                let count = self.count(id);
                (count > 1).then(|| (id.to_string(), count))
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for RemoteFavorites {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut remote = RemoteFavorites::new();
        for id in iter {
            remote.record(id);
        }
        remote
    }
}

/// Remote mutations needed to make the registry match the local favorites.
///
/// Computed once from one snapshot of both sides; the apply loop never
/// re-diffs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
    /// Duplicate remote markers with their observed count
    pub to_dedupe: Vec<(String, usize)>,
}

impl SyncPlan {
    pub fn compute(local: &FavoriteSet, remote: &RemoteFavorites) -> Self {
        let to_add: Vec<String> = local
            .iter()
            .filter(|id| !remote.ids().contains(id))
            .map(str::to_string)
            .collect();
        let to_remove: Vec<String> = remote
            .ids()
            .iter()
            .filter(|id| !local.contains(id))
            .map(str::to_string)
            .collect();
        let to_dedupe = remote.duplicates();

        debug!(
            local = local.len(),
            remote = remote.len(),
            to_add = to_add.len(),
            to_remove = to_remove.len(),
            to_dedupe = to_dedupe.len(),
            "Computed favorites plan"
        );

        Self {
            to_add,
            to_remove,
            to_dedupe,
        }
    }

    pub fn total_work(&self) -> usize {
        self.to_add.len() + self.to_remove.len() + self.to_dedupe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_work() == 0
    }
}
