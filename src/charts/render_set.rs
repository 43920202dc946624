use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Insertion-ordered, duplicate-rejecting set of chart-pack ids admitted for
/// rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSet {
    ids: IndexSet<String>,
}

impl RenderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `id`. Returns false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Admits every id in order and returns how many were new.
    pub fn extend<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.ids.len();
        for id in ids {
            self.ids.insert(id);
        }
        self.ids.len() - before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.ids.iter()
    }

    /// Owned copy in admission order, as published to the map engine
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn is_superset_of(&self, other: &RenderSet) -> bool {
        other.ids.is_subset(&self.ids)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<String> for RenderSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
