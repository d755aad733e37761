//! Insertion-ordered identity sets
//!
//! Social edges (followers, followings, likes) and a user's owned posts are
//! stored as ordered lists on the owning record. `IdSet` keeps those lists
//! duplicate-free and gives every mutation an explicit add-if-absent or
//! remove-if-present meaning, so toggles are self-inverse.

use serde::{Deserialize, Serialize};

/// Outcome of [`IdSet::toggle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggled {
    /// The identity was absent and has been added
    Added,
    /// The identity was present and has been removed
    Removed,
}

/// Ordered collection of identities with set semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de> + PartialEq"
))]
pub struct IdSet<T> {
    items: Vec<T>,
}

impl<T> IdSet<T> {
    /// Create an empty set
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set has no members
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate members in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Members as a slice, in insertion order
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: PartialEq> IdSet<T> {
    /// Whether `id` is a member
    pub fn contains(&self, id: &T) -> bool {
        self.items.contains(id)
    }

    /// Add `id` if absent. Returns `true` if the set changed.
    pub fn insert(&mut self, id: T) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.items.push(id);
        true
    }

    /// Remove `id` if present. Returns `true` if the set changed.
    pub fn remove(&mut self, id: &T) -> bool {
        match self.items.iter().position(|item| item == id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove `id` if present, otherwise add it.
    pub fn toggle(&mut self, id: T) -> Toggled {
        if self.remove(&id) {
            Toggled::Removed
        } else {
            self.items.push(id);
            Toggled::Added
        }
    }
}

impl<T> Default for IdSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> From<Vec<T>> for IdSet<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> From<IdSet<T>> for Vec<T> {
    fn from(set: IdSet<T>) -> Self {
        set.items
    }
}

impl<T: PartialEq> FromIterator<T> for IdSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl<'a, T> IntoIterator for &'a IdSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for IdSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
