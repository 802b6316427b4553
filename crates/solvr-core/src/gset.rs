use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;

/// Grow-only set.
///
/// Used for the ids a viewer has already voted for: elements are only ever
/// added, and merging a server-reported set is a plain union, so the set
/// can never shrink within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GSet<T: Eq + Hash> {
    elements: HashSet<T>,
}

impl<T: Eq + Hash> Default for GSet<T> {
    fn default() -> Self {
        Self {
            elements: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> GSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element. Returns `true` if it was not present before.
    pub fn insert(&mut self, element: T) -> bool {
        self.elements.insert(element)
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: &Self) {
        self.elements.extend(other.elements.iter().cloned());
    }

    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.elements.contains(element)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for GSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
