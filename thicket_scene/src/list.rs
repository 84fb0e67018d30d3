// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An insertion-ordered set of leaves with O(1) membership tests.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::types::LeafId;

/// An ordered collection of [`LeafId`]s with constant-time membership testing.
///
/// Insertion order is preserved and duplicate inserts are ignored. Used for
/// ancestor paths produced by picking and for picker exclusion sets.
#[derive(Clone, Debug, Default)]
pub struct LeafList {
    list: Vec<LeafId>,
    keys: HashSet<LeafId>,
}

impl LeafList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a leaf, ignoring it if already present.
    pub fn add(&mut self, leaf: LeafId) {
        if self.keys.insert(leaf) {
            self.list.push(leaf);
        }
    }

    /// Insert a leaf at `index`, ignoring it if already present.
    pub fn add_at(&mut self, leaf: LeafId, index: usize) {
        if self.keys.insert(leaf) {
            self.list.insert(index, leaf);
        }
    }

    /// Whether the list contains `leaf`.
    pub fn has(&self, leaf: LeafId) -> bool {
        self.keys.contains(&leaf)
    }

    /// Number of leaves in the list.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The leaves in insertion order.
    pub fn as_slice(&self) -> &[LeafId] {
        &self.list
    }

    /// Iterate the leaves in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, LeafId> {
        self.list.iter()
    }

    /// Remove all leaves.
    pub fn clear(&mut self) {
        self.list.clear();
        self.keys.clear();
    }
}

impl FromIterator<LeafId> for LeafList {
    fn from_iter<I: IntoIterator<Item = LeafId>>(iter: I) -> Self {
        let mut out = Self::new();
        for leaf in iter {
            out.add(leaf);
        }
        out
    }
}

impl<'a> IntoIterator for &'a LeafList {
    type Item = &'a LeafId;
    type IntoIter = core::slice::Iter<'a, LeafId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> LeafId {
        LeafId::new(n, 1)
    }

    #[test]
    fn preserves_insertion_order() {
        let mut list = LeafList::new();
        list.add(id(3));
        list.add(id(1));
        list.add(id(2));
        assert_eq!(list.as_slice(), &[id(3), id(1), id(2)]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let mut list = LeafList::new();
        list.add(id(7));
        list.add(id(7));
        assert_eq!(list.len(), 1);
        assert!(list.has(id(7)));
    }

    #[test]
    fn add_at_prepends() {
        let mut list = LeafList::new();
        list.add(id(1));
        list.add_at(id(2), 0);
        list.add_at(id(3), 0);
        assert_eq!(list.as_slice(), &[id(3), id(2), id(1)]);
        // Duplicates are ignored regardless of position.
        list.add_at(id(1), 0);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn generation_distinguishes_ids() {
        let mut list = LeafList::new();
        list.add(LeafId::new(4, 1));
        assert!(!list.has(LeafId::new(4, 2)));
    }

    #[test]
    fn clear_resets_membership() {
        let mut list = LeafList::new();
        list.add(id(1));
        list.clear();
        assert!(list.is_empty());
        assert!(!list.has(id(1)));
        list.add(id(1));
        assert_eq!(list.len(), 1);
    }
}
