// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The point-pick query over a leaf tree.

use smallvec::SmallVec;
use thicket_scene::{LeafAttrs, LeafId, LeafList, LeafTree};

use crate::precise;
use crate::types::{PickOptions, PickResult, RadiusPoint, hit_radius_point};

/// Candidate scratch; pick queries rarely collect more than a handful.
type FindList = SmallVec<[LeafId; 8]>;

/// Resolves which leaf (and ancestor path) a world-space point strikes.
///
/// One query runs at a time per instance; all per-query state is reset
/// unconditionally before [`Picker::get_by_point`] returns, including on the
/// zero-candidate path, so queries never observe residue from earlier calls.
/// Concurrent queries need distinct instances or external serialization.
///
/// Traversal visits siblings in reverse paint order (topmost first), so the
/// candidate list is already ordered by front-to-back visual priority.
#[derive(Debug)]
pub struct Picker {
    target: LeafId,
    find_list: FindList,
}

impl Picker {
    /// Create a picker bound to `target` as its default search root.
    pub fn new(target: LeafId) -> Self {
        Self {
            target,
            find_list: FindList::new(),
        }
    }

    /// Resolve the point (with uniform tolerance `radius`) against the tree.
    ///
    /// Forces a layout refresh of the search root's subtree, traverses it in
    /// reverse paint order (unless [`PickOptions::find_list`] supplied the
    /// candidates), disambiguates overlapping candidates, and builds the
    /// result path per the options. A miss yields `target: None` with an
    /// empty path.
    pub fn get_by_point(
        &mut self,
        tree: &mut LeafTree,
        point: kurbo::Point,
        radius: f64,
        options: PickOptions<'_>,
    ) -> PickResult {
        let target = options.target.unwrap_or(self.target);
        let exclude = options.exclude;
        let point = RadiusPoint::new(point.x, point.y, radius);

        tree.check_update(target);
        let tree = &*tree;

        match options.find_list {
            Some(list) => self.find_list = FindList::from_vec(list),
            None => {
                self.find_list.clear();
                let mask_only = tree
                    .attrs(target)
                    .is_some_and(|a| a.contains(LeafAttrs::ONLY_HIT_MASK));
                self.each_find(tree, tree.children_of(target), mask_only, &point, exclude);
            }
        }

        let candidates = core::mem::take(&mut self.find_list);
        let leaf = self.get_best_match_leaf(tree, &candidates, &point, exclude);

        let path = if options.ignore_hittable {
            get_path(tree, leaf, target)
        } else {
            get_hitable_path(tree, leaf, target)
        };
        let through_path = options.through.then(|| {
            if candidates.is_empty() {
                path.clone()
            } else {
                get_through_path(tree, &candidates, target)
            }
        });

        // Reclaim the buffer; no per-query state survives into the next call.
        self.find_list = candidates;
        self.find_list.clear();

        PickResult {
            target: leaf,
            path,
            through_path,
        }
    }

    /// Release retained scratch. Idempotent; the picker stays usable.
    pub fn destroy(&mut self) {
        self.find_list = FindList::new();
    }

    /// Depth-first, reverse-paint-order candidate collection.
    fn each_find(
        &mut self,
        tree: &LeafTree,
        children: &[LeafId],
        hit_mask_only: bool,
        point: &RadiusPoint,
        exclude: Option<&LeafList>,
    ) {
        for &child in children.iter().rev() {
            let Some(attrs) = tree.attrs(child) else {
                continue;
            };
            if !attrs.contains(LeafAttrs::VISIBLE)
                || (hit_mask_only && !attrs.contains(LeafAttrs::MASK))
            {
                continue;
            }
            let hit = attrs.contains(LeafAttrs::HIT_BOUNDS)
                || tree
                    .world_bounds(child)
                    .is_some_and(|b| hit_radius_point(b, point));

            if attrs.contains(LeafAttrs::IS_BRANCH) {
                if hit || attrs.contains(LeafAttrs::IGNORE_HIT_WORLD) {
                    self.each_find(
                        tree,
                        tree.children_of(child),
                        attrs.contains(LeafAttrs::ONLY_HIT_MASK),
                        point,
                        exclude,
                    );
                    // Fallback for branch-leaves (like frames): when nothing
                    // below produced a candidate, the container itself is one.
                    if attrs.contains(LeafAttrs::IS_BRANCH_LEAF) && self.find_list.is_empty() {
                        self.hit_child(tree, child, point, exclude);
                    }
                }
            } else if hit {
                self.hit_child(tree, child, point, exclude);
            }
        }
    }

    /// Submit a candidate: skip excluded leaves, keep only precise hits.
    fn hit_child(
        &mut self,
        tree: &LeafTree,
        child: LeafId,
        point: &RadiusPoint,
        exclude: Option<&LeafList>,
    ) {
        if exclude.is_some_and(|e| e.has(child)) {
            return;
        }
        if precise::hit_world(tree, child, point) {
            self.find_list.push(child);
        }
    }

    /// Disambiguate overlapping candidates.
    ///
    /// With more than one candidate, the first (topmost) one that is
    /// world-hittable and survives a focused zero-tolerance re-test wins;
    /// otherwise the first candidate, hittable or not, is returned.
    fn get_best_match_leaf(
        &mut self,
        tree: &LeafTree,
        candidates: &[LeafId],
        point: &RadiusPoint,
        exclude: Option<&LeafList>,
    ) -> Option<LeafId> {
        if candidates.len() > 1 {
            let focused = point.exact();
            for &candidate in candidates {
                if tree.world_hittable(candidate) {
                    self.hit_child(tree, candidate, &focused, exclude);
                    if let Some(&found) = self.find_list.first() {
                        self.find_list.clear();
                        return Some(found);
                    }
                }
            }
        }
        candidates.first().copied()
    }
}

/// Ancestor chain from `leaf` upward, deepest first, with the search root
/// always included. Empty when there was no hit.
fn get_path(tree: &LeafTree, leaf: Option<LeafId>, root: LeafId) -> LeafList {
    let mut path = LeafList::new();
    let Some(leaf) = leaf else {
        return path;
    };
    let mut cursor = Some(leaf);
    while let Some(cur) = cursor {
        path.add(cur);
        cursor = tree.parent_of(cur);
    }
    path.add(root);
    path
}

/// [`get_path`] truncated at hit-propagation boundaries: walking from the
/// root end toward the leaf, nodes are kept while they are `HITTABLE`; a node
/// without `HIT_CHILDREN` is kept as the final, deepest entry.
fn get_hitable_path(tree: &LeafTree, leaf: Option<LeafId>, root: LeafId) -> LeafList {
    let path = get_path(tree, leaf, root);
    let mut hitable = LeafList::new();
    for &item in path.as_slice().iter().rev() {
        let Some(attrs) = tree.attrs(item) else {
            break;
        };
        if !attrs.contains(LeafAttrs::HITTABLE) {
            break;
        }
        hitable.add_at(item, 0);
        if !attrs.contains(LeafAttrs::HIT_CHILDREN) {
            break;
        }
    }
    hitable
}

/// The see-through path: each candidate (topmost first) contributes its path
/// entries up to the first node shared with the next candidate's path, so
/// shared ancestor suffixes appear exactly once.
fn get_through_path(tree: &LeafTree, candidates: &[LeafId], root: LeafId) -> LeafList {
    let mut through = LeafList::new();
    let paths: SmallVec<[LeafList; 4]> = candidates
        .iter()
        .map(|&c| get_path(tree, Some(c), root))
        .collect();

    for (i, path) in paths.iter().enumerate() {
        let next = paths.get(i + 1);
        for &leaf in path {
            if next.is_some_and(|n| n.has(leaf)) {
                break;
            }
            through.add(leaf);
        }
    }
    through
}
