// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, lazy layout, and world-state propagation.

use alloc::{vec, vec::Vec};
use kurbo::{Affine, Rect};

use crate::types::{LeafAttrs, LeafId, LocalLeaf};
use crate::util::{compose_local, transform_rect_bbox};

/// Retained scene tree of leaves.
///
/// Leaves are stored in an arena addressed by generational [`LeafId`]s; a
/// parent owns the ordered list of its children (list order is paint order,
/// later children on top), and each child keeps a non-owning back-index to
/// its parent for upward traversal.
///
/// Derived state (the cached local/world matrices, world AABB, and world
/// opacity) is valid only root-to-leaf: a leaf's world state is computed from
/// its parent's already-current world state. Mutating local fields marks the
/// affected subtree dirty; [`LeafTree::check_update`] (or the propagation
/// entry points) brings it current again before it is read.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use thicket_scene::{LeafTree, LocalLeaf};
///
/// let mut tree = LeafTree::new();
/// let root = tree.insert(
///     None,
///     LocalLeaf {
///         bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
///         ..LocalLeaf::default()
///     },
/// );
/// tree.check_update(root);
/// assert_eq!(tree.world_bounds(root), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
/// ```
pub struct LeafTree {
    /// slots
    nodes: Vec<Option<Leaf>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for LeafTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("LeafTree")
            .field("leaves_total", &total)
            .field("leaves_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl Default for LeafTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Dirty {
    matrix: bool,
    opacity: bool,
}

#[derive(Clone, Debug)]
struct Leaf {
    generation: u32,
    parent: Option<LeafId>,
    children: Vec<LeafId>,
    local: LocalLeaf,
    local_matrix: Affine,
    world_matrix: Affine,
    world_bounds: Rect,
    world_opacity: f64,
    dirty: Dirty,
    changed: bool,
}

impl Leaf {
    fn new(generation: u32, local: LocalLeaf) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            local,
            local_matrix: Affine::IDENTITY,
            world_matrix: Affine::IDENTITY,
            world_bounds: Rect::ZERO,
            world_opacity: 1.0,
            dirty: Dirty {
                matrix: true,
                opacity: true,
            },
            changed: false,
        }
    }
}

impl LeafTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new leaf as the last child of `parent` (or as a root if `None`).
    ///
    /// The returned [`LeafId`] is live immediately; world-space state is
    /// computed on the next [`LeafTree::check_update`] or propagation call.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "leaf ids use 32-bit slot indices"
    )]
    pub fn insert(&mut self, parent: Option<LeafId>, local: LocalLeaf) -> LeafId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Leaf::new(generation, local));
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Leaf::new(generation, local)));
            self.generations.push(generation);
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = LeafId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove a leaf and its subtree. Their ids become stale immediately.
    pub fn remove(&mut self, id: LeafId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` to be the last child of `new_parent` (or a root for `None`),
    /// keeping its local transform untouched. Marks the subtree dirty.
    ///
    /// For the world-position-preserving variant see
    /// [`LeafTree::drop_into`](Self::drop_into).
    pub fn reparent(&mut self, id: LeafId, new_parent: Option<LeafId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.mark_subtree_dirty(
            id,
            Dirty {
                matrix: true,
                opacity: true,
            },
        );
    }

    /// Append `child` to `parent`'s child list, detaching it from its current
    /// parent first. `parent` must name a branch; this is the structural
    /// attach used by world-position-preserving drops.
    pub fn add(&mut self, parent: LeafId, child: LeafId) {
        if !self.is_alive(parent) {
            return;
        }
        self.reparent(child, Some(parent));
    }

    // --- accessors ---

    /// Returns true if `id` refers to a live leaf.
    pub fn is_alive(&self, id: LeafId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the parent of a leaf if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: LeafId) -> Option<LeafId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// The children of a leaf in paint order (last on top); empty for stale ids.
    pub fn children_of(&self, id: LeafId) -> &[LeafId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// The attribute flags of a live leaf.
    pub fn attrs(&self, id: LeafId) -> Option<LeafAttrs> {
        self.node_opt(id).map(|n| n.local.attrs)
    }

    /// The local state of a live leaf.
    pub fn local(&self, id: LeafId) -> Option<&LocalLeaf> {
        self.node_opt(id).map(|n| &n.local)
    }

    /// The cached local matrix as of the last update.
    pub fn local_matrix(&self, id: LeafId) -> Option<Affine> {
        self.node_opt(id).map(|n| n.local_matrix)
    }

    /// The cached local-to-world matrix as of the last update.
    pub fn world_matrix(&self, id: LeafId) -> Option<Affine> {
        self.node_opt(id).map(|n| n.world_matrix)
    }

    /// The cached world-space AABB as of the last update. Conservative under
    /// rotation and shear.
    pub fn world_bounds(&self, id: LeafId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.world_bounds)
    }

    /// The cached world opacity (product of local opacities along the chain).
    pub fn world_opacity(&self, id: LeafId) -> Option<f64> {
        self.node_opt(id).map(|n| n.world_opacity)
    }

    /// Whether the leaf is marked changed since the last render flush.
    pub fn is_changed(&self, id: LeafId) -> Option<bool> {
        self.node_opt(id).map(|n| n.changed)
    }

    /// Clear the changed flag for a whole subtree, typically after rendering.
    pub fn reset_change(&mut self, id: LeafId) {
        if !self.is_alive(id) {
            return;
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let n = self.node_mut(id);
            n.changed = false;
            stack.extend_from_slice(&n.children);
        }
    }

    // --- local mutation ---

    /// Set the local translation.
    pub fn set_position(&mut self, id: LeafId, x: f64, y: f64) {
        if let Some(n) = self.node_opt_mut(id)
            && (n.local.x != x || n.local.y != y)
        {
            n.local.x = x;
            n.local.y = y;
            self.mark_matrix_dirty(id);
        }
    }

    /// Set the local scale factors.
    pub fn set_scale(&mut self, id: LeafId, scale_x: f64, scale_y: f64) {
        if let Some(n) = self.node_opt_mut(id)
            && (n.local.scale_x != scale_x || n.local.scale_y != scale_y)
        {
            n.local.scale_x = scale_x;
            n.local.scale_y = scale_y;
            self.mark_matrix_dirty(id);
        }
    }

    /// Set the local rotation in degrees.
    pub fn set_rotation(&mut self, id: LeafId, rotation: f64) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.rotation != rotation
        {
            n.local.rotation = rotation;
            self.mark_matrix_dirty(id);
        }
    }

    /// Set the local shear angles in degrees.
    pub fn set_skew(&mut self, id: LeafId, skew_x: f64, skew_y: f64) {
        if let Some(n) = self.node_opt_mut(id)
            && (n.local.skew_x != skew_x || n.local.skew_y != skew_y)
        {
            n.local.skew_x = skew_x;
            n.local.skew_y = skew_y;
            self.mark_matrix_dirty(id);
        }
    }

    /// Set the local opacity. Marks the subtree's opacity dirty.
    pub fn set_opacity(&mut self, id: LeafId, opacity: f64) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.opacity != opacity
        {
            n.local.opacity = opacity;
            self.mark_subtree_dirty(
                id,
                Dirty {
                    matrix: false,
                    opacity: true,
                },
            );
        }
    }

    /// Set the local content bounds.
    pub fn set_bounds(&mut self, id: LeafId, bounds: Rect) {
        if let Some(n) = self.node_opt_mut(id)
            && n.local.bounds != bounds
        {
            n.local.bounds = bounds;
            self.mark_matrix_dirty(id);
        }
    }

    /// Replace the attribute flags.
    pub fn set_attrs(&mut self, id: LeafId, attrs: LeafAttrs) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.attrs = attrs;
        }
    }

    /// Replace the precise hit shape.
    pub fn set_hit_shape(&mut self, id: LeafId, shape: Option<kurbo::BezPath>) {
        if let Some(n) = self.node_opt_mut(id) {
            n.local.hit_shape = shape;
        }
    }

    // --- propagation ---

    /// Force any pending matrix/bounds recomputation before reading world state.
    ///
    /// Walks up from `id` to the highest ancestor with a stale matrix and
    /// recomputes that whole subtree (which contains `id`'s subtree). When no
    /// ancestor is stale, `id`'s own subtree is recomputed, covering local
    /// changes made below `id`.
    pub fn check_update(&mut self, id: LeafId) {
        if !self.is_alive(id) {
            return;
        }
        let mut top = id;
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            if self.node(cur).dirty.matrix {
                top = cur;
            }
            cursor = self.node(cur).parent;
        }
        self.update_all_world_matrix(top);
    }

    /// Recompute the world matrix and world AABB for `id` and every descendant,
    /// in child list order.
    ///
    /// The parent's world matrix (if any) must already be current; every leaf
    /// in the subtree ends up consistent with the full ancestor chain.
    pub fn update_all_world_matrix(&mut self, id: LeafId) {
        if !self.is_alive(id) {
            return;
        }
        let parent_world = self
            .node(id)
            .parent
            .map(|p| self.node(p).world_matrix)
            .unwrap_or(Affine::IDENTITY);

        // Depth-first with an explicit stack; `.rev()` keeps child list order.
        let mut stack = vec![(id, parent_world)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = self.node_mut(id);
            if node.dirty.matrix {
                node.local_matrix = compose_local(&node.local);
            }
            node.world_matrix = parent_world * node.local_matrix;
            node.world_bounds = transform_rect_bbox(node.world_matrix, node.local.bounds);
            node.dirty.matrix = false;
            let world = node.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Recompute the world opacity for `id` and every descendant.
    ///
    /// World opacity is the product of local opacities along the ancestor
    /// chain; the parent's world opacity must already be current.
    pub fn update_all_world_opacity(&mut self, id: LeafId) {
        if !self.is_alive(id) {
            return;
        }
        let parent_opacity = self
            .node(id)
            .parent
            .map(|p| self.node(p).world_opacity)
            .unwrap_or(1.0);

        let mut stack = vec![(id, parent_opacity)];
        while let Some((id, parent_opacity)) = stack.pop() {
            let node = self.node_mut(id);
            node.world_opacity = parent_opacity * node.local.opacity;
            node.dirty.opacity = false;
            let opacity = node.world_opacity;
            for &child in node.children.iter().rev() {
                stack.push((child, opacity));
            }
        }
    }

    /// Refresh world opacity for the subtree, then mark `id` and every
    /// descendant changed-since-render.
    ///
    /// Opacity runs first: render-change consumers compare against
    /// opacity-derived visual state, so it must be current when the changed
    /// flags are raised.
    pub fn update_all_change(&mut self, id: LeafId) {
        if !self.is_alive(id) {
            return;
        }
        self.update_all_world_opacity(id);

        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.node_mut(id);
            node.changed = true;
            stack.extend_from_slice(&node.children);
        }
    }

    // --- internals ---

    /// Access a live leaf; panics if `id` is stale.
    fn node(&self, id: LeafId) -> &Leaf {
        self.nodes[id.idx()].as_ref().expect("dangling LeafId")
    }

    fn node_mut(&mut self, id: LeafId) -> &mut Leaf {
        self.nodes[id.idx()].as_mut().expect("dangling LeafId")
    }

    fn node_opt(&self, id: LeafId) -> Option<&Leaf> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: LeafId) -> Option<&mut Leaf> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        (n.generation == id.1).then_some(n)
    }

    /// Mutable access to the local record for in-crate transform ops; the
    /// caller is responsible for marking dirtiness.
    pub(crate) fn local_mut(&mut self, id: LeafId) -> &mut LocalLeaf {
        &mut self.node_mut(id).local
    }

    pub(crate) fn mark_matrix_dirty(&mut self, id: LeafId) {
        self.mark_subtree_dirty(
            id,
            Dirty {
                matrix: true,
                opacity: false,
            },
        );
    }

    fn mark_subtree_dirty(&mut self, id: LeafId, flags: Dirty) {
        if !self.is_alive(id) {
            return;
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let n = self.node_mut(id);
            n.dirty.matrix |= flags.matrix;
            n.dirty.opacity |= flags.opacity;
            stack.extend_from_slice(&n.children);
        }
    }

    fn link_parent(&mut self, id: LeafId, parent: LeafId) {
        self.node_mut(parent).children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: LeafId, parent: LeafId) {
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    const EPS: f64 = 1e-9;

    fn leaf_at(x: f64, y: f64) -> LocalLeaf {
        LocalLeaf {
            x,
            y,
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            ..LocalLeaf::default()
        }
    }

    fn assert_affine_near(a: Affine, b: Affine) {
        for (x, y) in a.as_coeffs().iter().zip(b.as_coeffs()) {
            assert!((x - y).abs() < EPS, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, LocalLeaf::default());
        let a = tree.insert(Some(root), LocalLeaf::default());

        assert!(tree.is_alive(root));
        assert!(tree.is_alive(a));

        tree.remove(a);
        assert!(!tree.is_alive(a));

        let b = tree.insert(Some(root), LocalLeaf::default());
        assert!(tree.is_alive(b));
        assert!(!tree.is_alive(a));
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
    }

    #[test]
    fn remove_takes_subtree_and_unlinks() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, LocalLeaf::default());
        let a = tree.insert(Some(root), LocalLeaf::default());
        let b = tree.insert(Some(a), LocalLeaf::default());
        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(b));
        assert!(tree.children_of(root).is_empty());
    }

    #[test]
    fn children_keep_paint_order() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, LocalLeaf::default());
        let a = tree.insert(Some(root), LocalLeaf::default());
        let b = tree.insert(Some(root), LocalLeaf::default());
        assert_eq!(tree.children_of(root), &[a, b]);
        assert_eq!(tree.parent_of(a), Some(root));
        assert_eq!(tree.parent_of(root), None);
    }

    #[test]
    fn propagation_composes_ancestor_chain() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, leaf_at(10.0, 20.0));
        let a = tree.insert(
            Some(root),
            LocalLeaf {
                x: 5.0,
                y: 7.0,
                scale_x: 2.0,
                scale_y: 2.0,
                ..leaf_at(5.0, 7.0)
            },
        );
        let b = tree.insert(Some(a), leaf_at(1.0, 1.0));
        tree.update_all_world_matrix(root);

        // Every world matrix equals the composition of locals down the chain.
        let expected_a = tree.local_matrix(root).unwrap() * tree.local_matrix(a).unwrap();
        assert_affine_near(tree.world_matrix(a).unwrap(), expected_a);
        let expected_b = expected_a * tree.local_matrix(b).unwrap();
        assert_affine_near(tree.world_matrix(b).unwrap(), expected_b);

        // A root with no parent composes against the identity.
        assert_affine_near(
            tree.world_matrix(root).unwrap(),
            Affine::translate(Vec2::new(10.0, 20.0)),
        );
    }

    #[test]
    fn world_bounds_follow_transforms() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, leaf_at(0.0, 0.0));
        let child = tree.insert(
            Some(root),
            LocalLeaf {
                x: 100.0,
                y: 50.0,
                scale_x: 2.0,
                scale_y: 1.0,
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                ..LocalLeaf::default()
            },
        );
        tree.check_update(root);
        assert_eq!(
            tree.world_bounds(child),
            Some(Rect::new(100.0, 50.0, 120.0, 60.0))
        );
    }

    #[test]
    fn check_update_covers_dirty_ancestors() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, leaf_at(0.0, 0.0));
        let a = tree.insert(Some(root), leaf_at(0.0, 0.0));
        let b = tree.insert(Some(a), leaf_at(0.0, 0.0));
        tree.check_update(root);

        // Dirty an ancestor, then check_update the deep leaf: the whole dirty
        // chain must be recomputed.
        tree.set_position(root, 30.0, 0.0);
        tree.check_update(b);
        assert_affine_near(
            tree.world_matrix(b).unwrap(),
            Affine::translate(Vec2::new(30.0, 0.0)),
        );
    }

    #[test]
    fn check_update_covers_dirty_descendants() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, leaf_at(0.0, 0.0));
        let a = tree.insert(Some(root), leaf_at(0.0, 0.0));
        tree.check_update(root);

        tree.set_position(a, 9.0, 9.0);
        tree.check_update(root);
        assert_affine_near(
            tree.world_matrix(a).unwrap(),
            Affine::translate(Vec2::new(9.0, 9.0)),
        );
    }

    #[test]
    fn world_opacity_is_chain_product() {
        let mut tree = LeafTree::new();
        let root = tree.insert(
            None,
            LocalLeaf {
                opacity: 0.5,
                ..LocalLeaf::default()
            },
        );
        let a = tree.insert(
            Some(root),
            LocalLeaf {
                opacity: 0.5,
                ..LocalLeaf::default()
            },
        );
        let b = tree.insert(
            Some(a),
            LocalLeaf {
                opacity: 0.8,
                ..LocalLeaf::default()
            },
        );
        tree.update_all_world_opacity(root);
        assert!((tree.world_opacity(root).unwrap() - 0.5).abs() < EPS, "root opacity");
        assert!((tree.world_opacity(a).unwrap() - 0.25).abs() < EPS, "child opacity");
        assert!((tree.world_opacity(b).unwrap() - 0.2).abs() < EPS, "grandchild opacity");
    }

    #[test]
    fn update_all_change_refreshes_opacity_first() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, LocalLeaf::default());
        let a = tree.insert(Some(root), LocalLeaf::default());
        tree.update_all_world_opacity(root);

        tree.set_opacity(root, 0.25);
        tree.update_all_change(root);

        // Opacity must be current when the changed flags are raised.
        assert!((tree.world_opacity(a).unwrap() - 0.25).abs() < EPS, "opacity current");
        assert_eq!(tree.is_changed(root), Some(true));
        assert_eq!(tree.is_changed(a), Some(true));

        tree.reset_change(root);
        assert_eq!(tree.is_changed(a), Some(false));
    }

    #[test]
    fn reparent_marks_world_state_stale() {
        let mut tree = LeafTree::new();
        let root = tree.insert(None, leaf_at(0.0, 0.0));
        let a = tree.insert(Some(root), leaf_at(100.0, 0.0));
        let b = tree.insert(Some(root), leaf_at(2.0, 2.0));
        tree.check_update(root);

        tree.reparent(b, Some(a));
        tree.check_update(b);
        assert_affine_near(
            tree.world_matrix(b).unwrap(),
            Affine::translate(Vec2::new(102.0, 2.0)),
        );
        assert_eq!(tree.children_of(a), &[b]);
        assert!(tree.children_of(root).len() == 1);
    }

    #[test]
    fn stale_ids_are_inert() {
        let mut tree = LeafTree::new();
        let a = tree.insert(None, LocalLeaf::default());
        tree.remove(a);

        assert_eq!(tree.world_matrix(a), None);
        assert_eq!(tree.world_bounds(a), None);
        assert_eq!(tree.attrs(a), None);
        tree.set_position(a, 1.0, 1.0);
        tree.check_update(a);
        tree.update_all_world_matrix(a);
        assert!(tree.children_of(a).is_empty());
    }
}
