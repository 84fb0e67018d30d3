// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: leaf identifiers, attribute flags, and local state.

use kurbo::{BezPath, Rect};

/// Identifier for a leaf in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LeafId(pub(crate) u32, pub(crate) u32);

impl LeafId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Attribute flags controlling visibility, hit testing, and structural role.
    ///
    /// Hit testing distinguishes a leaf's own eligibility ([`Self::HITTABLE`])
    /// from whether queries may propagate into its children
    /// ([`Self::HIT_CHILDREN`]). Traversal itself is never gated by
    /// `HIT_CHILDREN`; it only truncates the reported hit path.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LeafAttrs: u16 {
        /// Leaf is visible. Invisible leaves (and their subtrees) are skipped by picking.
        const VISIBLE = 0b0_0000_0001;
        /// Leaf is itself eligible to be hit.
        const HITTABLE = 0b0_0000_0010;
        /// Hit paths may extend past this leaf into its children.
        const HIT_CHILDREN = 0b0_0000_0100;
        /// Treat the whole world AABB as always hit when visited, skipping the
        /// broad-phase point test. Used for leaves with enlarged interactive areas.
        const HIT_BOUNDS = 0b0_0000_1000;
        /// Leaf is a mask; it only participates when an ancestor requests
        /// mask-only traversal via [`Self::ONLY_HIT_MASK`].
        const MASK = 0b0_0001_0000;
        /// When set on a branch, only mask children participate in picking.
        const ONLY_HIT_MASK = 0b0_0010_0000;
        /// When set on a branch, traversal always descends into it regardless
        /// of its world bounds, e.g. an unbounded container.
        const IGNORE_HIT_WORLD = 0b0_0100_0000;
        /// Leaf is a branch (container with children).
        const IS_BRANCH = 0b0_1000_0000;
        /// Branch that is itself pickable as a unit, e.g. a clipped frame.
        const IS_BRANCH_LEAF = 0b1_0000_0000;
    }
}

impl Default for LeafAttrs {
    fn default() -> Self {
        Self::VISIBLE | Self::HITTABLE | Self::HIT_CHILDREN
    }
}

/// Local (parent-relative) state of a leaf.
///
/// The transform is stored decomposed. The composed local matrix is
/// `translate(x, y) * rotate(rotation) * skew(skew_x, skew_y) * scale(scale_x, scale_y)`
/// and is cached by the tree; anchored transform ops keep the decomposed
/// fields consistent with the composed matrix.
#[derive(Clone, Debug)]
pub struct LocalLeaf {
    /// Translation along x, in the parent's coordinate space.
    pub x: f64,
    /// Translation along y, in the parent's coordinate space.
    pub y: f64,
    /// Scale factor along the local x axis.
    pub scale_x: f64,
    /// Scale factor along the local y axis.
    pub scale_y: f64,
    /// Rotation in degrees, kept normalized into `(-180, 180]`.
    pub rotation: f64,
    /// Shear angle around x, in degrees.
    pub skew_x: f64,
    /// Shear angle around y, in degrees.
    pub skew_y: f64,
    /// Local opacity in `[0, 1]`; world opacity is the product along the ancestor chain.
    pub opacity: f64,
    /// Local content bounds. The world AABB is this rect pushed through the world matrix.
    pub bounds: Rect,
    /// Attribute flags.
    pub attrs: LeafAttrs,
    /// Precise rendered geometry in local coordinates, used by narrow-phase
    /// hit testing. `None` falls back to `bounds`.
    pub hit_shape: Option<BezPath>,
}

impl Default for LocalLeaf {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            opacity: 1.0,
            bounds: Rect::ZERO,
            attrs: LeafAttrs::default(),
            hit_shape: None,
        }
    }
}
