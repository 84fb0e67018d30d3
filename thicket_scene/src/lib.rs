// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Scene: a kurbo-native retained scene tree with transform propagation.
//!
//! This crate is the structural half of the Thicket core. It keeps a tree of
//! drawable leaves — each with a decomposed local transform, opacity, content
//! bounds, and attribute flags — and keeps every leaf's derived world state
//! (world matrix, world AABB, world opacity, changed-since-render flag)
//! consistent with its ancestor chain.
//!
//! Derived state always flows root-to-leaf: a leaf's world matrix is its
//! parent's world matrix composed with its own local matrix, never the other
//! way around. Callers mutate local fields (or restructure the tree) and the
//! tree re-derives world state lazily via [`LeafTree::check_update`] or
//! explicitly via the `update_all_*` entry points.
//!
//! ## API overview
//!
//! - [`LeafTree`]: arena of leaves addressed by generational [`LeafId`]s.
//! - [`LocalLeaf`]: per-leaf local state (decomposed transform, opacity,
//!   bounds, [`LeafAttrs`], optional precise hit shape).
//! - [`LeafList`]: insertion-ordered leaf set with O(1) membership, used for
//!   hit paths and picker exclusion sets.
//!
//! Key operations:
//! - Propagation: [`LeafTree::update_all_world_matrix`],
//!   [`LeafTree::update_all_world_opacity`], [`LeafTree::update_all_change`],
//!   [`LeafTree::check_update`].
//! - Hit eligibility: [`LeafTree::world_hittable`] (the full ancestor-chain
//!   `HITTABLE`/`HIT_CHILDREN` test used by picking).
//! - Anchored transform ops: [`LeafTree::move_local`]/[`LeafTree::move_world`],
//!   [`LeafTree::zoom_of_local`]/[`LeafTree::zoom_of_world`],
//!   [`LeafTree::rotate_of_local`]/[`LeafTree::rotate_of_world`],
//!   [`LeafTree::skew_of_local`]/[`LeafTree::skew_of_world`] — each keeps the
//!   anchor point fixed in the parent's space while accumulating into the
//!   stored decomposed components.
//! - Restructuring: [`LeafTree::reparent`] (keeps local transform),
//!   [`LeafTree::drop_into`] (keeps world position), [`LeafTree::has_parent`].
//!
//! ## Single-writer contract
//!
//! All operations are synchronous and run to completion; the tree performs no
//! locking and assumes exclusive access during any propagation or traversal
//! (encoded in the `&mut self` receivers). Parent links must stay acyclic;
//! cycles are not detected and would not terminate.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod list;
mod transform;
mod tree;
mod types;
mod util;

pub use list::LeafList;
pub use tree::LeafTree;
pub use types::{LeafAttrs, LeafId, LocalLeaf};
