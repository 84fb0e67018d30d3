// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thicket Pick: spatial hit-testing queries over a Thicket scene tree.
//!
//! Given a world-space point (and an optional tolerance radius), a
//! [`Picker`] answers "which leaf is under this point?" against a
//! [`thicket_scene::LeafTree`]. A query has two phases:
//!
//! 1. **Broad phase** — a reverse-paint-order depth-first traversal collects
//!    candidates whose world AABB contains the (inflated) point, honoring
//!    visibility, mask-only containers, and unbounded containers.
//! 2. **Narrow phase** — each surviving candidate is tested against its
//!    precise local geometry (its `BezPath` hit shape, or its bounds rect)
//!    through the inverse of its world matrix.
//!
//! Because siblings are visited in reverse paint order, candidates arrive
//! topmost-first and the returned target is the frontmost hit. The result
//! carries the target's ancestor path (optionally truncated at
//! hit-propagation boundaries) and, on request, the see-through path of
//! every leaf under the point.
//!
//! Queries force a layout refresh of the search root's subtree first, so
//! results always reflect pending local mutations.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod picker;
mod precise;
mod types;

pub use picker::Picker;
pub use types::{PickOptions, PickResult, RadiusPoint, hit_radius_point};
