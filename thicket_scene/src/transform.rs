// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local/world mutation primitives and the ancestry hittability query.
//!
//! The anchored ops (`zoom_of_*`, `rotate_of_*`, `skew_of_*`) all share one
//! shape: snapshot the composed local matrix, apply the anchored operation to
//! a scratch copy in the parent's coordinate space, diff the translation
//! component against the snapshot, apply that delta through
//! [`LeafTree::move_local`], and accumulate the operation into the stored
//! decomposed field. The decomposed components stay consistent with the
//! composed matrix without ever decomposing a matrix.

use kurbo::Point;

use crate::tree::LeafTree;
use crate::types::{LeafAttrs, LeafId};
use crate::util::{compose_local, format_rotation, rotate_about, scale_about, skew_about};

impl LeafTree {
    /// Whether `id` is effectively hit-testable: the leaf itself is
    /// [`LeafAttrs::HITTABLE`] and every ancestor is both `HITTABLE` and
    /// [`LeafAttrs::HIT_CHILDREN`]. Short-circuits at the first violating
    /// ancestor; a parentless leaf is hittable iff its own flag is set.
    pub fn world_hittable(&self, id: LeafId) -> bool {
        let Some(attrs) = self.attrs(id) else {
            return false;
        };
        if !attrs.contains(LeafAttrs::HITTABLE) {
            return false;
        }
        let mut parent = self.parent_of(id);
        while let Some(p) = parent {
            let attrs = self.attrs(p).expect("dangling LeafId");
            if !attrs.contains(LeafAttrs::HITTABLE) || !attrs.contains(LeafAttrs::HIT_CHILDREN) {
                return false;
            }
            parent = self.parent_of(p);
        }
        true
    }

    /// True iff `candidate` appears in `id`'s parent chain, not counting `id` itself.
    pub fn has_parent(&self, id: LeafId, candidate: LeafId) -> bool {
        let mut parent = self.parent_of(id);
        while let Some(p) = parent {
            if p == candidate {
                return true;
            }
            parent = self.parent_of(p);
        }
        false
    }

    /// Translate by `(dx, dy)` in the parent's coordinate space.
    pub fn move_local(&mut self, id: LeafId, dx: f64, dy: f64) {
        if !self.is_alive(id) {
            return;
        }
        let local = self.local_mut(id);
        local.x += dx;
        local.y += dy;
        self.mark_matrix_dirty(id);
    }

    /// Translate by a world-space delta `(dx, dy)`.
    ///
    /// The delta is converted into the parent's coordinate space through the
    /// inverse of the parent's world matrix, as a direction (translation-only
    /// semantics), then applied via [`LeafTree::move_local`].
    pub fn move_world(&mut self, id: LeafId, dx: f64, dy: f64) {
        if !self.is_alive(id) {
            return;
        }
        let (dx, dy) = match self.parent_of(id) {
            Some(parent) => {
                self.check_update(parent);
                let inv = self
                    .world_matrix(parent)
                    .expect("dangling LeafId")
                    .inverse();
                // Direction vector: drop the translation part of the inverse.
                let d = inv * Point::new(dx, dy) - inv * Point::ORIGIN;
                (d.x, d.y)
            }
            None => (dx, dy),
        };
        self.move_local(id, dx, dy);
    }

    /// Scale about `origin`, expressed in the parent's coordinate space.
    ///
    /// The point at `origin` stays fixed in the parent's space; the scale
    /// factors accumulate multiplicatively into `scale_x`/`scale_y`.
    pub fn zoom_of_local(&mut self, id: LeafId, origin: Point, scale_x: f64, scale_y: f64) {
        let Some(local) = self.local(id) else {
            return;
        };
        let m = compose_local(local);
        let scratch = scale_about(m, origin, scale_x, scale_y);
        let d = scratch.translation() - m.translation();
        self.move_local(id, d.x, d.y);
        let local = self.local_mut(id);
        local.scale_x *= scale_x;
        local.scale_y *= scale_y;
        self.mark_matrix_dirty(id);
    }

    /// Scale about a world-space `origin`. A `None` `scale_y` means uniform scale.
    pub fn zoom_of_world(&mut self, id: LeafId, origin: Point, scale_x: f64, scale_y: Option<f64>) {
        let Some(origin) = self.to_parent_space(id, origin) else {
            return;
        };
        self.zoom_of_local(id, origin, scale_x, scale_y.unwrap_or(scale_x));
    }

    /// Rotate by `angle` degrees about `origin`, expressed in the parent's
    /// coordinate space. The accumulated rotation is normalized into `(-180, 180]`.
    pub fn rotate_of_local(&mut self, id: LeafId, origin: Point, angle: f64) {
        let Some(local) = self.local(id) else {
            return;
        };
        let m = compose_local(local);
        let scratch = rotate_about(m, origin, angle);
        let d = scratch.translation() - m.translation();
        self.move_local(id, d.x, d.y);
        let local = self.local_mut(id);
        local.rotation = format_rotation(local.rotation + angle);
        self.mark_matrix_dirty(id);
    }

    /// Rotate by `angle` degrees about a world-space `origin`.
    pub fn rotate_of_world(&mut self, id: LeafId, origin: Point, angle: f64) {
        let Some(origin) = self.to_parent_space(id, origin) else {
            return;
        };
        self.rotate_of_local(id, origin, angle);
    }

    /// Shear by the given angles (degrees) about `origin`, expressed in the
    /// parent's coordinate space. The angles accumulate into `skew_x`/`skew_y`.
    pub fn skew_of_local(&mut self, id: LeafId, origin: Point, skew_x: f64, skew_y: f64) {
        let Some(local) = self.local(id) else {
            return;
        };
        let m = compose_local(local);
        let scratch = skew_about(m, origin, skew_x, skew_y);
        let d = scratch.translation() - m.translation();
        self.move_local(id, d.x, d.y);
        let local = self.local_mut(id);
        local.skew_x += skew_x;
        local.skew_y += skew_y;
        self.mark_matrix_dirty(id);
    }

    /// Shear about a world-space `origin`.
    pub fn skew_of_world(&mut self, id: LeafId, origin: Point, skew_x: f64, skew_y: f64) {
        let Some(origin) = self.to_parent_space(id, origin) else {
            return;
        };
        self.skew_of_local(id, origin, skew_x, skew_y);
    }

    /// Reparent `id` as the last child of `new_parent`, preserving its
    /// world-space position.
    ///
    /// The leaf's current world position is captured (after forcing a layout
    /// refresh; stale cached matrices would corrupt it), the leaf is attached
    /// to `new_parent`, and the captured position is converted into the new
    /// parent's inner space and written back.
    pub fn drop_into(&mut self, id: LeafId, new_parent: LeafId) {
        if !self.is_alive(id) || !self.is_alive(new_parent) {
            return;
        }
        self.check_update(id);
        let (x, y) = {
            let local = self.local(id).expect("dangling LeafId");
            (local.x, local.y)
        };
        let position = match self.parent_of(id) {
            Some(parent) => self.world_matrix(parent).expect("dangling LeafId") * Point::new(x, y),
            None => Point::new(x, y),
        };

        self.add(new_parent, id);

        self.check_update(new_parent);
        let inner = self
            .world_matrix(new_parent)
            .expect("dangling LeafId")
            .inverse()
            * position;
        let local = self.local_mut(id);
        local.x = inner.x;
        local.y = inner.y;
        self.mark_matrix_dirty(id);
    }

    /// Convert a point in `id`'s inner (local content) space to world space.
    ///
    /// Forces a layout refresh first.
    pub fn local_to_world(&mut self, id: LeafId, point: Point) -> Option<Point> {
        if !self.is_alive(id) {
            return None;
        }
        self.check_update(id);
        self.world_matrix(id).map(|m| m * point)
    }

    /// Convert a world-space point into `id`'s inner (local content) space.
    ///
    /// Forces a layout refresh first.
    pub fn world_to_inner(&mut self, id: LeafId, point: Point) -> Option<Point> {
        if !self.is_alive(id) {
            return None;
        }
        self.check_update(id);
        self.world_matrix(id).map(|m| m.inverse() * point)
    }

    /// Convert a world-space point into `id`'s parent coordinate space, the
    /// space the anchored `*_of_local` ops take their origin in.
    fn to_parent_space(&mut self, id: LeafId, world: Point) -> Option<Point> {
        if !self.is_alive(id) {
            return None;
        }
        self.check_update(id);
        Some(match self.parent_of(id) {
            Some(parent) => {
                self.world_matrix(parent).expect("dangling LeafId").inverse() * world
            }
            None => world,
        })
    }
}
