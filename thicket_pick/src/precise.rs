// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Narrow-phase precise hit testing in leaf-local coordinates.
//!
//! The broad phase works on loose world AABBs; this module answers whether
//! the query point actually strikes the leaf's rendered geometry. The point
//! is mapped into the leaf's local space through the inverse world matrix and
//! tested against the leaf's hit shape (fill-only, via
//! [`kurbo::Shape::contains`]) or, absent one, its local bounds.

use kurbo::{Point, Shape};
use thicket_scene::{LeafAttrs, LeafId, LeafTree};

use crate::types::RadiusPoint;

/// Precise test of a world-space radius point against a leaf's rendered
/// geometry. The leaf's world matrix must be current.
///
/// Leaves flagged [`LeafAttrs::HIT_BOUNDS`] opt out of precise geometry and
/// always pass once visited.
pub(crate) fn hit_world(tree: &LeafTree, id: LeafId, point: &RadiusPoint) -> bool {
    let Some(local) = tree.local(id) else {
        return false;
    };
    if local.attrs.contains(LeafAttrs::HIT_BOUNDS) {
        return true;
    }
    let Some(world) = tree.world_matrix(id) else {
        return false;
    };
    let inv = world.inverse();
    let local_pt = inv * Point::new(point.x, point.y);
    let tol = local_tolerance(&inv, point, local_pt);

    match &local.hit_shape {
        Some(path) => {
            // Fill-only: reject on the inflated bounding box, accept on
            // containment, and treat a bbox-near miss as a tolerant hit.
            let bounds = path.bounding_box();
            let inflated = if tol > 0.0 {
                bounds.inflate(tol, tol)
            } else {
                bounds
            };
            if !inflated.contains(local_pt) {
                return false;
            }
            path.contains(local_pt) || tol > 0.0
        }
        None => {
            let bounds = if tol > 0.0 {
                local.bounds.inflate(tol, tol)
            } else {
                local.bounds
            };
            bounds.contains(local_pt)
        }
    }
}

/// Map the world-space tolerance radii into local units, conservatively
/// taking the larger of the two mapped axis offsets.
fn local_tolerance(inv: &kurbo::Affine, point: &RadiusPoint, local_pt: Point) -> f64 {
    if point.radius_x == 0.0 && point.radius_y == 0.0 {
        return 0.0;
    }
    let dx = *inv * Point::new(point.x + point.radius_x, point.y) - local_pt;
    let dy = *inv * Point::new(point.x, point.y + point.radius_y) - local_pt;
    dx.hypot().max(dy.hypot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{BezPath, Rect};
    use thicket_scene::LocalLeaf;

    fn triangle() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        path
    }

    #[test]
    fn bounds_fallback_respects_transform() {
        let mut tree = LeafTree::new();
        let leaf = tree.insert(
            None,
            LocalLeaf {
                x: 100.0,
                scale_x: 2.0,
                scale_y: 2.0,
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                ..LocalLeaf::default()
            },
        );
        tree.check_update(leaf);

        assert!(hit_world(&tree, leaf, &RadiusPoint::new(110.0, 10.0, 0.0)));
        assert!(!hit_world(&tree, leaf, &RadiusPoint::new(125.0, 10.0, 0.0)));
        // Tolerance is mapped through the inverse scale: 6 world units reach
        // 3 local units past the right edge at 2x scale.
        assert!(hit_world(&tree, leaf, &RadiusPoint::new(125.0, 10.0, 6.0)));
    }

    #[test]
    fn shape_hit_is_tighter_than_bbox() {
        let mut tree = LeafTree::new();
        let leaf = tree.insert(
            None,
            LocalLeaf {
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                hit_shape: Some(triangle()),
                ..LocalLeaf::default()
            },
        );
        tree.check_update(leaf);

        assert!(hit_world(&tree, leaf, &RadiusPoint::new(2.0, 2.0, 0.0)));
        // Inside the bbox, outside the triangle.
        assert!(!hit_world(&tree, leaf, &RadiusPoint::new(9.0, 9.0, 0.0)));
    }

    #[test]
    fn hit_bounds_leaf_always_passes() {
        let mut tree = LeafTree::new();
        let leaf = tree.insert(
            None,
            LocalLeaf {
                bounds: Rect::new(0.0, 0.0, 1.0, 1.0),
                attrs: LeafAttrs::default() | LeafAttrs::HIT_BOUNDS,
                ..LocalLeaf::default()
            },
        );
        tree.check_update(leaf);
        assert!(hit_world(&tree, leaf, &RadiusPoint::new(500.0, 500.0, 0.0)));
    }
}
