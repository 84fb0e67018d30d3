// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query and result types for point picking.

use alloc::vec::Vec;

use kurbo::Rect;
use thicket_scene::{LeafId, LeafList};

/// A query point with a circular tolerance, in world coordinates.
///
/// Zero radii mean an exact point test; positive radii inflate every
/// broad-phase bounds test by that amount per axis.
#[derive(Clone, Copy, Debug)]
pub struct RadiusPoint {
    /// World-space x.
    pub x: f64,
    /// World-space y.
    pub y: f64,
    /// Tolerance along x.
    pub radius_x: f64,
    /// Tolerance along y.
    pub radius_y: f64,
}

impl RadiusPoint {
    /// A point with uniform tolerance.
    pub const fn new(x: f64, y: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            radius_x: radius,
            radius_y: radius,
        }
    }

    /// The same point with zero tolerance, for focused re-tests.
    pub const fn exact(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            radius_x: 0.0,
            radius_y: 0.0,
        }
    }
}

/// Broad-phase test: does the tolerance circle around the point touch `bounds`?
///
/// Implemented as a point-in-inflated-rect test, matching the loose AABB the
/// tree caches for world bounds.
pub fn hit_radius_point(bounds: Rect, point: &RadiusPoint) -> bool {
    let b = if point.radius_x > 0.0 || point.radius_y > 0.0 {
        bounds.inflate(point.radius_x, point.radius_y)
    } else {
        bounds
    };
    b.contains(kurbo::Point::new(point.x, point.y))
}

/// Configuration for a single [`Picker::get_by_point`](crate::Picker::get_by_point) call.
#[derive(Clone, Debug, Default)]
pub struct PickOptions<'a> {
    /// Also collect the "through path": every distinct hit leaf beneath the
    /// topmost one, ordered topmost first.
    pub through: bool,
    /// Skip hittable-path truncation and return the raw ancestor path.
    pub ignore_hittable: bool,
    /// Search root; defaults to the picker's bound target.
    pub target: Option<LeafId>,
    /// Leaves to skip entirely during the query.
    pub exclude: Option<&'a LeafList>,
    /// Pre-computed candidate list; skips traversal when supplied.
    pub find_list: Option<Vec<LeafId>>,
}

impl<'a> PickOptions<'a> {
    /// New options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the through path.
    pub fn through(mut self) -> Self {
        self.through = true;
        self
    }

    /// Return the raw ancestor path instead of the hittable-truncated one.
    pub fn ignore_hittable(mut self) -> Self {
        self.ignore_hittable = true;
        self
    }

    /// Override the search root for this query.
    pub fn target(mut self, target: LeafId) -> Self {
        self.target = Some(target);
        self
    }

    /// Skip every leaf in `exclude`.
    pub fn exclude(mut self, exclude: &'a LeafList) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// Supply candidates directly, skipping traversal.
    pub fn find_list(mut self, list: Vec<LeafId>) -> Self {
        self.find_list = Some(list);
        self
    }
}

/// Result of a pick query.
///
/// Absence of a hit is not an error: `target` is `None` and `path` is empty.
#[derive(Clone, Debug)]
pub struct PickResult {
    /// The resolved leaf, if any.
    pub target: Option<LeafId>,
    /// Ancestor path from the resolved leaf up to and including the search
    /// root, deepest entry first. Truncated at the first ancestor blocking
    /// hit propagation unless the query set
    /// [`PickOptions::ignore_hittable`].
    pub path: LeafList,
    /// In `through` mode, every hit leaf from topmost to bottommost with
    /// their diverging path segments; equals `path` when there were no
    /// candidates. `None` unless requested.
    pub through_path: Option<LeafList>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_point_inflates_bounds() {
        let b = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(hit_radius_point(b, &RadiusPoint::new(15.0, 15.0, 0.0)));
        assert!(!hit_radius_point(b, &RadiusPoint::new(25.0, 15.0, 0.0)));
        assert!(hit_radius_point(b, &RadiusPoint::new(25.0, 15.0, 6.0)));
        // Radii are per-axis.
        let skinny = RadiusPoint {
            x: 25.0,
            y: 15.0,
            radius_x: 0.0,
            radius_y: 6.0,
        };
        assert!(!hit_radius_point(b, &skinny));
    }

    #[test]
    fn exact_drops_tolerance() {
        let p = RadiusPoint::new(3.0, 4.0, 9.0);
        let e = p.exact();
        assert_eq!((e.x, e.y), (3.0, 4.0));
        assert_eq!((e.radius_x, e.radius_y), (0.0, 0.0));
    }
}
