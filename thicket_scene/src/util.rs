// Copyright 2026 the Thicket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matrix composition and anchored-transform helpers.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Rect, Vec2};

use crate::types::LocalLeaf;

/// Compose the local matrix from a leaf's decomposed transform components.
///
/// Order is translate, rotate, skew, scale; skew angles are in degrees and
/// applied as shear factors (their tangents).
pub(crate) fn compose_local(local: &LocalLeaf) -> Affine {
    let mut m = Affine::translate(Vec2::new(local.x, local.y));
    if local.rotation != 0.0 {
        m *= Affine::rotate(local.rotation.to_radians());
    }
    if local.skew_x != 0.0 || local.skew_y != 0.0 {
        m *= Affine::skew(
            local.skew_x.to_radians().tan(),
            local.skew_y.to_radians().tan(),
        );
    }
    if local.scale_x != 1.0 || local.scale_y != 1.0 {
        m *= Affine::scale_non_uniform(local.scale_x, local.scale_y);
    }
    m
}

/// Scale `m` about `origin`, with both the origin and the scale expressed in
/// the matrix's outer (parent) coordinate space. The point at `origin` is a
/// fixed point of the result.
pub(crate) fn scale_about(m: Affine, origin: Point, scale_x: f64, scale_y: f64) -> Affine {
    Affine::translate(origin.to_vec2())
        * Affine::scale_non_uniform(scale_x, scale_y)
        * Affine::translate(-origin.to_vec2())
        * m
}

/// Rotate `m` by `angle` degrees about `origin` in the outer coordinate space.
pub(crate) fn rotate_about(m: Affine, origin: Point, angle: f64) -> Affine {
    Affine::translate(origin.to_vec2())
        * Affine::rotate(angle.to_radians())
        * Affine::translate(-origin.to_vec2())
        * m
}

/// Shear `m` by the given angles (degrees) about `origin` in the outer coordinate space.
pub(crate) fn skew_about(m: Affine, origin: Point, skew_x: f64, skew_y: f64) -> Affine {
    Affine::translate(origin.to_vec2())
        * Affine::skew(skew_x.to_radians().tan(), skew_y.to_radians().tan())
        * Affine::translate(-origin.to_vec2())
        * m
}

/// Normalize a rotation in degrees into the canonical `(-180, 180]` range.
pub(crate) fn format_rotation(rotation: f64) -> f64 {
    let mut r = rotation % 360.0;
    if r > 180.0 {
        r -= 360.0;
    } else if r <= -180.0 {
        r += 360.0;
    }
    r
}

/// Transform an axis-aligned `Rect` by an `Affine` and return a conservative
/// axis-aligned bounding box in the outer space.
pub(crate) fn transform_rect_bbox(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}
