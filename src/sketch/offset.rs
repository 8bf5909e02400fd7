//! **Mathematical Foundations for Polygon Offsetting**
//!
//! For a region P and a disk D of radius r the offset is the Minkowski sum
//! ```text
//! P ⊕ D = {p + d | p ∈ P, d ∈ D}
//! ```
//! - **Dilation (r > 0)**: every boundary point moves outward by r; convex
//!   vertices become circular arcs.
//! - **Erosion (r < 0)**: the complement is dilated instead; parts thinner than
//!   2|r| vanish.
//!
//! ### **Morphological opening**
//! Eroding and then dilating by the same r removes every feature narrower than
//! 2r (slivers, thin necks, spikes) while leaving wide regions in place:
//! ```text
//! open(P, r) = (P ⊖ D) ⊕ D
//! ```
//!
//! Offsetting is delegated to `geo-buf`, which resolves the self-intersections
//! created at concave vertices and returns valid multipolygons.

use crate::float_types::Real;
use geo::MultiPolygon;
use geo_buf::buffer_multi_polygon_rounded;

/// Grows (`distance > 0`) or shrinks (`distance < 0`) `shape` with rounded
/// corners.
pub fn offset(shape: &MultiPolygon<Real>, distance: Real) -> MultiPolygon<Real> {
    if shape.0.is_empty() || distance == 0.0 {
        return shape.clone();
    }
    let grown = buffer_multi_polygon_rounded(shape, distance);
    drop_degenerate(grown)
}

/// Erodes by `distance`, then dilates back.
pub fn open(shape: &MultiPolygon<Real>, distance: Real) -> MultiPolygon<Real> {
    let distance = distance.abs();
    let eroded = offset(shape, -distance);
    if eroded.0.is_empty() {
        return eroded;
    }
    offset(&eroded, distance)
}

/// Erosion can leave rings with fewer than 4 coordinates behind.
fn drop_degenerate(shape: MultiPolygon<Real>) -> MultiPolygon<Real> {
    MultiPolygon::new(
        shape
            .0
            .into_iter()
            .filter(|p| p.exterior().0.len() >= 4)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, polygon};

    fn square(side: Real) -> MultiPolygon<Real> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: side, y: 0.0), (x: side, y: side), (x: 0.0, y: side)
        ]])
    }

    #[test]
    fn dilation_adds_rounded_margin() {
        let grown = offset(&square(10.0), 1.0);
        let area = grown.unsigned_area();
        // 100 + 4·10 + π
        assert!(area > 140.0 && area < 143.2, "area {}", area);
    }

    #[test]
    fn erosion_shrinks_and_can_vanish() {
        let shrunk = offset(&square(10.0), -1.0);
        assert!((shrunk.unsigned_area() - 64.0).abs() < 1e-6);
        assert!(offset(&square(1.0), -1.0).0.is_empty());
    }

    #[test]
    fn opening_keeps_wide_regions() {
        let opened = open(&square(10.0), 0.5);
        assert!((opened.unsigned_area() - 100.0).abs() < 0.5);
        assert!(open(&square(0.5), 0.5).0.is_empty());
    }
}
