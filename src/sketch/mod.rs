//! 2D region helpers on top of `geo` and `geo-buf`.
//!
//! Everything here works on `MultiPolygon<Real>` so results of boolean
//! operations can be chained without unwrapping. Helpers that can produce an
//! empty region where the caller needs a non-empty one return
//! [`DensityError::EmptyGeometry`].

use crate::errors::{DensityError, DensityResult};
use crate::float_types::Real;
use geo::{Area, BooleanOps, LineString, MultiPolygon, Orient, Polygon, Simplify, orient::Direction};

pub mod offset;
pub mod shapes;

pub use offset::{offset, open};
pub use shapes::{DISC_SEGMENTS, disc, discs};

/// Wraps a polygon.
pub fn multi(polygon: Polygon<Real>) -> MultiPolygon<Real> {
    MultiPolygon::new(vec![polygon])
}

/// Normalizes `shape` through a union with nothing: overlapping parts merge,
/// self-intersections are resolved and zero-width spikes disappear.
pub fn correct(shape: &MultiPolygon<Real>) -> DensityResult<MultiPolygon<Real>> {
    let cleaned = shape.union(&MultiPolygon::new(vec![]));
    if cleaned.0.is_empty() {
        return Err(DensityError::EmptyGeometry { operation: "correct" });
    }
    Ok(cleaned)
}

/// Union of every part, merged pairwise so each boolean operation sees inputs
/// of similar size.
pub fn union_all<I>(parts: I) -> MultiPolygon<Real>
where
    I: IntoIterator<Item = MultiPolygon<Real>>,
{
    let mut level: Vec<MultiPolygon<Real>> =
        parts.into_iter().filter(|p| !p.0.is_empty()).collect();
    if level.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => a.union(b),
                [a] => a.clone(),
                _ => MultiPolygon::new(vec![]),
            })
            .collect();
    }
    level.swap_remove(0)
}

pub fn intersection(a: &MultiPolygon<Real>, b: &MultiPolygon<Real>) -> MultiPolygon<Real> {
    if a.0.is_empty() || b.0.is_empty() {
        return MultiPolygon::new(vec![]);
    }
    a.intersection(b)
}

pub fn difference(a: &MultiPolygon<Real>, b: &MultiPolygon<Real>) -> MultiPolygon<Real> {
    if a.0.is_empty() || b.0.is_empty() {
        return a.clone();
    }
    a.difference(b)
}

/// Keeps only the holes whose area exceeds `area`.
pub fn remove_holes(polygon: &Polygon<Real>, area: Real) -> Polygon<Real> {
    let holes = polygon
        .interiors()
        .iter()
        .filter(|ring| ring_area(ring) > area)
        .cloned()
        .collect();
    Polygon::new(polygon.exterior().clone(), holes)
}

/// [`remove_holes`] for every part.
pub fn remove_holes_multi(shape: &MultiPolygon<Real>, area: Real) -> MultiPolygon<Real> {
    shape.iter().map(|p| remove_holes(p, area)).collect()
}

/// Drops parts whose area does not exceed `area`.
pub fn remove_small(shape: &MultiPolygon<Real>, area: Real) -> MultiPolygon<Real> {
    shape
        .iter()
        .filter(|p| p.unsigned_area() > area)
        .cloned()
        .collect()
}

/// The part with the largest area (the first one on ties).
pub fn largest(shape: &MultiPolygon<Real>) -> Option<Polygon<Real>> {
    shape
        .iter()
        .fold(None, |best: Option<(&Polygon<Real>, Real)>, p| {
            let a = p.unsigned_area();
            match best {
                Some((_, b)) if b >= a => best,
                _ => Some((p, a)),
            }
        })
        .map(|(p, _)| p.clone())
}

/// Every part without its holes.
pub fn exterior(shape: &MultiPolygon<Real>) -> MultiPolygon<Real> {
    shape
        .iter()
        .map(|p| Polygon::new(p.exterior().clone(), vec![]))
        .collect()
}

/// Ramer–Douglas–Peucker simplification; parts that collapse are dropped.
pub fn simplify(shape: &MultiPolygon<Real>, tolerance: Real) -> MultiPolygon<Real> {
    if tolerance <= 0.0 {
        return shape.clone();
    }
    shape
        .simplify(&tolerance)
        .0
        .into_iter()
        .filter(|p| p.exterior().0.len() >= 4)
        .map(|p| {
            let holes = p
                .interiors()
                .iter()
                .filter(|r| r.0.len() >= 4)
                .cloned()
                .collect();
            Polygon::new(p.exterior().clone(), holes)
        })
        .collect()
}

/// Counter-clockwise exterior, clockwise holes.
pub fn orient(polygon: &Polygon<Real>) -> Polygon<Real> {
    polygon.orient(Direction::Default)
}

/// Total boundary length, holes included.
pub fn perimeter(polygon: &Polygon<Real>) -> Real {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_length)
        .sum()
}

pub(crate) fn ring_length(ring: &LineString<Real>) -> Real {
    ring.lines().map(|l| l.dx().hypot(l.dy())).sum()
}

fn ring_area(ring: &LineString<Real>) -> Real {
    Polygon::new(ring.clone(), vec![]).unsigned_area()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Winding, polygon};

    fn square(x: Real, y: Real, side: Real) -> Polygon<Real> {
        polygon![
            (x: x, y: y), (x: x + side, y: y), (x: x + side, y: y + side), (x: x, y: y + side)
        ]
    }

    fn framed() -> Polygon<Real> {
        polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [
                [(x: 1.0, y: 1.0), (x: 1.5, y: 1.0), (x: 1.5, y: 1.5), (x: 1.0, y: 1.5)],
                [(x: 4.0, y: 4.0), (x: 7.0, y: 4.0), (x: 7.0, y: 7.0), (x: 4.0, y: 7.0)],
            ],
        )
    }

    #[test]
    fn union_merges_overlaps() {
        let merged = union_all([
            multi(square(0.0, 0.0, 2.0)),
            multi(square(1.0, 0.0, 2.0)),
            multi(square(10.0, 0.0, 1.0)),
        ]);
        assert_eq!(merged.0.len(), 2);
        assert!((merged.unsigned_area() - 7.0).abs() < 1e-9);
        assert!(union_all(Vec::new()).0.is_empty());
    }

    #[test]
    fn correct_rejects_empty_regions() {
        assert_eq!(
            correct(&MultiPolygon::new(vec![])),
            Err(DensityError::EmptyGeometry { operation: "correct" })
        );
        let fixed = correct(&multi(square(0.0, 0.0, 1.0))).unwrap();
        assert!((fixed.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn difference_and_intersection() {
        let a = multi(square(0.0, 0.0, 2.0));
        let b = multi(square(1.0, 0.0, 2.0));
        assert!((intersection(&a, &b).unsigned_area() - 2.0).abs() < 1e-9);
        assert!((difference(&a, &b).unsigned_area() - 2.0).abs() < 1e-9);
        assert_eq!(difference(&a, &MultiPolygon::new(vec![])), a);
    }

    #[test]
    fn hole_and_part_filters() {
        let p = framed();
        assert_eq!(remove_holes(&p, 1.0).interiors().len(), 1);
        assert_eq!(exterior(&multi(p.clone())).0[0].interiors().len(), 0);

        let parts = MultiPolygon::new(vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 3.0)]);
        assert_eq!(remove_small(&parts, 2.0).0.len(), 1);
        assert_eq!(largest(&parts), Some(square(5.0, 5.0, 3.0)));
        assert_eq!(largest(&MultiPolygon::new(vec![])), None);
    }

    #[test]
    fn simplify_drops_collinear_vertices() {
        let p = polygon![
            (x: 0.0, y: 0.0), (x: 5.0, y: 0.01), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)
        ];
        let out = simplify(&multi(p), 0.1);
        assert_eq!(out.0[0].exterior().0.len(), 5);
    }

    #[test]
    fn orientation_and_perimeter() {
        let p = orient(&framed());
        assert!(p.exterior().is_ccw());
        assert!(p.interiors().iter().all(|r| r.is_cw()));
        assert!((perimeter(&framed()) - (40.0 + 2.0 + 12.0)).abs() < 1e-12);
    }
}
