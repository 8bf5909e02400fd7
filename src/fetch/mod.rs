//! Interior-nearest ("fetch") distances.
//!
//! For every boundary vertex of a polygon, the distance to the closest other
//! boundary vertex seen across the interior: only vertices inside a cone around
//! the inward normal count. In a channel this is the channel width, which
//! makes it a natural source of density seeds (see
//! [`DensityField::add_fetch`](crate::DensityField::add_fetch)).
//!
//! All per-vertex outputs follow the rings after orientation (exterior
//! counter-clockwise, then every hole clockwise) with closing duplicates
//! removed.

use crate::errors::{DensityError, DensityResult};
use crate::float_types::Real;
use crate::spatial::PointIndex;
use geo::Polygon;
use nalgebra::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchOptions {
    /// Search radius; also the value reported when nothing qualifies.
    pub max_distance: Real,
    /// Candidates at or below this distance are ignored.
    pub min_distance: Real,
    /// Full opening of the search cone, in degrees.
    pub angle: Real,
    /// Number of vertices searched at once.
    pub chunk_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { max_distance: 1.0, min_distance: 0.0, angle: 90.0, chunk_size: 100 }
    }
}

/// Ring vertices with the left normal of `next − prev` pointing into the
/// polygon, closing duplicates removed.
fn oriented_rings(polygon: &Polygon<Real>) -> Vec<Vec<[Real; 2]>> {
    let oriented = crate::sketch::orient(polygon);
    std::iter::once(oriented.exterior())
        .chain(oriented.interiors())
        .map(|ring| {
            let mut coords: Vec<[Real; 2]> = ring.coords().map(|c| [c.x, c.y]).collect();
            if coords.len() > 1 && coords.first() == coords.last() {
                coords.pop();
            }
            coords
        })
        .filter(|coords| !coords.is_empty())
        .collect()
}

/// `(prev, next)` neighbors of vertex `i` on a closed ring.
#[inline]
fn around(ring: &[[Real; 2]], i: usize) -> ([Real; 2], [Real; 2]) {
    let n = ring.len();
    (ring[(i + n - 1) % n], ring[(i + 1) % n])
}

fn inward_normal(prev: [Real; 2], next: [Real; 2]) -> Vector2<Real> {
    let tangent = Vector2::new(next[0] - prev[0], next[1] - prev[1]);
    let normal = Vector2::new(-tangent.y, tangent.x);
    normal.try_normalize(0.0).unwrap_or_else(Vector2::zeros)
}

/// `[x, y, nx, ny]` per vertex, with `(nx, ny)` the inward unit normal.
pub fn normal_vectors(polygon: &Polygon<Real>) -> Vec<[Real; 4]> {
    oriented_rings(polygon)
        .iter()
        .flat_map(|ring| {
            (0..ring.len()).map(move |i| {
                let (prev, next) = around(ring, i);
                let n = inward_normal(prev, next);
                [ring[i][0], ring[i][1], n.x, n.y]
            })
        })
        .collect()
}

/// `[x, y, length]` per vertex, with `length` the shorter of its two segments.
pub fn min_segment(polygon: &Polygon<Real>) -> Vec<[Real; 3]> {
    oriented_rings(polygon)
        .iter()
        .flat_map(|ring| {
            (0..ring.len()).map(move |i| {
                let (prev, next) = around(ring, i);
                let [x, y] = ring[i];
                let back = (x - prev[0]).hypot(y - prev[1]);
                let ahead = (next[0] - x).hypot(next[1] - y);
                [x, y, back.min(ahead)]
            })
        })
        .collect()
}

/// `[x, y, distance]` per vertex: the distance to the closest vertex inside the
/// cone of `options.angle` around the inward normal, or `max_distance`.
pub fn inearest_polygon(
    polygon: &Polygon<Real>,
    options: &FetchOptions,
) -> DensityResult<Vec<[Real; 3]>> {
    if !(options.max_distance > 0.0) {
        return Err(DensityError::invalid_input(format!(
            "maxDistance needs to be positive, got {}",
            options.max_distance
        )));
    }
    if !(options.angle > 0.0 && options.angle <= 360.0) {
        return Err(DensityError::invalid_input(format!(
            "angle needs to be in (0, 360] degrees, got {}",
            options.angle
        )));
    }

    let normals = normal_vectors(polygon);
    let points: Vec<[Real; 2]> = normals.iter().map(|&[x, y, _, _]| [x, y]).collect();
    let index = PointIndex::new(&points);
    let cos_half = (options.angle.to_radians() * 0.5).cos();
    let FetchOptions { max_distance, min_distance, .. } = *options;

    let nearest_in_cone = |me: usize, candidates: &[usize]| -> Real {
        let origin = Vector2::new(points[me][0], points[me][1]);
        let normal = Vector2::new(normals[me][2], normals[me][3]);
        candidates
            .iter()
            .map(|&j| {
                let v = Vector2::new(points[j][0], points[j][1]) - origin;
                let d = v.norm();
                if d > min_distance && d > 0.0 && v.dot(&normal) / d >= cos_half {
                    d
                } else {
                    max_distance
                }
            })
            .fold(max_distance, Real::min)
    };

    let distances = index.map_chunks(&points, max_distance, options.chunk_size, |start, _, table| {
        (0..table.rows())
            .map(|row| nearest_in_cone(start + row, table.neighbors(row)))
            .collect()
    });

    log::debug!("inearest: {} vertices, max distance {}", points.len(), max_distance);

    Ok(points
        .into_iter()
        .zip(distances)
        .map(|([x, y], d)| [x, y, d])
        .collect())
}
