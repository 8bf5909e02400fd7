//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use densefield::{DensityField, FieldConfig, float_types::Real};
use geo::{Coord, LineString, Polygon};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Returns the bounding box `[min_x, min_y, max_x, max_y]` of a set of coordinates.
pub fn bounding_box(coords: &[[Real; 2]]) -> [Real; 4] {
    coords.iter().fold(
        [Real::MAX, Real::MAX, Real::MIN, Real::MIN],
        |[x0, y0, x1, y1], &[x, y]| [x0.min(x), y0.min(y), x1.max(x), y1.max(y)],
    )
}

/// Straight line from `(x0, y0)` to `(x1, y1)`.
pub fn segment(x0: Real, y0: Real, x1: Real, y1: Real) -> LineString<Real> {
    LineString::new(vec![Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }])
}

/// Axis-aligned square polygon with its lower left corner at `(x, y)`.
pub fn square(x: Real, y: Real, side: Real) -> Polygon<Real> {
    Polygon::new(
        LineString::from(vec![
            (x, y),
            (x + side, y),
            (x + side, y + side),
            (x, y + side),
            (x, y),
        ]),
        vec![],
    )
}

/// Field with explicit clamps.
pub fn field(rows: &[[Real; 4]], min: Real, max: Real, growth: Real) -> DensityField {
    DensityField::with_config(
        rows,
        FieldConfig {
            min_density: Some(min),
            max_density: Some(max),
            min_growth: Some(growth),
            ..FieldConfig::default()
        },
    )
    .expect("valid field")
}

/// Lengths of consecutive segments.
pub fn segment_lengths(line: &LineString<Real>) -> Vec<Real> {
    line.0
        .windows(2)
        .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
        .collect()
}
