mod support;

use densefield::{FetchOptions, Shape, float_types::Real};
use geo::{LineString, MultiPolygon, Polygon};
use support::approx_eq;

/// Closed square ring with a vertex every unit.
fn unit_ring(x: Real, y: Real, side: usize) -> LineString<Real> {
    let s = side as Real;
    let mut coords = Vec::new();
    for i in 0..side {
        coords.push((x + i as Real, y));
    }
    for i in 0..side {
        coords.push((x + s, y + i as Real));
    }
    for i in 0..side {
        coords.push((x + s - i as Real, y + s));
    }
    for i in 0..side {
        coords.push((x, y + s - i as Real));
    }
    coords.push((x, y));
    coords.into()
}

fn frame() -> Polygon<Real> {
    Polygon::new(unit_ring(0.0, 0.0, 10), vec![unit_ring(3.0, 3.0, 4)])
}

fn lookup(rows: &[[Real; 3]], x: Real, y: Real) -> Real {
    rows.iter()
        .find(|r| r[0] == x && r[1] == y)
        .map(|r| r[2])
        .unwrap_or_else(|| panic!("no row at ({}, {})", x, y))
}

#[test]
fn walls_see_each_other_across_the_gap() {
    let options = FetchOptions { max_distance: 5.0, ..FetchOptions::default() };
    let rows = Shape::Polygon(frame()).inearest(&options).unwrap();
    // 40 exterior and 16 hole vertices, closing duplicates dropped
    assert_eq!(rows.len(), 56);

    assert!(approx_eq(lookup(&rows, 5.0, 0.0), 3.0, 1e-12));
    assert!(approx_eq(lookup(&rows, 5.0, 3.0), 3.0, 1e-12));
    assert!(approx_eq(lookup(&rows, 0.0, 5.0), 3.0, 1e-12));
    assert!(approx_eq(lookup(&rows, 7.0, 5.0), 3.0, 1e-12));
    assert!(rows.iter().all(|r| r[2] > 0.0 && r[2] <= 5.0));
}

#[test]
fn short_search_reports_the_maximum() {
    let options = FetchOptions { max_distance: 2.0, ..FetchOptions::default() };
    let rows = Shape::Polygon(frame()).inearest(&options).unwrap();
    assert_eq!(lookup(&rows, 5.0, 0.0), 2.0);
}

#[test]
fn multipolygon_rows_are_concatenated() {
    let far = Polygon::new(unit_ring(100.0, 0.0, 2), vec![]);
    let shape = Shape::MultiPolygon(MultiPolygon::new(vec![frame(), far]));
    let rows = shape.inearest(&FetchOptions::default()).unwrap();
    assert_eq!(rows.len(), 56 + 8);
    assert!(rows[56..].iter().all(|r| r[0] >= 100.0));

    let line = Shape::LineString(support::segment(0.0, 0.0, 1.0, 0.0));
    assert!(line.inearest(&FetchOptions::default()).unwrap().is_empty());
}

#[test]
fn chunking_does_not_change_fetch() {
    let base = FetchOptions { max_distance: 5.0, ..FetchOptions::default() };
    let whole = Shape::Polygon(frame()).inearest(&base).unwrap();
    let chunked = Shape::Polygon(frame())
        .inearest(&FetchOptions { chunk_size: 7, ..base })
        .unwrap();
    assert_eq!(whole, chunked);
}
