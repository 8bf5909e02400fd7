mod support;

use densefield::{
    Shape, SimplifyOptions,
    float_types::Real,
    simplify::dsimplify_polygon,
};
use geo::{Area, Contains, CoordsIter, MultiPolygon, Point, Polygon};
use support::{bounding_box, field, square};

#[test]
fn square_survives_with_a_thin_margin() {
    let f = field(&[[0.0, 0.0, 1.0, 1.2]], 1.0, 10.0, 1.2);
    let sq = square(0.0, 0.0, 100.0);
    let mut calls = 0;
    let mut observer = |_: usize, _: usize| calls += 1;
    let out = dsimplify_polygon(&sq, &f, &SimplifyOptions::default(), Some(&mut observer)).unwrap();

    // radii 10, 20 and 40 stay below l(D = 10) = 55
    assert_eq!(calls, 3);
    let area = out.unsigned_area();
    assert!(area > 9500.0 && area < 10500.0, "area {}", area);

    let coords: Vec<[Real; 2]> = out.coords_iter().map(|c| [c.x, c.y]).collect();
    let [x0, y0, x1, y1] = bounding_box(&coords);
    // no further out than the 0.01 correction
    assert!(x0 > -0.02 && y0 > -0.02 && x1 < 100.02 && y1 < 100.02, "{:?}", [x0, y0, x1, y1]);
}

#[test]
fn tiny_polygons_are_only_cleaned() {
    let f = field(&[[0.0, 0.0, 1.0, 1.2]], 1.0, 10.0, 1.2);
    let sq = square(0.0, 0.0, 2.0);
    let out = dsimplify_polygon(&sq, &f, &SimplifyOptions::default(), None).unwrap();
    assert_eq!(out.0.len(), 1);
    assert!((out.unsigned_area() - 4.0).abs() < 1e-9);
}

#[test]
fn thin_spike_far_from_seeds_is_removed() {
    // 100 × 100 square with a 0.4 wide spike sticking 20 out of the far side
    let spiked = Polygon::new(
        vec![
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 79.8),
            (120.0, 79.8),
            (120.0, 80.2),
            (100.0, 80.2),
            (100.0, 100.0),
            (0.0, 100.0),
            (0.0, 0.0),
        ]
        .into(),
        vec![],
    );
    let f = field(&[[0.0, 0.0, 1.0, 1.2]], 1.0, 10.0, 1.2);
    let out = dsimplify_polygon(&spiked, &f, &SimplifyOptions::default(), None).unwrap();

    assert!(!out.contains(&Point::new(110.0, 80.0)));
    assert!(out.contains(&Point::new(90.0, 80.0)));
    let coords: Vec<[Real; 2]> = out.coords_iter().map(|c| [c.x, c.y]).collect();
    assert!(bounding_box(&coords)[2] < 100.02);
}

#[test]
fn large_radii_follow_the_coarse_copy() {
    let f = field(&[[0.0, 0.0, 1.0, 1.2]], 1.0, 10.0, 1.2);
    let sq = square(0.0, 0.0, 100.0);
    let mut holed = sq.clone();
    holed.interiors_push(square(15.0, 15.0, 10.0).exterior().clone());
    let inside_hole = Point::new(20.0, 20.0);

    // every trial radius asks for a density above 1.5 (D(10) = 3)
    let coarse = SimplifyOptions { coarse: Some(&holed), fine_threshold: 1.5, ..Default::default() };
    let out = dsimplify_polygon(&sq, &f, &coarse, None).unwrap();
    assert!(!out.contains(&inside_hole));
    assert!(out.contains(&Point::new(50.0, 50.0)));

    // below the threshold only the fine copy is read
    let fine = SimplifyOptions { coarse: Some(&holed), ..Default::default() };
    let out = dsimplify_polygon(&sq, &f, &fine, None).unwrap();
    assert!(out.contains(&inside_hole));

    let fine_holed = SimplifyOptions { fine: Some(&holed), fine_threshold: 1.5, ..Default::default() };
    let out = dsimplify_polygon(&sq, &f, &fine_holed, None).unwrap();
    assert!(out.contains(&inside_hole));
}

#[test]
fn shapes_dispatch_dsimplify() {
    let f = field(&[[0.0, 0.0, 1.0, 1.2]], 1.0, 10.0, 1.2);
    let parts = MultiPolygon::new(vec![square(0.0, 0.0, 50.0), square(200.0, 0.0, 50.0)]);
    let out = Shape::MultiPolygon(parts).dsimplify(&f, &SimplifyOptions::default()).unwrap();
    match out {
        Shape::MultiPolygon(mp) => {
            assert_eq!(mp.0.len(), 2);
            assert!(mp.unsigned_area() > 4500.0);
        },
        other => panic!("unexpected {:?}", other),
    }

    let line = Shape::LineString(support::segment(0.0, 0.0, 1.0, 0.0));
    assert_eq!(line.dsimplify(&f, &SimplifyOptions::default()).unwrap(), line);
}
