//! Adding vertices where a feature comes close to a curve.
//!
//! Each feature point is projected onto the curve and the curve gains a vertex
//! at the projection. Existing vertices are never moved or removed, so the
//! shape of the curve is unchanged; only the vertex spacing follows the
//! feature.

use super::chain::Chain;
use super::split::split_line_at_points;
use crate::errors::{DensityError, DensityResult};
use crate::float_types::Real;
use geo::{LineString, Polygon};

/// Inserts the projection of every feature point onto `curve` as a vertex.
///
/// With `within`, feature points farther than that from the curve are
/// ignored. Projections on existing vertices, including the end vertices,
/// add nothing.
pub fn resample_near_line_string(
    curve: &LineString<Real>,
    feature: &[[Real; 2]],
    within: Option<Real>,
) -> DensityResult<LineString<Real>> {
    if curve.0.len() < 2 {
        return Err(DensityError::invalid_input(format!(
            "Curve needs at least 2 coordinates, got {}",
            curve.0.len()
        )));
    }
    let chain = Chain::from_line_string(curve);
    let cuts: Vec<[Real; 2]> = feature
        .iter()
        .filter_map(|&point| {
            let (along, distance) = chain.project(point);
            match within {
                Some(reach) if distance > reach => None,
                _ => Some(chain.interpolate(along)),
            }
        })
        .collect();
    if cuts.is_empty() {
        return Ok(curve.clone());
    }

    let mut merged: Vec<[Real; 2]> = Vec::with_capacity(curve.0.len() + cuts.len());
    for piece in split_line_at_points(curve, &cuts) {
        // consecutive pieces share their end vertex
        let skip = usize::from(!merged.is_empty());
        merged.extend(piece.coords().skip(skip).map(|c| [c.x, c.y]));
    }
    log::trace!("inserted {} vertices near the feature", merged.len() - curve.0.len());
    Ok(Chain::into_line_string(merged))
}

/// [`resample_near_line_string`] for the exterior and every hole.
pub fn resample_near_polygon(
    polygon: &Polygon<Real>,
    feature: &[[Real; 2]],
    within: Option<Real>,
) -> DensityResult<Polygon<Real>> {
    let exterior = resample_near_line_string(polygon.exterior(), feature, within)?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| resample_near_line_string(ring, feature, within))
        .collect::<DensityResult<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    fn xs(line: &LineString<Real>) -> Vec<Real> {
        line.coords().map(|c| c.x).collect()
    }

    #[test]
    fn projections_become_vertices_in_curve_order() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 8.0, y: 0.0)];
        let out = resample_near_line_string(&line, &[[6.0, 3.0], [2.0, -1.0]], None).unwrap();
        assert_eq!(xs(&out), vec![0.0, 2.0, 6.0, 8.0]);
        assert!(out.coords().all(|c| c.y == 0.0));
    }

    #[test]
    fn existing_vertices_are_not_duplicated() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0), (x: 10.0, y: 0.0)];
        let feature = [[5.0, 2.0], [-3.0, 0.0], [12.0, 1.0], [5.0, -2.0]];
        let out = resample_near_line_string(&line, &feature, None).unwrap();
        assert_eq!(out, line);
    }

    #[test]
    fn reach_limits_which_points_count() {
        let line = line_string![(x: 0.0, y: 0.0), (x: 8.0, y: 0.0)];
        let feature = [[3.0, 0.5], [6.0, 4.0]];
        let near = resample_near_line_string(&line, &feature, Some(1.0)).unwrap();
        assert_eq!(xs(&near), vec![0.0, 3.0, 8.0]);
        let all = resample_near_line_string(&line, &feature, None).unwrap();
        assert_eq!(xs(&all), vec![0.0, 3.0, 6.0, 8.0]);
    }

    #[test]
    fn every_ring_gets_its_own_projections() {
        let mut p = polygon![
            (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)
        ];
        p.interiors_push(line_string![
            (x: 4.0, y: 4.0), (x: 4.0, y: 6.0), (x: 6.0, y: 6.0), (x: 6.0, y: 4.0), (x: 4.0, y: 4.0)
        ]);
        let out = resample_near_polygon(&p, &[[5.0, 1.0]], None).unwrap();
        assert!(out.exterior().coords().any(|c| c.x == 5.0 && c.y == 0.0));
        assert!(out.interiors()[0].coords().any(|c| c.x == 5.0 && c.y == 4.0));
        assert_eq!(out.exterior().0.len(), p.exterior().0.len() + 1);

        let out = resample_near_polygon(&p, &[[5.0, 1.0]], Some(2.0)).unwrap();
        assert_eq!(out.interiors()[0], p.interiors()[0]);
    }

    #[test]
    fn single_coordinate_is_invalid() {
        let line = LineString::from(vec![(1.0, 1.0)]);
        assert!(resample_near_line_string(&line, &[[0.0, 0.0]], None).is_err());
    }
}
