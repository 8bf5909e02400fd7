use super::union_all;
use crate::float_types::{Real, TAU};
use geo::{Coord, LineString, MultiPolygon, Polygon};

/// Segments used for the discs of [`discs`].
pub const DISC_SEGMENTS: usize = 64;

/// Regular polygon approximating the disc of `radius` around `center`,
/// counter-clockwise and explicitly closed.
pub fn disc(center: [Real; 2], radius: Real, segments: usize) -> Polygon<Real> {
    let segments = segments.max(3);
    let mut coords: Vec<Coord<Real>> = (0..segments)
        .map(|i| {
            let theta = TAU * (i as Real) / (segments as Real);
            Coord {
                x: center[0] + radius * theta.cos(),
                y: center[1] + radius * theta.sin(),
            }
        })
        .collect();
    coords.push(coords[0]);
    Polygon::new(LineString::new(coords), vec![])
}

/// Union of the discs of `radius` around every point (the buffer of a point
/// set).
pub fn discs(points: &[[Real; 2]], radius: Real) -> MultiPolygon<Real> {
    if radius <= 0.0 {
        return MultiPolygon::new(vec![]);
    }
    union_all(
        points
            .iter()
            .map(|&p| MultiPolygon::new(vec![disc(p, radius, DISC_SEGMENTS)])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::PI;
    use geo::{Area, Winding};

    #[test]
    fn disc_is_closed_and_counter_clockwise() {
        let d = disc([1.0, 2.0], 3.0, 32);
        assert_eq!(d.exterior().0.len(), 33);
        assert!(d.exterior().is_closed());
        assert!(d.exterior().is_ccw());
        assert!((d.unsigned_area() - PI * 9.0).abs() < 0.2);
    }

    #[test]
    fn overlapping_discs_merge() {
        let merged = discs(&[[0.0, 0.0], [1.0, 0.0], [10.0, 0.0]], 1.0);
        assert_eq!(merged.0.len(), 2);
        assert!(discs(&[], 1.0).0.is_empty());
    }
}
