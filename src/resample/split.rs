//! Splitting curves at anchor points.
//!
//! An anchor is projected onto the curve; the curve is cut there unless the
//! anchor lies off the curve or its projection lands on the first or last
//! vertex. A projection on an existing
//! vertex shares that vertex between both halves, anywhere else a new vertex is
//! interpolated. Coordinates are snapped to 12 decimals before projecting so
//! anchors taken from the curve itself hit its vertices exactly.

use super::chain::Chain;
use crate::float_types::{Real, SNAP_SCALE, snap, tolerance};
use geo::LineString;

/// Splits `curve` at the projection of `point`. Returns the curve unchanged
/// (as the only element) when there is nothing to split.
pub fn split_line_at_point(curve: &LineString<Real>, point: [Real; 2]) -> Vec<LineString<Real>> {
    let coords: Vec<[Real; 2]> = curve.coords().map(|c| [c.x, c.y]).collect();
    match split_coords(&coords, point) {
        Some((head, tail)) => vec![Chain::into_line_string(head), Chain::into_line_string(tail)],
        None => vec![curve.clone()],
    }
}

/// Splits `curve` at every anchor in turn. Each anchor cuts the piece it is
/// closest to; pieces stay in curve order.
pub fn split_line_at_points(
    curve: &LineString<Real>,
    points: &[[Real; 2]],
) -> Vec<LineString<Real>> {
    let mut pieces: Vec<Vec<[Real; 2]>> = vec![curve.coords().map(|c| [c.x, c.y]).collect()];

    for &point in points {
        let target = snapped(point);
        let nearest = pieces
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                let chain = Chain::new(piece.iter().copied().map(snapped).collect());
                (i, chain.project(target).1)
            })
            .fold(None, |best: Option<(usize, Real)>, (i, d)| match best {
                Some((_, b)) if b <= d => best,
                _ => Some((i, d)),
            });
        let Some((i, _)) = nearest else { continue };
        if let Some((head, tail)) = split_coords(&pieces[i], point) {
            pieces.splice(i..=i, [head, tail]);
        }
    }

    pieces.into_iter().map(Chain::into_line_string).collect()
}

fn snapped([x, y]: [Real; 2]) -> [Real; 2] {
    [snap(x, SNAP_SCALE), snap(y, SNAP_SCALE)]
}

/// `(head, tail)` of `coords` cut at the projection of `point`, or `None` when
/// `point` is farther than tolerance from the curve or its projection is within
/// tolerance of an end vertex.
pub(crate) fn split_coords(
    coords: &[[Real; 2]],
    point: [Real; 2],
) -> Option<(Vec<[Real; 2]>, Vec<[Real; 2]>)> {
    if coords.len() < 2 {
        return None;
    }
    let chain = Chain::new(coords.iter().copied().map(snapped).collect());
    let (along, distance) = chain.project(snapped(point));
    if distance > tolerance() || along <= tolerance() || along >= chain.length() - tolerance() {
        return None;
    }

    let cumulative = chain.cumulative();
    let i = cumulative.partition_point(|&l| l < along);
    if cumulative[i] == along {
        return Some((coords[..=i].to_vec(), coords[i..].to_vec()));
    }
    let cut = chain.interpolate(along);
    let mut head = coords[..i].to_vec();
    head.push(cut);
    let mut tail = vec![cut];
    tail.extend_from_slice(&coords[i..]);
    Some((head, tail))
}
