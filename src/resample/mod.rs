//! Curve and polygon resampling.
//!
//! * **Uniform**: [`resample_line_string`] / [`resample_polygon`] cut every curve
//!   into equal pieces no longer than a maximum length.
//! * **Density driven**: [`dresample_line_string`] / [`dresample_polygon`] march
//!   along the curve with the spacing a [`SpacingField`] asks for, then smooth
//!   the last few steps so the curve ends exactly on its last vertex.
//! * **Near a feature**: [`resample_near_line_string`] / [`resample_near_polygon`]
//!   add a vertex wherever a feature point projects onto the curve.
//!
//! The march goes from the coarse end to the fine end. At each position the
//! step is the smaller of the spacing here and the spacing one step ahead, so
//! the spacing never jumps past what the field allows.

use crate::errors::{DensityError, DensityResult};
use crate::float_types::{Real, tolerance};
use crate::traits::SpacingField;
use geo::{LineString, Orient, Polygon, orient::Direction};

pub(crate) mod chain;
pub mod near;
pub mod split;

use chain::Chain;
pub use near::{resample_near_line_string, resample_near_polygon};
pub use split::{split_line_at_point, split_line_at_points};

/// Steps starting this many maximum spacings from the end are smoothed.
const TAIL_WINDOW: Real = 3.0;

/// Cuts `curve` into `max(ceil(L / max_length), 1)` equal segments.
/// A non-positive `max_length` returns the input.
pub fn resample_line_string(curve: &LineString<Real>, max_length: Real) -> LineString<Real> {
    if max_length <= 0.0 || curve.0.len() < 2 {
        return curve.clone();
    }
    let chain = Chain::from_line_string(curve);
    let total = chain.length();
    let n = (total / max_length).ceil().max(1.0) as usize;
    let piece = total / n as Real;

    let mut coords = Vec::with_capacity(n + 1);
    coords.extend(chain.first());
    coords.extend((1..n).map(|i| chain.interpolate(piece * i as Real)));
    coords.extend(chain.last());
    Chain::into_line_string(coords)
}

/// Cuts a closed ring into `max(ceil(L / max_length), 3)` equal segments. The
/// result is closed.
pub fn resample_ring(ring: &LineString<Real>, max_length: Real) -> LineString<Real> {
    if max_length <= 0.0 || ring.0.len() < 2 {
        return ring.clone();
    }
    let chain = Chain::from_line_string(ring);
    let total = chain.length();
    let n = (total / max_length).ceil().max(3.0) as usize;
    let piece = total / n as Real;

    let mut coords = Vec::with_capacity(n + 1);
    coords.extend(chain.first());
    coords.extend((1..n).map(|i| chain.interpolate(piece * i as Real)));
    coords.extend(chain.first());
    Chain::into_line_string(coords)
}

/// Uniform resampling of every ring of `polygon`.
pub fn resample_polygon(polygon: &Polygon<Real>, max_length: Real) -> Polygon<Real> {
    let exterior = resample_ring(polygon.exterior(), max_length);
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| resample_ring(ring, max_length))
        .collect();
    assemble(exterior, interiors)
}

/// Density-driven resampling of an open or closed curve.
///
/// With `anchors`, the curve is first split at their projections and every piece
/// is resampled on its own, so anchors survive as vertices.
///
/// A curve shorter than the field's minimum spacing is returned unchanged (and
/// logged). Fewer than two coordinates is an error.
pub fn dresample_line_string<F: SpacingField + ?Sized>(
    curve: &LineString<Real>,
    field: &F,
    anchors: Option<&[[Real; 2]]>,
) -> DensityResult<LineString<Real>> {
    if curve.0.len() < 2 {
        return Err(DensityError::invalid_input(format!(
            "Curve needs at least 2 coordinates, got {}",
            curve.0.len()
        )));
    }

    let pieces = match anchors {
        Some(anchors) if !anchors.is_empty() => split_line_at_points(curve, anchors),
        _ => vec![curve.clone()],
    };

    let mut merged: Vec<[Real; 2]> = Vec::new();
    for piece in &pieces {
        let coords = march_or_keep(Chain::from_line_string(piece), field)?;
        // consecutive pieces share their end vertex
        let skip = usize::from(!merged.is_empty());
        merged.extend(coords.into_iter().skip(skip));
    }
    Ok(Chain::into_line_string(merged))
}

/// Density-driven resampling of every ring.
///
/// Holes that end up with fewer than 4 coordinates, or open, are dropped. The
/// result has a counter-clockwise exterior and clockwise holes.
pub fn dresample_polygon<F: SpacingField + ?Sized>(
    polygon: &Polygon<Real>,
    field: &F,
    anchors: Option<&[[Real; 2]]>,
) -> DensityResult<Polygon<Real>> {
    let exterior = dresample_line_string(polygon.exterior(), field, anchors)?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| dresample_line_string(ring, field, anchors))
        .collect::<DensityResult<Vec<_>>>()?;
    Ok(assemble(exterior, interiors))
}

fn assemble(exterior: LineString<Real>, interiors: Vec<LineString<Real>>) -> Polygon<Real> {
    let before = interiors.len();
    let interiors: Vec<LineString<Real>> = interiors
        .into_iter()
        .filter(|ring| ring.0.len() >= 4 && ring.is_closed())
        .collect();
    if interiors.len() < before {
        log::debug!("dropped {} degenerate holes", before - interiors.len());
    }
    Polygon::new(exterior, interiors).orient(Direction::Default)
}

/// Marches `chain`, or hands it back untouched when it is too short.
fn march_or_keep<F: SpacingField + ?Sized>(
    chain: Chain,
    field: &F,
) -> DensityResult<Vec<[Real; 2]>> {
    match march(&chain, field) {
        Ok(coords) => Ok(coords),
        Err(err) if err.is_recoverable() => {
            log::warn!("{}; keeping the curve as is", err);
            Ok(chain.coords().to_vec())
        },
        Err(err) => Err(err),
    }
}

fn march<F: SpacingField + ?Sized>(chain: &Chain, field: &F) -> DensityResult<Vec<[Real; 2]>> {
    let total = chain.length();
    let min = field.min_spacing();
    let max = field.max_spacing();
    let (Some(first), Some(last)) = (chain.first(), chain.last()) else {
        return Err(DensityError::invalid_input("Curve has no coordinates"));
    };
    if total < min {
        return Err(DensityError::DegenerateCurve { length: total, min_density: min });
    }

    // coarse end first
    let flip = field.spacing_at(last) < field.spacing_at(first);
    let reversed;
    let chain = if flip {
        reversed = Chain::new(chain.coords().iter().rev().copied().collect());
        &reversed
    } else {
        chain
    };
    let (first, last) = if flip { (last, first) } else { (first, last) };

    let mut length = 0.0;
    let mut coords = vec![first];
    // (step, arc length where the step starts)
    let mut tail: Vec<(Real, Real)> = Vec::new();

    while length + min <= total {
        let here = field.spacing_at(chain.interpolate(length));
        let ahead = field.spacing_at(chain.interpolate((length + here).min(total)));
        let step = here.min(ahead);
        if !(step > 0.0) {
            return Err(DensityError::invalid_input(format!(
                "Spacing needs to be positive, got {} at arc length {}",
                step, length
            )));
        }
        if length + TAIL_WINDOW * max > total {
            tail.push((step, length));
        }
        length += step;
        coords.push(chain.interpolate(length));
    }

    if let Some(&(_, start)) = tail.first() {
        let end_spacing = field.spacing_at(last);
        let mut extra = length - total;
        if -extra > growth_room(&tail, max) + tolerance() {
            // stretching would exceed the maximum: take one more step and shrink
            tail.push((end_spacing, length));
            coords.push(chain.interpolate(length + end_spacing));
            extra += end_spacing;
        }
        let steps = smooth_tail(&tail, extra, end_spacing, min, max);

        coords.truncate(coords.len() - tail.len());
        let mut along = start;
        for step in steps {
            along += step;
            coords.push(chain.interpolate(along));
        }
        coords.pop();
    }
    coords.push(last);

    log::trace!(
        "resampled curve of length {} into {} vertices ({} smoothed)",
        total,
        coords.len(),
        tail.len()
    );

    if flip {
        coords.reverse();
    }
    Ok(coords)
}

/// Total stretch the tail can take before a step exceeds `max`.
fn growth_room(tail: &[(Real, Real)], max: Real) -> Real {
    tail.iter().map(|&(step, _)| (max - step).max(0.0)).sum()
}

/// New tail steps with `extra` taken off (or added, when negative). Steps
/// coarser than the end spacing give up the difference proportionally; failing
/// that, steps coarser than the minimum spacing; failing that, all steps
/// equally. Stretched steps are capped at `max` and the excess moves to the
/// steps that still have room.
fn smooth_tail(
    tail: &[(Real, Real)],
    extra: Real,
    end_spacing: Real,
    min: Real,
    max: Real,
) -> Vec<Real> {
    let weights = |floor: Real| -> Vec<Real> {
        tail.iter().map(|&(step, _)| (step - floor).max(0.0)).collect()
    };
    let mut w = weights(end_spacing);
    let mut sum: Real = w.iter().sum();
    if sum == 0.0 {
        w = weights(min);
        sum = w.iter().sum();
    }
    if sum == 0.0 {
        w = vec![1.0; tail.len()];
        sum = tail.len() as Real;
    }
    let mut steps: Vec<Real> = tail
        .iter()
        .zip(w)
        .map(|(&(step, _), v)| step - v / sum * extra)
        .collect();

    if extra < 0.0 {
        let overflow: Real = steps.iter().map(|s| (s - max).max(0.0)).sum();
        let room: Real = steps.iter().map(|s| (max - s).max(0.0)).sum();
        if overflow > 0.0 && room > 0.0 {
            let moved = overflow.min(room);
            for s in steps.iter_mut() {
                let (excess, free) = ((*s - max).max(0.0), (max - *s).max(0.0));
                *s += free / room * moved - excess / overflow * moved;
            }
        }
    }
    steps
}
