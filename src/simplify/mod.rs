//! Density-aware polygon simplification.
//!
//! The polygon is rebuilt ring by ring around the seeds of a [`DensityField`].
//! For a growing series of trial radii `d`, every group of equal-density seeds
//! claims the part of the polygon within `d` of it. That part is cleaned at a
//! scale matching the spacing the field allows there (`D(l = d)`): features
//! narrower than a fifth of it are opened away, small holes are filled and the
//! outline is simplified. The newly claimed band (zones minus what the previous
//! radius already claimed) is accepted into the result. Whatever no radius
//! claims is taken from the original polygon at the end, cleaned at the scale
//! of the coarsest density. The result never reaches further than the
//! correction distance outside the input.
//!
//! Small radii work on the `fine` copy of the polygon, large ones on the
//! `coarse` copy; both are themselves simplified progressively.

use crate::errors::{DensityError, DensityResult};
use crate::field::DensityField;
use crate::float_types::{PI, Real};
use crate::growth::GrowthLaw;
use crate::sketch::{self, multi};
use geo::{MultiPolygon, Polygon};

/// Trial radius mantissas; every decade from 1 to 10⁶ is tried.
const RADIUS_STEPS: [Real; 4] = [10.0, 20.0, 40.0, 70.0];
const RADIUS_DECADES: i32 = 7;

/// Share of the local spacing used to open zones.
const OPEN_FACTOR: Real = 0.1;
/// Share of the local spacing used as simplification tolerance.
const SIMPLIFY_FACTOR: Real = 0.01;
/// Largest coarse density as a share of the polygon perimeter.
const PERIMETER_CAP: Real = 0.1;

#[derive(Clone, Debug)]
pub struct SimplifyOptions<'a> {
    /// Source for small radii (defaults to the input polygon).
    pub fine: Option<&'a Polygon<Real>>,
    /// Source for large radii (defaults to the input polygon).
    pub coarse: Option<&'a Polygon<Real>>,
    /// Radii whose density exceeds this work on the coarse copy.
    pub fine_threshold: Real,
    /// Coarsest density considered (defaults to the field's maximum).
    pub coarse_threshold: Option<Real>,
    /// Dilation applied after every union to close hairline gaps.
    pub correction: Real,
}

impl Default for SimplifyOptions<'_> {
    fn default() -> Self {
        Self {
            fine: None,
            coarse: None,
            fine_threshold: 1000.0,
            coarse_threshold: None,
            correction: 0.01,
        }
    }
}

/// Simplifies `polygon` so that its detail follows the spacing `field` asks
/// for. The result may consist of several polygons.
///
/// `progress` is called with `(radius index, radius count)` after every radius.
pub fn dsimplify_polygon(
    polygon: &Polygon<Real>,
    field: &DensityField,
    options: &SimplifyOptions<'_>,
    mut progress: Option<&mut dyn FnMut(usize, usize)>,
) -> DensityResult<MultiPolygon<Real>> {
    let min_density = field.min_density();
    let envelope = field.envelope();
    let perimeter = sketch::perimeter(polygon);

    let cap = options
        .coarse_threshold
        .unwrap_or(field.max_density())
        .min(perimeter * PERIMETER_CAP);
    let max_distance = envelope.distance_at_density(cap);
    let radii = trial_radii(min_density, max_distance, perimeter);

    let original = sketch::correct(&multi(polygon.clone()))?;
    let mut fine = sketch::correct(&multi(options.fine.unwrap_or(polygon).clone()))?;
    let mut coarse = sketch::correct(&multi(options.coarse.unwrap_or(polygon).clone()))?;

    let groups = density_groups(field);
    let merge = Merge { min_density, correction: options.correction };
    let bound = sketch::offset(&original, options.correction);

    log::debug!(
        "dsimplify: perimeter {}, {} radii up to {}, {} density groups",
        perimeter,
        radii.len(),
        max_distance,
        groups.len()
    );

    if radii.is_empty() {
        let domain = sketch::simplify(&original, min_density);
        return sketch::correct(&domain).or(Ok(original));
    }

    let mut domain: Option<MultiPolygon<Real>> = None;
    let mut previous = MultiPolygon::new(vec![]);

    for (i, &radius) in radii.iter().enumerate() {
        let density = envelope.density_at_distance(radius);
        let work = if density > options.fine_threshold {
            resimplify(&mut coarse, density * SIMPLIFY_FACTOR);
            &coarse
        } else {
            resimplify(&mut fine, density * SIMPLIFY_FACTOR);
            &fine
        };

        let (zones, outlines) = zones_at(work, radius, &groups, min_density, field.min_growth());

        domain = Some(match domain.take() {
            None => {
                previous = outlines;
                zones
            },
            Some(current) if zones.0.is_empty() => current,
            Some(current) => {
                let band = sketch::difference(&zones, &previous);
                if !outlines.0.is_empty() {
                    previous = outlines;
                }
                merge.apply(current, band)
            },
        });

        log::trace!("radius {} (density {}) done", radius, density);
        if let Some(observer) = progress.as_mut() {
            observer(i + 1, radii.len());
        }
    }

    let rest = sketch::difference(&clean(&original, cap), &previous);
    let domain = merge.apply(domain.unwrap_or_else(|| MultiPolygon::new(vec![])), rest);
    let domain = sketch::remove_small(
        &sketch::intersection(&domain, &bound),
        disc_area(min_density * OPEN_FACTOR),
    );
    if domain.0.is_empty() {
        return Err(DensityError::EmptyGeometry { operation: "dsimplify_polygon" });
    }
    Ok(domain)
}

/// `{10, 20, 40, 70}·10ᵏ` restricted to `[min_density, max_distance)` and
/// shorter than the perimeter.
fn trial_radii(min_density: Real, max_distance: Real, perimeter: Real) -> Vec<Real> {
    (0..RADIUS_DECADES)
        .flat_map(|k| RADIUS_STEPS.iter().map(move |m| m * (10.0 as Real).powi(k)))
        .filter(|&d| d >= min_density && d < max_distance && d < perimeter)
        .collect()
}

/// Seed positions grouped by exact density, finest first.
fn density_groups(field: &DensityField) -> Vec<(Real, Vec<[Real; 2]>)> {
    let mut densities: Vec<Real> = field.seeds().iter().map(|s| s.density).collect();
    densities.sort_by(Real::total_cmp);
    densities.dedup();
    densities
        .into_iter()
        .map(|u| {
            let points = field
                .seeds()
                .iter()
                .filter(|s| s.density == u)
                .map(|s| s.position)
                .collect();
            (u, points)
        })
        .collect()
}

/// Cleaned zones claimed within `radius` of each density group, and their
/// outlines.
fn zones_at(
    work: &MultiPolygon<Real>,
    radius: Real,
    groups: &[(Real, Vec<[Real; 2]>)],
    min_density: Real,
    min_growth: Real,
) -> (MultiPolygon<Real>, MultiPolygon<Real>) {
    let mut zones = Vec::new();
    let mut outlines = Vec::new();

    for (density, points) in groups {
        let covered = sketch::discs(points, radius);
        let local = GrowthLaw { density: *density, growth: min_growth }
            .density_at_distance(radius)
            .max(min_density);

        let zone = clean(&sketch::intersection(&covered, work), local);
        if zone.0.is_empty() {
            continue;
        }
        outlines.push(sketch::union_all([
            sketch::exterior(&zone),
            sketch::offset(&covered, -local * OPEN_FACTOR),
        ]));
        zones.push(zone);
    }

    (sketch::union_all(zones), sketch::union_all(outlines))
}

/// Removes what is too small to matter at spacing `density`: features
/// narrower than a fifth of it are opened away, smaller holes filled and the
/// outline simplified at a hundredth of it.
fn clean(shape: &MultiPolygon<Real>, density: Real) -> MultiPolygon<Real> {
    let opened = sketch::open(shape, density * OPEN_FACTOR);
    let filled = sketch::remove_holes_multi(&opened, disc_area(density * OPEN_FACTOR));
    sketch::simplify(&filled, density * SIMPLIFY_FACTOR)
}

/// Simplifies a working copy in place; a copy that would vanish is kept.
fn resimplify(copy: &mut MultiPolygon<Real>, tolerance: Real) {
    match sketch::correct(&sketch::simplify(copy, tolerance)) {
        Ok(simpler) => *copy = simpler,
        Err(err) => log::debug!("keeping working copy: {}", err),
    }
}

/// Area of the disc of diameter `diameter`.
fn disc_area(diameter: Real) -> Real {
    PI * (diameter * 0.5).powi(2)
}

struct Merge {
    min_density: Real,
    correction: Real,
}

impl Merge {
    /// Unions `band` into `domain`, closes hairline gaps and simplifies at the
    /// minimum density. An empty band or an empty outcome leaves `domain` as is.
    fn apply(&self, domain: MultiPolygon<Real>, band: MultiPolygon<Real>) -> MultiPolygon<Real> {
        if band.0.is_empty() {
            return domain;
        }
        let merged = sketch::offset(&sketch::union_all([domain.clone(), band]), self.correction);
        match sketch::correct(&sketch::simplify(&merged, self.min_density)) {
            Ok(next) => next,
            Err(err) => {
                log::debug!("merge skipped: {}", err);
                domain
            },
        }
    }
}
