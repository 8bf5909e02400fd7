//! `DensityField`: a pruned set of weighted seeds answering "which spacing is
//! required at this point?".
//!
//! Every seed asks for its own `density` at its position and lets the spacing
//! grow geometrically (factor `growth`) with distance. The field value at a
//! point is the finest spacing implied by any seed, clamped to
//! `[min_density, max_density]`.
//!
//! ```
//! use densefield::DensityField;
//! let field = DensityField::new(&[[0.0, 0.0, 1.0, 1.2], [40.0, 0.0, 3.0, 1.2]]).unwrap();
//! let d = field.get_density(&[[0.0, 0.0], [10.0, 0.0]]);
//! assert_eq!(d[0], 1.0);
//! assert!(d[1] > 1.0 && d[1] <= 3.0);
//! ```

use crate::errors::{DensityError, DensityResult};
use crate::fetch::{FetchOptions, inearest_polygon, min_segment};
use crate::float_types::Real;
use crate::growth::{GrowthLaw, check_growth, implied_density};
use crate::spatial::{DEFAULT_CHUNK_SIZE, PointIndex};
use crate::traits::SpacingField;
use geo::Polygon;

mod prune;
mod state;

pub use state::FieldState;

/// One density sample.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seed {
    pub position: [Real; 2],
    pub density: Real,
    pub growth: Real,
    /// Batch (`add` call) that introduced the seed.
    pub group_id: usize,
    /// Row of the seed inside its batch.
    pub point_id: usize,
}

impl Seed {
    pub const fn law(&self) -> GrowthLaw {
        GrowthLaw { density: self.density, growth: self.growth }
    }

    /// `[x, y, density, growth, group_id, point_id]`
    pub fn to_row(&self) -> [Real; 6] {
        [
            self.position[0],
            self.position[1],
            self.density,
            self.growth,
            self.group_id as Real,
            self.point_id as Real,
        ]
    }
}

/// Construction-time settings of a [`DensityField`].
///
/// The three clamps default to the extremes of the first batch.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub min_density: Option<Real>,
    pub max_density: Option<Real>,
    pub min_growth: Option<Real>,
    /// Coarsest density considered while pruning (defaults to `max_density`).
    pub max_density_simplify: Option<Real>,
    /// Increment of the pruning step index.
    pub stride: usize,
    /// Number of query points searched at once.
    pub chunk_size: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            min_density: None,
            max_density: None,
            min_growth: None,
            max_density_simplify: None,
            stride: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Per-batch overrides of [`DensityField::add_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AddOverrides {
    /// Replaces the field's `max_density_simplify` from this batch on.
    pub max_density_simplify: Option<Real>,
}

/// Per-call overrides of [`DensityField::get_density_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DensityQuery<'a> {
    /// Caps the result and bounds the search radius instead of `max_density`.
    pub max_density: Option<Real>,
    /// Evaluates these seeds instead of the field's own.
    pub seeds: Option<&'a [Seed]>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FieldParams {
    pub min_density: Real,
    pub max_density: Real,
    pub min_growth: Real,
    pub max_density_simplify: Real,
}

impl FieldParams {
    /// Law of the finest, slowest-growing seed the field can hold; it bounds
    /// every search radius.
    pub const fn envelope(&self) -> GrowthLaw {
        GrowthLaw { density: self.min_density, growth: self.min_growth }
    }

    /// Search radius needed to see every seed that can push the field below `max`.
    pub fn search_radius(&self, max: Real) -> Real {
        self.envelope().distance_at_density(max)
    }

    fn validate(&self) -> DensityResult<()> {
        check_growth(self.min_growth)?;
        let positive = |v: Real| v.is_finite() && v > 0.0;
        if !positive(self.min_density) || !positive(self.max_density) {
            return Err(DensityError::invalid_input(format!(
                "densities need to be positive, got min {} max {}",
                self.min_density, self.max_density
            )));
        }
        if self.max_density < self.min_density {
            return Err(DensityError::invalid_input(format!(
                "maxDensity {} is smaller than minDensity {}",
                self.max_density, self.min_density
            )));
        }
        if !positive(self.max_density_simplify) {
            return Err(DensityError::invalid_input(format!(
                "maxDensitySimplify needs to be positive, got {}",
                self.max_density_simplify
            )));
        }
        Ok(())
    }
}

/// Adaptive density field.
///
/// Single writer: `add` takes `&mut self` and either incorporates a whole batch
/// or leaves the field untouched.
#[derive(Clone, Debug)]
pub struct DensityField {
    params: FieldParams,
    stride: usize,
    chunk_size: usize,
    seeds: Vec<Seed>,
    index: PointIndex,
    next_group: usize,
}

impl DensityField {
    /// Builds a field from `[x, y, density, growth]` rows with default settings.
    pub fn new<R: AsRef<[Real]>>(rows: &[R]) -> DensityResult<Self> {
        Self::with_config(rows, FieldConfig::default())
    }

    /// Builds a field from `[x, y, density, growth]` rows.
    ///
    /// Unset clamps are taken from the batch; an empty batch is only accepted
    /// when `config` provides all three of them.
    pub fn with_config<R: AsRef<[Real]>>(rows: &[R], config: FieldConfig) -> DensityResult<Self> {
        let batch = validate_rows(rows)?;

        let pick = |given: Option<Real>, column: usize, take_max: bool, name: &str| {
            given
                .or_else(|| {
                    let values = batch.iter().map(|r| r[column]);
                    if take_max {
                        values.reduce(Real::max)
                    } else {
                        values.reduce(Real::min)
                    }
                })
                .ok_or_else(|| {
                    DensityError::invalid_input(format!(
                        "{} is required when the first batch is empty",
                        name
                    ))
                })
        };
        let min_density = pick(config.min_density, 2, false, "minDensity")?;
        let max_density = pick(config.max_density, 2, true, "maxDensity")?;
        let min_growth = pick(config.min_growth, 3, false, "minGrowth")?;
        let params = FieldParams {
            min_density,
            max_density,
            min_growth,
            max_density_simplify: config.max_density_simplify.unwrap_or(max_density),
        };
        params.validate()?;

        let mut field = Self {
            params,
            stride: config.stride.max(1),
            chunk_size: config.chunk_size.max(1),
            seeds: Vec::new(),
            index: PointIndex::default(),
            next_group: 0,
        };
        field.incorporate(batch, None)?;
        Ok(field)
    }

    /// Adds a batch of `[x, y, density, growth]` rows and prunes the union.
    pub fn add<R: AsRef<[Real]>>(&mut self, rows: &[R]) -> DensityResult<()> {
        self.add_with(rows, AddOverrides::default(), None)
    }

    /// `add` with overrides and a progress observer called with
    /// `(step, total_steps)` while pruning.
    pub fn add_with<R: AsRef<[Real]>>(
        &mut self,
        rows: &[R],
        overrides: AddOverrides,
        progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> DensityResult<()> {
        let batch = validate_rows(rows)?;
        if let Some(value) = overrides.max_density_simplify {
            let params = FieldParams { max_density_simplify: value, ..self.params };
            params.validate()?;
            let previous = std::mem::replace(&mut self.params, params);
            let outcome = self.incorporate(batch, progress);
            if outcome.is_err() {
                self.params = previous;
            }
            return outcome;
        }
        self.incorporate(batch, progress)
    }

    /// Clamps, tags and merges a validated batch, then prunes.
    fn incorporate(
        &mut self,
        batch: Vec<[Real; 4]>,
        progress: Option<&mut dyn FnMut(usize, usize)>,
    ) -> DensityResult<()> {
        let group_id = self.next_group;
        let FieldParams { min_density, max_density, .. } = self.params;

        let mut merged = Vec::with_capacity(self.seeds.len() + batch.len());
        merged.extend_from_slice(&self.seeds);
        merged.extend(batch.iter().enumerate().map(|(point_id, row)| Seed {
            position: [row[0], row[1]],
            density: row[2].clamp(min_density, max_density),
            growth: row[3],
            group_id,
            point_id,
        }));

        let kept = prune::prune(merged, &self.params, self.stride, self.chunk_size, progress);
        log::debug!(
            "density field group {}: {} new rows, {} seeds kept",
            group_id,
            batch.len(),
            kept.len()
        );

        self.index = PointIndex::new(&positions(&kept));
        self.seeds = kept;
        self.next_group += 1;
        Ok(())
    }

    /// Seeds derived from the polygon's own geometry: the cone-constrained
    /// distance across the polygon ("channel width") becomes a density via the
    /// field's envelope law. With `min_length`, each density is further capped
    /// by the vertex's shortest adjacent segment.
    pub fn add_fetch(
        &mut self,
        polygon: &Polygon<Real>,
        options: FetchOptions,
        min_length: bool,
    ) -> DensityResult<()> {
        let envelope = self.params.envelope();
        let options = FetchOptions {
            max_distance: self.params.search_radius(self.params.max_density),
            ..options
        };
        let mut rows = inearest_polygon(polygon, &options)?;
        for row in rows.iter_mut() {
            row[2] = envelope.density_at_distance(row[2]);
        }
        if min_length {
            let segments = min_segment(polygon);
            for (row, segment) in rows.iter_mut().zip(segments) {
                row[2] = row[2].min(segment[2]);
            }
        }
        let growth = self.params.min_growth;
        let batch: Vec<[Real; 4]> = rows
            .into_iter()
            .filter(|r| r[2] > 0.0)
            .map(|[x, y, d]| [x, y, d, growth])
            .collect();
        self.add(&batch)
    }

    pub const fn min_density(&self) -> Real {
        self.params.min_density
    }

    pub const fn max_density(&self) -> Real {
        self.params.max_density
    }

    pub const fn min_growth(&self) -> Real {
        self.params.min_growth
    }

    pub const fn max_density_simplify(&self) -> Real {
        self.params.max_density_simplify
    }

    /// Conservative law `(min_density, min_growth)`.
    pub const fn envelope(&self) -> GrowthLaw {
        self.params.envelope()
    }

    /// Radius beyond which no seed can ask for less than `max`.
    pub fn search_radius(&self, max: Real) -> Real {
        self.params.search_radius(max)
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Required spacing at every point.
    pub fn get_density(&self, points: &[[Real; 2]]) -> Vec<Real> {
        self.get_density_with(points, DensityQuery::default())
    }

    /// Required spacing at every point, with per-call overrides.
    ///
    /// The result lies in `[min_density, max]` where `max` is the override or
    /// the field's `max_density`. Points without any seed in reach get `max`.
    pub fn get_density_with(&self, points: &[[Real; 2]], query: DensityQuery<'_>) -> Vec<Real> {
        let max = query.max_density.unwrap_or(self.params.max_density);
        let min = self.params.min_density.min(max);
        self.nearest_influence(points, max, query.seeds)
            .into_iter()
            .map(|winner| match winner {
                Some((_, value)) => value.clamp(min, max),
                None => max,
            })
            .collect()
    }

    /// Index (into `seeds`, or the field's own seeds) of the seed imposing the
    /// finest spacing at each point; `None` where no seed is in reach.
    pub fn winning_seeds(
        &self,
        points: &[[Real; 2]],
        max_density: Real,
        seeds: Option<&[Seed]>,
    ) -> Vec<Option<usize>> {
        self.nearest_influence(points, max_density, seeds)
            .into_iter()
            .map(|winner| winner.map(|(index, _)| index))
            .collect()
    }

    fn nearest_influence(
        &self,
        points: &[[Real; 2]],
        max_density: Real,
        seeds: Option<&[Seed]>,
    ) -> Vec<Option<(usize, Real)>> {
        let radius = self.params.search_radius(max_density);
        match seeds {
            Some(seeds) => {
                let index = PointIndex::new(&positions(seeds));
                influence(seeds, &index, points, radius, self.chunk_size)
            },
            None => influence(&self.seeds, &self.index, points, radius, self.chunk_size),
        }
    }

    /// `[min_x, min_y, max_x, max_y]` of the seeds.
    pub fn extent(&self) -> Option<[Real; 4]> {
        let first = self.seeds.first()?;
        let init = [first.position[0], first.position[1], first.position[0], first.position[1]];
        Some(self.seeds.iter().fold(init, |[x0, y0, x1, y1], s| {
            let [x, y] = s.position;
            [x0.min(x), y0.min(y), x1.max(x), y1.max(y)]
        }))
    }

    /// Field sampled on an `nx × nx` grid spanning `extent` (defaults to the seed
    /// extent) padded by 5% on every side. Returns the x ticks, the y ticks and
    /// the row-major values (`values[iy * nx + ix]`).
    pub fn sample_grid(
        &self,
        extent: Option<[Real; 4]>,
        nx: usize,
    ) -> Option<(Vec<Real>, Vec<Real>, Vec<Real>)> {
        let [x0, y0, x1, y1] = extent.or_else(|| self.extent())?;
        let nx = nx.max(2);
        let (xpad, ypad) = ((x1 - x0) * 0.05, (y1 - y0) * 0.05);
        let ticks = |lo: Real, hi: Real| -> Vec<Real> {
            (0..nx)
                .map(|i| lo + (hi - lo) * i as Real / (nx - 1) as Real)
                .collect()
        };
        let xs = ticks(x0 - xpad, x1 + xpad);
        let ys = ticks(y0 - ypad, y1 + ypad);
        let grid: Vec<[Real; 2]> = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| [x, y]))
            .collect();
        let values = self.get_density(&grid);
        Some((xs, ys, values))
    }
}

impl SpacingField for DensityField {
    fn min_spacing(&self) -> Real {
        self.params.min_density
    }

    fn max_spacing(&self) -> Real {
        self.params.max_density
    }

    fn spacing(&self, points: &[[Real; 2]]) -> Vec<Real> {
        self.get_density(points)
    }
}

pub(crate) fn positions(seeds: &[Seed]) -> Vec<[Real; 2]> {
    seeds.iter().map(|s| s.position).collect()
}

/// Winner `(seed index, implied density)` per query point. The lowest seed
/// index wins ties.
pub(crate) fn influence(
    seeds: &[Seed],
    index: &PointIndex,
    points: &[[Real; 2]],
    radius: Real,
    chunk_size: usize,
) -> Vec<Option<(usize, Real)>> {
    index.map_chunks(points, radius, chunk_size, |_, chunk, table| {
        chunk
            .iter()
            .enumerate()
            .map(|(row, &[px, py])| {
                let mut best: Option<(usize, Real)> = None;
                for &i in table.neighbors(row) {
                    let seed = &seeds[i];
                    let distance = (seed.position[0] - px).hypot(seed.position[1] - py);
                    let value = implied_density(seed.density, seed.growth, distance);
                    if best.is_none_or(|(_, b)| value < b) {
                        best = Some((i, value));
                    }
                }
                best
            })
            .collect()
    })
}

/// Checks every row before anything is mutated.
fn validate_rows<R: AsRef<[Real]>>(rows: &[R]) -> DensityResult<Vec<[Real; 4]>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let row = row.as_ref();
            let &[x, y, density, growth] = row else {
                return Err(DensityError::invalid_input(format!(
                    "Needs 2D array of [x, y, density, growth]; row {} has {} columns",
                    i,
                    row.len()
                )));
            };
            if !(x.is_finite() && y.is_finite()) {
                return Err(DensityError::invalid_input(format!(
                    "row {} has a non-finite coordinate",
                    i
                )));
            }
            if !(density.is_finite() && density > 0.0) {
                return Err(DensityError::invalid_input(format!(
                    "row {} has a non-positive density {}",
                    i, density
                )));
            }
            check_growth(growth)?;
            Ok([x, y, density, growth])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of_seeds() -> Vec<[Real; 4]> {
        vec![
            [0.0, 0.0, 1.0, 1.2],
            [10.0, 0.0, 5.0, 1.2],
            [20.0, 0.0, 2.0, 1.2],
            [30.0, 0.0, 1.0, 1.2],
            [40.0, 0.0, 3.0, 1.2],
        ]
    }

    fn config(min: Real, max: Real) -> FieldConfig {
        FieldConfig {
            min_density: Some(min),
            max_density: Some(max),
            min_growth: Some(1.2),
            ..FieldConfig::default()
        }
    }

    #[test]
    fn clamps_come_from_the_first_batch() {
        let field = DensityField::new(&line_of_seeds()).unwrap();
        assert_eq!(field.min_density(), 1.0);
        assert_eq!(field.max_density(), 5.0);
        assert_eq!(field.min_growth(), 1.2);
        assert_eq!(field.max_density_simplify(), 5.0);
    }

    #[test]
    fn densities_are_clamped_on_insertion() {
        let field =
            DensityField::with_config(&[[0.0, 0.0, 0.1, 1.2], [500.0, 0.0, 50.0, 1.2]], config(1.0, 10.0))
                .unwrap();
        let densities: Vec<Real> = field.seeds().iter().map(|s| s.density).collect();
        assert_eq!(densities, vec![1.0, 10.0]);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let rows = vec![vec![0.0, 0.0, 1.0, 1.2], vec![1.0, 1.0, 1.0]];
        assert!(matches!(
            DensityField::new(&rows),
            Err(DensityError::InvalidInput { .. })
        ));
        assert!(matches!(
            DensityField::new(&[[0.0, 0.0, 1.0, 1.0]]),
            Err(DensityError::InvalidGrowth { .. })
        ));
        let empty: [[Real; 4]; 0] = [];
        assert!(DensityField::new(&empty).is_err());
        assert!(DensityField::with_config(&empty, config(1.0, 10.0)).is_ok());
    }

    #[test]
    fn failed_add_leaves_field_untouched() {
        let mut field = DensityField::with_config(&line_of_seeds(), config(1.0, 10.0)).unwrap();
        let before: Vec<Seed> = field.seeds().to_vec();
        let bad = vec![vec![100.0, 0.0, 1.0, 1.2], vec![200.0, 0.0, 1.0, 0.5]];
        assert!(field.add(&bad).is_err());
        assert_eq!(field.seeds(), before.as_slice());

        field.add(&[[100.0, 0.0, 1.0, 1.2]]).unwrap();
        let added = field.seeds().last().unwrap();
        assert_eq!(added.group_id, 1);
        assert_eq!(added.point_id, 0);
    }

    #[test]
    fn density_grows_linearly_away_from_a_seed() {
        let field = DensityField::with_config(&[[0.0, 0.0, 1.0, 1.2]], config(1.0, 5.0)).unwrap();
        let d = field.get_density(&[[0.0, 0.0], [1.0, 0.0], [10.0, 0.0], [25.0, 0.0], [100.0, 0.0]]);
        assert!((d[0] - 1.0).abs() < 1e-12);
        assert!((d[1] - 1.2).abs() < 1e-12);
        assert!((d[2] - 3.0).abs() < 1e-12);
        assert_eq!(d[3], 5.0);
        assert_eq!(d[4], 5.0);
    }

    #[test]
    fn query_overrides() {
        let field = DensityField::with_config(&[[0.0, 0.0, 1.0, 1.2]], config(1.0, 5.0)).unwrap();
        let capped = field.get_density_with(
            &[[0.0, 0.0], [10.0, 0.0]],
            DensityQuery { max_density: Some(2.0), seeds: None },
        );
        assert_eq!(capped[1], 2.0);

        let other = [Seed { position: [10.0, 0.0], density: 1.0, growth: 1.2, group_id: 0, point_id: 0 }];
        let moved = field.get_density_with(
            &[[10.0, 0.0]],
            DensityQuery { max_density: None, seeds: Some(&other) },
        );
        assert_eq!(moved[0], 1.0);
    }

    #[test]
    fn winners_report_missing_neighbors_explicitly() {
        let field = DensityField::with_config(&line_of_seeds(), config(1.0, 10.0)).unwrap();
        let winners = field.winning_seeds(&[[0.5, 0.0], [1.0e6, 0.0]], 10.0, None);
        assert_eq!(winners, vec![Some(0), None]);
    }

    #[test]
    fn extent_and_grid() {
        let field = DensityField::with_config(&line_of_seeds(), config(1.0, 10.0)).unwrap();
        assert_eq!(field.extent(), Some([0.0, 0.0, 30.0, 0.0]));
        let (xs, ys, values) = field.sample_grid(None, 10).unwrap();
        assert_eq!(xs.len(), 10);
        assert_eq!(ys.len(), 10);
        assert_eq!(values.len(), 100);
        assert!(values.iter().all(|v| (1.0..=10.0).contains(v)));
    }
}
