use super::{DensityField, FieldParams, Seed, positions};
use crate::errors::{DensityError, DensityResult};
use crate::float_types::Real;
use crate::growth::check_growth;
use crate::spatial::{DEFAULT_CHUNK_SIZE, PointIndex};

/// Persisted form of a [`DensityField`].
///
/// Restoring it does not prune again: the seeds come back exactly as saved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldState {
    pub min_density: Real,
    pub max_density: Real,
    pub min_growth: Real,
    /// `[x, y, density, growth, group_id, point_id]`
    pub seeds: Vec<[Real; 6]>,
}

impl DensityField {
    pub fn state(&self) -> FieldState {
        FieldState {
            min_density: self.params.min_density,
            max_density: self.params.max_density,
            min_growth: self.params.min_growth,
            seeds: self.seeds.iter().map(Seed::to_row).collect(),
        }
    }

    pub fn from_state(state: FieldState) -> DensityResult<Self> {
        let params = FieldParams {
            min_density: state.min_density,
            max_density: state.max_density,
            min_growth: state.min_growth,
            max_density_simplify: state.max_density,
        };
        params.validate()?;

        let seeds = state
            .seeds
            .iter()
            .enumerate()
            .map(|(i, &[x, y, density, growth, group_id, point_id])| {
                check_growth(growth)?;
                let index = |v: Real| v >= 0.0 && v.fract() == 0.0;
                if !(x.is_finite() && y.is_finite() && density > 0.0)
                    || !index(group_id)
                    || !index(point_id)
                {
                    return Err(DensityError::invalid_input(format!(
                        "state row {} is not [x, y, density, growth, group_id, point_id]",
                        i
                    )));
                }
                Ok(Seed {
                    position: [x, y],
                    density,
                    growth,
                    group_id: group_id as usize,
                    point_id: point_id as usize,
                })
            })
            .collect::<DensityResult<Vec<Seed>>>()?;

        let next_group = seeds.iter().map(|s| s.group_id + 1).max().unwrap_or(0);
        Ok(Self {
            params,
            stride: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
            index: PointIndex::new(&positions(&seeds)),
            seeds,
            next_group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trip_is_lossless() {
        let field = DensityField::new(&[
            [0.0, 0.0, 1.0, 1.2],
            [10.0, 0.0, 5.0, 1.3],
            [20.0, 0.0, 2.0, 1.2],
            [30.0, 0.0, 1.0, 1.2],
        ])
        .unwrap();
        let state = field.state();
        let restored = DensityField::from_state(state.clone()).unwrap();
        assert_eq!(restored.state(), state);
        assert_eq!(restored.seeds(), field.seeds());

        let queries = [[5.0, 0.0], [15.0, 3.0], [100.0, 100.0]];
        assert_eq!(restored.get_density(&queries), field.get_density(&queries));
    }

    #[test]
    fn restored_field_continues_group_numbering() {
        let field = DensityField::new(&[[0.0, 0.0, 1.0, 1.2], [50.0, 0.0, 4.0, 1.2]]).unwrap();
        let mut restored = DensityField::from_state(field.state()).unwrap();
        restored.add(&[[-50.0, 0.0, 1.0, 1.2]]).unwrap();
        assert!(restored.seeds().iter().any(|s| s.group_id == 1));
    }

    #[test]
    fn corrupt_rows_are_rejected() {
        let state = FieldState {
            min_density: 1.0,
            max_density: 5.0,
            min_growth: 1.2,
            seeds: vec![[0.0, 0.0, 1.0, 1.2, 0.5, 0.0]],
        };
        assert!(DensityField::from_state(state).is_err());
    }
}
