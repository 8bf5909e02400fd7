use crate::float_types::Real;

/// Anything that can tell the resampler which spacing is required where.
pub trait SpacingField {
    /// Finest spacing the field can ever ask for.
    fn min_spacing(&self) -> Real;

    /// Coarsest spacing the field can ever ask for.
    fn max_spacing(&self) -> Real;

    /// Required spacing at each point, within `[min_spacing, max_spacing]`.
    fn spacing(&self, points: &[[Real; 2]]) -> Vec<Real>;

    /// Required spacing at a single point.
    fn spacing_at(&self, point: [Real; 2]) -> Real {
        self.spacing(&[point])
            .first()
            .copied()
            .unwrap_or_else(|| self.max_spacing())
    }
}

/// The same spacing everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSpacing(pub Real);

impl SpacingField for UniformSpacing {
    fn min_spacing(&self) -> Real {
        self.0
    }

    fn max_spacing(&self) -> Real {
        self.0
    }

    fn spacing(&self, points: &[[Real; 2]]) -> Vec<Real> {
        vec![self.0; points.len()]
    }
}

impl<T: SpacingField + ?Sized> SpacingField for &T {
    fn min_spacing(&self) -> Real {
        (**self).min_spacing()
    }

    fn max_spacing(&self) -> Real {
        (**self).max_spacing()
    }

    fn spacing(&self, points: &[[Real; 2]]) -> Vec<Real> {
        (**self).spacing(points)
    }
}
