//! **Geometric growth law**
//!
//! A seed with spacing `d` and growth factor `g` asks for the spacing to grow
//! geometrically with every "ring" of elements laid away from it:
//!
//! ```text
//! D(n) = d·gⁿ                          spacing of the n-th element
//! l(n) = (d·g⁽ⁿ⁺¹⁾ − d) / (g − 1)       distance covered after n+1 elements
//! n(D) = max(0, ln(D/d) / ln g)
//! n(l) = max(0, ln(l·(g−1)/d + 1) / ln g − shift)
//! ```
//!
//! `l(0) = d`, so the inverse of `l(n)` carries a shift of one step. Which side
//! of the element a distance refers to is selected with [`Convention`].
//! Every routine of the density field uses [`Convention::Arrival`], for which
//! `D(l) = d + l·(g − 1)`.

use crate::errors::{DensityError, DensityResult};
use crate::float_types::Real;

/// How a distance is mapped back to a step index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Convention {
    /// `n(l)` counts the elements needed to *arrive* at `l` (shift 0).
    #[default]
    Arrival,
    /// `n(l)` is the exact inverse of `l(n)` (shift 1).
    Departure,
}

impl Convention {
    #[inline]
    const fn shift(self) -> Real {
        match self {
            Convention::Arrival => 0.0,
            Convention::Departure => 1.0,
        }
    }
}

/// Growth law of a single seed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthLaw {
    pub density: Real,
    pub growth: Real,
}

impl GrowthLaw {
    /// Checked constructor: `density` must be positive, `growth` larger than one.
    pub fn new(density: Real, growth: Real) -> DensityResult<Self> {
        check_growth(growth)?;
        if !(density.is_finite() && density > 0.0) {
            return Err(DensityError::invalid_input(format!(
                "density needs to be positive and finite, got {}",
                density
            )));
        }
        Ok(Self { density, growth })
    }

    /// `D(n)`
    #[inline]
    pub fn density_at_step(&self, n: Real) -> Real {
        self.density * self.growth.powf(n)
    }

    /// `n(D)`, zero for targets finer than the seed itself.
    #[inline]
    pub fn step_at_density(&self, target: Real) -> Real {
        let ratio = (target / self.density).max(1.0);
        ratio.ln() / self.growth.ln()
    }

    /// `l(n)`
    #[inline]
    pub fn distance_at_step(&self, n: Real) -> Real {
        (self.density * self.growth.powf(n + 1.0) - self.density) / (self.growth - 1.0)
    }

    /// `l(D) = l(n(D))`
    #[inline]
    pub fn distance_at_density(&self, target: Real) -> Real {
        self.distance_at_step(self.step_at_density(target))
    }

    /// `n(l)` under the given convention.
    #[inline]
    pub fn step_at_distance(&self, distance: Real, convention: Convention) -> Real {
        let n = (distance * (self.growth - 1.0) / self.density + 1.0).ln() / self.growth.ln()
            - convention.shift();
        n.max(0.0)
    }

    /// `D(l) = D(n(l))` using [`Convention::Arrival`].
    #[inline]
    pub fn density_at_distance(&self, distance: Real) -> Real {
        self.density_at_distance_with(distance, Convention::Arrival)
    }

    #[inline]
    pub fn density_at_distance_with(&self, distance: Real, convention: Convention) -> Real {
        self.density_at_step(self.step_at_distance(distance, convention))
    }
}

/// Fails with [`DensityError::InvalidGrowth`] unless `growth > 1`.
#[inline]
pub fn check_growth(growth: Real) -> DensityResult<()> {
    // NaN fails this comparison as well
    if growth > 1.0 && growth.is_finite() {
        Ok(())
    } else {
        Err(DensityError::InvalidGrowth { growth })
    }
}

/// Shorthand for the field routines: `D(l)` for a seed, no validation.
#[inline]
pub(crate) fn implied_density(density: Real, growth: Real, distance: Real) -> Real {
    GrowthLaw { density, growth }.density_at_distance(distance)
}

/// Batch evaluation of the growth law.
///
/// Every routine takes rows of `(d, g, x)` and validates all growth factors
/// before computing anything.
pub mod batch {
    use super::{Convention, GrowthLaw, check_growth};
    use crate::errors::DensityResult;
    use crate::float_types::Real;

    fn evaluate<F>(rows: &[[Real; 3]], f: F) -> DensityResult<Vec<Real>>
    where
        F: Fn(&GrowthLaw, Real) -> Real,
    {
        for row in rows {
            check_growth(row[1])?;
        }
        Ok(rows
            .iter()
            .map(|&[density, growth, x]| f(&GrowthLaw { density, growth }, x))
            .collect())
    }

    /// Same `(d, g)` for every `x`.
    pub fn rows(density: Real, growth: Real, xs: &[Real]) -> Vec<[Real; 3]> {
        xs.iter().map(|&x| [density, growth, x]).collect()
    }

    pub fn density_at_step(rows: &[[Real; 3]]) -> DensityResult<Vec<Real>> {
        evaluate(rows, GrowthLaw::density_at_step)
    }

    pub fn step_at_density(rows: &[[Real; 3]]) -> DensityResult<Vec<Real>> {
        evaluate(rows, GrowthLaw::step_at_density)
    }

    pub fn distance_at_step(rows: &[[Real; 3]]) -> DensityResult<Vec<Real>> {
        evaluate(rows, GrowthLaw::distance_at_step)
    }

    pub fn distance_at_density(rows: &[[Real; 3]]) -> DensityResult<Vec<Real>> {
        evaluate(rows, GrowthLaw::distance_at_density)
    }

    pub fn step_at_distance(
        rows: &[[Real; 3]],
        convention: Convention,
    ) -> DensityResult<Vec<Real>> {
        evaluate(rows, |law, l| law.step_at_distance(l, convention))
    }

    pub fn density_at_distance(rows: &[[Real; 3]]) -> DensityResult<Vec<Real>> {
        evaluate(rows, GrowthLaw::density_at_distance)
    }
}
