//! Arc-length parametrized polyline.

use crate::float_types::Real;
use geo::{Coord, LineString};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Chain {
    coords: Vec<[Real; 2]>,
    /// `cumulative[i]` is the arc length at `coords[i]`.
    cumulative: Vec<Real>,
}

impl Chain {
    pub fn new(coords: Vec<[Real; 2]>) -> Self {
        let mut cumulative = Vec::with_capacity(coords.len());
        let mut total = 0.0;
        for (i, c) in coords.iter().enumerate() {
            if i > 0 {
                total += distance(coords[i - 1], *c);
            }
            cumulative.push(total);
        }
        Self { coords, cumulative }
    }

    pub fn from_line_string(line: &LineString<Real>) -> Self {
        Self::new(line.coords().map(|c| [c.x, c.y]).collect())
    }

    pub fn into_line_string(coords: Vec<[Real; 2]>) -> LineString<Real> {
        LineString::new(coords.into_iter().map(|[x, y]| Coord { x, y }).collect())
    }

    pub fn coords(&self) -> &[[Real; 2]] {
        &self.coords
    }

    pub fn cumulative(&self) -> &[Real] {
        &self.cumulative
    }

    pub fn length(&self) -> Real {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn first(&self) -> Option<[Real; 2]> {
        self.coords.first().copied()
    }

    pub fn last(&self) -> Option<[Real; 2]> {
        self.coords.last().copied()
    }

    /// Point at arc length `along`, clamped to the chain.
    pub fn interpolate(&self, along: Real) -> [Real; 2] {
        let Some(&first) = self.coords.first() else {
            return [Real::NAN, Real::NAN];
        };
        if along <= 0.0 {
            return first;
        }
        // first vertex at or past `along`
        let i = self.cumulative.partition_point(|&l| l < along);
        if i >= self.coords.len() {
            return self.coords[self.coords.len() - 1];
        }
        let (l0, l1) = (self.cumulative[i - 1], self.cumulative[i]);
        let t = if l1 > l0 { (along - l0) / (l1 - l0) } else { 0.0 };
        lerp(self.coords[i - 1], self.coords[i], t)
    }

    /// Arc length of the point of the chain closest to `point`, and the
    /// distance to it. The first segment wins ties.
    pub fn project(&self, point: [Real; 2]) -> (Real, Real) {
        if self.coords.len() < 2 {
            let d = self.first().map_or(Real::INFINITY, |c| distance(c, point));
            return (0.0, d);
        }
        let mut best = (0.0, Real::INFINITY);
        for (i, w) in self.coords.windows(2).enumerate() {
            let (a, b) = (w[0], w[1]);
            let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
            let len2 = dx * dx + dy * dy;
            let t = if len2 > 0.0 {
                (((point[0] - a[0]) * dx + (point[1] - a[1]) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let d = distance(lerp(a, b, t), point);
            if d < best.1 {
                best = (self.cumulative[i] + t * len2.sqrt(), d);
            }
        }
        best
    }
}

#[inline]
pub(crate) fn distance(a: [Real; 2], b: [Real; 2]) -> Real {
    (b[0] - a[0]).hypot(b[1] - a[1])
}

#[inline]
fn lerp(a: [Real; 2], b: [Real; 2], t: Real) -> [Real; 2] {
    [a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ell() -> Chain {
        Chain::new(vec![[0.0, 0.0], [3.0, 0.0], [3.0, 4.0]])
    }

    #[test]
    fn interpolation_clamps_to_the_ends() {
        let chain = ell();
        assert_eq!(chain.length(), 7.0);
        assert_eq!(chain.interpolate(-1.0), [0.0, 0.0]);
        assert_eq!(chain.interpolate(1.5), [1.5, 0.0]);
        assert_eq!(chain.interpolate(3.0), [3.0, 0.0]);
        assert_eq!(chain.interpolate(5.0), [3.0, 2.0]);
        assert_eq!(chain.interpolate(70.0), [3.0, 4.0]);
    }

    #[test]
    fn projection_finds_the_closest_segment() {
        let chain = ell();
        let (along, d) = chain.project([1.0, -2.0]);
        assert_eq!((along, d), (1.0, 2.0));
        let (along, d) = chain.project([5.0, 3.0]);
        assert_eq!((along, d), (6.0, 2.0));
    }
}
