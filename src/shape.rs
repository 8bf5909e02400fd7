//! One type for every geometry the crate operates on.
//!
//! [`Shape`] is a closed set of the six `geo` kinds the resampler, simplifier and
//! fetch estimator understand. Each operation dispatches on the variant and
//! leaves the kinds it does not apply to untouched.

use crate::errors::{DensityError, DensityResult};
use crate::field::DensityField;
use crate::fetch::{FetchOptions, inearest_polygon};
use crate::float_types::Real;
use crate::resample::{
    dresample_line_string, dresample_polygon, resample_line_string, resample_near_line_string,
    resample_near_polygon, resample_polygon,
};
use crate::simplify::{SimplifyOptions, dsimplify_polygon};
use crate::sketch;
use crate::traits::SpacingField;
use geo::{
    CoordsIter, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Point<Real>),
    LineString(LineString<Real>),
    Polygon(Polygon<Real>),
    MultiPoint(MultiPoint<Real>),
    MultiLineString(MultiLineString<Real>),
    MultiPolygon(MultiPolygon<Real>),
}

impl Shape {
    /// Uniform resampling; points are returned as is.
    pub fn resample(&self, max_length: Real) -> Shape {
        match self {
            Shape::LineString(l) => Shape::LineString(resample_line_string(l, max_length)),
            Shape::Polygon(p) => Shape::Polygon(resample_polygon(p, max_length)),
            Shape::MultiLineString(ml) => Shape::MultiLineString(
                ml.iter().map(|l| resample_line_string(l, max_length)).collect(),
            ),
            Shape::MultiPolygon(mp) => {
                Shape::MultiPolygon(mp.iter().map(|p| resample_polygon(p, max_length)).collect())
            },
            Shape::Point(_) | Shape::MultiPoint(_) => self.clone(),
        }
    }

    /// Density-driven resampling; points are returned as is.
    pub fn dresample<F: SpacingField + ?Sized>(
        &self,
        field: &F,
        anchors: Option<&[[Real; 2]]>,
    ) -> DensityResult<Shape> {
        Ok(match self {
            Shape::LineString(l) => Shape::LineString(dresample_line_string(l, field, anchors)?),
            Shape::Polygon(p) => Shape::Polygon(dresample_polygon(p, field, anchors)?),
            Shape::MultiLineString(ml) => Shape::MultiLineString(MultiLineString::new(
                ml.iter()
                    .map(|l| dresample_line_string(l, field, anchors))
                    .collect::<DensityResult<_>>()?,
            )),
            Shape::MultiPolygon(mp) => Shape::MultiPolygon(MultiPolygon::new(
                mp.iter()
                    .map(|p| dresample_polygon(p, field, anchors))
                    .collect::<DensityResult<_>>()?,
            )),
            Shape::Point(_) | Shape::MultiPoint(_) => self.clone(),
        })
    }

    /// Adds a vertex wherever `feature`, resampled uniformly at `min_density`,
    /// projects onto a line or ring. With `within`, only feature points that
    /// close to the curve count. Points are returned as is.
    pub fn resample_near(
        &self,
        feature: &Shape,
        min_density: Real,
        within: Option<Real>,
    ) -> DensityResult<Shape> {
        let points = feature.resample(min_density).coords();
        Ok(match self {
            Shape::LineString(l) => {
                Shape::LineString(resample_near_line_string(l, &points, within)?)
            },
            Shape::Polygon(p) => Shape::Polygon(resample_near_polygon(p, &points, within)?),
            Shape::MultiLineString(ml) => Shape::MultiLineString(MultiLineString::new(
                ml.iter()
                    .map(|l| resample_near_line_string(l, &points, within))
                    .collect::<DensityResult<_>>()?,
            )),
            Shape::MultiPolygon(mp) => Shape::MultiPolygon(MultiPolygon::new(
                mp.iter()
                    .map(|p| resample_near_polygon(p, &points, within))
                    .collect::<DensityResult<_>>()?,
            )),
            Shape::Point(_) | Shape::MultiPoint(_) => self.clone(),
        })
    }

    /// Density-aware simplification. Polygons become multipolygons; the parts
    /// of a multipolygon are simplified one by one and united. Points and lines
    /// are returned as is.
    pub fn dsimplify(
        &self,
        field: &DensityField,
        options: &SimplifyOptions<'_>,
    ) -> DensityResult<Shape> {
        Ok(match self {
            Shape::Polygon(p) => Shape::MultiPolygon(dsimplify_polygon(p, field, options, None)?),
            Shape::MultiPolygon(mp) => Shape::MultiPolygon(sketch::union_all(
                mp.iter()
                    .map(|p| dsimplify_polygon(p, field, options, None))
                    .collect::<DensityResult<Vec<_>>>()?,
            )),
            _ => self.clone(),
        })
    }

    /// Interior-nearest rows of every polygon; empty for other kinds.
    pub fn inearest(&self, options: &FetchOptions) -> DensityResult<Vec<[Real; 3]>> {
        match self {
            Shape::Polygon(p) => inearest_polygon(p, options),
            Shape::MultiPolygon(mp) => {
                let mut rows = Vec::new();
                for p in mp {
                    rows.extend(inearest_polygon(p, options)?);
                }
                Ok(rows)
            },
            _ => Ok(Vec::new()),
        }
    }

    /// Drops holes not larger than `area`.
    pub fn remove_holes(&self, area: Real) -> Shape {
        match self {
            Shape::Polygon(p) => Shape::Polygon(sketch::remove_holes(p, area)),
            Shape::MultiPolygon(mp) => Shape::MultiPolygon(sketch::remove_holes_multi(mp, area)),
            _ => self.clone(),
        }
    }

    /// Largest part of a multipolygon; other kinds are returned as is.
    pub fn largest(&self) -> Shape {
        match self {
            Shape::MultiPolygon(mp) => match sketch::largest(mp) {
                Some(p) => Shape::Polygon(p),
                None => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Polygons without their holes.
    pub fn exterior(&self) -> Shape {
        match self {
            Shape::Polygon(p) => Shape::Polygon(Polygon::new(p.exterior().clone(), vec![])),
            Shape::MultiPolygon(mp) => Shape::MultiPolygon(sketch::exterior(mp)),
            _ => self.clone(),
        }
    }

    /// Every coordinate, rings included, in storage order.
    pub fn coords(&self) -> Vec<[Real; 2]> {
        let geometry: Geometry<Real> = self.clone().into();
        geometry.coords_iter().map(|c| [c.x, c.y]).collect()
    }
}

impl From<Shape> for Geometry<Real> {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Point(g) => Geometry::Point(g),
            Shape::LineString(g) => Geometry::LineString(g),
            Shape::Polygon(g) => Geometry::Polygon(g),
            Shape::MultiPoint(g) => Geometry::MultiPoint(g),
            Shape::MultiLineString(g) => Geometry::MultiLineString(g),
            Shape::MultiPolygon(g) => Geometry::MultiPolygon(g),
        }
    }
}

impl TryFrom<Geometry<Real>> for Shape {
    type Error = DensityError;

    /// Lines, rectangles and triangles are widened to line strings and polygons.
    /// Collections must hold a single dimension and become the matching multi
    /// variant.
    fn try_from(geometry: Geometry<Real>) -> DensityResult<Self> {
        Ok(match geometry {
            Geometry::Point(g) => Shape::Point(g),
            Geometry::Line(g) => Shape::LineString(LineString::from(vec![g.start, g.end])),
            Geometry::LineString(g) => Shape::LineString(g),
            Geometry::Polygon(g) => Shape::Polygon(g),
            Geometry::MultiPoint(g) => Shape::MultiPoint(g),
            Geometry::MultiLineString(g) => Shape::MultiLineString(g),
            Geometry::MultiPolygon(g) => Shape::MultiPolygon(g),
            Geometry::Rect(g) => Shape::Polygon(g.to_polygon()),
            Geometry::Triangle(g) => Shape::Polygon(g.to_polygon()),
            Geometry::GeometryCollection(collection) => {
                let parts = collection
                    .0
                    .into_iter()
                    .map(Shape::try_from)
                    .collect::<DensityResult<Vec<_>>>()?;
                flatten(parts)?
            },
        })
    }
}

/// Merges same-dimension shapes into one multi variant.
fn flatten(parts: Vec<Shape>) -> DensityResult<Shape> {
    let mut points = Vec::new();
    let mut lines = Vec::new();
    let mut polygons = Vec::new();
    for part in parts {
        match part {
            Shape::Point(p) => points.push(p),
            Shape::MultiPoint(mp) => points.extend(mp),
            Shape::LineString(l) => lines.push(l),
            Shape::MultiLineString(ml) => lines.extend(ml),
            Shape::Polygon(p) => polygons.push(p),
            Shape::MultiPolygon(mp) => polygons.extend(mp),
        }
    }
    match (points.is_empty(), lines.is_empty(), polygons.is_empty()) {
        (false, true, true) => Ok(Shape::MultiPoint(MultiPoint::new(points))),
        (true, false, true) => Ok(Shape::MultiLineString(MultiLineString::new(lines))),
        (true, true, false) => Ok(Shape::MultiPolygon(MultiPolygon::new(polygons))),
        (true, true, true) => Err(DensityError::invalid_input("Geometry collection is empty")),
        _ => Err(DensityError::invalid_input(format!(
            "Geometry collection mixes {} points, {} lines and {} polygons",
            points.len(),
            lines.len(),
            polygons.len()
        ))),
    }
}
