//! An **adaptive density field** for graded resampling and simplification of 2D
//! curves and polygons, as needed by mesh generators.
//!
//! A [`DensityField`] holds weighted seed points. Each seed asks for a target
//! spacing at its position and lets it grow geometrically with distance (see
//! [`growth`]). The field answers "which spacing is required at P?" and drives:
//! - [`resample`]: boundaries re-cut into vertices whose spacing grades smoothly
//!   between fine and coarse regions,
//! - [`simplify`]: polygons whose detail follows the local spacing,
//! - [`fetch`]: seeds derived from the width of a polygon's channels.
//!
//! ```
//! use densefield::{DensityField, resample::dresample_line_string};
//! use geo::line_string;
//!
//! let field = DensityField::with_config(
//!     &[[0.0, 0.0, 1.0, 1.2]],
//!     densefield::FieldConfig { max_density: Some(5.0), ..Default::default() },
//! )
//! .unwrap();
//! let line = line_string![(x: 0.0, y: 0.0), (x: 30.0, y: 0.0)];
//! let graded = dresample_line_string(&line, &field, None).unwrap();
//! assert_eq!(graded.0.len(), 12);
//! ```
//!
//! # Features
//! #### Default
//! - none; the crate is `f64` throughout
//!
//! #### Optional
//! - **parallel**: use rayon for chunked neighbor queries and `geo`'s multithreading
//! - **serde**: `Serialize`/`Deserialize` for [`FieldState`] and [`Seed`]

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod fetch;
pub mod field;
pub mod float_types;
pub mod growth;
pub mod resample;
pub mod shape;
pub mod simplify;
pub mod sketch;
pub mod spatial;
pub mod traits;

pub use errors::{DensityError, DensityResult};
pub use fetch::FetchOptions;
pub use field::{AddOverrides, DensityField, DensityQuery, FieldConfig, FieldState, Seed};
pub use growth::{Convention, GrowthLaw};
pub use shape::Shape;
pub use simplify::SimplifyOptions;
pub use traits::{SpacingField, UniformSpacing};
