// Our Real scalar type:
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used across the crate.
/// Can be overridden:
///  1) **Build-time**: set env var `DENSEFIELD_TOLERANCE` (e.g. `DENSEFIELD_TOLERANCE=1e-6 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    1e-9
}

/// Returns the current tolerance value.
/// If not set yet, it tries `DENSEFIELD_TOLERANCE` (parsed as `Real`) and
/// falls back to a sensible default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        // Compile-time env if provided, inherited by dependencies
        if let Some(environment_variable) = option_env!("DENSEFIELD_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `densefield::float_types::set_tolerance(1e-6);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;

/// Scale used to snap coordinates before point-on-line tests (12 decimals).
pub const SNAP_SCALE: Real = 1e12;

/// Round `value` to the grid implied by `scale` (`1e12` keeps 12 decimals).
#[inline]
pub fn snap(value: Real, scale: Real) -> Real {
    (value * scale).round() / scale
}
