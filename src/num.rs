//! Utilities related to numbers.

use num;
use std::fmt;

/// Floating point marker trait for easier control over trait bounds.
pub trait BFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + Default + fmt::Debug + fmt::Display
{
}

impl BFloat for f32 {}
impl BFloat for f64 {}

/// Converts a value of one floating point type into another.
///
/// Conversions between `f32` and `f64` never fail, so this is infallible
/// for all types implementing `BFloat`.
pub fn cast_float<FIN: BFloat, FOUT: BFloat>(value: FIN) -> FOUT {
    FOUT::from(value).unwrap_or_else(FOUT::nan)
}
