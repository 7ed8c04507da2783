//! Float trait abstraction for f32/f64 support.
//!
//! This module provides a unified trait for floating-point operations,
//! enabling the filter to run at either f32 or f64 precision.

use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::Debug;
use std::iter::Sum;

/// Trait alias for floating point types supported by the filter.
///
/// Combines all the bounds the pipeline needs:
/// - Basic float operations (Float, NumAssign)
/// - Conversion from primitive types (FromPrimitive)
/// - Iteration support (Sum)
/// - Debug printing
pub trait NlmFloat:
    Float + FromPrimitive + NumAssign + Sum + Debug + Send + Sync + 'static
{
    /// Create a value from an f64 constant.
    fn from_f64_c(val: f64) -> Self;

    /// Create a value from a usize constant.
    fn usize_as(val: usize) -> Self;
}

impl NlmFloat for f32 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f32
    }
}

impl NlmFloat for f64 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val
    }

    #[inline]
    fn usize_as(val: usize) -> Self {
        val as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_trait_impl() {
        let val: f32 = NlmFloat::from_f64_c(0.587);
        assert!((val - 0.587f32).abs() < 1e-6);

        let usize_val: f32 = NlmFloat::usize_as(121);
        assert_eq!(usize_val, 121.0f32);
    }

    #[test]
    fn test_f64_trait_impl() {
        let val: f64 = NlmFloat::from_f64_c(0.587);
        assert!((val - 0.587f64).abs() < 1e-15);

        let usize_val: f64 = NlmFloat::usize_as(121);
        assert_eq!(usize_val, 121.0f64);
    }
}
