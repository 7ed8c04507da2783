//! Luminance extraction for similarity measurement.
//!
//! Patch similarity is measured on a single brightness channel rather than
//! per color channel. RGB input collapses to ITU-R BT.601 luminance after
//! clamping to [0, 1]; grayscale input passes through unchanged.

use ndarray::{Array4, ArrayView4};

use crate::error::NlmError;
use crate::float_trait::NlmFloat;

// =============================================================================
// ITU-R BT.601 luma coefficients
// =============================================================================

/// Red channel weight.
const LUMA_RED: f64 = 0.299;

/// Green channel weight.
const LUMA_GREEN: f64 = 0.587;

/// Blue channel weight.
const LUMA_BLUE: f64 = 0.114;

/// Collapse an image to a single luminance channel.
///
/// Grayscale input (1 channel) is returned as an owned copy of the input
/// values. RGB input (3 channels) is clamped to [0, 1] per value, then
/// reduced to `0.299 R + 0.587 G + 0.114 B`. Any other channel count is a
/// contract violation.
pub fn extract_luminance<F: NlmFloat>(image: ArrayView4<F>) -> Result<Array4<F>, NlmError> {
    let (batch, channels, height, width) = image.dim();
    match channels {
        1 => Ok(image.to_owned()),
        3 => {
            let wr = F::from_f64_c(LUMA_RED);
            let wg = F::from_f64_c(LUMA_GREEN);
            let wb = F::from_f64_c(LUMA_BLUE);
            let mut luminance = Array4::<F>::zeros((batch, 1, height, width));
            for b in 0..batch {
                for r in 0..height {
                    for c in 0..width {
                        let red = clamp_unit(image[[b, 0, r, c]]);
                        let green = clamp_unit(image[[b, 1, r, c]]);
                        let blue = clamp_unit(image[[b, 2, r, c]]);
                        luminance[[b, 0, r, c]] = wr * red + wg * green + wb * blue;
                    }
                }
            }
            Ok(luminance)
        }
        _ => Err(NlmError::InvalidShape {
            shape: [batch, channels, height, width],
            reason: format!("expected 1 or 3 channels, got {channels}"),
        }),
    }
}

/// Clamp a value to [0, 1]. NaN resolves to 0.
#[inline(always)]
pub(crate) fn clamp_unit<F: NlmFloat>(value: F) -> F {
    value.max(F::zero()).min(F::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    // ==================== Luminance Tests ====================

    #[test]
    fn test_grayscale_passthrough() {
        let image = Array4::from_shape_fn((2, 1, 3, 3), |(b, _, r, c)| {
            (b * 9 + r * 3 + c) as f64 * 0.05
        });
        let luminance = extract_luminance(image.view()).expect("grayscale is valid");
        assert_eq!(luminance, image);
    }

    #[test]
    fn test_rgb_weights_on_known_pixel() {
        let mut image = Array4::<f64>::zeros((1, 3, 1, 1));
        image[[0, 0, 0, 0]] = 1.0;
        image[[0, 1, 0, 0]] = 0.5;
        image[[0, 2, 0, 0]] = 0.25;
        let luminance = extract_luminance(image.view()).expect("rgb is valid");
        let expected = 0.299 * 1.0 + 0.587 * 0.5 + 0.114 * 0.25;
        assert!(
            approx_eq(luminance[[0, 0, 0, 0]], expected, 1e-12),
            "got {}",
            luminance[[0, 0, 0, 0]]
        );
    }

    #[test]
    fn test_rgb_values_clamped_before_weighting() {
        let mut image = Array4::<f64>::zeros((1, 3, 1, 2));
        // Out of range on both sides at column 0, in range at column 1.
        image[[0, 0, 0, 0]] = 2.0;
        image[[0, 1, 0, 0]] = -1.0;
        image[[0, 2, 0, 0]] = 0.5;
        image[[0, 0, 0, 1]] = 1.0;
        image[[0, 1, 0, 1]] = 0.0;
        image[[0, 2, 0, 1]] = 0.5;
        let luminance = extract_luminance(image.view()).expect("rgb is valid");
        assert!(
            approx_eq(
                luminance[[0, 0, 0, 0]],
                luminance[[0, 0, 0, 1]],
                1e-12
            ),
            "out-of-range values must clamp to the in-range equivalents"
        );
    }

    #[test]
    fn test_equal_rgb_channels_give_that_channel_value() {
        let image = Array4::from_shape_fn((1, 3, 4, 4), |(_, _, r, c)| {
            ((r * 4 + c) as f64) / 16.0
        });
        let luminance = extract_luminance(image.view()).expect("rgb is valid");
        for r in 0..4 {
            for c in 0..4 {
                let v = ((r * 4 + c) as f64) / 16.0;
                assert!(
                    approx_eq(luminance[[0, 0, r, c]], v, 1e-12),
                    "weights sum to 1, so equal channels pass through"
                );
            }
        }
    }

    #[test]
    fn test_rejects_two_channel_input() {
        let image = Array4::<f32>::zeros((1, 2, 4, 4));
        let err = extract_luminance(image.view()).unwrap_err();
        match err {
            NlmError::InvalidShape { shape, .. } => assert_eq!(shape, [1, 2, 4, 4]),
            other => panic!("expected InvalidShape, got {other:?}"),
        }
    }

    #[test]
    fn test_output_has_single_channel() {
        let image = Array4::<f32>::from_elem((2, 3, 5, 6), 0.5);
        let luminance = extract_luminance(image.view()).expect("rgb is valid");
        assert_eq!(luminance.dim(), (2, 1, 5, 6));
    }

    #[test]
    fn test_clamp_unit_boundaries() {
        assert_eq!(clamp_unit(-0.5f32), 0.0);
        assert_eq!(clamp_unit(0.25f32), 0.25);
        assert_eq!(clamp_unit(1.5f32), 1.0);
        assert_eq!(clamp_unit(f32::NAN), 0.0);
    }
}
