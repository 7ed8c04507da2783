//! Windowed local sums via shift-and-accumulate.
//!
//! A per-pixel windowed reduction over a W×W neighborhood is replaced by W²
//! whole-image additions of shifted copies. Each addition vectorizes over
//! the full image, which is what makes the large search windows of the
//! filter affordable.

use ndarray::{Array4, ArrayView4};

use crate::float_trait::NlmFloat;
use crate::shift::{shift_into, window_offsets, BoundaryMode};

/// Reduction applied after accumulating all window offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Plain sum over the window.
    #[default]
    Sum,
    /// Sum divided by the window area W².
    Mean,
}

/// Sum (or average) the W×W neighborhood of every pixel.
///
/// The accumulation visits offsets in [`window_offsets`] order; the order
/// does not change the result but keeps runs reproducible. One scratch
/// buffer holds the current shifted image, so memory stays at two images
/// regardless of window size.
///
/// # Panics
///
/// Panics if `window_size` is even or zero.
pub fn box_filter<F: NlmFloat>(
    image: ArrayView4<F>,
    window_size: usize,
    reduction: Reduction,
    boundary: BoundaryMode,
) -> Array4<F> {
    let mut local_sum = Array4::<F>::zeros(image.raw_dim());
    let mut shifted = Array4::<F>::zeros(image.raw_dim());
    for (dx, dy) in window_offsets(window_size) {
        shift_into(image, dx, dy, boundary, shifted.view_mut());
        local_sum += &shifted;
    }

    if reduction == Reduction::Mean {
        let inv_area = F::one() / F::usize_as(window_size * window_size);
        local_sum.mapv_inplace(|v| v * inv_area);
    }
    local_sum
}
