//! Neighborhood stack construction.
//!
//! Materializes every shifted copy of an image within a square window along
//! a new trailing neighbor axis. The filter reads per-neighbor color values
//! from this stack at the same index it computes per-neighbor distances,
//! so the trailing axis must follow the canonical offset enumeration of
//! [`crate::shift::window_offsets`].

use ndarray::{Array5, ArrayView4, Axis};
use rayon::prelude::*;

use crate::float_trait::NlmFloat;
use crate::shift::{shift_into, window_offsets, BoundaryMode};

/// Axis along which neighbors are enumerated in a stack.
pub const NEIGHBOR_AXIS: Axis = Axis(4);

/// Minimum total element count before the slot fill runs on the rayon
/// pool. Set high enough that test-sized inputs stay sequential.
const PARALLEL_ELEMENT_THRESHOLD: usize = 1 << 16;

/// Build the neighborhood stack of an image for a square window.
///
/// The result has shape `(batch, channel, row, column, W²)`; slot `k` along
/// the trailing axis holds the image shifted by `window_offsets(W)[k]`. The
/// slice at [`crate::shift::zero_offset_index`] is the unshifted input.
///
/// Slots are independent, so the fill parallelizes across the neighbor axis
/// for large inputs.
///
/// # Panics
///
/// Panics if `window_size` is even or zero.
pub fn shift_stack<F: NlmFloat>(
    image: ArrayView4<F>,
    window_size: usize,
    boundary: BoundaryMode,
) -> Array5<F> {
    let (batch, channels, height, width) = image.dim();
    let offsets = window_offsets(window_size);
    let neighbor_count = offsets.len();
    let mut stack = Array5::<F>::zeros((batch, channels, height, width, neighbor_count));

    let slots: Vec<_> = stack.axis_iter_mut(NEIGHBOR_AXIS).collect();
    if stack_len(image.len(), neighbor_count) >= PARALLEL_ELEMENT_THRESHOLD {
        slots
            .into_par_iter()
            .zip(offsets.into_par_iter())
            .for_each(|(slot, (dx, dy))| {
                shift_into(image.view(), dx, dy, boundary, slot);
            });
    } else {
        for (slot, (dx, dy)) in slots.into_iter().zip(offsets) {
            shift_into(image.view(), dx, dy, boundary, slot);
        }
    }

    stack
}

#[inline]
fn stack_len(image_len: usize, neighbor_count: usize) -> usize {
    image_len.saturating_mul(neighbor_count)
}
