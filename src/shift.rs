//! Whole-image spatial shifts and window offset enumeration.
//!
//! The filter never walks per-pixel neighborhoods; every windowed operation
//! is expressed as a handful of whole-image shifts. This module provides the
//! shift primitive, the boundary strategies it can resolve out-of-range
//! indices with, and the canonical enumeration of window offsets shared by
//! the box filter and the neighborhood stack.

use ndarray::{s, Array4, ArrayView4, ArrayViewMut4};

use crate::float_trait::NlmFloat;

/// Boundary strategy for spatial shifts.
///
/// `Periodic` is the wrap-around topology the fast formulation was designed
/// around; `Reflect` and `Clamp` substitute transparently at the shift layer
/// without changing the rest of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Wrap around both spatial axes (toroidal topology).
    #[default]
    Periodic,
    /// Mirror without repeating the edge sample: `d c b a | a b c d | d c b a`.
    Reflect,
    /// Clamp to the nearest edge sample.
    Clamp,
}

/// Map a possibly out-of-range index into `[0, len)` under the given
/// boundary mode. `len` must be non-zero.
#[inline(always)]
fn resolve_index(idx: isize, len: usize, boundary: BoundaryMode) -> usize {
    let n = len as isize;
    match boundary {
        BoundaryMode::Periodic => idx.rem_euclid(n) as usize,
        BoundaryMode::Clamp => idx.clamp(0, n - 1) as usize,
        BoundaryMode::Reflect => {
            // Triangular wave with period 2n handles offsets of any
            // magnitude: reflect(-1) = 0, reflect(n) = n-1.
            if n == 1 {
                return 0;
            }
            let m = idx.rem_euclid(2 * n);
            if m < n {
                m as usize
            } else {
                (2 * n - 1 - m) as usize
            }
        }
    }
}

/// Enumerate all offsets of a square window in the canonical order.
///
/// The order is dx outer, dy inner, each running from `-radius` to `radius`
/// inclusive. Both [`crate::box_filter::box_filter`] and
/// [`crate::shift_stack::shift_stack`] consume this enumeration, so a
/// neighbor index always denotes the same physical offset in every stack
/// built with the same window size.
///
/// # Panics
///
/// Panics if `window_size` is even or zero.
pub fn window_offsets(window_size: usize) -> Vec<(isize, isize)> {
    assert!(
        window_size % 2 == 1,
        "window size must be odd, got {window_size}"
    );
    let radius = (window_size / 2) as isize;
    let mut offsets = Vec::with_capacity(window_size * window_size);
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            offsets.push((dx, dy));
        }
    }
    offsets
}

/// Position of the (0, 0) offset within [`window_offsets`] for an odd
/// window size. The enumeration is symmetric, so the zero offset sits at
/// the middle index.
#[inline]
pub fn zero_offset_index(window_size: usize) -> usize {
    (window_size * window_size) / 2
}

/// Shift an image by `(dx, dy)` into a caller-provided buffer.
///
/// `out[.., row, col] = image[.., resolve(row - dy), resolve(col - dx)]`
/// where `resolve` applies the boundary mode per axis. Offsets are
/// unconstrained in magnitude. The periodic case is four rectangular block
/// copies; nothing is materialized beyond the output buffer.
///
/// # Panics
///
/// Panics if `out` does not have the same shape as `image`.
pub fn shift_into<F: NlmFloat>(
    image: ArrayView4<F>,
    dx: isize,
    dy: isize,
    boundary: BoundaryMode,
    mut out: ArrayViewMut4<F>,
) {
    assert_eq!(
        image.raw_dim(),
        out.raw_dim(),
        "shift output buffer must match the input shape"
    );
    let (batch, channels, height, width) = image.dim();
    if height == 0 || width == 0 {
        return;
    }

    if boundary == BoundaryMode::Periodic {
        // A circular 2D shift decomposes into four rectangular block moves.
        let sy = dy.rem_euclid(height as isize) as usize;
        let sx = dx.rem_euclid(width as isize) as usize;
        out.slice_mut(s![.., .., sy.., sx..])
            .assign(&image.slice(s![.., .., ..height - sy, ..width - sx]));
        out.slice_mut(s![.., .., sy.., ..sx])
            .assign(&image.slice(s![.., .., ..height - sy, width - sx..]));
        out.slice_mut(s![.., .., ..sy, sx..])
            .assign(&image.slice(s![.., .., height - sy.., ..width - sx]));
        out.slice_mut(s![.., .., ..sy, ..sx])
            .assign(&image.slice(s![.., .., height - sy.., width - sx..]));
        return;
    }

    let row_map: Vec<usize> = (0..height)
        .map(|r| resolve_index(r as isize - dy, height, boundary))
        .collect();
    let col_map: Vec<usize> = (0..width)
        .map(|c| resolve_index(c as isize - dx, width, boundary))
        .collect();

    for b in 0..batch {
        for ch in 0..channels {
            let plane = image.slice(s![b, ch, .., ..]);
            let mut out_plane = out.slice_mut(s![b, ch, .., ..]);
            for (r, &src_r) in row_map.iter().enumerate() {
                let src_row = plane.row(src_r);
                let mut dst_row = out_plane.row_mut(r);
                for (c, &src_c) in col_map.iter().enumerate() {
                    dst_row[c] = src_row[src_c];
                }
            }
        }
    }
}

/// Shift an image by `(dx, dy)` under the given boundary mode, returning a
/// new array.
pub fn shift_image<F: NlmFloat>(
    image: ArrayView4<F>,
    dx: isize,
    dy: isize,
    boundary: BoundaryMode,
) -> Array4<F> {
    let mut out = Array4::zeros(image.raw_dim());
    shift_into(image, dx, dy, boundary, out.view_mut());
    out
}

/// Toroidal shift: `out[.., row, col] = image[.., (row - dy) mod H,
/// (col - dx) mod W]`. Content moves down by `dy` rows and right by `dx`
/// columns, wrapping around both spatial axes.
pub fn toroidal_shift<F: NlmFloat>(image: ArrayView4<F>, dx: isize, dy: isize) -> Array4<F> {
    shift_image(image, dx, dy, BoundaryMode::Periodic)
}
