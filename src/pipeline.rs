//! Non-Local Means filtering pipeline.
//!
//! Orchestrates the full pass: luminance extraction, neighborhood stacks,
//! per-neighbor patch distances via the box filter, exponential similarity
//! weights, and the weight-normalized reconstruction. Configuration is
//! validated when the filter is built; a constructed filter cannot fail on
//! anything except input shape.

use std::time::Instant;

use ndarray::{Array3, Array4, Array5, ArrayView4, ArrayView5, ArrayViewMut4, Axis};
use rayon::prelude::*;

use crate::box_filter::{box_filter, Reduction};
use crate::error::NlmError;
use crate::float_trait::NlmFloat;
use crate::luminance::{clamp_unit, extract_luminance};
use crate::shift::BoundaryMode;
use crate::shift_stack::{shift_stack, NEIGHBOR_AXIS};

// =============================================================================
// Constants
// =============================================================================

/// Default similarity bandwidth h.
const DEFAULT_BANDWIDTH: f64 = 3.0;

/// Default template window edge length (patch compared for similarity).
const DEFAULT_TEMPLATE_WINDOW: usize = 5;

/// Default search window edge length (neighborhood scanned for neighbors).
const DEFAULT_SEARCH_WINDOW: usize = 11;

/// Smallest total neighbor weight a pixel may be normalized by. Below this
/// the pixel keeps its original value. The zero-offset neighbor always
/// contributes exp(0) = 1, so in exact arithmetic the total is >= 1 and
/// this guard only catches numerical underflow.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Minimum weight-stack element count before the per-neighbor weight
/// computation runs on the rayon pool.
const PARALLEL_WEIGHT_THRESHOLD: usize = 1 << 16;

/// Environment variable enabling the per-stage timing report on stderr.
const PROFILE_TIMING_ENV: &str = "NLM_PROFILE_TIMING";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Non-Local Means filter.
///
/// All parameters have defaults matching the common fast-NLM settings. Use
/// `Default::default()` for standard denoising strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NlmConfig<F: NlmFloat> {
    /// Similarity bandwidth. Larger values treat more neighbors as similar
    /// and smooth more aggressively. Default: 3.0
    pub h: F,
    /// Odd edge length of the patch compared when measuring similarity.
    /// Default: 5
    pub template_window_size: usize,
    /// Odd edge length of the neighborhood scanned for similar patches.
    /// Default: 11
    pub search_window_size: usize,
    /// Boundary strategy for all spatial shifts. Default: Periodic
    pub boundary: BoundaryMode,
}

impl<F: NlmFloat> Default for NlmConfig<F> {
    fn default() -> Self {
        Self {
            h: F::from_f64_c(DEFAULT_BANDWIDTH),
            template_window_size: DEFAULT_TEMPLATE_WINDOW,
            search_window_size: DEFAULT_SEARCH_WINDOW,
            boundary: BoundaryMode::default(),
        }
    }
}

impl<F: NlmFloat> NlmConfig<F> {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters.
    pub fn validate(&self) -> Result<(), NlmError> {
        if !self.h.is_finite() || self.h <= F::zero() {
            return Err(NlmError::InvalidConfiguration {
                reason: format!("bandwidth h must be finite and > 0, got {:?}", self.h),
            });
        }
        let windows = [
            ("template_window_size", self.template_window_size),
            ("search_window_size", self.search_window_size),
        ];
        for (name, size) in windows {
            if size == 0 || size % 2 == 0 {
                return Err(NlmError::InvalidConfiguration {
                    reason: format!("{name} must be an odd positive integer, got {size}"),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Non-Local Means filter with a fixed, validated configuration.
///
/// The filter holds no mutable state; a single instance may be shared
/// across threads and reused for any number of [`denoise`](Self::denoise)
/// calls.
#[derive(Debug, Clone)]
pub struct NonLocalMeans<F: NlmFloat> {
    config: NlmConfig<F>,
}

impl<F: NlmFloat> NonLocalMeans<F> {
    /// Build a filter from a configuration, validating it up front.
    pub fn new(config: NlmConfig<F>) -> Result<Self, NlmError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build a filter with the default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: NlmConfig::default(),
        }
    }

    /// The configuration this filter was built with.
    pub fn config(&self) -> &NlmConfig<F> {
        &self.config
    }

    /// Denoise a batched image tensor of shape (batch, channel, row, col).
    ///
    /// Channel count must be 1 (grayscale) or 3 (RGB); batch and spatial
    /// axes must be non-empty. The output has the input's shape with every
    /// value clamped to [0, 1].
    pub fn denoise(&self, image: ArrayView4<F>) -> Result<Array4<F>, NlmError> {
        validate_image_shape(image.dim())?;
        let config = &self.config;
        let profile_timing = resolve_profile_timing();
        let wall_start = Instant::now();

        let luminance = extract_luminance(image)?;
        let luminance_done = Instant::now();

        let color_stack = shift_stack(image, config.search_window_size, config.boundary);
        let luminance_stack =
            shift_stack(luminance.view(), config.search_window_size, config.boundary);
        let stacks_done = Instant::now();

        let weights = similarity_weights(luminance.view(), luminance_stack.view(), config);
        let weights_done = Instant::now();

        let output = weighted_reconstruct(image, color_stack.view(), weights.view());

        if profile_timing {
            let (batch, channels, height, width) = image.dim();
            let to_ms = |ns: u128| ns as f64 / 1_000_000.0;
            eprintln!(
                "nlm_profile size={}x{} batch={} channels={} neighbors={} wall_ms={:.3} luminance_ms={:.3} stack_ms={:.3} weights_ms={:.3} reconstruct_ms={:.3}",
                height,
                width,
                batch,
                channels,
                config.search_window_size * config.search_window_size,
                to_ms(wall_start.elapsed().as_nanos()),
                to_ms(luminance_done.duration_since(wall_start).as_nanos()),
                to_ms(stacks_done.duration_since(luminance_done).as_nanos()),
                to_ms(weights_done.duration_since(stacks_done).as_nanos()),
                to_ms(weights_done.elapsed().as_nanos()),
            );
        }

        Ok(output)
    }
}

impl<F: NlmFloat> Default for NonLocalMeans<F> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// =============================================================================
// Pipeline stages
// =============================================================================

fn validate_image_shape(dim: (usize, usize, usize, usize)) -> Result<(), NlmError> {
    let (batch, channels, height, width) = dim;
    let shape = [batch, channels, height, width];
    if channels != 1 && channels != 3 {
        return Err(NlmError::InvalidShape {
            shape,
            reason: format!("expected 1 or 3 channels, got {channels}"),
        });
    }
    if batch == 0 || height == 0 || width == 0 {
        return Err(NlmError::InvalidShape {
            shape,
            reason: "batch and spatial axes must be non-empty".to_string(),
        });
    }
    Ok(())
}

/// Per-neighbor similarity weights from the luminance stack.
///
/// For each neighbor slot: squared luminance difference, summed over the
/// template window, square root, then `exp(-distance / h)`. Slots are
/// independent and run in parallel for large inputs.
fn similarity_weights<F: NlmFloat>(
    luminance: ArrayView4<F>,
    luminance_stack: ArrayView5<F>,
    config: &NlmConfig<F>,
) -> Array5<F> {
    let h = config.h;
    let template_window = config.template_window_size;
    let boundary = config.boundary;
    let total_elements = luminance_stack.len();

    let mut weights = Array5::<F>::zeros(luminance_stack.raw_dim());
    let slots: Vec<_> = weights.axis_iter_mut(NEIGHBOR_AXIS).collect();
    if total_elements >= PARALLEL_WEIGHT_THRESHOLD {
        slots.into_par_iter().enumerate().for_each(|(k, slot)| {
            fill_weight_slot(
                luminance.view(),
                luminance_stack.view(),
                k,
                template_window,
                boundary,
                h,
                slot,
            );
        });
    } else {
        for (k, slot) in slots.into_iter().enumerate() {
            fill_weight_slot(
                luminance.view(),
                luminance_stack.view(),
                k,
                template_window,
                boundary,
                h,
                slot,
            );
        }
    }
    weights
}

fn fill_weight_slot<F: NlmFloat>(
    luminance: ArrayView4<F>,
    luminance_stack: ArrayView5<F>,
    neighbor: usize,
    template_window: usize,
    boundary: BoundaryMode,
    h: F,
    mut slot: ArrayViewMut4<F>,
) {
    let shifted = luminance_stack.index_axis(NEIGHBOR_AXIS, neighbor);
    let mut diff = &luminance - &shifted;
    diff.mapv_inplace(|v| v * v);
    let mut distance = box_filter(diff.view(), template_window, Reduction::Sum, boundary);
    distance.mapv_inplace(|v| (-(v.sqrt()) / h).exp());
    slot.assign(&distance);
}

/// Weight-normalized average over the neighbor axis, clamped to [0, 1].
///
/// The output starts as the input image; a pixel is overwritten with
/// numerator/denominator only where the total weight clears
/// `WEIGHT_SUM_EPSILON`, so degenerate pixels keep their original value.
fn weighted_reconstruct<F: NlmFloat>(
    image: ArrayView4<F>,
    color_stack: ArrayView5<F>,
    weights: ArrayView5<F>,
) -> Array4<F> {
    debug_assert_eq!(weights.len_of(Axis(1)), 1, "weights carry one channel");
    let (batch, channels, height, width) = image.dim();
    let neighbor_count = color_stack.len_of(NEIGHBOR_AXIS);
    let weight_floor = F::from_f64_c(WEIGHT_SUM_EPSILON);

    let mut numerator = Array4::<F>::zeros(image.raw_dim());
    let mut denominator = Array3::<F>::zeros((batch, height, width));
    for k in 0..neighbor_count {
        let weight_plane = weights.index_axis(NEIGHBOR_AXIS, k);
        let weight_plane = weight_plane.index_axis(Axis(1), 0);
        let neighbor_values = color_stack.index_axis(NEIGHBOR_AXIS, k);
        denominator += &weight_plane;
        for c in 0..channels {
            let mut channel_sum = numerator.index_axis_mut(Axis(1), c);
            channel_sum += &(&weight_plane * &neighbor_values.index_axis(Axis(1), c));
        }
    }

    let mut output = image.to_owned();
    for b in 0..batch {
        for c in 0..channels {
            for r in 0..height {
                for col in 0..width {
                    let den = denominator[[b, r, col]];
                    if den > weight_floor {
                        output[[b, c, r, col]] = numerator[[b, c, r, col]] / den;
                    }
                }
            }
        }
    }
    output.mapv_inplace(clamp_unit);
    output
}

fn resolve_profile_timing() -> bool {
    std::env::var(PROFILE_TIMING_ENV)
        .ok()
        .map(|value| {
            let v = value.trim();
            v == "1"
                || v.eq_ignore_ascii_case("true")
                || v.eq_ignore_ascii_case("yes")
                || v.eq_ignore_ascii_case("on")
        })
        .unwrap_or(false)
}
