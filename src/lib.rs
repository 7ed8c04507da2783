//! Fast approximate Non-Local Means denoising.
//!
//! Pure Rust implementation of NLM filtering for batched image tensors
//! (batch, channel, row, column). Instead of the textbook per-pixel
//! quadruple loop, every windowed operation is expressed as whole-image
//! shift-and-accumulate passes, which keeps large search windows affordable.
//!
//! ```
//! use fast_nlm::{NlmConfig, NonLocalMeans};
//! use ndarray::Array4;
//!
//! let image = Array4::<f32>::from_elem((1, 3, 32, 32), 0.5);
//! let filter = NonLocalMeans::new(NlmConfig::default())?;
//! let denoised = filter.denoise(image.view())?;
//! assert_eq!(denoised.dim(), image.dim());
//! # Ok::<(), fast_nlm::NlmError>(())
//! ```

pub mod box_filter;
pub mod error;
pub mod float_trait;
pub mod luminance;
pub mod pipeline;
pub mod shift;
pub mod shift_stack;

// Re-export commonly used types at the crate root
pub use box_filter::{box_filter, Reduction};
pub use error::NlmError;
pub use float_trait::NlmFloat;
pub use luminance::extract_luminance;
pub use pipeline::{NlmConfig, NonLocalMeans};
pub use shift::{shift_image, toroidal_shift, window_offsets, zero_offset_index, BoundaryMode};
pub use shift_stack::{shift_stack, NEIGHBOR_AXIS};
