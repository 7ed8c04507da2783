//! Error types for configuration and input validation.

use thiserror::Error;

/// Errors surfaced by filter construction and filtering calls.
///
/// Configuration problems are caught when the filter is built; shape
/// problems are caught at call time before any computation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NlmError {
    /// A configuration parameter is out of contract (even or zero window
    /// size, non-positive or non-finite bandwidth).
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// The input image shape is out of contract (channel count not 1 or 3,
    /// or an empty batch/spatial axis).
    #[error("invalid input shape {shape:?}: {reason}")]
    InvalidShape { shape: [usize; 4], reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let err = NlmError::InvalidConfiguration {
            reason: "search_window_size must be odd, got 4".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid configuration"), "message: {msg}");
        assert!(msg.contains("got 4"), "message: {msg}");
    }

    #[test]
    fn test_invalid_shape_display() {
        let err = NlmError::InvalidShape {
            shape: [1, 2, 8, 8],
            reason: "expected 1 or 3 channels, got 2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[1, 2, 8, 8]"), "message: {msg}");
        assert!(msg.contains("channels"), "message: {msg}");
    }
}
