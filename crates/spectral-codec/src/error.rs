//! Error types for the spectral codec.

use thiserror::Error;

/// Errors that can occur while encoding or decoding spectra.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The inflate step rejected its input.
    #[error("malformed deflate stream: {0}")]
    Inflate(String),

    /// The deflate stream ended before its final block.
    #[error("truncated deflate stream")]
    Truncated,

    /// The deflate compressor failed.
    #[error("deflate compression failed: {0}")]
    Deflate(String),

    /// A coordinate does not fit the 16-bit delta code.
    #[error("coordinate {value} on axis {axis} exceeds the 16-bit coordinate range")]
    CoordinateOverflow { axis: usize, value: usize },

    /// Quantile outside [0, 1].
    #[error("quantile must be within [0, 1], got {0}")]
    InvalidQuantile(f64),

    /// Number of values does not match the declared shape.
    #[error("shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Only 1D, 2D and 3D arrays are supported.
    #[error("unsupported dimensionality {0}, expected 1 to 3 axes")]
    UnsupportedRank(usize),

    /// Empty or zero-length axes.
    #[error("invalid shape {0:?}")]
    InvalidShape(Vec<usize>),

    /// Strategy name not recognised.
    #[error("unknown deflate strategy '{0}'")]
    UnknownStrategy(String),

    /// Decoded buffers are inconsistent with each other.
    #[error("corrupt spectrum: {0}")]
    Corrupt(String),
}

impl CodecError {
    /// Create a Corrupt error.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

impl From<flate2::DecompressError> for CodecError {
    fn from(err: flate2::DecompressError) -> Self {
        Self::Inflate(err.to_string())
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
