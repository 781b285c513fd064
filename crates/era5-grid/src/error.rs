//! Error types for grid access.

use std::path::PathBuf;

use era5_common::{Era5DateTime, TimeParseError};
use spectral_codec::CodecError;
use thiserror::Error;

/// Errors that can occur while reading, selecting or deriving grid data.
#[derive(Error, Debug)]
pub enum GridError {
    /// No stored grid exists for the requested path.
    #[error("grid file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The variable name is not registered.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A variable with this name is already registered.
    #[error("variable already registered: {0}")]
    DuplicateVariable(String),

    /// No value range is known for this variable at this level.
    #[error("no value range for {variable} at {level} hPa")]
    UnknownLevel { variable: String, level: u16 },

    /// A dataset lacks a variable the computation needs.
    #[error("dataset has no variable '{0}'")]
    MissingVariable(String),

    /// A coordinate value could not be matched against an axis.
    #[error("{axis} = {value} is not on the grid")]
    CoordinateNotFound { axis: &'static str, value: f64 },

    /// A grid file does not hold the requested instant.
    #[error("{0} is not on the time axis")]
    InstantNotFound(Era5DateTime),

    /// Array length does not match the declared shape.
    #[error("shape mismatch for '{name}': expected {expected} values, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// The query cannot be resolved as written.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Time(#[from] TimeParseError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl GridError {
    /// Create an InvalidQuery error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the input file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
