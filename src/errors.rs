//! Centralized error handling for the squeezer
//!
//! Every fallible operation in the library returns [`Result`], so a failure in
//! any file aborts the whole run with a single error type.

use std::path::PathBuf;

/// Main error type for squeezer operations
#[derive(Debug, thiserror::Error)]
pub enum SqueezeError {
    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Input file does not exist
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Input path cannot be turned into an output path
    #[error("invalid path '{}': {reason}", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// Variable not found in NetCDF file
    #[error("Variable '{var}' not found in file")]
    VariableNotFound { var: String },

    /// Variable type the squeezer cannot carry over
    #[error("Variable '{var}' has unsupported type {vartype}")]
    UnsupportedType { var: String, vartype: String },

    /// Values that do not survive a numeric conversion
    #[error("cannot cast variable '{var}': {reason}")]
    Cast { var: String, reason: String },

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),
}

/// Result type alias for squeezer operations
pub type Result<T> = std::result::Result<T, SqueezeError>;
