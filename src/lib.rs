//! LandLab NetCDF Squeezer: recompress model output with reduced precision
//!
//! The squeezer rewrites every data variable of a NetCDF file with a storage
//! encoding chosen by a [`CompressionLevel`], writes the result as a
//! 64-bit-offset classic NetCDF file next to the input and can gzip it.
//!
//! ## Compression levels
//!
//! - **CHICKEN**: values untouched, container compression requested
//! - **MEDIUM**: float64 variables packed into int32, scale factor 0.001
//! - **HARD**: float64 variables packed into int16, scale factor 0.01
//!
//! Packed variables carry `_FillValue = -9999` and their `scale_factor`, so
//! any CF-aware reader decodes them back to the original units. The grid
//! coordinates `x` and `y` and dimension coordinates are never re-encoded.
//!
//! ## Module Organization
//!
//! - [`dataset`]: in-memory datasets loaded from NetCDF files
//! - [`encoding`]: storage encodings and value packing
//! - [`level`]: compression levels
//! - [`netcdf_io`]: writing squeezed datasets
//! - [`gzip`]: gzip of written files
//! - [`squeeze`]: the per-file recompression pass
//! - [`options`]: run configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//! ```rust,no_run
//! use landlab_squeezer::prelude::*;
//!
//! let options = SqueezeOptions::new(CompressionLevel::Hard).with_gzip(true);
//! let outputs = squeeze_files(&["storm.nc"], &options).unwrap();
//! assert_eq!(outputs[0].to_str(), Some("storm_compressed.nc.gz"));
//! ```

// Core modules
pub mod dataset;
pub mod encoding;
pub mod errors;
pub mod gzip;
pub mod level;
pub mod netcdf_io;
pub mod options;
pub mod squeeze;

// Binary support
pub mod cli;
pub mod logging;

pub use errors::{Result, SqueezeError};
pub use level::CompressionLevel;
pub use options::{OutputFormat, SqueezeOptions};
pub use squeeze::{output_path, squeeze_file, squeeze_files};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::dataset::{Dataset, Variable, VariableData};
    pub use crate::encoding::{set_encoding, DataType, Encoding};
    pub use crate::errors::{Result, SqueezeError};
    pub use crate::level::CompressionLevel;
    pub use crate::options::{OutputFormat, SqueezeOptions};
    pub use crate::squeeze::{output_path, squeeze_file, squeeze_files};
}
