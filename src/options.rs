//! Run configuration for the squeezer
//!
//! One [`SqueezeOptions`] value is built per invocation and applied uniformly
//! to every input file.

use crate::level::CompressionLevel;
use clap::ValueEnum;
use netcdf::Options;

/// Unlimited dimension of LandLab output files
pub const DEFAULT_UNLIMITED_DIM: &str = "nt";

/// Container format of the rewritten file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Classic format with 64-bit offsets (CDF-2)
    #[default]
    #[value(name = "64bit-offset")]
    Classic64BitOffset,
    /// NetCDF-4/HDF5, the only format that applies deflate
    #[value(name = "netcdf4")]
    Netcdf4,
}

impl OutputFormat {
    /// Creation mode flags for `netcdf::create_with`.
    pub fn create_options(&self) -> Options {
        match self {
            OutputFormat::Classic64BitOffset => Options::_64BIT_OFFSET,
            OutputFormat::Netcdf4 => Options::NETCDF4,
        }
    }

    pub fn is_classic(&self) -> bool {
        matches!(self, OutputFormat::Classic64BitOffset)
    }

    pub fn supports_deflate(&self) -> bool {
        !self.is_classic()
    }
}

/// Configuration for a squeeze run
#[derive(Debug, Clone, PartialEq)]
pub struct SqueezeOptions {
    pub level: CompressionLevel,
    /// gzip the written file and remove the uncompressed one
    pub gzip: bool,
    pub format: OutputFormat,
    /// Dimensions created as unlimited in the output, when present
    pub unlimited_dims: Vec<String>,
}

impl SqueezeOptions {
    /// Create a configuration for `level` with every other setting at its default
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            gzip: false,
            format: OutputFormat::default(),
            unlimited_dims: vec![DEFAULT_UNLIMITED_DIM.to_string()],
        }
    }

    /// Also gzip the result
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// Write a different container format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the list of unlimited dimensions
    pub fn with_unlimited_dims<I, S>(mut self, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unlimited_dims = dims.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_unlimited(&self, dim: &str) -> bool {
        self.unlimited_dims.iter().any(|d| d == dim)
    }
}

impl Default for SqueezeOptions {
    fn default() -> Self {
        Self::new(CompressionLevel::default())
    }
}
