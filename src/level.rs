//! Compression levels and the storage policy each one selects.

use crate::encoding::DataType;
use clap::ValueEnum;
use std::fmt;

/// Fill value written for packed integer variables
pub const PACKED_FILL_VALUE: i32 = -9999;

/// How hard to squeeze the data variables of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CompressionLevel {
    /// Container compression only, values untouched
    #[default]
    #[value(name = "CHICKEN")]
    Chicken,
    /// float64 packed into int32 with scale factor 0.001
    #[value(name = "MEDIUM")]
    Medium,
    /// float64 packed into int16 with scale factor 0.01
    #[value(name = "HARD")]
    Hard,
}

impl CompressionLevel {
    /// Integer storage type and scale factor used for float64 variables.
    ///
    /// `None` for [`CompressionLevel::Chicken`], which never reduces precision.
    pub fn packing(&self) -> Option<(DataType, f64)> {
        match self {
            CompressionLevel::Chicken => None,
            CompressionLevel::Medium => Some((DataType::I32, 0.001)),
            CompressionLevel::Hard => Some((DataType::I16, 0.01)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionLevel::Chicken => "CHICKEN",
            CompressionLevel::Medium => "MEDIUM",
            CompressionLevel::Hard => "HARD",
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
