//! Per-variable storage encoding and value packing
//!
//! An [`Encoding`] describes how a variable is laid out on disk, independent of
//! how its values are held in memory. The level policy of the squeezer only
//! ever produces two shapes of encoding: container compression alone, or
//! container compression plus integer packing with a scale factor and fill value.

use crate::dataset::Variable;
use crate::level::{CompressionLevel, PACKED_FILL_VALUE};
use ndarray::ArrayD;
use netcdf::types::{FloatType, IntType, NcVariableType};
use std::fmt;

/// Numeric storage types the squeezer reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl DataType {
    /// Map a NetCDF variable type, `None` for char, string and user-defined types.
    pub fn from_nc(vartype: &NcVariableType) -> Option<Self> {
        match vartype {
            NcVariableType::Int(IntType::I8) => Some(DataType::I8),
            NcVariableType::Int(IntType::U8) => Some(DataType::U8),
            NcVariableType::Int(IntType::I16) => Some(DataType::I16),
            NcVariableType::Int(IntType::U16) => Some(DataType::U16),
            NcVariableType::Int(IntType::I32) => Some(DataType::I32),
            NcVariableType::Int(IntType::U32) => Some(DataType::U32),
            NcVariableType::Int(IntType::I64) => Some(DataType::I64),
            NcVariableType::Int(IntType::U64) => Some(DataType::U64),
            NcVariableType::Float(FloatType::F32) => Some(DataType::F32),
            NcVariableType::Float(FloatType::F64) => Some(DataType::F64),
            _ => None,
        }
    }

    /// Whether the classic (CDF-1/CDF-2) formats can store this type.
    pub fn is_classic(&self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::F32 | DataType::F64
        )
    }

    /// Closest classic type for the types only NetCDF-4 can store.
    pub fn classic_equivalent(&self) -> DataType {
        match self {
            DataType::U8 => DataType::I8,
            DataType::U16 => DataType::I16,
            DataType::U32 | DataType::I64 | DataType::U64 => DataType::I32,
            other => *other,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::I8 => "int8",
            DataType::U8 => "uint8",
            DataType::I16 => "int16",
            DataType::U16 => "uint16",
            DataType::I32 => "int32",
            DataType::U32 => "uint32",
            DataType::I64 => "int64",
            DataType::U64 => "uint64",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
        };
        f.write_str(name)
    }
}

/// Storage policy applied to a variable at write time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Encoding {
    /// Storage type; `None` keeps the in-memory type
    pub dtype: Option<DataType>,
    pub scale_factor: Option<f64>,
    pub fill_value: Option<i32>,
    /// Lossless container compression (deflate)
    pub zlib: bool,
}

impl Encoding {
    /// Container compression only.
    pub fn zlib() -> Self {
        Self {
            zlib: true,
            ..Self::default()
        }
    }

    /// Integer packing with the given scale factor and the shared fill value.
    pub fn packed(dtype: DataType, scale_factor: f64) -> Self {
        Self {
            dtype: Some(dtype),
            scale_factor: Some(scale_factor),
            fill_value: Some(PACKED_FILL_VALUE),
            zlib: true,
        }
    }

    pub fn is_packed(&self) -> bool {
        self.scale_factor.is_some()
    }

    /// Encoding `level` selects for a variable currently stored as `dtype`.
    pub fn for_level(level: CompressionLevel, dtype: DataType) -> Self {
        match level.packing() {
            Some((target, scale)) if dtype == DataType::F64 => Self::packed(target, scale),
            _ => Self::zlib(),
        }
    }
}

/// Replace the encoding of `variable`.
pub fn set_encoding(variable: &mut Variable, encoding: Encoding) {
    variable.encoding = encoding;
}

/// Values that ended up clamped to the integer range during packing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackStats {
    pub saturated: usize,
    pub filled: usize,
}

/// Pack float values as `round(value / scale)` in an integer type.
///
/// NaN and `missing` values become `fill`. The conversion is the saturating
/// float-to-int `as` cast, so out-of-range values clamp to the type bounds.
pub fn pack<T>(
    values: &ArrayD<f64>,
    scale: f64,
    fill: T,
    missing: &[f64],
    min: f64,
    max: f64,
    cast: impl Fn(f64) -> T,
) -> (ArrayD<T>, PackStats)
where
    T: Copy,
{
    let mut stats = PackStats::default();
    let packed = values.mapv(|v| {
        if v.is_nan() || missing.contains(&v) {
            stats.filled += 1;
            return fill;
        }
        let scaled = (v / scale).round();
        if scaled < min || scaled > max {
            stats.saturated += 1;
        }
        cast(scaled)
    });
    (packed, stats)
}
