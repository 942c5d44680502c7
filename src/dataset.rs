//! In-memory datasets loaded from NetCDF files
//!
//! A [`Dataset`] holds everything needed to write a file back out: dimensions,
//! global attributes and every variable with its raw values. Values are read
//! exactly as stored; `scale_factor`, `add_offset` and `_FillValue` attributes
//! are carried as plain metadata and never applied.

use crate::encoding::{pack, DataType, Encoding, PackStats};
use crate::errors::{Result, SqueezeError};
use ndarray::{ArrayD, IxDyn};
use netcdf::{AttributeValue, File};
use std::path::Path;
use tracing::debug;

/// Variables that index the grid and are never re-encoded
pub const COORDINATE_NAMES: [&str; 2] = ["x", "y"];

/// Attributes describing an existing packing of the stored values
pub const PACKING_ATTRIBUTES: [&str; 4] = ["_FillValue", "missing_value", "scale_factor", "add_offset"];

/// Information about a dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionInfo {
    pub name: String,
    pub length: usize,
    pub is_unlimited: bool,
}

/// A named attribute value, kept in file order
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Raw values of a variable in their stored type
#[derive(Debug, Clone)]
pub enum VariableData {
    I8(ArrayD<i8>),
    U8(ArrayD<u8>),
    I16(ArrayD<i16>),
    U16(ArrayD<u16>),
    I32(ArrayD<i32>),
    U32(ArrayD<u32>),
    I64(ArrayD<i64>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Apply `$body` to the array inside any [`VariableData`] variant.
macro_rules! with_array {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            VariableData::I8($arr) => $body,
            VariableData::U8($arr) => $body,
            VariableData::I16($arr) => $body,
            VariableData::U16($arr) => $body,
            VariableData::I32($arr) => $body,
            VariableData::U32($arr) => $body,
            VariableData::I64($arr) => $body,
            VariableData::U64($arr) => $body,
            VariableData::F32($arr) => $body,
            VariableData::F64($arr) => $body,
        }
    };
}
pub(crate) use with_array;

impl VariableData {
    pub fn dtype(&self) -> DataType {
        match self {
            VariableData::I8(_) => DataType::I8,
            VariableData::U8(_) => DataType::U8,
            VariableData::I16(_) => DataType::I16,
            VariableData::U16(_) => DataType::U16,
            VariableData::I32(_) => DataType::I32,
            VariableData::U32(_) => DataType::U32,
            VariableData::I64(_) => DataType::I64,
            VariableData::U64(_) => DataType::U64,
            VariableData::F32(_) => DataType::F32,
            VariableData::F64(_) => DataType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, arr => arr.shape())
    }

    pub fn len(&self) -> usize {
        with_array!(self, arr => arr.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values widened to f64, for inspection and tests.
    pub fn to_f64(&self) -> Vec<f64> {
        with_array!(self, arr => arr.iter().map(|&v| v as f64).collect())
    }
}

/// A named multi-dimensional variable with its encoding and attributes
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub dimensions: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub data: VariableData,
    pub encoding: Encoding,
}

impl Variable {
    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// A 1-D variable named after its own dimension, such as `nt(nt)`.
    pub fn is_dimension_coordinate(&self) -> bool {
        self.dimensions.len() == 1 && self.dimensions[0] == self.name
    }

    /// Whether the squeezer may change how this variable is stored.
    pub fn is_data_variable(&self) -> bool {
        !self.is_dimension_coordinate() && !COORDINATE_NAMES.contains(&self.name.as_str())
    }

    /// Numeric values the stored data uses to mark missing entries.
    pub fn missing_values(&self) -> Vec<f64> {
        ["_FillValue", "missing_value"]
            .iter()
            .filter_map(|name| self.attribute(name))
            .flat_map(attribute_as_f64s)
            .collect()
    }

    /// Cast float64 values into the integer type of a packed encoding.
    ///
    /// Returns `Ok(None)` when the encoding does not pack or the values are
    /// not float64; the variable is left untouched in that case.
    pub fn pack_values(&mut self) -> Result<Option<PackStats>> {
        let (Some(dtype), Some(scale), Some(fill)) = (
            self.encoding.dtype,
            self.encoding.scale_factor,
            self.encoding.fill_value,
        ) else {
            return Ok(None);
        };
        let VariableData::F64(values) = &self.data else {
            return Ok(None);
        };
        let missing = self.missing_values();

        let (data, stats) = match dtype {
            DataType::I16 => {
                let fill = i16::try_from(fill).map_err(|_| SqueezeError::Cast {
                    var: self.name.clone(),
                    reason: format!("fill value {fill} does not fit in {dtype}"),
                })?;
                let (packed, stats) = pack(
                    values,
                    scale,
                    fill,
                    &missing,
                    i16::MIN as f64,
                    i16::MAX as f64,
                    |v| v as i16,
                );
                (VariableData::I16(packed), stats)
            }
            DataType::I32 => {
                let (packed, stats) = pack(
                    values,
                    scale,
                    fill,
                    &missing,
                    i32::MIN as f64,
                    i32::MAX as f64,
                    |v| v as i32,
                );
                (VariableData::I32(packed), stats)
            }
            other => {
                return Err(SqueezeError::Cast {
                    var: self.name.clone(),
                    reason: format!("cannot pack float64 values into {other}"),
                })
            }
        };

        self.data = data;
        self.attributes
            .retain(|a| !PACKING_ATTRIBUTES.contains(&a.name.as_str()));
        Ok(Some(stats))
    }
}

/// Numeric attribute values widened to f64; empty for strings.
pub fn attribute_as_f64s(value: &AttributeValue) -> Vec<f64> {
    match value {
        AttributeValue::Schar(v) => vec![*v as f64],
        AttributeValue::Schars(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Uchar(v) => vec![*v as f64],
        AttributeValue::Uchars(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Short(v) => vec![*v as f64],
        AttributeValue::Shorts(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Ushort(v) => vec![*v as f64],
        AttributeValue::Ushorts(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Int(v) => vec![*v as f64],
        AttributeValue::Ints(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Uint(v) => vec![*v as f64],
        AttributeValue::Uints(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Longlong(v) => vec![*v as f64],
        AttributeValue::Longlongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Ulonglong(v) => vec![*v as f64],
        AttributeValue::Ulonglongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Float(v) => vec![*v as f64],
        AttributeValue::Floats(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Double(v) => vec![*v],
        AttributeValue::Doubles(v) => v.clone(),
        _ => Vec::new(),
    }
}

/// In-memory copy of a NetCDF file
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub dimensions: Vec<DimensionInfo>,
    pub attributes: Vec<Attribute>,
    pub variables: Vec<Variable>,
}

impl Dataset {
    /// Load every dimension, attribute and variable of the file at `path`.
    ///
    /// The NetCDF handle is dropped before this returns, on success and on error.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SqueezeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = netcdf::open(path)?;
        Self::from_file(&file)
    }

    /// Copy the contents of an open NetCDF file into memory.
    pub fn from_file(file: &File) -> Result<Self> {
        let dimensions = file
            .dimensions()
            .map(|d| DimensionInfo {
                name: d.name().to_string(),
                length: d.len(),
                is_unlimited: d.is_unlimited(),
            })
            .collect();

        let attributes = file
            .attributes()
            .map(|attr| {
                Ok(Attribute {
                    name: attr.name().to_string(),
                    value: attr.value()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let variables = file
            .variables()
            .map(|var| read_variable(&var))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dimensions,
            attributes,
            variables,
        })
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.name == name)
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    /// Variables eligible for re-encoding, in file order.
    pub fn data_vars_mut(&mut self) -> impl Iterator<Item = &mut Variable> {
        self.variables.iter_mut().filter(|v| v.is_data_variable())
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }

    /// Set a global attribute, replacing an existing one in place.
    pub fn set_attribute(&mut self, name: &str, value: AttributeValue) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }
}

fn read_variable(var: &netcdf::Variable) -> Result<Variable> {
    let name = var.name().to_string();
    let dimensions: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let vartype = var.vartype();
    let dtype = DataType::from_nc(&vartype).ok_or_else(|| SqueezeError::UnsupportedType {
        var: name.clone(),
        vartype: format!("{:?}", vartype).to_lowercase(),
    })?;

    macro_rules! read_as {
        ($t:ty, $variant:ident) => {{
            let values = var.get_values::<$t, _>(..)?;
            VariableData::$variant(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
        }};
    }

    let data = match dtype {
        DataType::I8 => read_as!(i8, I8),
        DataType::U8 => read_as!(u8, U8),
        DataType::I16 => read_as!(i16, I16),
        DataType::U16 => read_as!(u16, U16),
        DataType::I32 => read_as!(i32, I32),
        DataType::U32 => read_as!(u32, U32),
        DataType::I64 => read_as!(i64, I64),
        DataType::U64 => read_as!(u64, U64),
        DataType::F32 => read_as!(f32, F32),
        DataType::F64 => read_as!(f64, F64),
    };

    let attributes = var
        .attributes()
        .map(|attr| {
            Ok(Attribute {
                name: attr.name().to_string(),
                value: attr.value()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(var = %name, dtype = %dtype, shape = ?shape, "loaded variable");

    Ok(Variable {
        name,
        dimensions,
        attributes,
        data,
        encoding: Encoding::default(),
    })
}
