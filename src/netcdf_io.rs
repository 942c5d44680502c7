//! NetCDF output of squeezed datasets
//!
//! This module writes an in-memory [`Dataset`] to a new NetCDF file, turning
//! each variable's [`Encoding`](crate::encoding::Encoding) into on-disk types,
//! packing attributes and (for NetCDF-4) deflate settings.
//!
//! Classic files must be fully defined before any value is written, so the
//! writer makes two passes: dimensions, variables and attributes first, then
//! `enddef` and the data.

use crate::dataset::{with_array, Attribute, Dataset, Variable, VariableData};
use crate::encoding::DataType;
use crate::errors::{Result, SqueezeError};
use crate::options::{OutputFormat, SqueezeOptions};
use ndarray::ArrayD;
use netcdf::{AttributeValue, Extent, FileMut, VariableMut};
use std::{fs, path::Path};
use tracing::{debug, warn};

/// Deflate level used for container compression
pub const DEFLATE_LEVEL: i32 = 4;

/// Writer for squeezed datasets
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
    options: &'a SqueezeOptions,
}

impl<'a> NetCDFWriter<'a> {
    /// Create a new NetCDF writer
    pub fn new(output_path: &'a Path, options: &'a SqueezeOptions) -> Self {
        Self {
            output_path,
            options,
        }
    }

    /// Write `dataset` to the output path, replacing any existing file
    pub fn write(&self, dataset: &Dataset) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let format = self.options.format;
        let mut file = netcdf::create_with(self.output_path, format.create_options())?;

        for dim in &dataset.dimensions {
            if self.options.is_unlimited(&dim.name) {
                file.add_unlimited_dimension(&dim.name)?;
            } else {
                file.add_dimension(&dim.name, dim.length)?;
            }
        }

        for attr in &dataset.attributes {
            put_global_attribute(&mut file, attr, format)?;
        }

        for var in &dataset.variables {
            define_variable(&mut file, var, format)?;
        }

        file.enddef()?;

        for var in &dataset.variables {
            write_values(&mut file, var, format)?;
        }

        Ok(())
    }
}

/// Type a variable is stored as in `format`.
pub fn storage_type(var: &Variable, format: OutputFormat) -> DataType {
    let dtype = var.encoding.dtype.unwrap_or_else(|| var.dtype());
    if format.is_classic() {
        dtype.classic_equivalent()
    } else {
        dtype
    }
}

fn define_variable(file: &mut FileMut, var: &Variable, format: OutputFormat) -> Result<()> {
    let dims: Vec<&str> = var.dimensions.iter().map(|d| d.as_str()).collect();
    let dtype = storage_type(var, format);

    let mut nc_var = match dtype {
        DataType::I8 => file.add_variable::<i8>(&var.name, &dims)?,
        DataType::U8 => file.add_variable::<u8>(&var.name, &dims)?,
        DataType::I16 => file.add_variable::<i16>(&var.name, &dims)?,
        DataType::U16 => file.add_variable::<u16>(&var.name, &dims)?,
        DataType::I32 => file.add_variable::<i32>(&var.name, &dims)?,
        DataType::U32 => file.add_variable::<u32>(&var.name, &dims)?,
        DataType::I64 => file.add_variable::<i64>(&var.name, &dims)?,
        DataType::U64 => file.add_variable::<u64>(&var.name, &dims)?,
        DataType::F32 => file.add_variable::<f32>(&var.name, &dims)?,
        DataType::F64 => file.add_variable::<f64>(&var.name, &dims)?,
    };

    if var.encoding.zlib {
        if format.supports_deflate() {
            nc_var.set_compression(DEFLATE_LEVEL, true)?;
        } else {
            debug!(var = %var.name, "deflate not available in classic format, skipped");
        }
    }

    // _FillValue has to match the storage type
    if let Some(fill) = var.encoding.fill_value {
        match dtype {
            DataType::I16 => {
                let fill = i16::try_from(fill).map_err(|_| SqueezeError::Cast {
                    var: var.name.clone(),
                    reason: format!("fill value {fill} does not fit in {dtype}"),
                })?;
                nc_var.put_attribute("_FillValue", fill)?;
            }
            DataType::I32 => {
                nc_var.put_attribute("_FillValue", fill)?;
            }
            other => {
                return Err(SqueezeError::Cast {
                    var: var.name.clone(),
                    reason: format!("packed fill value needs an integer type, got {other}"),
                })
            }
        }
    }
    if let Some(scale) = var.encoding.scale_factor {
        nc_var.put_attribute("scale_factor", scale)?;
    }

    for attr in &var.attributes {
        put_variable_attribute(&mut nc_var, attr, format)?;
    }

    Ok(())
}

fn write_values(file: &mut FileMut, var: &Variable, format: OutputFormat) -> Result<()> {
    if var.data.is_empty() {
        return Ok(());
    }

    let mut nc_var = file
        .variable_mut(&var.name)
        .ok_or_else(|| SqueezeError::VariableNotFound {
            var: var.name.clone(),
        })?;
    let shape = var.data.shape().to_vec();

    macro_rules! put {
        ($arr:expr) => {{
            let values: Vec<_> = $arr.iter().copied().collect();
            if shape.is_empty() {
                nc_var.put_values(&values, ..)?;
            } else {
                // Explicit ranges let unlimited dimensions grow to the source length
                let extents: Vec<Extent> = shape.iter().map(|&len| (0..len).into()).collect();
                nc_var.put_values(&values, extents)?;
            }
        }};
    }

    match storage_type(var, format) {
        dtype if dtype == var.dtype() => with_array!(&var.data, arr => put!(arr)),
        DataType::I8 => put!(coerce::<i8>(var)?),
        DataType::I16 => put!(coerce::<i16>(var)?),
        DataType::I32 => put!(coerce::<i32>(var)?),
        other => {
            return Err(SqueezeError::Cast {
                var: var.name.clone(),
                reason: format!("cannot store {} as {other}", var.dtype()),
            })
        }
    }
    Ok(())
}

/// Narrow an unsigned or 64-bit variable to a classic integer type.
///
/// Every value must survive the conversion unchanged.
fn coerce<T>(var: &Variable) -> Result<ArrayD<T>>
where
    T: Copy + TryFrom<i64> + TryFrom<u64>,
{
    fn convert<S, T>(var: &Variable, arr: &ArrayD<S>) -> Result<ArrayD<T>>
    where
        S: Copy + std::fmt::Display,
        T: TryFrom<S>,
    {
        let mut values = Vec::with_capacity(arr.len());
        for &v in arr.iter() {
            let converted = T::try_from(v).map_err(|_| SqueezeError::Cast {
                var: var.name.clone(),
                reason: format!(
                    "value {v} of type {} does not fit the classic format",
                    var.dtype()
                ),
            })?;
            values.push(converted);
        }
        Ok(ArrayD::from_shape_vec(arr.raw_dim(), values)?)
    }

    match &var.data {
        VariableData::U8(arr) => convert(var, &arr.mapv(i64::from)),
        VariableData::U16(arr) => convert(var, &arr.mapv(i64::from)),
        VariableData::U32(arr) => convert(var, &arr.mapv(i64::from)),
        VariableData::I64(arr) => convert(var, arr),
        VariableData::U64(arr) => convert(var, arr),
        _ => Err(SqueezeError::Cast {
            var: var.name.clone(),
            reason: format!("no classic coercion for {}", var.dtype()),
        }),
    }
}

/// Whether the classic format has an external type for this attribute.
pub fn is_classic_attribute(value: &AttributeValue) -> bool {
    matches!(
        value,
        AttributeValue::Schar(_)
            | AttributeValue::Schars(_)
            | AttributeValue::Short(_)
            | AttributeValue::Shorts(_)
            | AttributeValue::Int(_)
            | AttributeValue::Ints(_)
            | AttributeValue::Float(_)
            | AttributeValue::Floats(_)
            | AttributeValue::Double(_)
            | AttributeValue::Doubles(_)
            | AttributeValue::Str(_)
    )
}

fn put_global_attribute(file: &mut FileMut, attr: &Attribute, format: OutputFormat) -> Result<()> {
    if format.is_classic() && !is_classic_attribute(&attr.value) {
        warn!(attr = %attr.name, "skipped global attribute not representable in classic format");
        return Ok(());
    }
    file.add_attribute(&attr.name, attr.value.clone())?;
    Ok(())
}

fn put_variable_attribute(
    nc_var: &mut VariableMut,
    attr: &Attribute,
    format: OutputFormat,
) -> Result<()> {
    if format.is_classic() && !is_classic_attribute(&attr.value) {
        warn!(
            attr = %attr.name,
            var = %nc_var.name(),
            "skipped variable attribute not representable in classic format"
        );
        return Ok(());
    }
    nc_var.put_attribute(&attr.name, attr.value.clone())?;
    Ok(())
}
