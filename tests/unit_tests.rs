//! Unit tests for the squeezer modules working on real NetCDF fixtures.

mod common;

use common::*;
use landlab_squeezer::{
    dataset::Dataset,
    encoding::{DataType, Encoding},
    errors::{Result, SqueezeError},
    level::CompressionLevel,
    netcdf_io::{is_classic_attribute, storage_type, NetCDFWriter},
    options::{OutputFormat, SqueezeOptions},
    squeeze::apply_level,
};
use netcdf::{create, open, AttributeValue};
use tempfile::tempdir;

#[test]
fn test_error_types() {
    let var_err = SqueezeError::VariableNotFound {
        var: "precip".to_string(),
    };
    assert!(format!("{}", var_err).contains("Variable 'precip' not found"));

    let type_err = SqueezeError::UnsupportedType {
        var: "label".to_string(),
        vartype: "char".to_string(),
    };
    assert_eq!(
        format!("{}", type_err),
        "Variable 'label' has unsupported type char"
    );

    let netcdf_err = SqueezeError::NetCDFError(netcdf::Error::NotFound("test".to_string()));
    assert!(format!("{}", netcdf_err).contains("NetCDF error"));
}

#[test]
fn test_squeeze_options() {
    let default_options = SqueezeOptions::default();
    assert_eq!(default_options.level, CompressionLevel::Chicken);
    assert!(!default_options.gzip);
    assert_eq!(default_options.format, OutputFormat::Classic64BitOffset);
    assert!(default_options.is_unlimited("nt"));
    assert!(!default_options.is_unlimited("nodes"));

    let options = SqueezeOptions::new(CompressionLevel::Hard)
        .with_gzip(true)
        .with_format(OutputFormat::Netcdf4)
        .with_unlimited_dims(["time"]);
    assert!(options.gzip);
    assert!(options.format.supports_deflate());
    assert!(options.is_unlimited("time"));
    assert!(!options.is_unlimited("nt"));
}

#[test]
fn test_dataset_loads_raw_values() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_landlab_file(temp_dir.path(), "storm.nc", &precip_values());

    let dataset = Dataset::open(&path)?;
    assert_eq!(
        dataset.variable_names(),
        vec!["x", "y", "nt", "precip", "elevation", "mask"]
    );
    assert_eq!(dataset.dimensions.len(), 2);

    let precip = dataset.variable("precip").expect("precip loaded");
    assert_eq!(precip.dtype(), DataType::F64);
    assert_eq!(precip.data.shape(), &[NT, NODES]);
    assert_eq!(precip.data.to_f64(), precip_values());
    assert_eq!(precip.dimensions, vec!["nt", "nodes"]);
    assert!(precip.is_data_variable());

    assert!(!dataset.variable("x").expect("x").is_data_variable());
    assert!(!dataset.variable("nt").expect("nt").is_data_variable());
    assert!(matches!(
        dataset.attribute("title"),
        Some(AttributeValue::Str(title)) if title == "LandLab test run"
    ));
    Ok(())
}

#[test]
fn test_apply_level_sets_encodings() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = write_landlab_file(temp_dir.path(), "storm.nc", &precip_values());

    let mut dataset = Dataset::open(&path)?;
    apply_level(&mut dataset, &SqueezeOptions::new(CompressionLevel::Hard))?;

    let precip = dataset.variable("precip").expect("precip");
    assert_eq!(precip.encoding, Encoding::packed(DataType::I16, 0.01));
    assert_eq!(precip.dtype(), DataType::I16);

    let elevation = dataset.variable("elevation").expect("elevation");
    assert_eq!(elevation.encoding, Encoding::zlib());
    assert_eq!(elevation.dtype(), DataType::F32);

    for name in ["x", "y", "nt"] {
        let coord = dataset.variable(name).expect("coordinate");
        assert_eq!(coord.encoding, Encoding::default());
        assert_eq!(coord.dtype(), DataType::F64);
    }

    let mut chicken = Dataset::open(&path)?;
    apply_level(&mut chicken, &SqueezeOptions::new(CompressionLevel::Chicken))?;
    let precip = chicken.variable("precip").expect("precip");
    assert_eq!(precip.encoding, Encoding::zlib());
    assert_eq!(precip.dtype(), DataType::F64);
    Ok(())
}

#[test]
fn test_source_fill_value_is_remapped() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("filled.nc");
    {
        let mut file = create(&path)?;
        file.add_dimension("nodes", 3)?;
        let mut var = file.add_variable::<f64>("runoff", &["nodes"])?;
        var.put_attribute("_FillValue", -1.0e20f64)?;
        var.put_attribute("scale_factor", 1.0f64)?;
        var.put_values(&[1.5, -1.0e20, 2.25], ..)?;
    }

    let mut dataset = Dataset::open(&path)?;
    apply_level(&mut dataset, &SqueezeOptions::new(CompressionLevel::Medium))?;
    let runoff = dataset.variable("runoff").expect("runoff");
    assert_eq!(runoff.data.to_f64(), vec![1500.0, -9999.0, 2250.0]);
    assert!(runoff.attribute("_FillValue").is_none());
    assert!(runoff.attribute("scale_factor").is_none());
    Ok(())
}

#[test]
fn test_classic_coercion_of_unsigned_types() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("flags.nc");
    {
        let mut file = create(&path)?;
        file.add_dimension("nodes", 3)?;
        let mut var = file.add_variable::<u16>("status", &["nodes"])?;
        var.put_attribute("valid_max", 500u16)?;
        var.put_values(&[1u16, 2, 300], ..)?;
    }

    let output = temp_dir.path().join("flags_compressed.nc");
    let options = SqueezeOptions::default();
    let dataset = Dataset::open(&path)?;
    let status = dataset.variable("status").expect("status");
    assert_eq!(
        storage_type(status, OutputFormat::Classic64BitOffset),
        DataType::I16
    );
    assert_eq!(storage_type(status, OutputFormat::Netcdf4), DataType::U16);

    NetCDFWriter::new(&output, &options).write(&dataset)?;
    let file = open(&output)?;
    let status = file.variable("status").expect("status");
    assert!(is_i16(&status.vartype()));
    assert_eq!(status.get_values::<i16, _>(..)?, vec![1, 2, 300]);
    assert!(status.attribute("valid_max").is_none());
    Ok(())
}

#[test]
fn test_classic_coercion_rejects_lossy_values() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("counts.nc");
    {
        let mut file = create(&path)?;
        file.add_dimension("nodes", 2)?;
        let mut var = file.add_variable::<u16>("count", &["nodes"])?;
        var.put_values(&[7u16, 60000], ..)?;
    }

    let output = temp_dir.path().join("counts_compressed.nc");
    let dataset = Dataset::open(&path)?;
    let result = NetCDFWriter::new(&output, &SqueezeOptions::default()).write(&dataset);
    match result {
        Err(SqueezeError::Cast { var, reason }) => {
            assert_eq!(var, "count");
            assert!(reason.contains("60000"));
        }
        other => panic!("Expected Cast error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_classic_attribute_types() {
    assert!(is_classic_attribute(&AttributeValue::Double(0.01)));
    assert!(is_classic_attribute(&AttributeValue::Str("mm".to_string())));
    assert!(!is_classic_attribute(&AttributeValue::Ushort(3)));
    assert!(!is_classic_attribute(&AttributeValue::Longlong(3)));
}
