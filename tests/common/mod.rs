//! NetCDF fixtures shared by the integration tests.

#![allow(dead_code)]

use netcdf::types::{FloatType, IntType, NcVariableType};
use std::path::{Path, PathBuf};

pub const NT: usize = 2;
pub const NODES: usize = 4;

/// Precipitation values spanning 0.0–120.0
pub fn precip_values() -> Vec<f64> {
    vec![0.0, 12.34, 56.789, 120.0, 0.004, 33.333, 99.995, 7.5]
}

/// Write a LandLab-like file: `x`, `y` node coordinates, an `nt` time axis,
/// float64 `precip(nt, nodes)`, float32 `elevation(nodes)` and int32 `mask(nodes)`.
pub fn write_landlab_file(dir: &Path, name: &str, precip: &[f64]) -> PathBuf {
    let path = dir.join(name);
    let mut file = netcdf::create(&path).expect("Failed to create NetCDF file");

    file.add_dimension("nt", NT).expect("add dim nt");
    file.add_dimension("nodes", NODES).expect("add dim nodes");
    file.add_attribute("title", "LandLab test run")
        .expect("add title");

    {
        let mut var = file
            .add_variable::<f64>("x", &["nodes"])
            .expect("add var x");
        var.put_values(&[0.0, 1.0, 0.0, 1.0], ..).expect("put x");
    }
    {
        let mut var = file
            .add_variable::<f64>("y", &["nodes"])
            .expect("add var y");
        var.put_values(&[0.0, 0.0, 1.0, 1.0], ..).expect("put y");
    }
    {
        let mut var = file
            .add_variable::<f64>("nt", &["nt"])
            .expect("add var nt");
        var.put_attribute("units", "days since 2000-01-01")
            .expect("add nt units");
        var.put_values(&[0.0, 1.0], ..).expect("put nt");
    }
    {
        let mut var = file
            .add_variable::<f64>("precip", &["nt", "nodes"])
            .expect("add var precip");
        var.put_attribute("units", "mm").expect("add precip units");
        var.put_values(precip, ..).expect("put precip");
    }
    {
        let mut var = file
            .add_variable::<f32>("elevation", &["nodes"])
            .expect("add var elevation");
        var.put_values(&[10.5f32, 11.25, 12.125, 13.0], ..)
            .expect("put elevation");
    }
    {
        let mut var = file
            .add_variable::<i32>("mask", &["nodes"])
            .expect("add var mask");
        var.put_values(&[1i32, 0, 1, 1], ..).expect("put mask");
    }

    path
}

pub fn is_f64(vartype: &NcVariableType) -> bool {
    matches!(vartype, NcVariableType::Float(FloatType::F64))
}

pub fn is_f32(vartype: &NcVariableType) -> bool {
    matches!(vartype, NcVariableType::Float(FloatType::F32))
}

pub fn is_i16(vartype: &NcVariableType) -> bool {
    matches!(vartype, NcVariableType::Int(IntType::I16))
}

pub fn is_i32(vartype: &NcVariableType) -> bool {
    matches!(vartype, NcVariableType::Int(IntType::I32))
}

/// Sorted variable names of an open file.
pub fn variable_names(file: &netcdf::File) -> Vec<String> {
    let mut names: Vec<String> = file.variables().map(|v| v.name().to_string()).collect();
    names.sort();
    names
}

/// Sorted `(name, length)` pairs of the dimensions of an open file.
pub fn dimensions(file: &netcdf::File) -> Vec<(String, usize)> {
    let mut dims: Vec<(String, usize)> = file
        .dimensions()
        .map(|d| (d.name().to_string(), d.len()))
        .collect();
    dims.sort();
    dims
}
