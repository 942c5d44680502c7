//! The recompressor: one sequential pass per input file
//!
//! Each file is loaded into a [`Dataset`], its data variables are re-encoded
//! according to the [`CompressionLevel`](crate::level::CompressionLevel), and
//! the result is written next to the input as `<name>_compressed.nc`
//! (optionally gzipped). The first error aborts the whole run.

use crate::dataset::Dataset;
use crate::encoding::{set_encoding, Encoding};
use crate::errors::{Result, SqueezeError};
use crate::gzip::gz_replace;
use crate::netcdf_io::NetCDFWriter;
use crate::options::SqueezeOptions;
use chrono::Utc;
use netcdf::AttributeValue;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Substring of the input name replaced to build the output name
pub const INPUT_MARKER: &str = ".nc";
pub const OUTPUT_MARKER: &str = "_compressed.nc";

/// Output path for `input`: the first `.nc` replaced by `_compressed.nc`.
pub fn output_path(input: &Path) -> Result<PathBuf> {
    let name = input.to_str().ok_or_else(|| SqueezeError::InvalidPath {
        path: input.to_path_buf(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    if !name.contains(INPUT_MARKER) {
        return Err(SqueezeError::InvalidPath {
            path: input.to_path_buf(),
            reason: format!("no '{INPUT_MARKER}' to replace, output would overwrite the input"),
        });
    }
    Ok(PathBuf::from(name.replacen(INPUT_MARKER, OUTPUT_MARKER, 1)))
}

/// Re-encode every data variable of `dataset` for the configured level.
pub fn apply_level(dataset: &mut Dataset, options: &SqueezeOptions) -> Result<()> {
    for var in dataset.data_vars_mut() {
        let encoding = Encoding::for_level(options.level, var.dtype());
        set_encoding(var, encoding);

        if let Some(stats) = var.pack_values()? {
            if stats.saturated > 0 {
                warn!(
                    var = %var.name,
                    count = stats.saturated,
                    "values outside the {} range were clamped",
                    var.dtype()
                );
            }
            debug!(
                var = %var.name,
                dtype = %var.dtype(),
                filled = stats.filled,
                "packed variable"
            );
        } else {
            debug!(var = %var.name, dtype = %var.dtype(), "container compression only");
        }
    }

    append_history(dataset, options);
    Ok(())
}

fn append_history(dataset: &mut Dataset, options: &SqueezeOptions) {
    let entry = format!(
        "{}: squeezed with level {}",
        Utc::now().to_rfc3339(),
        options.level
    );
    let history = match dataset.attribute("history") {
        Some(AttributeValue::Str(previous)) if !previous.is_empty() => {
            format!("{previous}\n{entry}")
        }
        _ => entry,
    };
    dataset.set_attribute("history", AttributeValue::Str(history));
}

/// Squeeze a single file and return the path of the artifact produced.
pub fn squeeze_file(input: &Path, options: &SqueezeOptions) -> Result<PathBuf> {
    info!(input = %input.display(), level = %options.level, "squeezing");
    let mut dataset = Dataset::open(input)?;
    let output = output_path(input)?;

    apply_level(&mut dataset, options)?;
    NetCDFWriter::new(&output, options).write(&dataset)?;
    drop(dataset);

    if options.gzip {
        let gz = gz_replace(&output)?;
        info!(output = %gz.display(), "written");
        return Ok(gz);
    }

    info!(output = %output.display(), "written");
    Ok(output)
}

/// Squeeze every file in order, stopping at the first failure.
///
/// An empty input list returns immediately without touching the filesystem.
pub fn squeeze_files<P: AsRef<Path>>(inputs: &[P], options: &SqueezeOptions) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Ok(Vec::new());
    }

    inputs
        .iter()
        .map(|input| squeeze_file(input.as_ref(), options))
        .collect()
}
