//! gzip of written output files

use crate::errors::Result;
use flate2::write::GzEncoder;
use flate2::Compression as FlateCompression;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the gzip artifact for `path`: the same name plus `.gz`.
pub fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compress `path` into `<path>.gz` at maximum compression, keeping the original.
pub fn gz_compress(path: &Path) -> Result<PathBuf> {
    let target = gz_path(path);
    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(
        BufWriter::new(File::create(&target)?),
        FlateCompression::best(),
    );
    let copied = io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;

    debug!(path = %target.display(), bytes = copied, "gzip written");
    Ok(target)
}

/// Replace `path` by its gzip artifact.
pub fn gz_replace(path: &Path) -> Result<PathBuf> {
    let target = gz_compress(path)?;
    fs::remove_file(path)?;
    Ok(target)
}
