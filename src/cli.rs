//! Defines command-line interface options using `clap` for the squeezer.

use crate::level::CompressionLevel;
use crate::options::{OutputFormat, SqueezeOptions, DEFAULT_UNLIMITED_DIM};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Attribution footer printed below the help text
pub const EPILOG: &str = "Christian Werner (christian.werner@senckenberg.de)
Senckenberg Biodiversity and Climate Research Centre (BiK-F)
2018/03/21";

/// LandLab NetCDF Squeezer
#[derive(Parser, Debug)]
#[command(
    name = "landlab-squeezer",
    version,
    about = "LandLab NetCDF Squeezer",
    after_help = EPILOG
)]
pub struct Args {
    /// NetCDF files to squeeze
    #[arg(required = true, value_parser = existing_path)]
    pub infile: Vec<PathBuf>,

    /// compression level
    #[arg(long, value_enum, default_value_t = CompressionLevel::Chicken)]
    pub level: CompressionLevel,

    /// also gzip the result
    #[arg(short, long, default_value_t = false)]
    pub compress: bool,

    /// container format of the output file
    #[arg(long, value_enum, default_value_t = OutputFormat::Classic64BitOffset)]
    pub format: OutputFormat,

    /// dimension written as unlimited
    #[arg(long, default_value = DEFAULT_UNLIMITED_DIM)]
    pub unlimited: String,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn options(&self) -> SqueezeOptions {
        SqueezeOptions::new(self.level)
            .with_gzip(self.compress)
            .with_format(self.format)
            .with_unlimited_dims([self.unlimited.clone()])
    }
}

/// Full help text, shown for usage errors as well as `--help`.
pub fn render_help() -> String {
    Args::command().render_help().to_string()
}

fn existing_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("Path '{}' does not exist.", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_carries_epilog() {
        let help = render_help();
        assert!(help.contains("LandLab NetCDF Squeezer"));
        assert!(help.contains("Senckenberg"));
        assert!(help.contains("--level"));
    }

    #[test]
    fn rejects_missing_path() {
        let err = Args::try_parse_from(["landlab-squeezer", "/nonexistent/storm.nc"]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn requires_at_least_one_file() {
        assert!(Args::try_parse_from(["landlab-squeezer", "--level", "HARD"]).is_err());
    }

    #[test]
    fn verify_command() {
        Args::command().debug_assert();
    }
}
