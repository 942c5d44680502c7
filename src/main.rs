//! Entry point for the squeezer.
//! Parses the command line, then squeezes every input file in order.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use landlab_squeezer::cli::{render_help, Args};
use landlab_squeezer::{logging, squeeze_files};
use std::process;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage errors show the whole help, not just the usage line
            if !matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                eprintln!("{}", render_help());
            }
            e.exit();
        }
    };
    logging::init(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let options = args.options();
    let outputs = squeeze_files(&args.infile, &options)?;
    for output in outputs {
        println!("✅ Saved result to {}", output.display());
    }
    Ok(())
}
