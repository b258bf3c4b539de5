
//! Command line tool around the bmz codec.
//!
//! ```bash
//! # compress image.bmp into image.bmz
//! bmz compress image.bmp
//!
//! # restore it, choosing the output name explicitly
//! bmz decompress image.bmz -o restored.bmp
//! ```
//!
//! Timing and size statistics are reported through the `log` crate;
//! run with `RUST_LOG=info` to see them.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use bmz::prelude::*;


#[derive(Parser)]
#[command(name = "bmz")]
#[command(version)]
#[command(about = "Losslessly compress 24 bit uncompressed bmp images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {

    /// Compress a bmp file
    Compress {
        /// The file to compress
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Where to write the archive (default: the input path with a `bmz` extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Restore the original file from an archive
    Decompress {
        /// The archive to decompress
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Where to write the restored file (default: the input path with a `bmp` extension)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
}


fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(error) = run(Cli::parse()) {
        eprintln!("error: {}", error);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compress { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("bmz"));

            let bytes = fs::read(&input)?;
            let start = Instant::now();
            let archive = compress(&bytes)?;
            let elapsed = start.elapsed();

            fs::write(&output, &archive)?;

            log::info!(
                "compressed {} ({} bytes) to {} ({} bytes, {:.1}% of the input) in {:.3?}",
                input.display(), bytes.len(),
                output.display(), archive.len(),
                100.0 * archive.len() as f64 / bytes.len().max(1) as f64,
                elapsed,
            );
        },

        Command::Decompress { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("bmp"));

            let archive = fs::read(&input)?;
            let start = Instant::now();
            let bytes = decompress(&archive)?;
            let elapsed = start.elapsed();

            fs::write(&output, &bytes)?;

            log::info!(
                "restored {} ({} bytes) from {} in {:.3?}",
                output.display(), bytes.len(), input.display(), elapsed,
            );
        },
    }

    Ok(())
}
