//! sam-export - SWF animation export tool
//!
//! Converts a timeline-only SWF movie into a .sam animation file plus the
//! movie's bitmaps as scaled .png files.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use sam_export::{Options, Session};

#[derive(Parser)]
#[command(name = "sam-export")]
#[command(about = "SWF to SAM animation converter")]
#[command(version)]
struct Cli {
    /// Input SWF file
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the .sam and .png outputs
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Uniform scale applied to coordinates and bitmaps (must be > 0.1)
    #[arg(short, long, default_value_t = 1.0)]
    scale: f64,

    /// JSON config file (label renames)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SAM format version to write (1 or 2)
    #[arg(long, default_value_t = 2)]
    sam_version: u32,

    /// Skip unsupported shapes and flags instead of failing
    #[arg(long)]
    skip_unsupported: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut session = Session::new(Options {
        input: cli.input,
        output_dir: cli.output_dir,
        scale: cli.scale,
        sam_version: cli.sam_version,
        config: cli.config,
        skip_unsupported: cli.skip_unsupported,
    });

    match session.run() {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            for warning in session.warnings() {
                eprintln!("{warning}");
            }
            eprintln!("{err}");
            ExitCode::from(err.code() as u8)
        }
    }
}
