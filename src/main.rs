//! transeq - translate nucleotide FASTA into protein FASTA
//!
//! ## Usage
//!
//! ```bash
//! transeq -s genes.fna -o proteins.faa            # frame 1, standard code
//! transeq -s genes.fna -o proteins.faa -f 6 -t 2  # six frames, vertebrate mito
//! transeq -s genes.fna -o - -f R                  # reverse frames to stdout
//! ```
//!
//! ## Frames
//!
//! - `1`, `2`, `3`: a single forward frame; `F`: all three
//! - `-1`, `-2`, `-3`: a single reverse frame; `R`: all three
//! - `6`: all six frames

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, Level};

use transeq::{controller, Config};

/// transeq - translate nucleic acid sequences into protein
///
/// Reads a nucleotide FASTA file and writes the translation of every
/// sequence in the requested frame(s). With more than one worker, the
/// order of output sequences may differ from the input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Nucleotide sequence(s) filename
    #[arg(short = 's', long = "sequence", value_name = "FILE")]
    sequence: PathBuf,

    /// Protein sequence filename. Use "-" for stdout.
    #[arg(short = 'o', long = "outseq", value_name = "FILE")]
    outseq: PathBuf,

    /// Frame(s) to translate: 1, 2, 3, F, -1, -2, -3, R or 6
    #[arg(short = 'f', long = "frame", default_value = "1", allow_hyphen_values = true)]
    frame: String,

    /// NCBI genetic code to use (0-31, 0 = standard)
    #[arg(short = 't', long = "table", default_value = "0")]
    table: u32,

    /// Number of worker threads (0 = number of CPUs)
    #[arg(short = 'n', long = "numcpu", default_value = "0")]
    numcpu: usize,

    /// Logging verbosity level
    #[arg(short = 'L', long = "level", default_value = "info")]
    level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    simple_logger::init_with_level(args.level).context("cannot initialise logging")?;

    let config = Config::new(args.sequence, args.outseq, args.table, &args.frame, args.numcpu)
        .context("wrong args, try transeq --help for more information")?;
    info!("Starting transeq with {}", config);

    controller::run(&config)?;

    Ok(())
}
