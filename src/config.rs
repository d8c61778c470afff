//! Run configuration.
//!
//! The command line is parsed in `main.rs`; this module turns the raw
//! values into a validated [`Config`]. Every check happens here, before the
//! pipeline starts, so a bad argument never leaves partial work behind.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::genetic_code::{self, GeneticCodeError};
use crate::translate::{FrameSelector, InvalidFrameError};

/// Output path that selects standard output.
pub const STDOUT_PATH: &str = "-";

/// Errors detected while validating the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required parameter -s | --sequence")]
    MissingInput,

    #[error("missing required parameter -o | --outseq")]
    MissingOutput,

    #[error(transparent)]
    InvalidTable(#[from] GeneticCodeError),

    #[error(transparent)]
    InvalidFrame(#[from] InvalidFrameError),
}

/// Where translated sequences are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    fn from_path(path: PathBuf) -> Self {
        if path.as_os_str() == STDOUT_PATH {
            Output::Stdout
        } else {
            Output::File(path)
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => write!(f, "{}", STDOUT_PATH),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Validated settings of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Nucleotide FASTA file
    pub input: PathBuf,
    /// Protein FASTA destination
    pub output: Output,
    /// Genetic code id (0 = standard)
    pub table: u32,
    /// Frames to translate
    pub frames: FrameSelector,
    /// Number of worker threads, always at least one
    pub workers: usize,
}

impl Config {
    /// Validates raw settings.
    ///
    /// `workers == 0` selects the number of logical CPUs.
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        table: u32,
        frame: &str,
        workers: usize,
    ) -> Result<Self, ConfigError> {
        let input = input.into();
        let output = output.into();

        if input.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }
        if output.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutput);
        }
        genetic_code::validate_table_id(table)?;
        let frames = frame.parse::<FrameSelector>()?;

        Ok(Self {
            input,
            output: Output::from_path(output),
            table,
            frames,
            workers: resolve_workers(workers),
        })
    }

    /// Returns the input path.
    pub fn input(&self) -> &Path {
        &self.input
    }
}

/// Formats the config as a comma-separated list of key=value pairs.
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sequence={}, outseq={}, table={}, frame={}, workers={}",
            self.input.display(),
            self.output,
            self.table,
            self.frames,
            self.workers,
        )
    }
}

/// Maps a requested worker count to the count actually used.
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}
