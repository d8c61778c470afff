//! Errors surfaced by a translation run.
//!
//! Every error is terminal: the run stops and exactly one error is
//! reported, whichever happened first.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::fasta::FastaError;
use crate::genetic_code::GeneticCodeError;
use crate::pipeline::PipelineError;
use crate::sink::SinkError;

/// Top-level error of a run.
#[derive(Error, Debug)]
pub enum TranseqError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot open input file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create output file {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] FastaError),

    #[error(transparent)]
    SinkWrite(#[from] SinkError),
}

impl From<GeneticCodeError> for TranseqError {
    fn from(e: GeneticCodeError) -> Self {
        TranseqError::Config(ConfigError::InvalidTable(e))
    }
}

impl From<PipelineError> for TranseqError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Parse(e) => TranseqError::Parse(e),
            PipelineError::Sink(e) => TranseqError::SinkWrite(e),
        }
    }
}

/// Result type for run-level operations.
pub type TranseqResult<T> = Result<T, TranseqError>;
