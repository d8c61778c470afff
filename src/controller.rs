//! Run controller.
//!
//! This module orchestrates one run:
//! - Genetic code table construction
//! - Opening the input and creating the output
//! - Running the translation pipeline and reporting its outcome
//!
//! A failed run leaves any partially written output file in place.

use log::info;

use crate::config::{Config, Output};
use crate::error::{TranseqError, TranseqResult};
use crate::fasta::FastaReader;
use crate::genetic_code::CodeTable;
use crate::pipeline::{self, RunSummary};
use crate::sink::{FileSink, StdoutSink};

/// Translates the input of `config` into its output.
pub fn run(config: &Config) -> TranseqResult<RunSummary> {
    let table = CodeTable::build(config.table)?;
    info!("Using genetic code {} ({})", table.id(), table.name());

    let reader = FastaReader::from_path(&config.input).map_err(|source| TranseqError::OpenInput {
        path: config.input.clone(),
        source,
    })?;
    let mask = config.frames.mask();

    let summary = match &config.output {
        Output::Stdout => pipeline::run(reader, &table, mask, config.workers, &StdoutSink)?,
        Output::File(path) => {
            let sink = FileSink::create(path).map_err(|source| TranseqError::CreateOutput {
                path: path.clone(),
                source,
            })?;
            pipeline::run(reader, &table, mask, config.workers, &sink)?
        }
    };

    info!(
        "Translated {} sequences into {} ({} bytes)",
        summary.records, config.output, summary.bytes
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fasta::FastaError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_run_to_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fa");
        let output = dir.path().join("out.fa");
        fs::write(&input, ">seq1\nATGAAATAG\n").unwrap();

        let config = Config::new(&input, &output, 0, "1", 2).unwrap();
        let summary = run(&config).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), ">seq1_1\nMK*\n");
        assert_eq!(summary.records, 1);
        assert_eq!(summary.bytes, 12);
    }

    #[test]
    fn test_run_six_frames_with_comment() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fa");
        let output = dir.path().join("out.fa");
        fs::write(&input, ">seq1 a comment\nATGAAA\nTAG\n").unwrap();

        let config = Config::new(&input, &output, 0, "6", 3).unwrap();
        run(&config).unwrap();

        let content = fs::read_to_string(&output).unwrap();
        let mut headers: Vec<&str> = content.lines().filter(|l| l.starts_with('>')).collect();
        headers.sort();
        assert_eq!(
            headers,
            vec![
                ">seq1_1 a comment",
                ">seq1_2 a comment",
                ">seq1_3 a comment",
                ">seq1_4 a comment",
                ">seq1_5 a comment",
                ">seq1_6 a comment",
            ]
        );
    }

    #[test]
    fn test_missing_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("absent.fa");
        let config = Config::new(input, dir.path().join("out.fa"), 0, "1", 1).unwrap();

        assert!(matches!(run(&config), Err(TranseqError::OpenInput { .. })));
        // Input is checked before the output is created
        assert!(!dir.path().join("out.fa").exists());
    }

    #[test]
    fn test_uncreatable_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fa");
        fs::write(&input, ">seq1\nATG\n").unwrap();

        let config = Config::new(&input, dir.path().join("no/such/dir/out.fa"), 0, "1", 1).unwrap();
        assert!(matches!(run(&config), Err(TranseqError::CreateOutput { .. })));
    }

    #[test]
    fn test_malformed_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.fa");
        let output = dir.path().join("out.fa");
        fs::write(&input, ">bad\nATGZAA\n").unwrap();

        let config = Config::new(&input, &output, 0, "1", 2).unwrap();
        let err = run(&config).unwrap_err();

        match &err {
            TranseqError::Parse(FastaError::InvalidSequenceCharacter { id, character, .. }) => {
                assert_eq!(id, "bad");
                assert_eq!(*character, 'Z');
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("bad"));
    }
}
