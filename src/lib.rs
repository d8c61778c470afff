//! # transeq - Multi-threaded six-frame translation
//!
//! Translates nucleotide FASTA into protein FASTA in any of the six reading
//! frames, with any NCBI genetic code.
//!
//! ## Architecture
//!
//! The crate is organised as a pipeline with clear separation:
//! - `model`: Nucleotides, codon keys and sequence records
//! - `genetic_code`: Codon → amino acid tables
//! - `fasta`: Streaming FASTA parsing
//! - `translate`: Frame selection and record translation
//! - `pipeline`: Parser → bounded queue → workers, with cancellation
//! - `sink`: Output destinations shared by the workers
//! - `config`: Validated run settings
//! - `controller`: Orchestration of a whole run
//!
//! ## Example
//!
//! ```
//! use transeq::fasta::FastaReader;
//! use transeq::genetic_code::CodeTable;
//! use transeq::pipeline;
//! use transeq::sink::MemorySink;
//! use transeq::translate::FrameSelector;
//!
//! let table = CodeTable::standard();
//! let sink = MemorySink::new();
//! let reader = FastaReader::new(&b">seq1\nATGAAATAG\n"[..]);
//! pipeline::run(reader, &table, FrameSelector::Frame1.mask(), 1, &sink).unwrap();
//! assert_eq!(sink.into_inner(), b">seq1_1\nMK*\n");
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod fasta;
pub mod genetic_code;
pub mod model;
pub mod pipeline;
pub mod sink;
pub mod translate;

pub use config::Config;
pub use error::{TranseqError, TranseqResult};
