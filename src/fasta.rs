//! Streaming FASTA parser.
//!
//! This module reads nucleotide FASTA line by line and yields one
//! [`SequenceRecord`] per header, without holding the whole file in memory.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```
//!
//! Blank lines are skipped. A record is only materialized once the next
//! header (or the end of input) is reached, and every character of its
//! sequence must belong to the `ACGTN` alphabet.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::mem;
use std::path::Path;

use thiserror::Error;

use crate::model::{Nucleotide, SequenceRecord};

const HEADER_MARKER: u8 = b'>';
const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to read input: {0}")]
    IoError(#[from] io::Error),

    #[error("invalid char in sequence {id}: '{character}' at position {position}")]
    InvalidSequenceCharacter {
        id: String,
        character: char,
        position: usize,
    },

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Header fields of the record being accumulated.
#[derive(Debug)]
struct Header {
    id: Vec<u8>,
    comment: Option<Vec<u8>>,
}

impl Header {
    /// Splits a header line (without the marker) at the first space.
    fn parse(line: &[u8]) -> Self {
        match line.iter().position(|&b| b == b' ') {
            Some(space) => {
                let comment = &line[space + 1..];
                Self {
                    id: line[..space].to_vec(),
                    comment: (!comment.is_empty()).then(|| comment.to_vec()),
                }
            }
            None => Self {
                id: line.to_vec(),
                comment: None,
            },
        }
    }

    /// Encodes the accumulated raw sequence and builds the record.
    fn into_record(self, raw: &[u8]) -> FastaResult<SequenceRecord> {
        let mut bases = Vec::with_capacity(raw.len());
        for (i, &b) in raw.iter().enumerate() {
            match Nucleotide::from_ascii(b) {
                Some(n) => bases.push(n),
                None => {
                    return Err(FastaError::InvalidSequenceCharacter {
                        id: String::from_utf8_lossy(&self.id).into_owned(),
                        character: b as char,
                        position: i + 1,
                    })
                }
            }
        }
        Ok(SequenceRecord::new(self.id, self.comment, bases))
    }
}

/// Pull-based FASTA reader.
///
/// Records are returned in file order. After an error the reader is
/// exhausted and yields nothing more.
pub struct FastaReader<R> {
    reader: R,
    line: Vec<u8>,
    line_number: usize,
    current: Option<Header>,
    raw: Vec<u8>,
    finished: bool,
}

impl FastaReader<BufReader<File>> {
    /// Opens a FASTA file for streaming.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> FastaReader<R> {
    /// Creates a reader over any buffered source.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(128),
            line_number: 0,
            current: None,
            raw: Vec::with_capacity(1000),
            finished: false,
        }
    }

    /// Returns the number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next record, or `None` once the input is exhausted.
    pub fn next_record(&mut self) -> FastaResult<Option<SequenceRecord>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.advance();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    fn advance(&mut self) -> FastaResult<Option<SequenceRecord>> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                // Last record is flushed here, not by a following header
                return self.flush_current();
            }
            self.line_number += 1;
            strip_line_terminator(&mut self.line);

            if self.line.is_empty() {
                continue;
            }

            if self.line[0] == HEADER_MARKER {
                let header = Header::parse(&self.line[1..]);
                if let Some(previous) = self.current.replace(header) {
                    let record = previous.into_record(&self.raw);
                    self.raw.clear();
                    return record.map(Some);
                }
            } else {
                if self.current.is_none() {
                    return Err(FastaError::SequenceWithoutHeader(self.line_number));
                }
                self.raw.extend_from_slice(&self.line);
            }
        }
    }

    fn flush_current(&mut self) -> FastaResult<Option<SequenceRecord>> {
        match self.current.take() {
            Some(header) => {
                let raw = mem::take(&mut self.raw);
                header.into_record(&raw).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = FastaResult<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

fn strip_line_terminator(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fasta_str(content: &str) -> FastaResult<Vec<SequenceRecord>> {
        FastaReader::new(content.as_bytes()).collect()
    }

    fn bases(record: &SequenceRecord) -> String {
        record.bases.iter().map(|n| n.to_ascii() as char).collect()
    }

    #[test]
    fn test_parse_simple_fasta() {
        let records = parse_fasta_str(">seq1\nACGT\n>seq2\nTGCA\n").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, b"seq1");
        assert_eq!(bases(&records[0]), "ACGT");
        assert_eq!(records[1].id, b"seq2");
        assert_eq!(bases(&records[1]), "TGCA");
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let records = parse_fasta_str(">seq1\nACGT\nTGCA\nAAAA\n").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(bases(&records[0]), "ACGTTGCAAAAA");
    }

    #[test]
    fn test_parse_with_description() {
        let records = parse_fasta_str(">seq1 This is a description\nACGT\n").unwrap();

        assert_eq!(records[0].id, b"seq1");
        assert_eq!(records[0].comment.as_deref(), Some(&b"This is a description"[..]));
    }

    #[test]
    fn test_empty_comment_is_absent() {
        let records = parse_fasta_str(">seq1 \nACGT\n").unwrap();
        assert_eq!(records[0].id, b"seq1");
        assert!(records[0].comment.is_none());
    }

    #[test]
    fn test_parse_with_empty_lines() {
        let records = parse_fasta_str(">seq1\nACGT\n\n>seq2\n\nTGCA\n").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(bases(&records[0]), "ACGT");
        assert_eq!(bases(&records[1]), "TGCA");
    }

    #[test]
    fn test_crlf_and_missing_final_newline() {
        let records = parse_fasta_str(">seq1 c\r\nAC\r\nGT\r\n>seq2\r\nNN").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].comment.as_deref(), Some(&b"c"[..]));
        assert_eq!(bases(&records[0]), "ACGT");
        assert_eq!(bases(&records[1]), "NN");
    }

    #[test]
    fn test_header_without_sequence() {
        let records = parse_fasta_str(">empty\n>seq2\nA\n>last\n").unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[0].is_empty());
        assert_eq!(bases(&records[1]), "A");
        assert!(records[2].is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_fasta_str("").unwrap().is_empty());
        assert!(parse_fasta_str("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_sequence_without_header() {
        let result = parse_fasta_str("\nACGT\n>seq1\nTGCA\n");
        assert!(matches!(result, Err(FastaError::SequenceWithoutHeader(2))));
    }

    #[test]
    fn test_invalid_character() {
        let result = parse_fasta_str(">bad\nATGZAA\n");
        match result {
            Err(FastaError::InvalidSequenceCharacter { id, character, position }) => {
                assert_eq!(id, "bad");
                assert_eq!(character, 'Z');
                assert_eq!(position, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_lowercase_is_rejected() {
        let result = parse_fasta_str(">seq1\nacgt\n");
        assert!(matches!(
            result,
            Err(FastaError::InvalidSequenceCharacter { character: 'a', .. })
        ));
    }

    #[test]
    fn test_error_stops_the_stream() {
        let mut reader = FastaReader::new(&b">ok\nACGT\n>bad\nAXG\n>never\nAAA\n"[..]);

        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_records_are_yielded_lazily() {
        let mut reader = FastaReader::new(&b">a\nAC\n>b\nGT\n"[..]);

        let first = reader.next_record().unwrap().unwrap();
        assert_eq!(first.id, b"a");
        // The second header had to be read to close the first record
        assert_eq!(reader.line_number(), 3);
    }
}
