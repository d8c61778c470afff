//! Six-frame translation of nucleotide records.
//!
//! This module provides:
//! - Frame selection (`1`, `2`, `3`, `F`, `-1`, `-2`, `-3`, `R`, `6`)
//! - Translation of a record into FASTA-formatted protein text
//! - Reverse-frame phase resolution
//!
//! ## Output
//!
//! One FASTA record per requested frame, the frame being appended to the
//! identifier (`_1`..`_3` forward, `_4`..`_6` reverse), wrapped at
//! [`LINE_WIDTH`] residues per line:
//!
//! ```text
//! >seq1_1 optional comment
//! MK*
//! ```
//!
//! ## Reverse frames
//!
//! Frame -1 is the reverse complement read with the same codon phase as
//! frame 1, and likewise for -2 and -3 (Staden convention). Which offset of
//! the reverse complement carries that phase depends on the sequence length
//! modulo 3, see [`reverse_offsets`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::genetic_code::{CodeTable, UNKNOWN_AMINO_ACID};
use crate::model::{CodonKey, Nucleotide, SequenceRecord};

/// Maximum number of residues per output line.
pub const LINE_WIDTH: usize = 60;

/// Identifier suffix of each frame, forward frames first.
const FRAME_SUFFIXES: [&[u8]; 6] = [b"_1", b"_2", b"_3", b"_4", b"_5", b"_6"];

/// Reverse-complement offsets of frames -1, -2, -3, indexed by length % 3.
const REVERSE_PHASES: [[usize; 3]; 3] = [[0, 2, 1], [1, 0, 2], [2, 1, 0]];

/// Error returned for an unknown frame selector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("wrong value for -f | --frame parameter: {0}")]
pub struct InvalidFrameError(pub String);

/// The frames requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameSelector {
    #[default]
    Frame1,
    Frame2,
    Frame3,
    /// Frames 1, 2 and 3
    Forward,
    Reverse1,
    Reverse2,
    Reverse3,
    /// Frames -1, -2 and -3
    Reverse,
    /// All six frames
    All,
}

impl FrameSelector {
    /// Returns the mask of frames selected.
    pub fn mask(self) -> FrameMask {
        let indices: &[usize] = match self {
            FrameSelector::Frame1 => &[0],
            FrameSelector::Frame2 => &[1],
            FrameSelector::Frame3 => &[2],
            FrameSelector::Forward => &[0, 1, 2],
            FrameSelector::Reverse1 => &[3],
            FrameSelector::Reverse2 => &[4],
            FrameSelector::Reverse3 => &[5],
            FrameSelector::Reverse => &[3, 4, 5],
            FrameSelector::All => &[0, 1, 2, 3, 4, 5],
        };
        FrameMask::from_indices(indices)
    }
}

impl FromStr for FrameSelector {
    type Err = InvalidFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(FrameSelector::Frame1),
            "2" => Ok(FrameSelector::Frame2),
            "3" => Ok(FrameSelector::Frame3),
            "F" => Ok(FrameSelector::Forward),
            "-1" => Ok(FrameSelector::Reverse1),
            "-2" => Ok(FrameSelector::Reverse2),
            "-3" => Ok(FrameSelector::Reverse3),
            "R" => Ok(FrameSelector::Reverse),
            "6" => Ok(FrameSelector::All),
            _ => Err(InvalidFrameError(s.to_string())),
        }
    }
}

impl fmt::Display for FrameSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameSelector::Frame1 => "1",
            FrameSelector::Frame2 => "2",
            FrameSelector::Frame3 => "3",
            FrameSelector::Forward => "F",
            FrameSelector::Reverse1 => "-1",
            FrameSelector::Reverse2 => "-2",
            FrameSelector::Reverse3 => "-3",
            FrameSelector::Reverse => "R",
            FrameSelector::All => "6",
        };
        write!(f, "{}", s)
    }
}

/// Six flags, indices 0-2 for frames 1-3 and 3-5 for frames -1..-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameMask {
    frames: [bool; 6],
}

impl FrameMask {
    /// Builds a mask from frame indices. Indices above 5 are ignored.
    pub fn from_indices(indices: &[usize]) -> Self {
        let mut frames = [false; 6];
        for &idx in indices {
            if let Some(flag) = frames.get_mut(idx) {
                *flag = true;
            }
        }
        Self { frames }
    }

    /// Returns true if the frame at `idx` is requested.
    pub fn contains(&self, idx: usize) -> bool {
        self.frames.get(idx).copied().unwrap_or(false)
    }

    /// Returns true if any reverse frame is requested.
    pub fn reverse(&self) -> bool {
        self.frames[3..].iter().any(|&f| f)
    }

    /// Returns the number of requested frames.
    pub fn count(&self) -> usize {
        self.frames.iter().filter(|&&f| f).count()
    }
}

/// Returns the reverse-complement offsets read for frames -1, -2 and -3 of
/// a sequence of `len` bases.
pub fn reverse_offsets(len: usize) -> [usize; 3] {
    REVERSE_PHASES[len % 3]
}

/// Translates records with a fixed table and frame mask.
///
/// Holds no per-record state, so one translator can serve every record a
/// worker dequeues.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    table: &'a CodeTable,
    mask: FrameMask,
}

impl<'a> Translator<'a> {
    /// Creates a new translator.
    pub fn new(table: &'a CodeTable, mask: FrameMask) -> Self {
        Self { table, mask }
    }

    /// Appends the translation of every requested frame to `out`.
    ///
    /// The record is consumed: reverse frames are read from its bases after
    /// reverse-complementing them in place.
    pub fn translate_record(&self, mut record: SequenceRecord, out: &mut Vec<u8>) {
        for frame in 0..3 {
            if self.mask.contains(frame) {
                self.write_frame(out, &record, frame, frame);
            }
        }

        if !self.mask.reverse() {
            return;
        }

        record.reverse_complement();
        for (j, &offset) in reverse_offsets(record.len()).iter().enumerate() {
            if self.mask.contains(j + 3) {
                self.write_frame(out, &record, j + 3, offset);
            }
        }
    }

    /// Writes the header and the wrapped translation of `record` read from
    /// `offset`, labelled as frame `frame`.
    fn write_frame(&self, out: &mut Vec<u8>, record: &SequenceRecord, frame: usize, offset: usize) {
        out.push(b'>');
        out.extend_from_slice(&record.id);
        out.extend_from_slice(FRAME_SUFFIXES[frame]);
        if let Some(comment) = &record.comment {
            out.push(b' ');
            out.extend_from_slice(comment);
        }
        out.push(b'\n');

        let body = record.bases.get(offset..).unwrap_or(&[]);
        out.reserve(body.len() / 3 + body.len() / (3 * LINE_WIDTH) + 2);

        let mut line_len = 0;
        let mut emit = |aa: u8| {
            if line_len == LINE_WIDTH {
                out.push(b'\n');
                line_len = 0;
            }
            out.push(aa);
            line_len += 1;
        };

        let mut codons = body.chunks_exact(3);
        for codon in &mut codons {
            emit(self.lookup(CodonKey::triplet(codon[0], codon[1], codon[2])));
        }
        match *codons.remainder() {
            [first, second] => emit(self.lookup(CodonKey::doublet(first, second))),
            [_] => emit(UNKNOWN_AMINO_ACID),
            _ => {}
        }

        out.push(b'\n');
    }

    #[inline]
    fn lookup(&self, key: CodonKey) -> u8 {
        self.table.get(key).unwrap_or(UNKNOWN_AMINO_ACID)
    }
}

/// Translates one record into FASTA-formatted protein text.
pub fn translate(record: &SequenceRecord, mask: FrameMask, table: &CodeTable) -> Vec<u8> {
    let mut out = Vec::new();
    Translator::new(table, mask).translate_record(record.clone(), &mut out);
    out
}

/// Translates `bases` read from `offset` without any header or wrapping.
pub fn translate_frame(bases: &[Nucleotide], offset: usize, table: &CodeTable) -> Vec<u8> {
    let record = SequenceRecord::new(Vec::new(), None, bases.to_vec());
    let mut out = Vec::new();
    Translator::new(table, FrameMask::default()).write_frame(&mut out, &record, 0, offset);
    // Drop the header line and the line breaks
    out.into_iter()
        .skip_while(|&b| b != b'\n')
        .filter(|&b| b != b'\n')
        .collect()
}
