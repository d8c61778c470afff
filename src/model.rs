//! Data model for the translation pipeline.
//!
//! This module contains the data structures shared by every stage:
//! - Nucleotide codes (the packed 5-letter alphabet)
//! - Codon keys used to index the genetic code table
//! - Sequence records produced by the FASTA parser
//!
//! A record is created once per FASTA header, handed to exactly one worker
//! through the record queue and dropped as soon as it has been translated.

use std::fmt;

/// A nucleotide of the packed alphabet.
///
/// The discriminant is the code stored in a [`SequenceRecord`]. `N` packs to
/// zero, so a codon key whose third base is `N` collides with the two-base
/// key of its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Nucleotide {
    N = 0,
    A = 1,
    C = 2,
    T = 3,
    G = 4,
}

impl Nucleotide {
    /// All nucleotides in code order.
    pub const ALL: [Nucleotide; 5] = [
        Nucleotide::N,
        Nucleotide::A,
        Nucleotide::C,
        Nucleotide::T,
        Nucleotide::G,
    ];

    /// The four unambiguous bases, in NCBI codon order.
    pub const BASES: [Nucleotide; 4] = [
        Nucleotide::T,
        Nucleotide::C,
        Nucleotide::A,
        Nucleotide::G,
    ];

    /// Maps an input character to its nucleotide, or `None` if the character
    /// is not part of the alphabet.
    #[inline]
    pub fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            b'A' => Some(Nucleotide::A),
            b'C' => Some(Nucleotide::C),
            b'G' => Some(Nucleotide::G),
            b'T' => Some(Nucleotide::T),
            b'N' => Some(Nucleotide::N),
            _ => None,
        }
    }

    /// Returns the one-letter symbol of this nucleotide.
    #[inline]
    pub fn to_ascii(self) -> u8 {
        match self {
            Nucleotide::N => b'N',
            Nucleotide::A => b'A',
            Nucleotide::C => b'C',
            Nucleotide::T => b'T',
            Nucleotide::G => b'G',
        }
    }

    /// Returns the pairing base (A↔T, C↔G). `N` is its own complement.
    #[inline]
    pub fn complement(self) -> Self {
        match self {
            Nucleotide::A => Nucleotide::T,
            Nucleotide::T => Nucleotide::A,
            Nucleotide::C => Nucleotide::G,
            Nucleotide::G => Nucleotide::C,
            Nucleotide::N => Nucleotide::N,
        }
    }

    /// Returns the packed code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii() as char)
    }
}

/// A codon packed into an integer, one byte per nucleotide, first base in the
/// low byte. Two-base keys leave the third byte zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodonKey(u32);

impl CodonKey {
    /// Packs a full three-base codon.
    #[inline]
    pub fn triplet(first: Nucleotide, second: Nucleotide, third: Nucleotide) -> Self {
        Self(first.code() as u32 | (second.code() as u32) << 8 | (third.code() as u32) << 16)
    }

    /// Packs a trailing two-base codon.
    #[inline]
    pub fn doublet(first: Nucleotide, second: Nucleotide) -> Self {
        Self(first.code() as u32 | (second.code() as u32) << 8)
    }

    /// Packs a slice of two or three nucleotides.
    pub fn from_slice(bases: &[Nucleotide]) -> Option<Self> {
        match *bases {
            [a, b] => Some(Self::doublet(a, b)),
            [a, b, c] => Some(Self::triplet(a, b, c)),
            _ => None,
        }
    }

    /// Returns the raw packed value.
    pub fn value(self) -> u32 {
        self.0
    }
}

/// A nucleotide sequence read from a FASTA file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// The sequence identifier (header text up to the first space, without '>')
    pub id: Vec<u8>,
    /// The rest of the header line, if any
    pub comment: Option<Vec<u8>>,
    /// The packed bases
    pub bases: Vec<Nucleotide>,
}

impl SequenceRecord {
    /// Creates a new record.
    pub fn new(id: impl Into<Vec<u8>>, comment: Option<Vec<u8>>, bases: Vec<Nucleotide>) -> Self {
        Self {
            id: id.into(),
            comment,
            bases,
        }
    }

    /// Returns the number of bases.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns true if the record has no bases.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Reverse-complements the bases in place.
    pub fn reverse_complement(&mut self) {
        reverse_complement_in_place(&mut self.bases);
    }
}

/// Complements every base, then reverses the order.
pub fn reverse_complement_in_place(bases: &mut [Nucleotide]) {
    for base in bases.iter_mut() {
        *base = base.complement();
    }
    bases.reverse();
}
