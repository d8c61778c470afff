//! Genetic code definitions and codon lookup table.
//!
//! This module provides:
//! - The standard genetic code and the NCBI alternate codes (ids 1-31)
//! - Construction of the packed codon → amino acid lookup table
//! - Two-base fallback entries for trailing partial codons
//!
//! Alternate codes are stored as differences from the standard code, so a
//! table only overrides the codons that actually change.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::model::{CodonKey, Nucleotide};

/// Highest table id accepted by [`CodeTable::build`].
pub const MAX_TABLE_ID: u32 = 31;

/// Amino acid emitted for windows the table cannot resolve.
pub const UNKNOWN_AMINO_ACID: u8 = b'X';

/// Name reported for an id inside the valid range that NCBI never assigned.
pub const UNASSIGNED_TABLE_NAME: &str = "Standard (unassigned id)";

/// Standard code in NCBI order: TTT, TTC, TTA, TTG, TCT, ...
/// (T, C, A, G per position).
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Codons of an alternate code that differ from the standard code.
struct TableDiff {
    id: u32,
    name: &'static str,
    changes: &'static [(&'static [u8; 3], u8)],
}

const TABLE_DIFFS: &[TableDiff] = &[
    TableDiff {
        id: 1,
        name: "Standard",
        changes: &[],
    },
    TableDiff {
        id: 2,
        name: "Vertebrate Mitochondrial",
        changes: &[(b"TGA", b'W'), (b"ATA", b'M'), (b"AGA", b'*'), (b"AGG", b'*')],
    },
    TableDiff {
        id: 3,
        name: "Yeast Mitochondrial",
        changes: &[
            (b"TGA", b'W'),
            (b"CTT", b'T'),
            (b"CTC", b'T'),
            (b"CTA", b'T'),
            (b"CTG", b'T'),
            (b"ATA", b'M'),
        ],
    },
    TableDiff {
        id: 4,
        name: "Mold/Protozoan/Coelenterate Mitochondrial",
        changes: &[(b"TGA", b'W')],
    },
    TableDiff {
        id: 5,
        name: "Invertebrate Mitochondrial",
        changes: &[(b"TGA", b'W'), (b"ATA", b'M'), (b"AGA", b'S'), (b"AGG", b'S')],
    },
    TableDiff {
        id: 6,
        name: "Ciliate/Dasycladacean/Hexamita Nuclear",
        changes: &[(b"TAA", b'Q'), (b"TAG", b'Q')],
    },
    TableDiff {
        id: 9,
        name: "Echinoderm/Flatworm Mitochondrial",
        changes: &[(b"TGA", b'W'), (b"AAA", b'N'), (b"AGA", b'S'), (b"AGG", b'S')],
    },
    TableDiff {
        id: 10,
        name: "Euplotid Nuclear",
        changes: &[(b"TGA", b'C')],
    },
    TableDiff {
        id: 11,
        name: "Bacterial/Archaeal/Plant Plastid",
        changes: &[],
    },
    TableDiff {
        id: 12,
        name: "Alternative Yeast Nuclear",
        changes: &[(b"CTG", b'S')],
    },
    TableDiff {
        id: 13,
        name: "Ascidian Mitochondrial",
        changes: &[(b"TGA", b'W'), (b"ATA", b'M'), (b"AGA", b'G'), (b"AGG", b'G')],
    },
    TableDiff {
        id: 14,
        name: "Alternative Flatworm Mitochondrial",
        changes: &[
            (b"TAA", b'Y'),
            (b"TGA", b'W'),
            (b"AAA", b'N'),
            (b"AGA", b'S'),
            (b"AGG", b'S'),
        ],
    },
    TableDiff {
        id: 15,
        name: "Blepharisma Macronuclear",
        changes: &[(b"TAG", b'Q')],
    },
    TableDiff {
        id: 16,
        name: "Chlorophycean Mitochondrial",
        changes: &[(b"TAG", b'L')],
    },
    TableDiff {
        id: 21,
        name: "Trematode Mitochondrial",
        changes: &[
            (b"TGA", b'W'),
            (b"ATA", b'M'),
            (b"AAA", b'N'),
            (b"AGA", b'S'),
            (b"AGG", b'S'),
        ],
    },
    TableDiff {
        id: 22,
        name: "Scenedesmus obliquus Mitochondrial",
        changes: &[(b"TCA", b'*'), (b"TAG", b'L')],
    },
    TableDiff {
        id: 23,
        name: "Thraustochytrium Mitochondrial",
        changes: &[(b"TTA", b'*')],
    },
    TableDiff {
        id: 24,
        name: "Rhabdopleuridae Mitochondrial",
        changes: &[(b"TGA", b'W'), (b"AGA", b'S'), (b"AGG", b'K')],
    },
    TableDiff {
        id: 25,
        name: "Candidate Division SR1/Gracilibacteria",
        changes: &[(b"TGA", b'G')],
    },
    TableDiff {
        id: 26,
        name: "Pachysolen tannophilus Nuclear",
        changes: &[(b"CTG", b'A')],
    },
    TableDiff {
        id: 27,
        name: "Karyorelict Nuclear",
        changes: &[(b"TAA", b'Q'), (b"TAG", b'Q'), (b"TGA", b'W')],
    },
    TableDiff {
        id: 28,
        name: "Condylostoma Nuclear",
        changes: &[(b"TAA", b'Q'), (b"TAG", b'Q'), (b"TGA", b'W')],
    },
    TableDiff {
        id: 29,
        name: "Mesodinium Nuclear",
        changes: &[(b"TAA", b'Y'), (b"TAG", b'Y')],
    },
    TableDiff {
        id: 30,
        name: "Peritrich Nuclear",
        changes: &[(b"TAA", b'E'), (b"TAG", b'E')],
    },
    TableDiff {
        id: 31,
        name: "Blastocrithidia Nuclear",
        changes: &[(b"TAA", b'E'), (b"TAG", b'E'), (b"TGA", b'W')],
    },
];

/// Errors that can occur while building a code table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneticCodeError {
    #[error("invalid table code: {0}, must be between 0 and 31")]
    InvalidTable(u32),
}

/// Returns the name of a genetic code, or `None` if the id is out of range.
///
/// Unassigned ids inside the range use the standard code and report
/// [`UNASSIGNED_TABLE_NAME`].
pub fn table_name(id: u32) -> Option<&'static str> {
    (id <= MAX_TABLE_ID).then(|| code_name(id))
}

/// Checks that a table id is in the accepted range.
pub fn validate_table_id(id: u32) -> Result<(), GeneticCodeError> {
    if id > MAX_TABLE_ID {
        return Err(GeneticCodeError::InvalidTable(id));
    }
    Ok(())
}

fn code_name(id: u32) -> &'static str {
    match (id, find_diff(id)) {
        (0, _) => "Standard",
        (_, Some(diff)) => diff.name,
        (_, None) => UNASSIGNED_TABLE_NAME,
    }
}

fn find_diff(id: u32) -> Option<&'static TableDiff> {
    TABLE_DIFFS.iter().find(|diff| diff.id == id)
}

/// Position of a base in NCBI codon order (T, C, A, G).
fn ncbi_rank(base: u8) -> Option<usize> {
    match base {
        b'T' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

fn ncbi_index(codon: &[u8; 3]) -> Option<usize> {
    Some(ncbi_rank(codon[0])? * 16 + ncbi_rank(codon[1])? * 4 + ncbi_rank(codon[2])?)
}

/// An immutable codon → amino acid table.
///
/// Built once per run and shared by reference between all workers.
#[derive(Debug, Clone)]
pub struct CodeTable {
    id: u32,
    name: &'static str,
    codons: HashMap<CodonKey, u8>,
}

impl CodeTable {
    /// Builds the table for a genetic code id.
    ///
    /// Id 0 selects the standard code; ids 1-31 select the NCBI code with the
    /// same number, and ids NCBI left unassigned fall back to the standard
    /// code. Besides the 64 codons, the table holds a two-base entry for every
    /// prefix whose four extensions all encode the same amino acid.
    pub fn build(id: u32) -> Result<Self, GeneticCodeError> {
        validate_table_id(id)?;
        Ok(Self::assemble(id))
    }

    /// Returns the standard genetic code.
    pub fn standard() -> Self {
        Self::assemble(0)
    }

    // `id` must already be in range.
    fn assemble(id: u32) -> Self {
        let mut amino_acids = *STANDARD_CODE;
        if let Some(diff) = find_diff(id) {
            for (codon, aa) in diff.changes {
                if let Some(idx) = ncbi_index(codon) {
                    amino_acids[idx] = *aa;
                }
            }
        }
        let name = code_name(id);

        let mut codons = HashMap::with_capacity(64 + 16);
        let bases = Nucleotide::BASES;

        for (i, &first) in bases.iter().enumerate() {
            for (j, &second) in bases.iter().enumerate() {
                let block = &amino_acids[i * 16 + j * 4..i * 16 + j * 4 + 4];
                for (k, &third) in bases.iter().enumerate() {
                    codons.insert(CodonKey::triplet(first, second, third), block[k]);
                }
                // All four extensions agree: the prefix alone is decisive
                if block.iter().all(|&aa| aa == block[0]) {
                    codons.insert(CodonKey::doublet(first, second), block[0]);
                }
            }
        }

        debug!(
            "Built genetic code table {} ({}) with {} entries",
            id,
            name,
            codons.len()
        );

        Self { id, name, codons }
    }

    /// Returns the table id this table was built from.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the name of the genetic code.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the number of entries (three-base and two-base keys).
    pub fn len(&self) -> usize {
        self.codons.len()
    }

    /// Returns true if the table holds no entry.
    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    /// Looks up a packed codon.
    #[inline]
    pub fn get(&self, key: CodonKey) -> Option<u8> {
        self.codons.get(&key).copied()
    }

    /// Translates a textual codon of two or three letters.
    ///
    /// Returns `X` for anything the table cannot resolve, including letters
    /// outside the nucleotide alphabet.
    pub fn translate_codon(&self, codon: &[u8]) -> u8 {
        let bases: Option<Vec<Nucleotide>> =
            codon.iter().map(|&b| Nucleotide::from_ascii(b)).collect();
        bases
            .as_deref()
            .and_then(CodonKey::from_slice)
            .and_then(|key| self.get(key))
            .unwrap_or(UNKNOWN_AMINO_ACID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_codons() -> Vec<[u8; 3]> {
        let bases = [b'T', b'C', b'A', b'G'];
        let mut codons = Vec::with_capacity(64);
        for &b1 in &bases {
            for &b2 in &bases {
                for &b3 in &bases {
                    codons.push([b1, b2, b3]);
                }
            }
        }
        codons
    }

    #[test]
    fn test_standard_code_translation() {
        let standard = CodeTable::build(0).unwrap();

        assert_eq!(standard.translate_codon(b"ATG"), b'M'); // Start codon
        assert_eq!(standard.translate_codon(b"TAA"), b'*'); // Stop codon
        assert_eq!(standard.translate_codon(b"TAG"), b'*');
        assert_eq!(standard.translate_codon(b"TGA"), b'*');
        assert_eq!(standard.translate_codon(b"TGG"), b'W');
        assert_eq!(standard.translate_codon(b"TTT"), b'F');
        assert_eq!(standard.translate_codon(b"GGG"), b'G');
        assert_eq!(standard.translate_codon(b"AGA"), b'R');
    }

    #[test]
    fn test_standard_matches_ncbi_order() {
        let standard = CodeTable::standard();
        for (idx, codon) in all_codons().iter().enumerate() {
            assert_eq!(
                standard.translate_codon(codon),
                STANDARD_CODE[idx],
                "codon {}",
                String::from_utf8_lossy(codon)
            );
        }
    }

    #[test]
    fn test_two_letter_fallback() {
        let standard = CodeTable::standard();

        // Fourfold degenerate prefixes
        assert_eq!(standard.translate_codon(b"GC"), b'A');
        assert_eq!(standard.translate_codon(b"GG"), b'G');
        assert_eq!(standard.translate_codon(b"CT"), b'L');
        assert_eq!(standard.translate_codon(b"AC"), b'T');

        // Ambiguous prefixes
        assert_eq!(standard.translate_codon(b"AG"), b'X');
        assert_eq!(standard.translate_codon(b"AT"), b'X');
        assert_eq!(standard.translate_codon(b"TA"), b'X');

        // 64 codons + 8 unambiguous prefixes
        assert_eq!(standard.len(), 72);
    }

    #[test]
    fn test_trailing_n_resolves_through_prefix() {
        let standard = CodeTable::standard();
        assert_eq!(standard.translate_codon(b"GCN"), b'A');
        assert_eq!(standard.translate_codon(b"ATN"), b'X');
        assert_eq!(standard.translate_codon(b"NCG"), b'X');
        assert_eq!(standard.translate_codon(b"ANG"), b'X');
    }

    #[test]
    fn test_invalid_letters() {
        let standard = CodeTable::standard();
        assert_eq!(standard.translate_codon(b"AUG"), b'X');
        assert_eq!(standard.translate_codon(b"atg"), b'X');
        assert_eq!(standard.translate_codon(b"A"), b'X');
        assert_eq!(standard.translate_codon(b"ATGA"), b'X');
    }

    #[test]
    fn test_different_genetic_codes() {
        // In standard code, TGA is stop
        let standard = CodeTable::build(0).unwrap();
        assert_eq!(standard.translate_codon(b"TGA"), b'*');

        // In vertebrate mitochondrial (code 2), TGA is Trp (W)
        let vert_mito = CodeTable::build(2).unwrap();
        assert_eq!(vert_mito.translate_codon(b"TGA"), b'W');
        assert_eq!(vert_mito.translate_codon(b"AGA"), b'*');
        assert_eq!(vert_mito.name(), "Vertebrate Mitochondrial");
    }

    #[test]
    fn test_alternate_tables_only_change_their_diffs() {
        let standard = CodeTable::standard();
        for diff in TABLE_DIFFS {
            let table = CodeTable::build(diff.id).unwrap();
            for codon in all_codons() {
                let changed = diff.changes.iter().find(|(c, _)| **c == codon);
                let expected = match changed {
                    Some((_, aa)) => *aa,
                    None => standard.translate_codon(&codon),
                };
                assert_eq!(
                    table.translate_codon(&codon),
                    expected,
                    "table {} codon {}",
                    diff.id,
                    String::from_utf8_lossy(&codon)
                );
            }
        }
    }

    #[test]
    fn test_fallback_follows_alternate_code() {
        // Yeast mitochondrial: CTN is Thr, still fourfold degenerate
        let yeast = CodeTable::build(3).unwrap();
        assert_eq!(yeast.translate_codon(b"CT"), b'T');

        // Alternative yeast nuclear: CTG is Ser, so CT is no longer decisive
        let alt_yeast = CodeTable::build(12).unwrap();
        assert_eq!(alt_yeast.translate_codon(b"CT"), b'X');
        assert_eq!(alt_yeast.translate_codon(b"CTA"), b'L');
    }

    #[test]
    fn test_table_one_equals_standard() {
        let zero = CodeTable::build(0).unwrap();
        let one = CodeTable::build(1).unwrap();
        assert_eq!(zero.codons, one.codons);
    }

    #[test]
    fn test_invalid_table_ids() {
        assert_eq!(CodeTable::build(32).unwrap_err(), GeneticCodeError::InvalidTable(32));
        assert_eq!(CodeTable::build(100).unwrap_err(), GeneticCodeError::InvalidTable(100));
    }

    #[test]
    fn test_unassigned_ids_use_standard_code() {
        let standard = CodeTable::standard();
        for id in [7, 8, 17, 18, 19, 20] {
            let table = CodeTable::build(id).unwrap();
            assert_eq!(table.id(), id);
            assert_eq!(table.name(), UNASSIGNED_TABLE_NAME);
            assert_eq!(table.codons, standard.codons);
        }
    }

    #[test]
    fn test_validate_table_id() {
        assert!(validate_table_id(0).is_ok());
        assert!(validate_table_id(31).is_ok());
        assert_eq!(validate_table_id(32), Err(GeneticCodeError::InvalidTable(32)));
        assert!(validate_table_id(19).is_ok());
    }

    #[test]
    fn test_table_names() {
        assert_eq!(table_name(0), Some("Standard"));
        assert_eq!(table_name(11), Some("Bacterial/Archaeal/Plant Plastid"));
        assert_eq!(table_name(7), Some(UNASSIGNED_TABLE_NAME));
        assert_eq!(table_name(31), Some("Blastocrithidia Nuclear"));
        assert_eq!(table_name(40), None);
    }
}
