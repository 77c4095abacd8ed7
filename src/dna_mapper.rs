// src/dna_mapper.rs
// BASE-LEVEL UTILITIES
// Symbol handling for the four-letter DNA alphabet, plus the small lookup-table
// operations built on it: complement, codon translation, GC% and melting temperature.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Base {
    A, C, G, T,
}

impl Base {
    pub fn to_char(self) -> char {
        match self {
            Base::A => 'A', Base::C => 'C', Base::G => 'G', Base::T => 'T',
        }
    }

    /// Case-insensitive; anything outside ACGT is rejected.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A), 'C' => Some(Base::C),
            'G' => Some(Base::G), 'T' => Some(Base::T),
            _ => None,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_char(b as char)
    }

    pub fn complement(self) -> Base {
        match self {
            Base::A => Base::T, Base::C => Base::G,
            Base::G => Base::C, Base::T => Base::A,
        }
    }

    pub fn is_gc(self) -> bool {
        matches!(self, Base::G | Base::C)
    }

    /// Maps the base to 0-3 (A, C, G, T) for table lookups.
    pub fn idx(self) -> usize {
        match self { Base::A => 0, Base::C => 1, Base::G => 2, Base::T => 3 }
    }
}

/// Standard genetic code indexed by `16 * b1 + 4 * b2 + b3` with A=0, C=1, G=2, T=3.
/// Stop codons translate to '_'.
const CODON_TABLE: &[u8; 64] =
    b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV_Y_YSSSS_CWCLFLF";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StabilityReport {
    pub gc_content: f64,
    pub melting_temp: f64,
}

pub struct DnaMapper;

impl DnaMapper {
    /// Upper-cases the input and drops every symbol outside ACGT.
    pub fn clean(raw: &str) -> String {
        raw.chars()
            .filter_map(Base::from_char)
            .map(Base::to_char)
            .collect()
    }

    /// Reverse complement over the canonical alphabet. Unknown symbols pass through unchanged.
    pub fn reverse_complement(dna: &str) -> String {
        dna.chars()
            .rev()
            .map(|c| Base::from_char(c).map(|b| b.complement().to_char()).unwrap_or(c))
            .collect()
    }

    /// Translates codon by codon from the first base; a trailing partial codon is ignored.
    /// Codons containing a non-ACGT symbol become '?'.
    pub fn translate(dna: &str) -> String {
        dna.as_bytes()
            .chunks_exact(3)
            .map(|codon| {
                let mut key = 0;
                for &b in codon {
                    match Base::from_byte(b) {
                        Some(base) => key = key * 4 + base.idx(),
                        None => return '?',
                    }
                }
                CODON_TABLE[key] as char
            })
            .collect()
    }

    /// Returns (gc, at) symbol counts.
    pub fn base_counts(dna: &str) -> (usize, usize) {
        let mut gc = 0;
        let mut at = 0;
        for base in dna.bytes().filter_map(Base::from_byte) {
            if base.is_gc() { gc += 1 } else { at += 1 }
        }
        (gc, at)
    }

    pub fn gc_percent(dna: &str) -> f64 {
        if dna.is_empty() {
            return 0.0;
        }
        let (gc, _) = Self::base_counts(dna);
        (gc as f64 / dna.len() as f64) * 100.0
    }

    /// Melting temperature estimate.
    /// Wallace rule (4·GC + 2·AT) below 14 bases, otherwise 64.9 + 41·(GC − 16.4)/length.
    pub fn melting_temp(dna: &str) -> f64 {
        let (gc, at) = Self::base_counts(dna);
        if dna.len() < 14 {
            return (4 * gc + 2 * at) as f64;
        }
        64.9 + 41.0 * (gc as f64 - 16.4) / dna.len() as f64
    }

    pub fn analyze_stability(dna: &str) -> StabilityReport {
        StabilityReport {
            gc_content: Self::gc_percent(dna),
            melting_temp: Self::melting_temp(dna),
        }
    }
}
