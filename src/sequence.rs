// src/sequence.rs
// INPUT LAYER
// Builds validated `Sequence` entities from raw user entries. Everything past this
// module assumes names are set and bases are restricted to ACGT.

use serde::Serialize;
use tracing::debug;

use crate::dna_mapper::DnaMapper;
use crate::error::{DnakitError, Result};
use crate::MIN_TREE_SEQUENCE_LEN;

pub const DEFAULT_NAME: &str = "Unnamed";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sequence {
    pub name: String,
    pub bases: String,
}

impl Sequence {
    /// Trims the name (falling back to "Unnamed") and filters the bases to ACGT.
    pub fn new(name: &str, raw_bases: &str) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() { DEFAULT_NAME.to_string() } else { name.to_string() },
            bases: DnaMapper::clean(raw_bases),
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Drops entries shorter than the tree-building threshold and rejects the set
/// if fewer than two remain.
pub fn prepare_tree_input(entries: Vec<Sequence>) -> Result<Vec<Sequence>> {
    let total = entries.len();
    let kept: Vec<Sequence> = entries
        .into_iter()
        .filter(|s| s.len() >= MIN_TREE_SEQUENCE_LEN)
        .collect();

    if kept.len() < total {
        debug!(dropped = total - kept.len(), "excluded sequences below minimum length");
    }
    if kept.len() < 2 {
        return Err(DnakitError::InsufficientSequences { found: kept.len() });
    }
    Ok(kept)
}
