// src/lib.rs
pub mod dna_mapper;
pub mod sequence;
pub mod fasta;
pub mod aligner;
pub mod distance_matrix;
pub mod upgma;
pub mod oligo;
pub mod primer_search;
pub mod diversity;
pub mod error;

pub use error::{DnakitError, Result};

/// Sequences shorter than this are dropped before tree building.
pub const MIN_TREE_SEQUENCE_LEN: usize = 5;

pub const MIN_PRIMER_LEN: usize = 18;
pub const MAX_PRIMER_LEN: usize = 30;

/// How far upstream/downstream of the target region primers are scanned.
pub const PRIMER_SEARCH_WINDOW: usize = 2000;

/// Forward start positions scanned between two progress checkpoints.
pub const CHECKPOINT_INTERVAL: usize = 100;

pub const MIN_GC_PERCENT: f64 = 40.0;
pub const MAX_GC_PERCENT: f64 = 60.0;
