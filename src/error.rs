// src/error.rs
use thiserror::Error;

/// Rejected-input conditions raised at the validation seams of the library.
/// The algorithms themselves never fail on well-formed input.
#[derive(Error, Debug)]
pub enum DnakitError {
    /// Tree building needs at least two usable sequences
    #[error("at least two valid sequences are required, found {found}")]
    InsufficientSequences { found: usize },
    /// Distance matrix does not match the sequence set
    #[error("distance matrix shape mismatch: expected {expected}x{expected}, found {found}")]
    MatrixShape { expected: usize, found: usize },
    #[error("distance matrix is not symmetric with a zero diagonal at ({row}, {col})")]
    AsymmetricMatrix { row: usize, col: usize },
    /// Target region does not fit inside the sequence
    #[error("invalid target region {start}..{end} for a sequence of length {len}")]
    InvalidRegion { start: usize, end: usize, len: usize },
    #[error("no non-zero counts supplied")]
    EmptyCounts,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DnakitError>;
