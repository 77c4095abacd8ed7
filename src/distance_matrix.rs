// src/distance_matrix.rs
// PAIRWISE DISTANCE MATRIX
// Runs the aligner once per unordered pair. The pairs are independent, so they are
// scored on the rayon pool and mirrored into a flat row-major matrix afterwards.
//
// Cost: n(n-1)/2 alignments of O(L²) each, i.e. O(n²L²) overall.

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::aligner::SequenceAligner;
use crate::error::{DnakitError, Result};
use crate::sequence::Sequence;

/// Symmetric n×n matrix with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from explicit rows, checking shape, symmetry and the zero diagonal.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);
        for row in rows {
            if row.len() != size {
                return Err(DnakitError::MatrixShape { expected: size, found: row.len() });
            }
            values.extend_from_slice(row);
        }

        let matrix = Self { size, values };
        for i in 0..size {
            if matrix.get(i, i) != 0.0 {
                return Err(DnakitError::AsymmetricMatrix { row: i, col: i });
            }
            for j in (i + 1)..size {
                if matrix.get(i, j) != matrix.get(j, i) {
                    return Err(DnakitError::AsymmetricMatrix { row: i, col: j });
                }
            }
        }
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks(self.size.max(1))
    }
}

pub struct DistanceMatrixBuilder;

impl DistanceMatrixBuilder {
    pub fn build(sequences: &[Sequence]) -> DistanceMatrix {
        let n = sequences.len();

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let scored: Vec<(usize, usize, f64)> = pairs
            .into_par_iter()
            .map(|(i, j)| {
                let d = SequenceAligner::distance(&sequences[i].bases, &sequences[j].bases);
                (i, j, d)
            })
            .collect();

        let mut values = vec![0.0; n * n];
        for (i, j, d) in scored {
            values[i * n + j] = d;
            values[j * n + i] = d;
        }

        info!(sequences = n, alignments = n * n.saturating_sub(1) / 2, "distance matrix built");
        DistanceMatrix { size: n, values }
    }
}
