// src/diversity.rs
// SPECIES DIVERSITY
// Shannon index and Pielou evenness over class counts.

use serde::Serialize;

use crate::error::{DnakitError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiversityReport {
    /// Shannon index H = -Σ p·ln(p) over the non-zero classes.
    pub shannon: f64,
    /// Pielou evenness J = H / ln(S); undefined with fewer than two non-zero classes.
    pub evenness: Option<f64>,
    pub total: u64,
    pub richness: usize,
}

/// Diversity of a set of class counts (e.g. individuals per species).
pub fn shannon_diversity(counts: &[u64]) -> Result<DiversityReport> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return Err(DnakitError::EmptyCounts);
    }

    let shannon = -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p.ln()
        })
        .sum::<f64>();

    let richness = counts.iter().filter(|&&c| c > 0).count();
    let evenness = (richness >= 2).then(|| shannon / (richness as f64).ln());

    Ok(DiversityReport { shannon, evenness, total, richness })
}
