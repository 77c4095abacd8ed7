// src/oligo.rs
// PRIMER CANDIDATES
// A candidate is a window of the template that passes, in order:
// (i)   3' clamp: last base of the primer is G or C
// (ii)  GC content within [40, 60] percent
// (iii) melting temperature within the allowed tolerance of the target
// (iv)  no intrusion into the protected target region
//
// Reverse primers are the reverse complement of the scanned window, so their 3' end
// sits at the window start.

use serde::Serialize;

use crate::dna_mapper::DnaMapper;
use crate::error::{DnakitError, Result};
use crate::{MAX_GC_PERCENT, MIN_GC_PERCENT};

/// Size of the fallback region used when no valid region is supplied.
pub const DEFAULT_REGION_SPAN: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strand {
    Forward,
    Reverse,
}

/// Protected region, 0-based and inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetRegion {
    pub start: usize,
    pub end: usize,
}

impl TargetRegion {
    pub fn new(start: usize, end: usize, sequence_len: usize) -> Result<Self> {
        if start >= end || end >= sequence_len {
            return Err(DnakitError::InvalidRegion { start, end, len: sequence_len });
        }
        Ok(Self { start, end })
    }

    /// Converts 1-based user coordinates, falling back to a 300-base region centred on
    /// the sequence when they are missing or do not fit.
    pub fn resolve(start_1based: Option<usize>, end_1based: Option<usize>, sequence_len: usize) -> Self {
        let explicit = match (start_1based, end_1based) {
            (Some(s), Some(e)) if s >= 1 && e >= 1 => Self::new(s - 1, e - 1, sequence_len).ok(),
            _ => None,
        };
        explicit.unwrap_or_else(|| Self::centered(sequence_len))
    }

    pub fn centered(sequence_len: usize) -> Self {
        let middle = sequence_len / 2;
        let half = DEFAULT_REGION_SPAN / 2;
        Self {
            start: middle.saturating_sub(half),
            end: (middle + half).min(sequence_len.saturating_sub(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimerCandidate {
    /// Offset of the scanned window in the template.
    pub start: usize,
    pub length: usize,
    /// Primer sequence 5'->3' (reverse complemented for reverse primers).
    pub sequence: String,
    pub melting_temp: f64,
    pub gc_percent: f64,
}

impl PrimerCandidate {
    /// Exclusive end of the scanned window.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimerPair {
    pub forward: PrimerCandidate,
    pub reverse: PrimerCandidate,
    pub product_length: usize,
}

impl PrimerPair {
    pub fn new(forward: PrimerCandidate, reverse: PrimerCandidate) -> Self {
        let product_length = reverse.end() - forward.start;
        Self { forward, reverse, product_length }
    }
}

pub struct Oligo;

impl Oligo {
    pub fn has_gc_clamp(primer: &str) -> bool {
        matches!(primer.as_bytes().last(), Some(b'G' | b'C'))
    }

    /// Applies filters (i)-(iii) to `template[start..start + length]`.
    /// Returns None when the window runs past the template or any filter fails.
    pub fn evaluate(
        template: &str,
        start: usize,
        length: usize,
        strand: Strand,
        desired_tm: f64,
        max_diff: f64,
    ) -> Option<PrimerCandidate> {
        let window = template.get(start..start + length)?;
        let sequence = match strand {
            Strand::Forward => window.to_string(),
            Strand::Reverse => DnaMapper::reverse_complement(window),
        };

        if !Self::has_gc_clamp(&sequence) {
            return None;
        }

        let gc_percent = DnaMapper::gc_percent(&sequence);
        if !(MIN_GC_PERCENT..=MAX_GC_PERCENT).contains(&gc_percent) {
            return None;
        }

        let melting_temp = DnaMapper::melting_temp(&sequence);
        if (melting_temp - desired_tm).abs() > max_diff {
            return None;
        }

        Some(PrimerCandidate { start, length, sequence, melting_temp, gc_percent })
    }

    /// Filter (iv): forward primers must end before the region, reverse primers start after it.
    pub fn clears_region(candidate: &PrimerCandidate, strand: Strand, region: &TargetRegion) -> bool {
        match strand {
            Strand::Forward => candidate.end() < region.start,
            Strand::Reverse => candidate.start > region.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMER: &str = "ATGCATGCATGCATGCATGC";

    fn tm_of(gc: f64, len: f64) -> f64 {
        64.9 + 41.0 * (gc - 16.4) / len
    }

    #[test]
    fn accepts_clamped_balanced_primer() {
        let c = Oligo::evaluate(PRIMER, 0, 20, Strand::Forward, tm_of(10.0, 20.0), 0.0).unwrap();
        assert_eq!(c.sequence, PRIMER);
        assert_eq!(c.gc_percent, 50.0);
        assert_eq!(c.end(), 20);
    }

    #[test]
    fn rejects_missing_clamp() {
        let template = "ATGCATGCATGCATGCATGCA";
        assert!(Oligo::evaluate(template, 1, 20, Strand::Forward, 50.0, 100.0).is_none());
        assert!(!Oligo::has_gc_clamp(""));
    }

    #[test]
    fn rejects_gc_outside_bounds() {
        // 18 bases, GC-rich: 15 GC
        let rich = "GCGCGCGCGCGCGCATAC";
        assert!(Oligo::evaluate(rich, 0, 18, Strand::Forward, 60.0, 100.0).is_none());
        // 18 bases, AT-rich: 3 GC
        let poor = "ATATATATATATATAGCC";
        assert!(Oligo::evaluate(poor, 0, 18, Strand::Forward, 60.0, 100.0).is_none());
    }

    #[test]
    fn rejects_tm_outside_tolerance() {
        let tm = tm_of(10.0, 20.0);
        assert!(Oligo::evaluate(PRIMER, 0, 20, Strand::Forward, tm + 1.0, 0.5).is_none());
        assert!(Oligo::evaluate(PRIMER, 0, 20, Strand::Forward, tm + 1.0, 1.5).is_some());
    }

    #[test]
    fn reverse_candidates_are_reverse_complemented() {
        let window = "GCATGCATGCATGCATGCAT";
        let c = Oligo::evaluate(window, 0, 20, Strand::Reverse, tm_of(10.0, 20.0), 0.0).unwrap();
        assert_eq!(c.sequence, PRIMER);
        assert_eq!(c.start, 0);
        // Forward reading of the same window ends in T
        assert!(Oligo::evaluate(window, 0, 20, Strand::Forward, tm_of(10.0, 20.0), 0.0).is_none());
    }

    #[test]
    fn window_past_template_end_is_rejected() {
        assert!(Oligo::evaluate(PRIMER, 5, 20, Strand::Forward, 50.0, 100.0).is_none());
    }

    #[test]
    fn region_intrusion() {
        let region = TargetRegion { start: 50, end: 80 };
        let mut c = Oligo::evaluate(PRIMER, 0, 20, Strand::Forward, 50.0, 100.0).unwrap();
        c.start = 29;
        assert!(Oligo::clears_region(&c, Strand::Forward, &region));
        c.start = 30;
        assert!(!Oligo::clears_region(&c, Strand::Forward, &region));
        c.start = 81;
        assert!(Oligo::clears_region(&c, Strand::Reverse, &region));
        c.start = 80;
        assert!(!Oligo::clears_region(&c, Strand::Reverse, &region));
    }

    #[test]
    fn product_length_spans_both_primers() {
        let fwd = PrimerCandidate { start: 10, length: 20, sequence: String::new(), melting_temp: 0.0, gc_percent: 0.0 };
        let rev = PrimerCandidate { start: 160, length: 22, ..fwd.clone() };
        assert_eq!(PrimerPair::new(fwd, rev).product_length, 172);
    }

    #[test]
    fn region_resolution() {
        assert_eq!(TargetRegion::resolve(Some(11), Some(20), 100), TargetRegion { start: 10, end: 19 });
        // end beyond the sequence falls back to the centred region
        assert_eq!(TargetRegion::resolve(Some(11), Some(2000), 1000), TargetRegion { start: 350, end: 650 });
        assert_eq!(TargetRegion::resolve(None, None, 100), TargetRegion { start: 0, end: 99 });
        assert_eq!(TargetRegion::resolve(Some(0), Some(5), 1000), TargetRegion::centered(1000));
        assert!(TargetRegion::new(5, 5, 10).is_err());
    }
}
