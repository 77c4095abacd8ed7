// src/aligner.rs
// GLOBAL ALIGNMENT DISTANCE
// Needleman-Wunsch scoring with a linear gap penalty. Only the final score is kept;
// no traceback is performed and identity is derived from the score.

pub const MATCH_SCORE: i64 = 1;
pub const MISMATCH_SCORE: i64 = -1;
pub const GAP_SCORE: i64 = -1;

pub struct SequenceAligner;

impl SequenceAligner {
    /// Global alignment score of `a` against `b`.
    ///
    /// Fills the (m+1)×(n+1) grid row by row, keeping only the previous row.
    /// Complexity: O(m·n) time, O(n) space.
    pub fn score(a: &[u8], b: &[u8]) -> i64 {
        let n = b.len();
        let mut prev: Vec<i64> = (0..=n as i64).map(|j| j * GAP_SCORE).collect();
        let mut curr = vec![0i64; n + 1];

        for (i, &ai) in a.iter().enumerate() {
            curr[0] = (i as i64 + 1) * GAP_SCORE;
            for (j, &bj) in b.iter().enumerate() {
                let sub = if ai == bj { MATCH_SCORE } else { MISMATCH_SCORE };
                let diag = prev[j] + sub;
                let up = prev[j + 1] + GAP_SCORE;
                let left = curr[j] + GAP_SCORE;
                curr[j + 1] = diag.max(up).max(left);
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        prev[n]
    }

    /// Dissimilarity in [0, 1] for well-formed input.
    ///
    /// `identical = (score + max(m, n)) / 2`, `distance = 1 - identical / max(m, n)`.
    /// This approximates percent identity from the score alone and diverges from a
    /// traceback-based identity when the lengths differ.
    pub fn distance(a: &str, b: &str) -> f64 {
        let aligned = a.len().max(b.len());
        if aligned == 0 {
            return 0.0;
        }
        let score = Self::score(a.as_bytes(), b.as_bytes());
        let aligned = aligned as f64;
        let identical = (score as f64 + aligned) / 2.0;
        1.0 - identical / aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_have_zero_distance() {
        assert_eq!(SequenceAligner::distance("ACGT", "ACGT"), 0.0);
    }

    #[test]
    fn fully_mismatched_equal_length() {
        assert_eq!(SequenceAligner::score(b"AAAA", b"TTTT"), -4);
        assert_eq!(SequenceAligner::distance("AAAA", "TTTT"), 1.0);
    }

    #[test]
    fn shifted_alignment_beats_all_mismatches() {
        // ACGT- / -TGCA: one match, two mismatches, two gaps
        assert_eq!(SequenceAligner::score(b"ACGT", b"TGCA"), -3);
        assert_eq!(SequenceAligner::distance("ACGT", "TGCA"), 0.875);
    }

    #[test]
    fn gap_only_alignment_against_empty() {
        assert_eq!(SequenceAligner::score(b"", b"ACGT"), -4);
        assert_eq!(SequenceAligner::score(b"ACG", b""), -3);
        assert_eq!(SequenceAligner::distance("", "ACGT"), 1.0);
        assert_eq!(SequenceAligner::distance("", ""), 0.0);
    }

    #[test]
    fn single_deletion() {
        // Three matches and one gap
        assert_eq!(SequenceAligner::score(b"ACGT", b"ACG"), 2);
        assert_eq!(SequenceAligner::distance("ACGT", "ACG"), 0.25);
    }

    #[test]
    fn score_is_symmetric() {
        let pairs = [("GATTACA", "GCATGCT"), ("AAAAC", "CAAAA"), ("ACGTTGCA", "TT")];
        for (a, b) in pairs {
            assert_eq!(
                SequenceAligner::score(a.as_bytes(), b.as_bytes()),
                SequenceAligner::score(b.as_bytes(), a.as_bytes())
            );
        }
    }
}
