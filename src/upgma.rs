// src/upgma.rs
// UPGMA CLUSTERING
// Agglomerative average-linkage clustering of a distance matrix into a rooted binary tree.
//
// Merge heights are recorded as half the average-linkage distance. Average linkage can
// produce a child whose height exceeds its parent's under floating-point ties; the tree
// is returned as built.

use std::fmt::Write;

use serde::Serialize;
use tracing::{debug, info};

use crate::distance_matrix::{DistanceMatrix, DistanceMatrixBuilder};
use crate::error::{DnakitError, Result};
use crate::sequence::Sequence;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterNode {
    /// One input sequence; `index` is its position in the input list.
    Leaf { index: usize, sequence: Sequence },
    /// A merge of two clusters. `members` lists the leaf indices, left subtree first.
    Internal {
        left: Box<ClusterNode>,
        right: Box<ClusterNode>,
        distance: f64,
        members: Vec<usize>,
    },
}

impl ClusterNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, ClusterNode::Leaf { .. })
    }

    pub fn members(&self) -> &[usize] {
        match self {
            ClusterNode::Leaf { index, .. } => std::slice::from_ref(index),
            ClusterNode::Internal { members, .. } => members,
        }
    }

    /// Merge distance of an internal node; leaves sit at 0.
    pub fn height(&self) -> f64 {
        match self {
            ClusterNode::Leaf { .. } => 0.0,
            ClusterNode::Internal { distance, .. } => *distance,
        }
    }

    pub fn children(&self) -> Option<(&ClusterNode, &ClusterNode)> {
        match self {
            ClusterNode::Leaf { .. } => None,
            ClusterNode::Internal { left, right, .. } => Some((left, right)),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((l, r)) => l.leaf_count() + r.leaf_count(),
        }
    }

    pub fn internal_count(&self) -> usize {
        match self.children() {
            None => 0,
            Some((l, r)) => 1 + l.internal_count() + r.internal_count(),
        }
    }

    /// Leaf sequences in left-to-right drawing order.
    pub fn leaves(&self) -> Vec<&Sequence> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Sequence>) {
        match self {
            ClusterNode::Leaf { sequence, .. } => out.push(sequence),
            ClusterNode::Internal { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    /// Newick rendering. Branch length is parent height minus child height.
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_newick(&mut out);
        out.push(';');
        out
    }

    fn write_newick(&self, out: &mut String) {
        match self {
            ClusterNode::Leaf { sequence, .. } => out.push_str(&newick_label(&sequence.name)),
            ClusterNode::Internal { left, right, distance, .. } => {
                out.push('(');
                left.write_newick(out);
                let _ = write!(out, ":{:.4},", distance - left.height());
                right.write_newick(out);
                let _ = write!(out, ":{:.4})", distance - right.height());
            }
        }
    }
}

fn newick_label(name: &str) -> String {
    if name.chars().any(|c| " ()[]':;,".contains(c)) {
        format!("'{}'", name.replace('\'', "''"))
    } else {
        name.to_string()
    }
}

/// Mean of the original pairwise distances between every member of `a` and every member of `b`.
fn average_linkage(matrix: &DistanceMatrix, a: &[usize], b: &[usize]) -> f64 {
    let mut sum = 0.0;
    for &x in a {
        for &y in b {
            sum += matrix.get(x, y);
        }
    }
    sum / (a.len() * b.len()) as f64
}

pub struct TreeBuilder;

impl TreeBuilder {
    /// Aligns every pair of sequences and clusters the resulting matrix.
    pub fn build(sequences: &[Sequence]) -> Result<ClusterNode> {
        if sequences.len() < 2 {
            return Err(DnakitError::InsufficientSequences { found: sequences.len() });
        }
        let matrix = DistanceMatrixBuilder::build(sequences);
        Self::cluster(sequences, &matrix)
    }

    /// UPGMA over a precomputed matrix.
    ///
    /// Each round rescans all cluster pairs (O(n³) overall). The first minimal pair in
    /// row-major order wins, and the lower-index cluster becomes the left child.
    pub fn cluster(sequences: &[Sequence], matrix: &DistanceMatrix) -> Result<ClusterNode> {
        if sequences.len() < 2 {
            return Err(DnakitError::InsufficientSequences { found: sequences.len() });
        }
        if matrix.len() != sequences.len() {
            return Err(DnakitError::MatrixShape { expected: sequences.len(), found: matrix.len() });
        }

        let mut clusters: Vec<ClusterNode> = sequences
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, sequence)| ClusterNode::Leaf { index, sequence })
            .collect();

        while clusters.len() > 1 {
            let mut min_dist = f64::INFINITY;
            let mut pair = (0, 1);

            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    let d = average_linkage(matrix, clusters[i].members(), clusters[j].members());
                    if d < min_dist {
                        min_dist = d;
                        pair = (i, j);
                    }
                }
            }

            // j > i, so removing j first leaves i in place
            let (i, j) = pair;
            let right = clusters.remove(j);
            let left = clusters.remove(i);

            let mut members = left.members().to_vec();
            members.extend_from_slice(right.members());
            debug!(?members, distance = min_dist, "merged clusters");

            clusters.push(ClusterNode::Internal {
                left: Box::new(left),
                right: Box::new(right),
                distance: min_dist / 2.0,
                members,
            });
        }

        let root = clusters
            .pop()
            .ok_or(DnakitError::InsufficientSequences { found: 0 })?;
        info!(leaves = sequences.len(), height = root.height(), "UPGMA tree built");
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<Sequence> {
        names.iter().map(|n| Sequence::new(n, "ACGTACGT")).collect()
    }

    fn internal_members(node: &ClusterNode) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        if let Some((l, r)) = node.children() {
            out.push(node.members().to_vec());
            out.extend(internal_members(l));
            out.extend(internal_members(r));
        }
        out
    }

    #[test]
    fn tie_break_takes_first_pair_in_row_major_order() {
        // (0,3) and (1,2) tie at 0.1; (0,3) is scanned first.
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 0.5, 0.5, 0.1],
            vec![0.5, 0.0, 0.1, 0.5],
            vec![0.5, 0.1, 0.0, 0.5],
            vec![0.1, 0.5, 0.5, 0.0],
        ])
        .unwrap();
        let root = TreeBuilder::cluster(&named(&["a", "b", "c", "d"]), &m).unwrap();

        // Working list after round one: [b, c, {a,d}], so {b,c} merges next and
        // the root joins {a,d} (lower index) with {b,c}.
        assert_eq!(root.members(), &[0, 3, 1, 2]);
        let (left, right) = root.children().unwrap();
        assert_eq!(left.members(), &[0, 3]);
        assert_eq!(right.members(), &[1, 2]);
        assert_eq!(left.height(), 0.05);
        assert_eq!(root.height(), 0.25);
    }

    #[test]
    fn counts_hold_under_permutation() {
        let base = [
            vec![0.0, 0.2, 0.6, 0.7, 0.9],
            vec![0.2, 0.0, 0.5, 0.8, 0.4],
            vec![0.6, 0.5, 0.0, 0.3, 0.6],
            vec![0.7, 0.8, 0.3, 0.0, 0.2],
            vec![0.9, 0.4, 0.6, 0.2, 0.0],
        ];
        let names = ["a", "b", "c", "d", "e"];
        for perm in [[0, 1, 2, 3, 4], [4, 3, 2, 1, 0], [2, 0, 4, 1, 3]] {
            let rows: Vec<Vec<f64>> = perm
                .iter()
                .map(|&i| perm.iter().map(|&j| base[i][j]).collect())
                .collect();
            let seqs: Vec<Sequence> = perm.iter().map(|&i| Sequence::new(names[i], "ACGTA")).collect();
            let m = DistanceMatrix::from_rows(&rows).unwrap();
            let root = TreeBuilder::cluster(&seqs, &m).unwrap();
            assert_eq!(root.leaf_count(), 5);
            assert_eq!(root.internal_count(), 4);
            let mut members = root.members().to_vec();
            members.sort();
            assert_eq!(members, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn near_identical_pair_merges_first() {
        let seqs = vec![
            Sequence::new("A", "ACGTACGTAC"),
            Sequence::new("B", "ACGTACGTAA"),
            Sequence::new("C", "TTTTGGGGCC"),
        ];
        let root = TreeBuilder::build(&seqs).unwrap();
        assert_eq!(internal_members(&root), vec![vec![2, 0, 1], vec![0, 1]]);

        let (left, right) = root.children().unwrap();
        assert!(left.is_leaf());
        assert_eq!(left.members(), &[2]);
        // One mismatch in ten bases: distance 0.1, merge height 0.05
        assert!((right.height() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn newick_uses_height_differences() {
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 0.2, 0.8, 0.8],
            vec![0.2, 0.0, 0.8, 0.8],
            vec![0.8, 0.8, 0.0, 0.2],
            vec![0.8, 0.8, 0.2, 0.0],
        ])
        .unwrap();
        let root = TreeBuilder::cluster(&named(&["a", "b", "c", "d e"]), &m).unwrap();
        assert_eq!(
            root.to_newick(),
            "((a:0.1000,b:0.1000):0.3000,(c:0.1000,'d e':0.1000):0.3000);"
        );
        let names: Vec<_> = root.leaves().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, ["a", "b", "c", "d e"]);
    }

    #[test]
    fn two_sequences_make_one_merge() {
        let seqs = vec![Sequence::new("x", "ACGT"), Sequence::new("y", "ACGT")];
        let root = TreeBuilder::build(&seqs).unwrap();
        assert_eq!(root.internal_count(), 1);
        assert_eq!(root.height(), 0.0);
    }

    #[test]
    fn rejects_single_sequence_and_bad_matrix() {
        let one = named(&["solo"]);
        assert!(matches!(
            TreeBuilder::build(&one),
            Err(DnakitError::InsufficientSequences { found: 1 })
        ));
        let m = DistanceMatrix::from_rows(&[vec![0.0, 0.1], vec![0.1, 0.0]]).unwrap();
        assert!(matches!(
            TreeBuilder::cluster(&named(&["a", "b", "c"]), &m),
            Err(DnakitError::MatrixShape { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn serializes_for_presentation_layer() {
        let seqs = vec![Sequence::new("x", "ACGTA"), Sequence::new("y", "ACGTT")];
        let root = TreeBuilder::build(&seqs).unwrap();
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["kind"], "internal");
        assert_eq!(json["left"]["kind"], "leaf");
        assert_eq!(json["left"]["sequence"]["name"], "x");
    }
}
