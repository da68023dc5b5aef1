//! Pruning and serialization of the finished trie.
//!
//! The exported tree is a plain owned copy: pruning never touches the trie it
//! was built from. Each node keeps the move leading to it (color and
//! corner-local vertex), its absolute count and its share of all merged
//! sequences, with children sorted by descending count.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::board::{Color, Move, local_vertex, parse_local_vertex};
use crate::symmetry::LocalMove;
use crate::trie::{NodeId, Trie};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedMove {
    pub color: Color,
    /// Corner-local vertex, `D4` being the 4-4 point.
    pub vertex: String,
}

impl ExportedMove {
    pub fn from_move(mv: LocalMove) -> Self {
        Self {
            color: mv.color,
            vertex: local_vertex(mv.point),
        }
    }

    pub fn to_move(&self) -> Option<LocalMove> {
        parse_local_vertex(&self.vertex).map(|pt| Move::new(self.color, pt))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedNode {
    /// `None` only for the root.
    #[serde(rename = "move", default, skip_serializing_if = "Option::is_none")]
    pub mv: Option<ExportedMove>,
    pub count: u64,
    pub fraction: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExportedNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportedTree {
    /// Sequences the fractions are relative to.
    pub total: u64,
    pub threshold: f64,
    pub root: ExportedNode,
}

fn fraction(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn sort_children(children: &mut [ExportedNode]) {
    let key = |node: &ExportedNode| node.mv.as_ref().and_then(ExportedMove::to_move);
    children.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| key(a).cmp(&key(b))));
}

fn export_node(
    trie: &Trie,
    id: NodeId,
    mv: Option<LocalMove>,
    cutoff: f64,
    total: u64,
) -> ExportedNode {
    let mut children: Vec<ExportedNode> = trie
        .children(id)
        .filter(|&(_, child)| trie.count(child) as f64 >= cutoff)
        .map(|(next, child)| export_node(trie, child, Some(next), cutoff, total))
        .collect();
    sort_children(&mut children);
    ExportedNode {
        mv: mv.map(ExportedMove::from_move),
        count: trie.count(id),
        fraction: fraction(trie.count(id), total),
        children,
    }
}

/// Copy out every node whose count reaches `threshold_fraction * total_sequences`.
/// A node below the cutoff disappears with its whole subtree; the root is always kept.
pub fn prune_and_export(trie: &Trie, threshold_fraction: f64, total_sequences: u64) -> ExportedTree {
    let cutoff = threshold_fraction * total_sequences as f64;
    ExportedTree {
        total: total_sequences,
        threshold: threshold_fraction,
        root: export_node(trie, trie.root(), None, cutoff, total_sequences),
    }
}

fn prune_node(node: &ExportedNode, cutoff: f64) -> ExportedNode {
    ExportedNode {
        mv: node.mv.clone(),
        count: node.count,
        fraction: node.fraction,
        children: node
            .children
            .iter()
            .filter(|child| child.count as f64 >= cutoff)
            .map(|child| prune_node(child, cutoff))
            .collect(),
    }
}

impl ExportedTree {
    /// Prune an exported tree again, keeping its fractions relative to `total`.
    pub fn prune(&self, threshold_fraction: f64, total_sequences: u64) -> ExportedTree {
        let cutoff = threshold_fraction * total_sequences as f64;
        ExportedTree {
            total: self.total,
            threshold: threshold_fraction,
            root: prune_node(&self.root, cutoff),
        }
    }

    /// Number of nodes below the root.
    pub fn len(&self) -> usize {
        fn count(node: &ExportedNode) -> usize {
            node.children.iter().map(|c| 1 + count(c)).sum()
        }
        count(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Every root-to-leaf path with the leaf's count, most frequent first.
    pub fn sequences(&self) -> Vec<(Vec<LocalMove>, u64)> {
        let mut out = Vec::new();
        let mut stack: Vec<(&ExportedNode, Vec<LocalMove>)> = vec![(&self.root, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            if node.children.is_empty() && !path.is_empty() {
                out.push((path.clone(), node.count));
            }
            for child in &node.children {
                let mut next = path.clone();
                next.extend(child.mv.as_ref().and_then(ExportedMove::to_move));
                stack.push((child, next));
            }
        }
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

/// Write the tree as pretty-printed JSON.
pub fn write_json<W: Write>(tree: &ExportedTree, writer: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    fn mv(color: Color, x: usize, y: usize) -> LocalMove {
        Move::new(color, Point::new(x, y))
    }

    /// 10 sequences: six through B[D4], four through B[D3].
    fn sample() -> Trie {
        let mut trie = Trie::new();
        let d4 = mv(Color::Black, 3, 3);
        let d3 = mv(Color::Black, 3, 2);
        for _ in 0..4 {
            trie.merge(&[d4, mv(Color::White, 5, 2)]);
        }
        for _ in 0..2 {
            trie.merge(&[d4, mv(Color::White, 2, 2)]);
        }
        for _ in 0..4 {
            trie.merge(&[d3, mv(Color::White, 4, 2)]);
        }
        trie
    }

    #[test]
    fn test_half_threshold_removes_subtree() {
        let trie = sample();
        let tree = prune_and_export(&trie, 0.5, 10);
        assert_eq!(tree.root.count, 10);
        assert_eq!(tree.root.children.len(), 1);
        let d4 = &tree.root.children[0];
        assert_eq!(d4.mv.as_ref().map(|m| m.vertex.as_str()), Some("D4"));
        assert_eq!(d4.count, 6);
        assert!(d4.children.is_empty(), "4 and 2 are below the cutoff of 5");
        // The source trie is untouched.
        assert_eq!(trie.len(), 6);
    }

    #[test]
    fn test_children_sorted_by_count() {
        let tree = prune_and_export(&sample(), 0.0, 10);
        let counts: Vec<u64> = tree.root.children.iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![6, 4]);
        let d4 = &tree.root.children[0];
        assert_eq!(d4.children[0].count, 4);
        assert_eq!(d4.children[1].count, 2);
        assert!((d4.fraction - 0.6).abs() < 1e-12);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_prune_is_idempotent() {
        let trie = sample();
        for threshold in [0.0, 0.2, 0.3, 0.5, 0.9] {
            let once = prune_and_export(&trie, threshold, 10);
            assert_eq!(once.prune(threshold, 10), once);
        }
    }

    #[test]
    fn test_sequences_reconstruct_paths() {
        let tree = prune_and_export(&sample(), 0.0, 10);
        let seqs = tree.sequences();
        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[0].1, 4);
        assert_eq!(seqs[2], (vec![mv(Color::Black, 3, 3), mv(Color::White, 2, 2)], 2));
    }

    #[test]
    fn test_json_keeps_everything() {
        let tree = prune_and_export(&sample(), 0.25, 10);
        let mut buf = Vec::new();
        write_json(&tree, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(r#""vertex": "D4""#));
        let back: ExportedTree = serde_json::from_str(&text).unwrap();
        assert_eq!(back.total, 10);
        assert_eq!(back.len(), tree.len());
        assert_eq!(back.sequences(), tree.sequences());
    }

    #[test]
    fn test_empty_trie() {
        let tree = prune_and_export(&Trie::new(), 0.01, 0);
        assert!(tree.is_empty());
        assert_eq!(tree.root.fraction, 0.0);
    }
}
