//! Frequency-annotated prefix tree of canonical corner sequences.
//!
//! Nodes live in an arena and refer to their children by index. Node 0 is the
//! root (the empty sequence); its counter is the number of sequences merged.
//! Counts only ever grow: [`Trie::merge`] increments one path and
//! [`Trie::absorb`] adds another trie's counts, so combining per-worker tries
//! gives the same counts in any order.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::symmetry::LocalMove;

/// Index of a node in the arena.
pub type NodeId = usize;

#[derive(Clone, Debug, Default)]
pub struct Node {
    count: u64,
    children: BTreeMap<LocalMove, NodeId>,
}

impl Node {
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[derive(Clone, Debug)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub const ROOT: NodeId = 0;

    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of sequences merged so far.
    pub fn total(&self) -> u64 {
        self.nodes[Self::ROOT].count
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn count(&self, id: NodeId) -> u64 {
        self.nodes[id].count
    }

    /// Children of a node, ordered by move.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (LocalMove, NodeId)> + '_ {
        self.nodes[id].children.iter().map(|(&mv, &child)| (mv, child))
    }

    /// Node reached by following `path` from the root.
    pub fn get(&self, path: &[LocalMove]) -> Option<NodeId> {
        path.iter()
            .try_fold(Self::ROOT, |id, mv| self.nodes[id].children.get(mv).copied())
    }

    fn child_or_insert(&mut self, id: NodeId, mv: LocalMove) -> NodeId {
        if let Some(&child) = self.nodes[id].children.get(&mv) {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        self.nodes[id].children.insert(mv, child);
        child
    }

    /// Count one sequence: the root and every node along its path go up by one.
    /// Empty sequences are ignored.
    pub fn merge(&mut self, seq: &[LocalMove]) {
        if seq.is_empty() {
            return;
        }
        let mut id = Self::ROOT;
        self.nodes[id].count += 1;
        for &mv in seq {
            id = self.child_or_insert(id, mv);
            self.nodes[id].count += 1;
        }
    }

    /// Add every count of `other` into `self`.
    pub fn absorb(&mut self, other: &Trie) {
        let mut stack = vec![(Self::ROOT, Self::ROOT)];
        while let Some((theirs, ours)) = stack.pop() {
            let node = &other.nodes[theirs];
            self.nodes[ours].count += node.count;
            for (&mv, &child) in &node.children {
                let mine = self.child_or_insert(ours, mv);
                stack.push((child, mine));
            }
        }
    }

    /// Combine two tries, reusing the larger one's arena.
    pub fn join(self, other: Trie) -> Trie {
        let (mut big, small) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        big.absorb(&small);
        big
    }

    fn same_subtree(&self, ours: NodeId, other: &Trie, theirs: NodeId) -> bool {
        let a = &self.nodes[ours];
        let b = &other.nodes[theirs];
        a.count == b.count
            && a.children.len() == b.children.len()
            && a.children.iter().all(|(mv, &child)| {
                b.children
                    .get(mv)
                    .is_some_and(|&their_child| self.same_subtree(child, other, their_child))
            })
    }
}

/// Two tries are equal when they hold the same paths with the same counts,
/// whatever order their nodes were created in.
impl PartialEq for Trie {
    fn eq(&self, other: &Self) -> bool {
        self.same_subtree(Self::ROOT, other, Self::ROOT)
    }
}

/// A single trie shared by all workers. The lock is held for a whole merge,
/// so a sequence is either fully counted or not at all.
#[derive(Debug, Default)]
pub struct SharedTrie {
    inner: Mutex<Trie>,
}

impl SharedTrie {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, seq: &[LocalMove]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(seq);
    }

    pub fn merge_all(&self, seqs: &[Vec<LocalMove>]) {
        let mut trie = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        for seq in seqs {
            trie.merge(seq);
        }
    }

    pub fn into_inner(self) -> Trie {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
