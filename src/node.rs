//! Node/edge storage for the compressed trie.
//!
//! A [`Node`] owns its outgoing [`Edge`]s, and every edge owns its child
//! node outright. There are no parent links or shared handles: the tree is
//! dropped as a whole together with the trie that owns the root.
//!
//! Two invariants are maintained by the insertion code in `trie.rs`:
//!
//! - Edge labels at one node never share a non-empty common prefix, so two
//!   distinct edges always diverge at their first byte.
//! - Edges are ordered by descending [`Node::subtree_max_frequency`] of
//!   their child. Pruned enumeration depends on this ordering.

/// One point in the compressed trie.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) edges: Vec<Edge>,
    pub(crate) terminal_frequency: u64,
    pub(crate) subtree_max_frequency: u64,
}

/// A labelled link from a node to the child it owns.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) label: Box<[u8]>,
    pub(crate) child: Node,
}

impl Node {
    /// A node that terminates a term with `frequency` and has no children.
    pub(crate) fn leaf(frequency: u64) -> Self {
        Self {
            edges: Vec::new(),
            terminal_frequency: frequency,
            subtree_max_frequency: frequency,
        }
    }

    /// Frequency of the term ending exactly here, `0` for a pure branch point.
    #[inline]
    pub fn terminal_frequency(&self) -> u64 {
        self.terminal_frequency
    }

    /// Largest terminal frequency found in this node or any descendant.
    #[inline]
    pub fn subtree_max_frequency(&self) -> u64 {
        self.subtree_max_frequency
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.terminal_frequency > 0
    }

    /// Outgoing edges, highest subtree bound first.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Raises the subtree bound to at least `frequency`. Never lowers it.
    #[inline]
    pub(crate) fn raise_bound(&mut self, frequency: u64) {
        self.subtree_max_frequency = self.subtree_max_frequency.max(frequency);
    }

    /// Moves the edge at `idx` towards the front while its predecessor has a
    /// strictly smaller bound. Returns the edge's new index.
    ///
    /// Only the edge at `idx` may have had its bound raised since the list
    /// was last sorted; equal bounds keep their relative order.
    pub(crate) fn sift_edge_forward(&mut self, mut idx: usize) -> usize {
        let bound = self.edges[idx].child.subtree_max_frequency;
        while idx > 0 && self.edges[idx - 1].child.subtree_max_frequency < bound {
            self.edges.swap(idx - 1, idx);
            idx -= 1;
        }
        idx
    }
}

impl Edge {
    pub(crate) fn new(label: impl Into<Box<[u8]>>, child: Node) -> Self {
        Self {
            label: label.into(),
            child,
        }
    }

    #[inline]
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    #[inline]
    pub fn child(&self) -> &Node {
        &self.child
    }
}

/// Length of the longest common prefix of `a` and `b`.
#[inline]
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
