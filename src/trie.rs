use crate::node::{common_prefix_len, Edge, Node};
use crate::topk::{Collect, Suggestion, TermSink, TopK, Visit};
use crate::Config;

use std::convert::Infallible;

/// Answer to a prefix query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    /// Matching terms. Highest frequency first when the query was bounded,
    /// tree order otherwise.
    pub entries: Vec<Suggestion>,
    /// Frequency of the prefix itself when it is a stored term, else `0`.
    pub prefix_frequency: u64,
}

/// A radix trie of `(term, frequency)` pairs answering top-K prefix queries.
///
/// Frequencies only accumulate: adding an existing term merges into its
/// count, and there is no removal.
///
/// The trie has no interior locking. Shared use across threads needs an
/// external reader/writer lock: queries take `&self`, insertion takes
/// `&mut self`.
#[derive(Debug, Clone)]
pub struct PruningRadixTrie {
    root: Node,
    term_count: u64,
    pub(crate) term_count_at_last_persist: u64,
    config: Config,
}

/// Result of the structural half of an insertion.
struct Placed {
    /// Frequency to propagate up the insertion path.
    frequency: u64,
    /// A node became terminal that was not before.
    new_term: bool,
}

impl PruningRadixTrie {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            root: Node::default(),
            term_count: 0,
            term_count_at_last_persist: 0,
            config,
        }
    }

    /// Number of distinct stored terms.
    pub fn len(&self) -> u64 {
        self.term_count
    }

    pub fn is_empty(&self) -> bool {
        self.term_count == 0
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read-only view of the tree. The root is never terminal.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Merges `frequency` into the count stored for `term`.
    ///
    /// A zero `frequency` creates structure only. The empty term is ignored.
    /// Counts saturate at `u64::MAX`.
    pub fn add_term(&mut self, term: impl AsRef<[u8]>, frequency: u64) {
        let term = term.as_ref();
        if term.is_empty() {
            return;
        }

        let mut path = Vec::new();
        let placed = place(&mut self.root, term, frequency, &mut path);
        if placed.new_term {
            self.term_count += 1;
        }
        propagate(&mut self.root, &path, placed.frequency);
    }

    /// Frequency of `term` if it is stored.
    pub fn frequency(&self, term: impl AsRef<[u8]>) -> Option<u64> {
        let mut node = &self.root;
        let mut rest = term.as_ref();
        while !rest.is_empty() {
            let edge = node.edges.iter().find(|e| rest.starts_with(&e.label))?;
            rest = &rest[edge.label.len()..];
            node = &edge.child;
        }
        Some(node.terminal_frequency).filter(|&f| f > 0)
    }

    /// Terms starting with `prefix`.
    ///
    /// `k == 0` returns every match in tree order. Otherwise the `k` most
    /// frequent matches are returned, highest first, ties in tree order.
    /// `pruning` only changes how much of the tree is visited, never the
    /// answer.
    pub fn top_k_for_prefix(&self, prefix: impl AsRef<[u8]>, k: usize, pruning: bool) -> Suggestions {
        let prefix = prefix.as_ref();
        if k == 0 {
            self.collect(prefix, Collect::new(), pruning)
        } else {
            self.collect(prefix, TopK::new(k), pruning)
        }
    }

    fn collect<S>(&self, prefix: &[u8], mut sink: S, pruning: bool) -> Suggestions
    where
        S: TermSink<Error = Infallible> + Into<Vec<Suggestion>>,
    {
        let prefix_frequency = infallible(self.visit_prefix(prefix, &mut sink, pruning));
        Suggestions {
            entries: sink.into(),
            prefix_frequency,
        }
    }

    /// [`top_k_for_prefix`](Self::top_k_for_prefix) with the configured
    /// `k` and pruning.
    pub fn suggest(&self, prefix: impl AsRef<[u8]>) -> Suggestions {
        self.top_k_for_prefix(prefix, self.config.default_top_k, self.config.pruning)
    }

    /// Calls `f` for every stored term in tree order.
    pub fn for_each_term(&self, f: impl FnMut(&[u8], u64)) {
        let mut term = Vec::new();
        infallible(walk_subtree(&self.root, &mut term, &mut Visit(f), false));
    }

    /// Descends to the subtree matching `prefix` and feeds every terminal in
    /// it to `sink`. With `pruning`, subtrees the sink no longer
    /// [`wants`](TermSink::wants) are skipped.
    ///
    /// Returns the prefix's own frequency, `0` if it is not a stored term.
    pub fn visit_prefix<S: TermSink>(
        &self,
        prefix: &[u8],
        sink: &mut S,
        pruning: bool,
    ) -> Result<u64, S::Error> {
        let mut term = Vec::with_capacity(prefix.len() + 16);
        if prefix.is_empty() {
            walk_subtree(&self.root, &mut term, sink, pruning)?;
            return Ok(0);
        }

        let mut node = &self.root;
        let mut rest = prefix;
        'descend: loop {
            for edge in &node.edges {
                if edge.label.starts_with(rest) {
                    term.extend_from_slice(&edge.label);
                    let child = &edge.child;
                    if child.is_terminal() {
                        sink.accept(&term, child.terminal_frequency)?;
                    }
                    walk_subtree(child, &mut term, sink, pruning)?;
                    return Ok(if rest.len() == edge.label.len() {
                        child.terminal_frequency
                    } else {
                        0
                    });
                }
                if rest.starts_with(&edge.label) {
                    term.extend_from_slice(&edge.label);
                    rest = &rest[edge.label.len()..];
                    node = &edge.child;
                    continue 'descend;
                }
            }
            return Ok(0);
        }
    }
}

impl Default for PruningRadixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: AsRef<[u8]>> Extend<(T, u64)> for PruningRadixTrie {
    fn extend<I: IntoIterator<Item = (T, u64)>>(&mut self, iter: I) {
        for (term, frequency) in iter {
            self.add_term(term, frequency);
        }
    }
}

impl<T: AsRef<[u8]>> FromIterator<(T, u64)> for PruningRadixTrie {
    fn from_iter<I: IntoIterator<Item = (T, u64)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

#[inline]
fn infallible<T>(r: Result<T, Infallible>) -> T {
    r.unwrap_or_else(|never| match never {})
}

// =============================================================================
// Insertion
// =============================================================================

/// Makes the structural change for `term` below `root` and records, in
/// `path`, the edge index taken at every node from the root down to the
/// edge whose child received the frequency. Bounds and edge order are left
/// for [`propagate`].
fn place(root: &mut Node, term: &[u8], frequency: u64, path: &mut Vec<usize>) -> Placed {
    let mut node = root;
    let mut rest = term;
    loop {
        // Labels are prefix-free, so at most one edge shares a first byte.
        let found = node.edges.iter().enumerate().find_map(|(i, e)| {
            let common = common_prefix_len(rest, &e.label);
            (common > 0).then_some((i, common))
        });

        let Some((idx, common)) = found else {
            path.push(node.edges.len());
            node.edges.push(Edge::new(rest, Node::leaf(frequency)));
            return Placed {
                frequency,
                new_term: frequency > 0,
            };
        };
        path.push(idx);

        let label_len = node.edges[idx].label.len();
        if common == label_len {
            if common == rest.len() {
                let child = &mut node.edges[idx].child;
                let was_terminal = child.is_terminal();
                child.terminal_frequency = child.terminal_frequency.saturating_add(frequency);
                return Placed {
                    frequency: child.terminal_frequency,
                    new_term: !was_terminal && child.is_terminal(),
                };
            }
            rest = &rest[common..];
            node = &mut node.edges[idx].child;
            continue;
        }

        // The edge label runs past the divergence point: split it. The old
        // child moves under a new node reached by the shared prefix.
        let edge = &mut node.edges[idx];
        let old_child = std::mem::take(&mut edge.child);
        let old_bound = old_child.subtree_max_frequency;
        let mut branch = Node {
            edges: vec![Edge::new(&edge.label[common..], old_child)],
            terminal_frequency: 0,
            subtree_max_frequency: old_bound,
        };
        if common == rest.len() {
            // The new term ends at the split point.
            branch.terminal_frequency = frequency;
        } else {
            branch
                .edges
                .push(Edge::new(&rest[common..], Node::leaf(frequency)));
            path.push(1);
        }
        branch.raise_bound(frequency);
        edge.label = Box::from(&rest[..common]);
        edge.child = branch;
        return Placed {
            frequency,
            new_term: frequency > 0,
        };
    }
}

/// Raises the bound of every node along `path` to `frequency` and restores
/// descending edge order at each of them.
fn propagate(root: &mut Node, path: &[usize], frequency: u64) {
    let mut node = root;
    node.raise_bound(frequency);
    for &idx in path {
        node.edges[idx].child.raise_bound(frequency);
        let idx = node.sift_edge_forward(idx);
        node = &mut node.edges[idx].child;
    }
}

// =============================================================================
// Enumeration
// =============================================================================

struct Frame<'a> {
    node: &'a Node,
    next: usize,
    /// Length of `term` when this node was entered.
    depth: usize,
}

/// Depth-first walk of everything below `root`, visiting edges in their
/// stored order. `term` holds the bytes leading to `root` on entry.
///
/// With `pruning`, a node's remaining edges are abandoned as soon as the
/// sink no longer wants the next child's bound: siblings are sorted by
/// descending bound, so none of them can do better.
fn walk_subtree<'a, S: TermSink>(
    root: &'a Node,
    term: &mut Vec<u8>,
    sink: &mut S,
    pruning: bool,
) -> Result<(), S::Error> {
    let mut stack = vec![Frame {
        node: root,
        next: 0,
        depth: term.len(),
    }];

    while let Some(frame) = stack.last_mut() {
        let node: &'a Node = frame.node;
        let depth = frame.depth;
        let Some(edge) = node.edges.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let child = &edge.child;
        if pruning && !sink.wants(child.subtree_max_frequency) {
            stack.pop();
            continue;
        }

        term.truncate(depth);
        term.extend_from_slice(&edge.label);
        if child.is_terminal() {
            sink.accept(term, child.terminal_frequency)?;
        }
        if !child.edges.is_empty() {
            stack.push(Frame {
                node: child,
                next: 0,
                depth: term.len(),
            });
        }
    }
    Ok(())
}
