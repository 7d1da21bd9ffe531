//! # pruning-radix-trie
//!
//! A radix trie of `(term, frequency)` pairs that answers "the K most
//! frequent terms starting with this prefix" without scanning the whole
//! vocabulary.
//!
//! Every node records the largest frequency found anywhere below it, and
//! each node's edges are kept sorted by that bound, highest first. A top-K
//! query can therefore stop visiting a node's remaining edges as soon as the
//! next one cannot beat the current K-th result.
//!
//! ## Example
//!
//! ```rust
//! use pruning_radix_trie::PruningRadixTrie;
//!
//! let mut trie = PruningRadixTrie::new();
//! trie.add_term("apple", 5);
//! trie.add_term("appetizer", 3);
//! trie.add_term("appetite", 2);
//! trie.add_term("banana", 4);
//!
//! let found = trie.top_k_for_prefix("app", 3, true);
//! let terms: Vec<_> = found.entries.iter().map(|s| (s.as_str().unwrap(), s.frequency)).collect();
//! assert_eq!(terms, [("apple", 5), ("appetizer", 3), ("appetite", 2)]);
//! assert_eq!(found.prefix_frequency, 0);
//! ```
//!
//! Terms are plain byte strings compared byte by byte; no Unicode
//! segmentation is applied.

#![warn(clippy::all)]

mod error;
mod node;
mod persist;
mod topk;
mod trie;

pub use error::PersistError;
pub use node::{Edge, Node};
pub use persist::{ExportOutcome, ImportStats};
pub use topk::{Collect, Suggestion, TermSink, TopK};
pub use trie::{PruningRadixTrie, Suggestions};

// =============================================================================
// Configuration
// =============================================================================

/// Separates the term from its frequency in the term file.
pub const FIELD_SEPARATOR: u8 = b'\t';
/// Ends each record in the term file.
pub const RECORD_TERMINATOR: u8 = b'\n';
/// Result size used by [`PruningRadixTrie::suggest`] unless configured.
pub const DEFAULT_TOP_K: usize = 10;

/// Query defaults for a [`PruningRadixTrie`].
#[derive(Debug, Clone)]
pub struct Config {
    /// `k` for [`PruningRadixTrie::suggest`]; `0` returns every match.
    pub default_top_k: usize,
    /// Whether [`PruningRadixTrie::suggest`] prunes.
    pub pruning: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            pruning: true,
        }
    }
}

#[cfg(test)]
mod proptests;
