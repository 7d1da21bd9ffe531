//! Result accumulation for prefix enumeration.
//!
//! Enumeration is a single tree walk that hands every terminal it reaches
//! to a [`TermSink`]. The sink decides what to keep and tells the walk how
//! much of the remaining tree is still worth visiting.

use std::convert::Infallible;

/// A stored term together with its accumulated frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub term: Vec<u8>,
    pub frequency: u64,
}

impl Suggestion {
    pub fn new(term: impl Into<Vec<u8>>, frequency: u64) -> Self {
        Self {
            term: term.into(),
            frequency,
        }
    }

    /// The term as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.term).ok()
    }
}

/// Receives terms discovered by a trie walk.
pub trait TermSink {
    type Error;

    /// Whether a subtree whose best frequency is `bound` could still change
    /// what this sink holds. Returning `false` lets a pruned walk stop
    /// visiting the current node's remaining edges.
    fn wants(&self, bound: u64) -> bool;

    /// Offers one terminal. `term` is only valid for the duration of the call.
    fn accept(&mut self, term: &[u8], frequency: u64) -> Result<(), Self::Error>;
}

/// Bounded list of the `k` most frequent terms, highest first.
///
/// Among equal frequencies, earlier-offered terms stay ahead of later ones.
#[derive(Debug, Clone)]
pub struct TopK {
    k: usize,
    entries: Vec<Suggestion>,
}

impl TopK {
    /// `k` must be non-zero; use [`Collect`] for unbounded results.
    pub fn new(k: usize) -> Self {
        debug_assert!(k > 0);
        Self {
            k,
            entries: Vec::with_capacity(k.min(64) + 1),
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.k
    }

    /// Frequency of the k-th entry once the list is full.
    #[inline]
    pub fn floor(&self) -> Option<u64> {
        if self.is_full() {
            self.entries.last().map(|e| e.frequency)
        } else {
            None
        }
    }

    pub fn offer(&mut self, term: &[u8], frequency: u64) {
        if let Some(floor) = self.floor() {
            if frequency < floor {
                return;
            }
        }
        // First slot holding a strictly lower frequency: ties stay in
        // discovery order.
        let pos = self.entries.partition_point(|e| e.frequency >= frequency);
        if pos >= self.k {
            return;
        }
        self.entries.insert(pos, Suggestion::new(term, frequency));
        self.entries.truncate(self.k);
    }

    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Suggestion> {
        self.entries
    }
}

impl From<TopK> for Vec<Suggestion> {
    fn from(top: TopK) -> Self {
        top.into_vec()
    }
}

impl TermSink for TopK {
    type Error = Infallible;

    #[inline]
    fn wants(&self, bound: u64) -> bool {
        self.floor().map_or(true, |floor| bound > floor)
    }

    #[inline]
    fn accept(&mut self, term: &[u8], frequency: u64) -> Result<(), Infallible> {
        self.offer(term, frequency);
        Ok(())
    }
}

/// Unbounded collector that keeps terms in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Collect {
    entries: Vec<Suggestion>,
}

impl Collect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<Suggestion> {
        self.entries
    }
}

impl From<Collect> for Vec<Suggestion> {
    fn from(c: Collect) -> Self {
        c.into_vec()
    }
}

impl TermSink for Collect {
    type Error = Infallible;

    #[inline]
    fn wants(&self, _bound: u64) -> bool {
        true
    }

    #[inline]
    fn accept(&mut self, term: &[u8], frequency: u64) -> Result<(), Infallible> {
        self.entries.push(Suggestion::new(term, frequency));
        Ok(())
    }
}

/// Adapts a closure into a sink that sees every terminal.
pub(crate) struct Visit<F>(pub(crate) F);

impl<F: FnMut(&[u8], u64)> TermSink for Visit<F> {
    type Error = Infallible;

    #[inline]
    fn wants(&self, _bound: u64) -> bool {
        true
    }

    #[inline]
    fn accept(&mut self, term: &[u8], frequency: u64) -> Result<(), Infallible> {
        (self.0)(term, frequency);
        Ok(())
    }
}
