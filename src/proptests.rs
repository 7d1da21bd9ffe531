use super::*;
use crate::node::common_prefix_len;

use proptest::prelude::*;
use std::collections::BTreeMap;

/// Checks every structural invariant and returns the number of terminals.
fn validate_node(node: &Node) -> u64 {
    let mut terminals = u64::from(node.is_terminal());
    let mut max = node.terminal_frequency();

    for (i, edge) in node.edges().iter().enumerate() {
        assert!(!edge.label().is_empty(), "empty edge label");
        for other in &node.edges()[i + 1..] {
            assert_eq!(
                common_prefix_len(edge.label(), other.label()),
                0,
                "sibling labels {:?} and {:?} share a prefix",
                edge.label(),
                other.label()
            );
            assert!(
                edge.child().subtree_max_frequency() >= other.child().subtree_max_frequency(),
                "edges not sorted by descending bound"
            );
        }
        terminals += validate_node(edge.child());
        max = max.max(edge.child().subtree_max_frequency());
    }

    assert_eq!(
        node.subtree_max_frequency(),
        max,
        "stored bound must equal the largest frequency below"
    );
    terminals
}

fn validate_trie(t: &PruningRadixTrie) {
    assert!(!t.root().is_terminal(), "root must not be terminal");
    assert_eq!(validate_node(t.root()), t.len(), "terminal count must match len");
}

/// Model answer: matches in tree order, stably sorted by frequency, cut to `k`.
fn expected_top_k(t: &PruningRadixTrie, prefix: &[u8], k: usize) -> Vec<Suggestion> {
    let mut all = t.top_k_for_prefix(prefix, 0, false).entries;
    all.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    all.truncate(k);
    all
}

fn term_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet forces shared prefixes, splits and merges.
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', b'd']), 1..=8)
}

fn entries_strategy() -> impl Strategy<Value = Vec<(Vec<u8>, u64)>> {
    prop::collection::vec((term_strategy(), 0u64..50), 0..=300)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_model(entries in entries_strategy()) {
        let mut t = PruningRadixTrie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (term, frequency) in entries {
            t.add_term(&term, frequency);
            *m.entry(term).or_insert(0) += frequency;
            validate_trie(&t);
        }
        m.retain(|_, f| *f > 0);

        prop_assert_eq!(t.len(), m.len() as u64);
        for (term, frequency) in &m {
            prop_assert_eq!(t.frequency(term), Some(*frequency));
        }

        let mut got: Vec<(Vec<u8>, u64)> = Vec::new();
        t.for_each_term(|term, f| got.push((term.to_vec(), f)));
        got.sort();
        let expected: Vec<(Vec<u8>, u64)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_pruning_preserves_answer(
        entries in entries_strategy(),
        prefix in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', b'd']), 0..=3),
        k in 1usize..8,
    ) {
        let t: PruningRadixTrie = entries.into_iter().collect();

        let pruned = t.top_k_for_prefix(&prefix, k, true);
        let unpruned = t.top_k_for_prefix(&prefix, k, false);
        prop_assert_eq!(&pruned, &unpruned);
        prop_assert_eq!(pruned.entries, expected_top_k(&t, &prefix, k));
        prop_assert_eq!(pruned.prefix_frequency, t.frequency(&prefix).unwrap_or(0));
    }

    #[test]
    fn prop_prefix_matches_are_complete(
        entries in entries_strategy(),
        prefix in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', b'd']), 0..=3),
    ) {
        let t: PruningRadixTrie = entries.into_iter().collect();

        let mut got: Vec<Vec<u8>> = t
            .top_k_for_prefix(&prefix, 0, true)
            .entries
            .into_iter()
            .map(|s| s.term)
            .collect();
        got.sort();

        let mut expected = Vec::new();
        t.for_each_term(|term, _| {
            if term.starts_with(&prefix) {
                expected.push(term.to_vec());
            }
        });
        expected.sort();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_export_import_round_trip(
        entries in prop::collection::vec((term_strategy(), 1u64..50), 0..=200),
        prefix in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', b'd']), 0..=2),
        k in 0usize..6,
    ) {
        let t: PruningRadixTrie = entries.into_iter().collect();

        let mut file = Vec::new();
        t.write_terms(&mut file).unwrap();
        let mut loaded = PruningRadixTrie::new();
        loaded.read_terms(&file[..]).unwrap();

        validate_trie(&loaded);
        prop_assert_eq!(loaded.len(), t.len());
        prop_assert_eq!(
            loaded.top_k_for_prefix(&prefix, k, true),
            t.top_k_for_prefix(&prefix, k, true)
        );
    }
}

/// Visits every ordering of `items` (iterative Heap's algorithm).
fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    let mut perm = items.to_vec();
    let mut counters = vec![0usize; perm.len()];
    f(perm.clone());

    let mut i = 1;
    while i < perm.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            perm.swap(j, i);
            f(perm.clone());
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

#[test]
fn permutations_cover_every_ordering() {
    let mut seen = std::collections::BTreeSet::new();
    for_each_permutation(&[1, 2, 3, 4], |perm| {
        seen.insert(perm);
    });
    assert_eq!(seen.len(), 24);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let entries: Vec<(&str, u64)> = vec![
        ("a", 3),
        ("ab", 1),
        ("abc", 6),
        ("abd", 2),
        ("b", 5),
        ("ba", 4),
    ];

    for_each_permutation(&entries, |perm| {
        let t: PruningRadixTrie = perm.into_iter().collect();
        validate_trie(&t);
        assert_eq!(t.len(), 6);

        let got: Vec<(String, u64)> = t
            .top_k_for_prefix("a", 3, true)
            .entries
            .into_iter()
            .map(|s| (String::from_utf8(s.term).unwrap(), s.frequency))
            .collect();
        assert_eq!(
            got,
            vec![("abc".to_string(), 6), ("a".to_string(), 3), ("abd".to_string(), 2)]
        );
        assert_eq!(t.top_k_for_prefix("ab", 1, true).prefix_frequency, 1);
    });
}

#[test]
fn exhaustive_merge_order_small_set() {
    let entries: Vec<(&str, u64)> = vec![("ab", 2), ("ab", 3), ("a", 1), ("abc", 0), ("abc", 4)];

    for_each_permutation(&entries, |perm| {
        let t: PruningRadixTrie = perm.into_iter().collect();
        validate_trie(&t);
        assert_eq!(t.len(), 3);
        assert_eq!(t.frequency("ab"), Some(5));
        assert_eq!(t.frequency("abc"), Some(4));
        assert_eq!(t.frequency("a"), Some(1));
    });
}
