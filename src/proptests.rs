use crate::{
    BinarySearchStore, InsertOutcome, Key, KeyOrder, LookupStore, Record, RecordGenerator,
    SequentialStore,
};

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, HashMap};

fn validate_tree(t: &BinarySearchStore) {
    let mut stack: Vec<(usize, Option<Key>, Option<Key>)> = Vec::new();
    if let Some(root) = t.root {
        stack.push((root, None, None));
    } else {
        assert!(t.nodes.is_empty(), "empty root with allocated nodes");
    }

    let mut seen = vec![false; t.nodes.len()];
    while let Some((idx, lo, hi)) = stack.pop() {
        assert!(!seen[idx], "node {idx} reachable twice");
        seen[idx] = true;

        let node = &t.nodes[idx];
        let key = node.record.key;
        if let Some(lo) = lo {
            assert!(key > lo, "key {key} not greater than ancestor bound {lo}");
        }
        if let Some(hi) = hi {
            assert!(key < hi, "key {key} not less than ancestor bound {hi}");
        }
        if let Some(l) = node.left {
            stack.push((l, lo, Some(key)));
        }
        if let Some(r) = node.right {
            stack.push((r, Some(key), hi));
        }
    }

    assert!(seen.iter().all(|&s| s), "every arena node must be reachable");
}

/// Depth the key `q` has, or would have if inserted next, in a BST built from
/// `inserted` in order. `x` is an ancestor of `q` iff no key strictly between
/// them was inserted before `x`.
fn model_depth(inserted: &[Key], q: Key) -> u64 {
    let pos: HashMap<Key, usize> = inserted.iter().enumerate().map(|(i, &k)| (k, i)).collect();
    let q_pos = pos.get(&q).copied().unwrap_or(inserted.len());
    let ancestors = inserted[..q_pos]
        .iter()
        .enumerate()
        .filter(|&(xi, &x)| {
            let (lo, hi) = if x < q { (x, q) } else { (q, x) };
            !inserted[..xi].iter().any(|&y| lo < y && y < hi)
        })
        .count();
    ancestors as u64 + 1
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(#[proptest(strategy = "1u64..64")] Key, u32),
    Search(#[proptest(strategy = "0u64..72")] Key),
}

fn unique_keys() -> impl Strategy<Value = Vec<Key>> {
    prop::collection::hash_set(1u64..10_000, 0..200).prop_flat_map(|set| {
        let keys: Vec<Key> = set.into_iter().collect();
        Just(keys).prop_shuffle()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_generated_keys_are_dense(n in 1usize..500, sorted in any::<bool>(), seed in any::<u64>()) {
        let records = RecordGenerator::from_seed(seed)
            .generate(n, KeyOrder::from_sorted(sorted))
            .unwrap();
        let mut keys: Vec<Key> = records.iter().map(|r| r.key).collect();
        if sorted {
            prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
        keys.sort_unstable();
        prop_assert_eq!(keys, (1..=n as Key).collect::<Vec<_>>());
    }

    #[test]
    fn prop_equivalence_ops(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        let mut t = BinarySearchStore::new();
        let mut s = SequentialStore::new();
        let mut m: BTreeMap<Key, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, aux) => {
                    let rec = Record::new(key, aux, "p");
                    let expected = if m.contains_key(&key) {
                        InsertOutcome::Duplicate
                    } else {
                        m.insert(key, aux);
                        InsertOutcome::Inserted
                    };
                    prop_assert_eq!(t.insert(rec.clone()), expected);
                    if expected == InsertOutcome::Inserted {
                        s.insert(rec);
                    }
                }
                Op::Search(key) => {
                    let want = m.get(&key).copied();
                    prop_assert_eq!(t.probe(key).record.map(|r| r.auxiliary), want);
                    prop_assert_eq!(s.probe(key).record.map(|r| r.auxiliary), want);
                }
            }
            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(s.len(), m.len());
        }

        validate_tree(&t);
        let got: Vec<(Key, u32)> = t.iter().map(|r| (r.key, r.auxiliary)).collect();
        let expected: Vec<(Key, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_round_trip_and_comparisons(keys in unique_keys(), misses in prop::collection::vec(10_000u64..20_000, 1..20)) {
        let records: Vec<Record> = keys
            .iter()
            .map(|&k| Record::new(k, (k % 97) as u32, format!("r{k}")))
            .collect();
        let mut t = BinarySearchStore::new();
        let mut s = SequentialStore::new();
        prop_assert_eq!(t.extend(records.iter().cloned()), keys.len());
        prop_assert_eq!(s.extend(records.iter().cloned()), keys.len());
        validate_tree(&t);

        for (pos, rec) in records.iter().enumerate() {
            let tp = t.probe(rec.key);
            prop_assert_eq!(tp.record, Some(rec));
            prop_assert_eq!(tp.comparisons, model_depth(&keys, rec.key));

            let sp = s.probe(rec.key);
            prop_assert_eq!(sp.record, Some(rec));
            prop_assert_eq!(sp.comparisons, pos as u64 + 1);
        }

        for q in misses {
            let tp = t.probe(q);
            prop_assert!(tp.record.is_none());
            let expected = if keys.is_empty() { 0 } else { model_depth(&keys, q) };
            prop_assert_eq!(tp.comparisons, expected);

            let sp = s.probe(q);
            prop_assert!(sp.record.is_none());
            prop_assert_eq!(sp.comparisons, keys.len() as u64);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Key> = vec![1, 3, 4, 5, 8, 13];

    for_each_permutation(&keys, |perm| {
        let mut t = BinarySearchStore::new();
        for &k in &perm {
            assert_eq!(t.insert(Record::new(k, 0, "x")), InsertOutcome::Inserted);
        }
        // A second pass is all duplicates and changes nothing.
        for &k in &perm {
            assert_eq!(t.insert(Record::new(k, 1, "y")), InsertOutcome::Duplicate);
        }

        validate_tree(&t);
        let got: Vec<Key> = t.iter().map(|r| r.key).collect();
        assert_eq!(got, keys);
        for &k in &perm {
            assert_eq!(t.depth_of(k), Some(model_depth(&perm, k)));
        }
        for q in [0, 2, 6, 20] {
            assert_eq!(t.probe(q).comparisons, model_depth(&perm, q));
        }
    });
}

#[test]
fn model_depth_matches_worked_example() {
    let order = [5, 3, 8, 1, 4];
    assert_eq!(model_depth(&order, 8), 2);
    assert_eq!(model_depth(&order, 1), 3);
    assert_eq!(model_depth(&order, 9), 3);
}
