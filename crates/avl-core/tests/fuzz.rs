//! Randomized interleavings with a full structural audit after every step.
//!
//! Each test prints its fuzzer seed; feed it back to `Fuzzer::new(Some(..))`
//! to replay a failure.

use avl_core::{audit, ArenaStore, AvlTree, SearchMode};
use avl_core_util::Fuzzer;

type Tree = AvlTree<ArenaStore<i64, ()>>;

fn inorder(tree: &Tree) -> Vec<i64> {
    tree.iter().map(|n| *tree.store().key(n)).collect()
}

#[test]
fn random_interleavings_keep_every_invariant() {
    let fuzzer = Fuzzer::new(None);
    println!("fuzzer seed: {:?}", fuzzer.seed);

    for _round in 0..6 {
        let mut tree: Tree = AvlTree::new(ArenaStore::new());
        let mut live: Vec<i64> = Vec::new();

        for _step in 0..200 {
            if live.is_empty() || fuzzer.chance(0.6) {
                let key = fuzzer.random_int(0, 499);
                let node = tree.store_mut().alloc(key, ());
                let got = tree.insert(node).unwrap();
                if live.contains(&key) {
                    assert_ne!(got, node, "duplicate insert must keep the resident node");
                    assert_eq!(*tree.store().key(got), key);
                } else {
                    assert_eq!(got, node);
                    live.push(key);
                }
            } else {
                let key = if fuzzer.chance(0.8) {
                    *fuzzer.pick(&live)
                } else {
                    fuzzer.random_int(0, 499)
                };
                let removed = tree.remove(&key).unwrap();
                if live.contains(&key) {
                    let node = removed.expect("resident key must come out");
                    assert_eq!(*tree.store().key(node), key);
                    live.retain(|&k| k != key);
                } else {
                    assert_eq!(removed, None);
                }
            }

            let stats = audit(&tree).unwrap();
            assert_eq!(stats.nodes, live.len());

            let mut expected = live.clone();
            expected.sort_unstable();
            assert_eq!(inorder(&tree), expected);
        }
    }
}

#[test]
fn insert_remove_round_trip_restores_the_sequence() {
    let fuzzer = Fuzzer::new(None);
    println!("fuzzer seed: {:?}", fuzzer.seed);

    for _round in 0..16 {
        let mut tree: Tree = AvlTree::new(ArenaStore::new());
        let keys = fuzzer.distinct_keys(64, 999);
        for &key in &keys {
            let node = tree.store_mut().alloc(key, ());
            tree.insert(node).unwrap();
        }
        let before = inorder(&tree);

        let fresh = 1000 + fuzzer.random_int(0, 99);
        let node = tree.store_mut().alloc(fresh, ());
        tree.insert(node).unwrap();
        audit(&tree).unwrap();
        assert_eq!(tree.remove(&fresh).unwrap(), Some(node));

        assert_eq!(inorder(&tree), before);
        audit(&tree).unwrap();
    }
}

#[test]
fn replace_keeps_the_sequence_identical() {
    let fuzzer = Fuzzer::new(None);
    println!("fuzzer seed: {:?}", fuzzer.seed);

    let mut tree: Tree = AvlTree::new(ArenaStore::new());
    let keys = fuzzer.distinct_keys(48, 500);
    for &key in &keys {
        let node = tree.store_mut().alloc(key, ());
        tree.insert(node).unwrap();
    }
    let before = inorder(&tree);

    for _ in 0..24 {
        let key = *fuzzer.pick(&keys);
        let old = tree.search(&key, SearchMode::Equal).unwrap().unwrap();
        let incoming = tree.store_mut().alloc(key, ());
        let displaced = tree.replace(incoming).unwrap();
        assert_eq!(displaced, Some(old));
        assert_eq!(
            tree.search(&key, SearchMode::Equal).unwrap(),
            Some(incoming)
        );
        assert_eq!(inorder(&tree), before);
        audit(&tree).unwrap();
    }
}

#[test]
fn sorted_inserts_respect_the_height_bound() {
    let mut tree: Tree = AvlTree::new(ArenaStore::new());
    for key in 0..512 {
        let node = tree.store_mut().alloc(key, ());
        tree.insert(node).unwrap();
    }
    let stats = audit(&tree).unwrap();
    let bound = 1.4405 * ((stats.nodes + 2) as f64).log2();
    assert!(
        (stats.height as f64) <= bound,
        "height {} over bound {bound}",
        stats.height
    );
}

#[test]
fn built_trees_survive_random_mutation() {
    let fuzzer = Fuzzer::new(None);
    println!("fuzzer seed: {:?}", fuzzer.seed);

    for _round in 0..8 {
        let n = fuzzer.random_int(1, 200) as usize;
        let mut tree: Tree = AvlTree::new(ArenaStore::new());
        let nodes: Vec<u32> = (0..n as i64)
            .map(|k| tree.store_mut().alloc(k * 10, ()))
            .collect();
        tree.build(nodes, n).unwrap();
        audit(&tree).unwrap();

        for _ in 0..40 {
            if fuzzer.chance(0.5) {
                let key = fuzzer.random_int(0, n as i64 * 10);
                let node = tree.store_mut().alloc(key, ());
                tree.insert(node).unwrap();
            } else {
                let key = fuzzer.random_int(0, n as i64 * 10);
                let _ = tree.remove(&key).unwrap();
            }
            audit(&tree).unwrap();
        }
    }
}
