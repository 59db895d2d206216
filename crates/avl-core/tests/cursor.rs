use avl_core::{ArenaStore, AvlTree, SearchMode};

type Tree = AvlTree<ArenaStore<i64, ()>>;

fn tree_of(keys: &[i64]) -> Tree {
    let mut tree = AvlTree::new(ArenaStore::new());
    for &key in keys {
        let node = tree.store_mut().alloc(key, ());
        tree.insert(node).unwrap();
    }
    tree
}

fn key_at(tree: &Tree, node: Option<u32>) -> Option<i64> {
    node.map(|n| *tree.store().key(n))
}

#[test]
fn seek_then_walk_both_directions() {
    let tree = tree_of(&[1, 2, 3, 4, 5]);
    let mut cursor = tree.cursor();

    cursor.seek(&3, SearchMode::Equal);
    assert_eq!(key_at(&tree, cursor.get()), Some(3));

    cursor.advance();
    assert_eq!(key_at(&tree, cursor.get()), Some(4));
    cursor.advance();
    assert_eq!(key_at(&tree, cursor.get()), Some(5));
    cursor.retreat();
    assert_eq!(key_at(&tree, cursor.get()), Some(4));
    cursor.retreat();
    assert_eq!(key_at(&tree, cursor.get()), Some(3));
    cursor.retreat();
    assert_eq!(key_at(&tree, cursor.get()), Some(2));
    cursor.retreat();
    assert_eq!(key_at(&tree, cursor.get()), Some(1));

    cursor.retreat();
    assert!(!cursor.is_valid());
    assert_eq!(cursor.get(), None);
}

#[test]
fn motions_on_an_invalid_cursor_stay_invalid() {
    let tree = tree_of(&[1, 2, 3]);
    let mut cursor = tree.cursor();

    assert!(!cursor.is_valid());
    cursor.advance();
    assert_eq!(cursor.get(), None);

    cursor.seek_greatest();
    cursor.advance();
    assert!(!cursor.is_valid());
    cursor.advance();
    cursor.retreat();
    assert!(!cursor.is_valid());
}

#[test]
fn seek_least_and_greatest_hit_the_ends() {
    let tree = tree_of(&[8, 3, 11, 1, 5, 9, 14]);
    let mut cursor = tree.cursor();

    cursor.seek_least();
    assert_eq!(key_at(&tree, cursor.get()), Some(1));
    cursor.retreat();
    assert!(!cursor.is_valid());

    cursor.seek_greatest();
    assert_eq!(key_at(&tree, cursor.get()), Some(14));
    cursor.advance();
    assert!(!cursor.is_valid());
}

#[test]
fn cursor_on_an_empty_tree_never_positions() {
    let tree = tree_of(&[]);
    let mut cursor = tree.cursor();
    cursor.seek_least();
    assert!(!cursor.is_valid());
    cursor.seek_greatest();
    assert!(!cursor.is_valid());
    cursor.seek(&1, SearchMode::GreaterOrEqual);
    assert!(!cursor.is_valid());
}

#[test]
fn forward_walk_enumerates_in_order() {
    let keys = [13, 2, 29, 7, 23, 5, 17, 3, 11, 19];
    let tree = tree_of(&keys);

    let mut walked = Vec::new();
    let mut cursor = tree.cursor();
    cursor.seek_least();
    while let Some(n) = cursor.get() {
        walked.push(*tree.store().key(n));
        cursor.advance();
    }

    let mut expected = keys.to_vec();
    expected.sort_unstable();
    assert_eq!(walked, expected);

    let collected: Vec<i64> = tree.iter().map(|n| *tree.store().key(n)).collect();
    assert_eq!(collected, expected);
}

#[test]
fn backward_walk_enumerates_in_reverse() {
    let keys = [13, 2, 29, 7, 23, 5, 17, 3, 11, 19];
    let tree = tree_of(&keys);

    let mut walked = Vec::new();
    let mut cursor = tree.cursor();
    cursor.seek_greatest();
    while let Some(n) = cursor.get() {
        walked.push(*tree.store().key(n));
        cursor.retreat();
    }

    let mut expected = keys.to_vec();
    expected.sort_unstable();
    expected.reverse();
    assert_eq!(walked, expected);
}

#[test]
fn cursor_agrees_with_search_threading() {
    let keys = [41, 8, 33, 15, 26, 4, 38, 11, 22, 30];
    let tree = tree_of(&keys);

    let via_cursor: Vec<i64> = tree.iter().map(|n| *tree.store().key(n)).collect();

    let mut via_search = Vec::new();
    let mut probe = tree.least().unwrap();
    while let Some(n) = probe {
        let key = *tree.store().key(n);
        via_search.push(key);
        probe = tree.search(&key, SearchMode::Greater).unwrap();
    }

    assert_eq!(via_cursor, via_search);
}

#[test]
fn inexact_seek_positions_on_the_best_candidate() {
    let tree = tree_of(&[10, 20, 30, 40, 50]);
    let mut cursor = tree.cursor();

    cursor.seek(&25, SearchMode::LessOrEqual);
    assert_eq!(key_at(&tree, cursor.get()), Some(20));
    cursor.advance();
    assert_eq!(key_at(&tree, cursor.get()), Some(30));

    cursor.seek(&25, SearchMode::GreaterOrEqual);
    assert_eq!(key_at(&tree, cursor.get()), Some(30));
    cursor.retreat();
    assert_eq!(key_at(&tree, cursor.get()), Some(20));

    cursor.seek(&30, SearchMode::Less);
    assert_eq!(key_at(&tree, cursor.get()), Some(20));
    cursor.seek(&30, SearchMode::Greater);
    assert_eq!(key_at(&tree, cursor.get()), Some(40));

    cursor.seek(&5, SearchMode::Less);
    assert!(!cursor.is_valid());
    cursor.seek(&55, SearchMode::Greater);
    assert!(!cursor.is_valid());
    cursor.seek(&25, SearchMode::Equal);
    assert!(!cursor.is_valid());
}
