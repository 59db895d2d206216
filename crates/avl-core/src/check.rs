//! Structural audits and debug rendering.
//!
//! Diagnostic code, not engine code: it recurses over the whole tree and is
//! meant for tests and postmortems. [`audit`] recomputes what the engine
//! maintains incrementally and reports the first discrepancy.

use core::cmp::Ordering;

use thiserror::Error;

use crate::store::{Access, NodeStore};
use crate::tree::AvlTree;

/// First invariant violation found by [`audit`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error("in-order traversal is not strictly ascending")]
    OrderViolated,
    #[error("stored balance factor {stored} but subtree heights differ by {actual}")]
    BalanceMismatch { stored: i8, actual: i64 },
    #[error("balance factor {0} outside [-1, 1]")]
    BalanceOutOfRange(i8),
    #[error("height {height} exceeds the AVL bound for {nodes} nodes")]
    HeightBound { height: usize, nodes: usize },
}

/// Figures reported by a successful [`audit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    /// Number of levels; a single node has height 1, an empty tree 0.
    pub height: usize,
}

/// Verifies every tree invariant the hard way: strict in-order ascent,
/// stored balance factors against recomputed subtree heights, and the AVL
/// height bound `1.4405 * log2(nodes + 2)`.
pub fn audit<S: NodeStore, const MAX_DEPTH: usize>(
    tree: &AvlTree<S, MAX_DEPTH>,
) -> Result<TreeStats, CheckError> {
    let store = tree.store();
    let mut nodes = 0usize;
    let mut prev = None;
    let height = walk(store, tree.root(), &mut nodes, &mut prev)?;

    let bound = 1.4405 * ((nodes + 2) as f64).log2();
    if height as f64 > bound {
        return Err(CheckError::HeightBound { height, nodes });
    }

    Ok(TreeStats { nodes, height })
}

fn walk<S: NodeStore>(
    store: &S,
    node: Option<S::Ref>,
    nodes: &mut usize,
    prev: &mut Option<S::Ref>,
) -> Result<usize, CheckError> {
    let Some(n) = node else {
        return Ok(0);
    };

    let less_height = walk(store, store.less(n, Access::Traverse), nodes, prev)?;

    if let Some(p) = *prev {
        if store.cmp_node(p, n) != Ordering::Less {
            return Err(CheckError::OrderViolated);
        }
    }
    *prev = Some(n);
    *nodes += 1;

    let greater_height = walk(store, store.greater(n, Access::Traverse), nodes, prev)?;

    let actual = greater_height as i64 - less_height as i64;
    let stored = store.balance(n);
    if i64::from(stored) != actual {
        return Err(CheckError::BalanceMismatch { stored, actual });
    }
    if !(-1..=1).contains(&stored) {
        return Err(CheckError::BalanceOutOfRange(stored));
    }

    Ok(1 + less_height.max(greater_height))
}

/// Indented structural dump with balance factors; `label` renders a node
/// handle into something readable.
pub fn render<S: NodeStore, const MAX_DEPTH: usize>(
    tree: &AvlTree<S, MAX_DEPTH>,
    label: &dyn Fn(S::Ref) -> String,
) -> String {
    render_node(tree.store(), tree.root(), "", label)
}

fn render_node<S: NodeStore>(
    store: &S,
    node: Option<S::Ref>,
    tab: &str,
    label: &dyn Fn(S::Ref) -> String,
) -> String {
    match node {
        None => "∅".to_string(),
        Some(n) => {
            let deeper = format!("{tab}  ");
            let less = render_node(store, store.less(n, Access::Traverse), &deeper, label);
            let greater = render_node(store, store.greater(n, Access::Traverse), &deeper, label);
            format!(
                "{} [bf={}]\n{tab}L={less}\n{tab}G={greater}",
                label(n),
                store.balance(n)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{audit, render, CheckError};
    use crate::arena::ArenaStore;
    use crate::store::NodeStore;
    use crate::tree::AvlTree;

    fn tree_of(keys: &[i64]) -> AvlTree<ArenaStore<i64, ()>> {
        let mut tree = AvlTree::new(ArenaStore::new());
        for &key in keys {
            let node = tree.store_mut().alloc(key, ());
            tree.insert(node).unwrap();
        }
        tree
    }

    #[test]
    fn audit_accepts_a_healthy_tree() {
        let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let stats = audit(&tree).unwrap();
        assert_eq!(stats.nodes, 7);
        assert_eq!(stats.height, 3);
    }

    #[test]
    fn audit_catches_a_corrupted_balance_factor() {
        let mut tree = tree_of(&[1, 2, 3]);
        let root = tree.root().unwrap();
        tree.store_mut().set_balance(root, 1);
        assert_eq!(
            audit(&tree),
            Err(CheckError::BalanceMismatch {
                stored: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn audit_catches_a_broken_order() {
        let mut tree = tree_of(&[1, 2, 3]);
        let root = tree.root().unwrap();
        let greatest = tree.greatest().unwrap().unwrap();
        // Cross-link the greatest node under itself on the less side.
        tree.store_mut().set_less(root, Some(greatest));
        assert!(audit(&tree).is_err());
    }

    #[test]
    fn render_shows_every_node() {
        let tree = tree_of(&[2, 1, 3]);
        let dump = render(&tree, &|n| format!("{}", tree.store().key(n)));
        for needle in ["1", "2", "3", "bf=0", "∅"] {
            assert!(dump.contains(needle), "missing {needle} in:\n{dump}");
        }
    }
}
