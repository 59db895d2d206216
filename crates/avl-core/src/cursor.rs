//! In-order cursors over a tree.
//!
//! Nodes have no parent pointers, so a [`Cursor`] carries its own way back
//! up: the handles of every node on the path from the root, plus a
//! [`BranchSet`] recording which way each step went. Both are fixed-size and
//! live inside the cursor value.

use core::cmp::Ordering;

use crate::bits::BranchSet;
use crate::store::{Access, NodeStore};
use crate::tree::{AvlTree, SearchMode};

/// Bidirectional in-order cursor.
///
/// A cursor is either positioned on a node or invalid; it starts invalid,
/// becomes positioned by one of the `seek` methods, and falls back to invalid
/// when it steps off either end of the tree or a store read fails. Motions on
/// an invalid cursor are no-ops.
///
/// The borrow of the tree is shared, so the tree cannot be mutated while any
/// cursor is alive.
pub struct Cursor<'t, S: NodeStore, const MAX_DEPTH: usize = 32> {
    tree: &'t AvlTree<S, MAX_DEPTH>,
    /// `path[d]` holds the node entered at depth `d + 1`; the root is not
    /// stored.
    path: [Option<S::Ref>; MAX_DEPTH],
    branch: BranchSet<MAX_DEPTH>,
    /// Depth of the current node, `None` when invalid.
    depth: Option<usize>,
}

impl<'t, S: NodeStore, const MAX_DEPTH: usize> Cursor<'t, S, MAX_DEPTH> {
    pub fn new(tree: &'t AvlTree<S, MAX_DEPTH>) -> Self {
        Self {
            tree,
            path: [None; MAX_DEPTH],
            branch: BranchSet::new(),
            depth: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.depth.is_some()
    }

    /// Handle of the current node, `None` when the cursor is invalid.
    pub fn get(&self) -> Option<S::Ref> {
        match self.depth? {
            0 => self.tree.root,
            d => self.path[d - 1],
        }
    }

    /// Forwards the store's latched read-failure flag.
    pub fn read_error(&self) -> bool {
        self.tree.read_error()
    }

    /// Positions the cursor like [`AvlTree::search`] would, leaving the
    /// descent on record so the cursor can move on from the match. Invalid
    /// when nothing qualifies.
    pub fn seek(&mut self, key: &S::Key, mode: SearchMode) {
        self.depth = None;
        let open = mode.open_side();
        let store = &self.tree.store;
        let mut here = match self.tree.root {
            Some(r) => r,
            None => return,
        };
        let mut d = 0usize;
        loop {
            let cmp = store.cmp_key(key, here);
            let step = match (cmp, open) {
                (Ordering::Equal, None) => {
                    self.depth = Some(d);
                    return;
                }
                (Ordering::Equal, Some(_)) if mode.admits_equal() => {
                    self.depth = Some(d);
                    return;
                }
                (Ordering::Equal, Some(side)) => side.reverse(),
                (cmp, Some(side)) if cmp == side => {
                    // Best candidate so far; keep descending for a better one.
                    self.depth = Some(d);
                    cmp
                }
                (cmp, _) => cmp,
            };
            let next = if step == Ordering::Less {
                store.less(here, Access::Traverse)
            } else {
                store.greater(here, Access::Traverse)
            };
            if store.read_error() {
                self.depth = None;
                return;
            }
            match next {
                None => return,
                Some(n) => {
                    debug_assert!(d < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                    self.branch.set(d, step == Ordering::Greater);
                    self.path[d] = Some(n);
                    d += 1;
                    here = n;
                }
            }
        }
    }

    /// Positions the cursor on the least node. The branch record is
    /// pre-filled all-less so that retreating immediately falls off the end.
    pub fn seek_least(&mut self) {
        self.branch.fill(false);
        self.descend_to_end(Ordering::Less);
    }

    /// Positions the cursor on the greatest node; mirror of
    /// [`seek_least`](Self::seek_least).
    pub fn seek_greatest(&mut self) {
        self.branch.fill(true);
        self.descend_to_end(Ordering::Greater);
    }

    fn descend_to_end(&mut self, side: Ordering) {
        self.depth = None;
        let store = &self.tree.store;
        let mut here = self.tree.root;
        while let Some(h) = here {
            match self.depth {
                None => self.depth = Some(0),
                Some(d) => {
                    debug_assert!(d < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                    self.path[d] = Some(h);
                    self.depth = Some(d + 1);
                }
            }
            here = if side == Ordering::Less {
                store.less(h, Access::Traverse)
            } else {
                store.greater(h, Access::Traverse)
            };
            if store.read_error() {
                self.depth = None;
                return;
            }
        }
    }

    /// Moves to the in-order successor; invalid past the greatest node.
    pub fn advance(&mut self) {
        let Some(mut d) = self.depth else {
            return;
        };
        let Some(current) = (if d == 0 { self.tree.root } else { self.path[d - 1] }) else {
            self.depth = None;
            return;
        };
        let store = &self.tree.store;

        let next = store.greater(current, Access::Traverse);
        if store.read_error() {
            self.depth = None;
            return;
        }
        match next {
            None => {
                // Pop until some step went less; its origin is the successor.
                loop {
                    if d == 0 {
                        self.depth = None;
                        return;
                    }
                    d -= 1;
                    if !self.branch.get(d) {
                        break;
                    }
                }
                self.depth = Some(d);
            }
            Some(mut h) => {
                // One step greater, then all the way less.
                debug_assert!(d < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                self.branch.set(d, true);
                self.path[d] = Some(h);
                d += 1;
                loop {
                    let less = store.less(h, Access::Traverse);
                    if store.read_error() {
                        self.depth = None;
                        return;
                    }
                    match less {
                        None => break,
                        Some(l) => {
                            debug_assert!(d < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                            self.branch.set(d, false);
                            self.path[d] = Some(l);
                            d += 1;
                            h = l;
                        }
                    }
                }
                self.depth = Some(d);
            }
        }
    }

    /// Moves to the in-order predecessor; invalid before the least node.
    pub fn retreat(&mut self) {
        let Some(mut d) = self.depth else {
            return;
        };
        let Some(current) = (if d == 0 { self.tree.root } else { self.path[d - 1] }) else {
            self.depth = None;
            return;
        };
        let store = &self.tree.store;

        let next = store.less(current, Access::Traverse);
        if store.read_error() {
            self.depth = None;
            return;
        }
        match next {
            None => {
                loop {
                    if d == 0 {
                        self.depth = None;
                        return;
                    }
                    d -= 1;
                    if self.branch.get(d) {
                        break;
                    }
                }
                self.depth = Some(d);
            }
            Some(mut h) => {
                debug_assert!(d < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                self.branch.set(d, false);
                self.path[d] = Some(h);
                d += 1;
                loop {
                    let greater = store.greater(h, Access::Traverse);
                    if store.read_error() {
                        self.depth = None;
                        return;
                    }
                    match greater {
                        None => break,
                        Some(g) => {
                            debug_assert!(d < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                            self.branch.set(d, true);
                            self.path[d] = Some(g);
                            d += 1;
                            h = g;
                        }
                    }
                }
                self.depth = Some(d);
            }
        }
    }
}

/// Forward in-order iterator, seeded at the least node on first use.
///
/// Yields nothing further once the underlying cursor goes invalid, which
/// also covers a store read failure mid-iteration; check
/// [`AvlTree::read_error`] to tell exhaustion from failure.
pub struct InOrder<'t, S: NodeStore, const MAX_DEPTH: usize = 32> {
    cursor: Cursor<'t, S, MAX_DEPTH>,
    started: bool,
}

impl<S: NodeStore, const MAX_DEPTH: usize> Iterator for InOrder<'_, S, MAX_DEPTH> {
    type Item = S::Ref;

    fn next(&mut self) -> Option<S::Ref> {
        if self.started {
            self.cursor.advance();
        } else {
            self.started = true;
            self.cursor.seek_least();
        }
        self.cursor.get()
    }
}

impl<S: NodeStore, const MAX_DEPTH: usize> AvlTree<S, MAX_DEPTH> {
    /// Unpositioned cursor over this tree.
    pub fn cursor(&self) -> Cursor<'_, S, MAX_DEPTH> {
        Cursor::new(self)
    }

    /// Forward in-order iteration over every node handle.
    pub fn iter(&self) -> InOrder<'_, S, MAX_DEPTH> {
        InOrder {
            cursor: Cursor::new(self),
            started: false,
        }
    }
}
