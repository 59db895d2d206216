//! The tree engine: insertion, search, removal, substitution, rebalancing.
//!
//! Nodes carry no parent pointers. Every operation that needs to retrace its
//! steps records the descent in a [`BranchSet`] and, for removal, reverses
//! child links in place on the way down so it can climb back up. Auxiliary
//! state is therefore bounded by `MAX_DEPTH` and lives on the call stack; the
//! engine never recurses and never allocates.

use core::cmp::Ordering;

use crate::bits::BranchSet;
use crate::store::{Access, NodeStore, ReadError};

/// Match policy for [`AvlTree::search`] and [`Cursor::seek`](crate::cursor::Cursor::seek).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Exact key match only.
    Equal,
    /// Greatest node with a key strictly below the probe.
    Less,
    /// Exact match, else the greatest node below the probe.
    LessOrEqual,
    /// Least node with a key strictly above the probe.
    Greater,
    /// Exact match, else the least node above the probe.
    GreaterOrEqual,
}

impl SearchMode {
    /// Whether an exact key match satisfies the mode.
    pub(crate) fn admits_equal(self) -> bool {
        matches!(
            self,
            SearchMode::Equal | SearchMode::LessOrEqual | SearchMode::GreaterOrEqual
        )
    }

    /// The sign of `cmp(key, node)` an inexact candidate is allowed to have.
    /// `Greater` admits nodes below the probe, `Less` nodes above it, `None`
    /// admits exact matches only.
    pub(crate) fn open_side(self) -> Option<Ordering> {
        match self {
            SearchMode::Equal => None,
            SearchMode::Less | SearchMode::LessOrEqual => Some(Ordering::Greater),
            SearchMode::Greater | SearchMode::GreaterOrEqual => Some(Ordering::Less),
        }
    }
}

/// Height-balanced search tree over consumer-supplied node storage.
///
/// Owns the store and the root handle, nothing else. `MAX_DEPTH` bounds the
/// deepest root-to-leaf path the engine will ever walk; choose it at least
/// `ceil(1.44 * log2(n + 2))` for the largest node count `n` the store can
/// hold. Exceeding it is a contract violation (debug builds assert).
///
/// Keys are unique: inserting a node whose key is already present is a no-op
/// returning the resident node.
///
/// # Errors
///
/// Operations that read links surface a latched store failure as
/// [`ReadError`]. An operation cut short this way may leave the tree
/// mid-restructure; [`clear`](Self::clear) it, or re-issue the identical
/// operation once the store is healed.
///
/// # Examples
///
/// ```
/// use avl_core::{ArenaStore, AvlTree, SearchMode};
///
/// let mut tree: AvlTree<ArenaStore<u32, &str>> = AvlTree::new(ArenaStore::new());
/// for (key, name) in [(20, "b"), (10, "a"), (30, "c")] {
///     let node = tree.store_mut().alloc(key, name);
///     tree.insert(node).unwrap();
/// }
/// let below = tree.search(&25, SearchMode::LessOrEqual).unwrap().unwrap();
/// assert_eq!(*tree.store().key(below), 20);
/// ```
pub struct AvlTree<S: NodeStore, const MAX_DEPTH: usize = 32> {
    pub(crate) store: S,
    pub(crate) root: Option<S::Ref>,
}

impl<S: NodeStore, const MAX_DEPTH: usize> AvlTree<S, MAX_DEPTH> {
    pub fn new(store: S) -> Self {
        Self { store, root: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store, for allocating or mutating payloads.
    /// Rewiring links or balance factors of linked nodes through this breaks
    /// the tree.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Handle of the root node.
    pub fn root(&self) -> Option<S::Ref> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Forwards the store's latched read-failure flag.
    pub fn read_error(&self) -> bool {
        self.store.read_error()
    }

    /// Drops every node reference without traversing. Reclaiming the nodes
    /// themselves is the store's business.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Inserts `node` as a new leaf and restores the height balance.
    ///
    /// The node's links and balance factor are initialized here; the caller
    /// only guarantees the handle is live and not yet in the tree. If a node
    /// with an equal key is already present, the tree is left untouched and
    /// that resident node is returned instead.
    pub fn insert(&mut self, node: S::Ref) -> Result<S::Ref, ReadError> {
        self.store.set_less(node, None);
        self.store.set_greater(node, None);
        self.store.set_balance(node, 0);

        let Some(root) = self.root else {
            self.root = Some(node);
            return Ok(node);
        };

        let mut branch = BranchSet::<MAX_DEPTH>::new();
        // Deepest ancestor with a non-zero balance factor. It is the only
        // node whose balance can reach +-2 after a single leaf insertion.
        let mut unbal = None;
        let mut unbal_parent = None;
        let mut unbal_depth = 0usize;

        let mut depth = 0usize;
        let mut here = root;
        let mut parent = None;
        let attach_cmp = loop {
            if self.store.balance(here) != 0 {
                unbal = Some(here);
                unbal_parent = parent;
                unbal_depth = depth;
            }
            let cmp = self.store.cmp_node(node, here);
            if cmp == Ordering::Equal {
                return Ok(here);
            }
            let next = self.child_checked(here, cmp, Access::Traverse)?;
            debug_assert!(depth < MAX_DEPTH, "descent exceeded MAX_DEPTH");
            branch.set(depth, cmp == Ordering::Greater);
            depth += 1;
            match next {
                Some(n) => {
                    parent = Some(here);
                    here = n;
                }
                None => break cmp,
            }
        };

        if attach_cmp == Ordering::Less {
            self.store.set_less(here, Some(node));
        } else {
            self.store.set_greater(here, Some(node));
        }

        // Retrace from the deepest unbalanced ancestor (or the root when all
        // ancestors were even): every node strictly below it on the recorded
        // path had balance 0 and now tips toward the new leaf.
        depth = unbal_depth;
        let mut walk;
        let mut pivot = None;
        match unbal {
            None => walk = Some(root),
            Some(u) => {
                let toward_greater = branch.get(depth);
                depth += 1;
                let mut bf = self.store.balance(u);
                if toward_greater {
                    bf += 1;
                    walk = self.greater_checked(u, Access::Traverse)?;
                } else {
                    bf -= 1;
                    walk = self.less_checked(u, Access::Traverse)?;
                }
                if bf == -2 || bf == 2 {
                    pivot = Some((u, unbal_parent));
                } else {
                    self.store.set_balance(u, bf);
                }
            }
        }

        while let Some(w) = walk {
            if w == node {
                break;
            }
            let toward_greater = branch.get(depth);
            depth += 1;
            if toward_greater {
                self.store.set_balance(w, 1);
                walk = self.greater_checked(w, Access::Traverse)?;
            } else {
                self.store.set_balance(w, -1);
                walk = self.less_checked(w, Access::Traverse)?;
            }
        }

        if let Some((u, u_parent)) = pivot {
            let subtree = self.rebalance(u)?;
            match u_parent {
                None => self.root = Some(subtree),
                Some(p) => {
                    if branch.get(unbal_depth - 1) {
                        self.store.set_greater(p, Some(subtree));
                    } else {
                        self.store.set_less(p, Some(subtree));
                    }
                }
            }
        }

        Ok(node)
    }

    /// Finds the best node for `key` under the given match policy.
    pub fn search(&self, key: &S::Key, mode: SearchMode) -> Result<Option<S::Ref>, ReadError> {
        let open = mode.open_side();
        let mut found = None;
        let mut here = self.root;
        while let Some(n) = here {
            let cmp = self.store.cmp_key(key, n);
            let step = match (cmp, open) {
                (Ordering::Equal, None) => return Ok(Some(n)),
                (Ordering::Equal, Some(_)) if mode.admits_equal() => return Ok(Some(n)),
                // Exact key in a strict mode: step past it, toward the side
                // the candidates live on.
                (Ordering::Equal, Some(side)) => side.reverse(),
                (cmp, Some(side)) if cmp == side => {
                    found = Some(n);
                    cmp
                }
                (cmp, _) => cmp,
            };
            here = self.child_checked(n, step, Access::Traverse)?;
        }
        Ok(found)
    }

    /// Node with the smallest key, `None` when the tree is empty.
    pub fn least(&self) -> Result<Option<S::Ref>, ReadError> {
        let mut last = None;
        let mut here = self.root;
        while let Some(n) = here {
            last = Some(n);
            here = self.less_checked(n, Access::Traverse)?;
        }
        Ok(last)
    }

    /// Node with the largest key, `None` when the tree is empty.
    pub fn greatest(&self) -> Result<Option<S::Ref>, ReadError> {
        let mut last = None;
        let mut here = self.root;
        while let Some(n) = here {
            last = Some(n);
            here = self.greater_checked(n, Access::Traverse)?;
        }
        Ok(last)
    }

    /// Unlinks the node holding `key` and returns its handle, `None` when the
    /// key is absent. The node's fields are left as they were at unlink time.
    pub fn remove(&mut self, key: &S::Key) -> Result<Option<S::Ref>, ReadError> {
        let Some(root) = self.root else {
            return Ok(None);
        };

        let mut branch = BranchSet::<MAX_DEPTH>::new();
        let mut depth = 0usize;
        let mut here = root;
        let mut parent: Option<S::Ref> = None;
        // Direction from the retrace anchor into the subtree that lost a
        // level of height. Reassigned before every use.
        let mut shrink_cmp = Ordering::Equal;

        let victim = loop {
            let cmp = self.store.cmp_key(key, here);
            if cmp == Ordering::Equal {
                break here;
            }
            let next = self.child_checked(here, cmp, Access::Traverse)?;
            debug_assert!(depth < MAX_DEPTH, "descent exceeded MAX_DEPTH");
            branch.set(depth, cmp == Ordering::Greater);
            depth += 1;
            shrink_cmp = cmp;
            parent = Some(here);
            here = match next {
                Some(n) => n,
                None => return Ok(None),
            };
        };
        let victim_parent = parent;
        let victim_depth = depth;

        // The replacement comes from the deeper subtree of the victim: the
        // greatest node of the less subtree, or the least of the greater.
        let mut cmp;
        let mut child;
        debug_assert!(depth < MAX_DEPTH, "descent exceeded MAX_DEPTH");
        if self.store.balance(victim) < 0 {
            child = self.less_checked(victim, Access::Traverse)?;
            branch.set(depth, false);
            cmp = Ordering::Less;
        } else {
            child = self.greater_checked(victim, Access::Traverse)?;
            branch.set(depth, true);
            cmp = Ordering::Greater;
        }
        depth += 1;

        if child.is_some() {
            cmp = cmp.reverse();
            while let Some(c) = child {
                parent = Some(here);
                here = c;
                debug_assert!(depth < MAX_DEPTH, "descent exceeded MAX_DEPTH");
                if cmp == Ordering::Less {
                    child = self.less_checked(here, Access::Traverse)?;
                    branch.set(depth, false);
                } else {
                    child = self.greater_checked(here, Access::Traverse)?;
                    branch.set(depth, true);
                }
                depth += 1;
            }
            shrink_cmp = if parent == Some(victim) {
                // The replacement is the victim's immediate child; the
                // shortened subtree hangs off the replacement itself.
                cmp.reverse()
            } else {
                cmp
            };
            // The replacement has at most one child, on its closed side.
            child = if cmp == Ordering::Greater {
                self.store.less(here, Access::Relink)
            } else {
                self.store.greater(here, Access::Relink)
            };
        }

        // Unlink the replacement (or the victim itself when it had no
        // children) from its parent.
        match parent {
            None => self.root = child,
            Some(p) => {
                if shrink_cmp == Ordering::Less {
                    self.store.set_less(p, child);
                } else {
                    self.store.set_greater(p, child);
                }
            }
        }

        // Anchor of the retrace: parent of the subtree whose depth shrank.
        let path_top = if parent == Some(victim) { Some(here) } else { parent };

        if here != victim {
            // Poke the replacement into the victim's position.
            let less = self.store.less(victim, Access::Relink);
            let greater = self.store.greater(victim, Access::Relink);
            self.store.set_less(here, less);
            self.store.set_greater(here, greater);
            let bf = self.store.balance(victim);
            self.store.set_balance(here, bf);
            match victim_parent {
                None => self.root = Some(here),
                Some(vp) => {
                    if branch.get(victim_depth - 1) {
                        self.store.set_greater(vp, Some(here));
                    } else {
                        self.store.set_less(vp, Some(here));
                    }
                }
            }
        }

        if let Some(top) = path_top {
            // Walk down from the root once more, reversing the on-path child
            // links so the climb back up needs no parent pointers.
            let mut down = self.root;
            let mut up: Option<S::Ref> = None;
            depth = 0;
            while down != Some(top) {
                let h = down.expect("retrace path reaches its anchor");
                if branch.get(depth) {
                    let next = self.greater_checked(h, Access::Traverse)?;
                    self.store.set_greater(h, up);
                    up = Some(h);
                    down = next;
                } else {
                    let next = self.less_checked(h, Access::Traverse)?;
                    self.store.set_less(h, up);
                    up = Some(h);
                    down = next;
                }
                depth += 1;
            }

            // Climb back, restoring the reversed links. A shrink propagates
            // until some node's new balance is +-1, or a rotation leaves a
            // non-zero balance behind.
            let mut here = top;
            let mut shrunk = true;
            let mut cmp = shrink_cmp;
            loop {
                if shrunk {
                    let mut bf = self.store.balance(here);
                    if cmp == Ordering::Less {
                        bf += 1;
                    } else {
                        bf -= 1;
                    }
                    if bf == -2 || bf == 2 {
                        here = self.rebalance(here)?;
                        bf = self.store.balance(here);
                    } else {
                        self.store.set_balance(here, bf);
                    }
                    shrunk = bf == 0;
                }
                let Some(u) = up else {
                    break;
                };
                let child = here;
                here = u;
                depth -= 1;
                if branch.get(depth) {
                    cmp = Ordering::Greater;
                    up = self.greater_checked(here, Access::Traverse)?;
                    self.store.set_greater(here, Some(child));
                } else {
                    cmp = Ordering::Less;
                    up = self.less_checked(here, Access::Traverse)?;
                    self.store.set_less(here, Some(child));
                }
            }
            self.root = Some(here);
        }

        Ok(Some(victim))
    }

    /// Swaps `node` in for the resident node holding the same key and returns
    /// the displaced handle. The resident node's links and balance factor are
    /// copied onto `node`, so payloads change hands without any rebalancing.
    /// Returns `None`, mutating nothing, when the key is absent.
    pub fn replace(&mut self, node: S::Ref) -> Result<Option<S::Ref>, ReadError> {
        let mut here = match self.root {
            Some(r) => r,
            None => return Ok(None),
        };
        let mut parent_step = None;
        let displaced = loop {
            let cmp = self.store.cmp_node(node, here);
            if cmp == Ordering::Equal {
                break here;
            }
            let next = self.child_checked(here, cmp, Access::Traverse)?;
            parent_step = Some((here, cmp));
            here = match next {
                Some(n) => n,
                None => return Ok(None),
            };
        };

        // Carry the housekeeping fields over to the incoming node.
        let less = self.store.less(displaced, Access::Relink);
        let greater = self.store.greater(displaced, Access::Relink);
        self.store.set_less(node, less);
        self.store.set_greater(node, greater);
        let bf = self.store.balance(displaced);
        self.store.set_balance(node, bf);

        match parent_step {
            None => self.root = Some(node),
            Some((p, cmp)) => {
                if cmp == Ordering::Less {
                    self.store.set_less(p, Some(node));
                } else {
                    self.store.set_greater(p, Some(node));
                }
            }
        }

        Ok(Some(displaced))
    }

    /// Restores the AVL invariant at a node whose balance reached +-2 and
    /// returns the new root of the subtree. The caller splices that root back
    /// into the parent.
    ///
    /// Four cases: an outer-heavy deep child takes a single rotation touching
    /// two balance factors, an inner-heavy one a double rotation touching
    /// three. The stored balance of `node` still holds the pre-insertion
    /// sign, which is all the case split needs.
    fn rebalance(&mut self, node: S::Ref) -> Result<S::Ref, ReadError> {
        if self.store.balance(node) > 0 {
            let deep = self
                .greater_checked(node, Access::Traverse)?
                .expect("node with greater-side overweight has a greater child");
            if self.store.balance(deep) < 0 {
                // Greater-less: rotate the inner grandchild to the top.
                let top = self
                    .less_checked(deep, Access::Traverse)?
                    .expect("inner-heavy child has a less child");
                let moved = self.store.less(top, Access::Relink);
                self.store.set_greater(node, moved);
                let moved = self.store.greater(top, Access::Relink);
                self.store.set_less(deep, moved);
                self.store.set_less(top, Some(node));
                self.store.set_greater(top, Some(deep));
                match self.store.balance(top) {
                    0 => {
                        self.store.set_balance(node, 0);
                        self.store.set_balance(deep, 0);
                    }
                    bf if bf > 0 => {
                        self.store.set_balance(node, -1);
                        self.store.set_balance(deep, 0);
                        self.store.set_balance(top, 0);
                    }
                    _ => {
                        self.store.set_balance(deep, 1);
                        self.store.set_balance(node, 0);
                        self.store.set_balance(top, 0);
                    }
                }
                Ok(top)
            } else {
                // Greater-greater: single rotation, `deep` becomes the top.
                let moved = self.store.less(deep, Access::Relink);
                self.store.set_greater(node, moved);
                self.store.set_less(deep, Some(node));
                if self.store.balance(deep) == 0 {
                    // Happens only on the removal path: the subtree keeps its
                    // height and the shrink stops here.
                    self.store.set_balance(deep, -1);
                    self.store.set_balance(node, 1);
                } else {
                    self.store.set_balance(deep, 0);
                    self.store.set_balance(node, 0);
                }
                Ok(deep)
            }
        } else {
            let deep = self
                .less_checked(node, Access::Traverse)?
                .expect("node with less-side overweight has a less child");
            if self.store.balance(deep) > 0 {
                // Less-greater: mirror double rotation.
                let top = self
                    .greater_checked(deep, Access::Traverse)?
                    .expect("inner-heavy child has a greater child");
                let moved = self.store.greater(top, Access::Relink);
                self.store.set_less(node, moved);
                let moved = self.store.less(top, Access::Relink);
                self.store.set_greater(deep, moved);
                self.store.set_greater(top, Some(node));
                self.store.set_less(top, Some(deep));
                match self.store.balance(top) {
                    0 => {
                        self.store.set_balance(node, 0);
                        self.store.set_balance(deep, 0);
                    }
                    bf if bf < 0 => {
                        self.store.set_balance(node, 1);
                        self.store.set_balance(deep, 0);
                        self.store.set_balance(top, 0);
                    }
                    _ => {
                        self.store.set_balance(deep, -1);
                        self.store.set_balance(node, 0);
                        self.store.set_balance(top, 0);
                    }
                }
                Ok(top)
            } else {
                // Less-less: mirror single rotation.
                let moved = self.store.greater(deep, Access::Relink);
                self.store.set_less(node, moved);
                self.store.set_greater(deep, Some(node));
                if self.store.balance(deep) == 0 {
                    self.store.set_balance(deep, 1);
                    self.store.set_balance(node, -1);
                } else {
                    self.store.set_balance(deep, 0);
                    self.store.set_balance(node, 0);
                }
                Ok(deep)
            }
        }
    }

    /// Link read followed by a poll of the latched failure flag.
    fn less_checked(
        &self,
        node: S::Ref,
        access: Access,
    ) -> Result<Option<S::Ref>, ReadError> {
        let child = self.store.less(node, access);
        if self.store.read_error() {
            Err(ReadError)
        } else {
            Ok(child)
        }
    }

    fn greater_checked(
        &self,
        node: S::Ref,
        access: Access,
    ) -> Result<Option<S::Ref>, ReadError> {
        let child = self.store.greater(node, access);
        if self.store.read_error() {
            Err(ReadError)
        } else {
            Ok(child)
        }
    }

    /// Checked link read on the side a comparison points at.
    fn child_checked(
        &self,
        node: S::Ref,
        cmp: Ordering,
        access: Access,
    ) -> Result<Option<S::Ref>, ReadError> {
        debug_assert_ne!(cmp, Ordering::Equal);
        if cmp == Ordering::Less {
            self.less_checked(node, access)
        } else {
            self.greater_checked(node, access)
        }
    }
}
