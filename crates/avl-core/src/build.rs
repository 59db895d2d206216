//! Bulk construction from a presorted sequence.
//!
//! Builds the unique balanced shape for `n` nodes in one linear pass. The
//! recursion of the textbook sorted-array construction is flattened into two
//! [`BranchSet`]s (the path of the subtree under construction, and the parity
//! of each split), and the nodes whose greater subtree is still pending are
//! kept on a stack threaded through their own greater links.

use thiserror::Error;

use crate::bits::BranchSet;
use crate::store::{Access, NodeStore, ReadError};
use crate::tree::AvlTree;

/// Failure of [`AvlTree::build`]. The tree is left mid-construction; `clear`
/// it before reuse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Read(#[from] ReadError),
    /// The input sequence ran out before `expected` nodes were produced and
    /// the store reported no failure.
    #[error("input sequence ended after {got} of {expected} nodes")]
    Exhausted { got: usize, expected: usize },
}

/// Pulls the next node handle off the input, polling the store's latched
/// flag the way link reads do: a storage-backed sequence signals failure by
/// latching and ending.
fn pull<S, I>(store: &S, seq: &mut I, taken: &mut usize, expected: usize) -> Result<S::Ref, BuildError>
where
    S: NodeStore,
    I: Iterator<Item = S::Ref>,
{
    match seq.next() {
        Some(node) => {
            *taken += 1;
            if store.read_error() {
                Err(ReadError.into())
            } else {
                Ok(node)
            }
        }
        None if store.read_error() => Err(ReadError.into()),
        None => Err(BuildError::Exhausted {
            got: *taken,
            expected,
        }),
    }
}

impl<S: NodeStore, const MAX_DEPTH: usize> AvlTree<S, MAX_DEPTH> {
    /// Replaces the tree's contents with `count` nodes drawn from `seq`,
    /// which must yield distinct keys in ascending order.
    ///
    /// Runs in `O(count)` time with `O(MAX_DEPTH)` auxiliary state and no
    /// recursion. The resulting shape is the balanced tree with every level
    /// full except possibly the deepest, odd splits giving the extra node to
    /// the greater side; every balance factor comes out `0` or `+1` and the
    /// height is `ceil(log2(count + 1))`.
    ///
    /// `count == 0` empties the tree and succeeds without touching `seq`.
    pub fn build<I>(&mut self, seq: I, count: usize) -> Result<(), BuildError>
    where
        I: IntoIterator<Item = S::Ref>,
    {
        let mut seq = seq.into_iter();
        let mut taken = 0usize;

        if count == 0 {
            self.root = None;
            return Ok(());
        }

        // Path to the subtree being built, exactly like a descent record.
        let mut branch = BranchSet::<MAX_DEPTH>::new();
        // rem[d]: the split at depth d was odd, so the greater side of that
        // subtree holds one node more than the less side.
        let mut rem = BranchSet::<MAX_DEPTH>::new();
        let mut depth = 0usize;
        // Node count of the subtree currently under construction.
        let mut num_sub = count;
        // Head of the pending stack: nodes whose less subtree is finished,
        // linked through their greater links until reattachment.
        let mut less_parent: Option<S::Ref> = None;
        let mut here: S::Ref;

        loop {
            // Descend toward the leftmost unbuilt subtree.
            while num_sub > 2 {
                num_sub -= 1;
                debug_assert!(depth < MAX_DEPTH, "build exceeded MAX_DEPTH");
                rem.set(depth, (num_sub & 1) != 0);
                branch.set(depth, false);
                depth += 1;
                num_sub >>= 1;
            }

            if num_sub == 2 {
                // Two nodes make a parent slanted toward its greater leaf.
                let top = pull(&self.store, &mut seq, &mut taken, count)?;
                let leaf = pull(&self.store, &mut seq, &mut taken, count)?;
                self.store.set_less(leaf, None);
                self.store.set_greater(leaf, None);
                self.store.set_balance(leaf, 0);
                self.store.set_greater(top, Some(leaf));
                self.store.set_less(top, None);
                self.store.set_balance(top, 1);
                here = top;
            } else {
                let leaf = pull(&self.store, &mut seq, &mut taken, count)?;
                self.store.set_less(leaf, None);
                self.store.set_greater(leaf, None);
                self.store.set_balance(leaf, 0);
                here = leaf;
            }

            // Unwind completed subtrees.
            while depth > 0 {
                depth -= 1;
                if !branch.get(depth) {
                    // A less subtree is done; its parent is the next node in
                    // the sequence, handled below.
                    break;
                }
                // A greater subtree is done. Pop its parent off the pending
                // stack and hang the subtree where the stack link was.
                let sub = here;
                let parent =
                    less_parent.expect("pending stack holds a parent for every greater frame");
                less_parent = self.greater_checked_build(parent)?;
                self.store.set_greater(parent, Some(sub));
                // Reconstituted size: 2 * prev + 1 - rem. A power of two
                // means the greater side is perfectly full and stands one
                // level taller than the less side.
                num_sub <<= 1;
                num_sub += 1 - usize::from(rem.get(depth));
                if (num_sub & (num_sub - 1)) == 0 {
                    self.store.set_balance(parent, 1);
                } else {
                    self.store.set_balance(parent, 0);
                }
                here = parent;
            }

            if num_sub == count {
                break;
            }

            // The finished subtree is the less child of the next node; push
            // that node onto the pending stack and build its greater side.
            let sub = here;
            let top = pull(&self.store, &mut seq, &mut taken, count)?;
            self.store.set_less(top, Some(sub));
            self.store.set_greater(top, less_parent);
            less_parent = Some(top);
            debug_assert!(depth < MAX_DEPTH, "build exceeded MAX_DEPTH");
            branch.set(depth, true);
            num_sub += usize::from(rem.get(depth));
            depth += 1;
        }

        self.root = Some(here);
        Ok(())
    }

    /// Reads the pending-stack link with the usual post-read poll.
    fn greater_checked_build(&self, node: S::Ref) -> Result<Option<S::Ref>, BuildError> {
        let next = self.store.greater(node, Access::Traverse);
        if self.store.read_error() {
            Err(ReadError.into())
        } else {
            Ok(next)
        }
    }
}
