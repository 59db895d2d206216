//! The storage contract between the tree engine and its consumer.
//!
//! The engine never owns nodes. It sees them through a [`NodeStore`]: an
//! addressing scheme (`Ref`), two child links, one balance factor, and a
//! total order. Anything can sit behind the trait: `Vec` indices (see
//! [`crate::arena`]), raw pointers, record ids in a memory-mapped file.
//!
//! The null handle of the tree is `Option::None`. Child links, the root and
//! every "node or nothing" result are `Option<Ref>`, so the sentinel is
//! stable and equal only to itself by construction.

use core::cmp::Ordering;
use thiserror::Error;

/// Advisory hint attached to every child-link read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The engine is about to descend into the returned child.
    Traverse,
    /// The link is read only to be copied or rewritten; no traversal into
    /// that child follows. Paged stores may serve this from cache and skip
    /// readahead, but must still return the true link.
    Relink,
}

/// A link or balance-factor read failed inside the store.
///
/// The store latches its [`NodeStore::read_error`] flag; the engine polls the
/// flag after traversing reads and aborts the running operation with this
/// error. The tree may be left mid-restructure: either `clear` it or re-issue
/// the identical operation once the storage failure is healed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("node store reported a read failure")]
pub struct ReadError;

/// Capability surface the consumer implements to host a tree.
///
/// The engine reads and writes exactly three per-node fields through this
/// trait (less link, greater link, balance factor) and compares keys through
/// it. Payload layout, allocation and reclamation stay on the consumer's
/// side.
///
/// Reads take `&self`. A store whose reads can fail latches an internal flag
/// (interior mutability is its own business), returns `None` for the failed
/// link, and reports the flag from [`read_error`](Self::read_error) until the
/// storage is healed.
pub trait NodeStore {
    /// Node address. `Copy + Eq` so the engine can keep a bounded path stack
    /// of them and splice links by value.
    type Ref: Copy + Eq;
    /// Search key type, always passed by reference.
    type Key;

    /// Reads the less-side child link.
    fn less(&self, node: Self::Ref, access: Access) -> Option<Self::Ref>;

    /// Reads the greater-side child link.
    fn greater(&self, node: Self::Ref, access: Access) -> Option<Self::Ref>;

    fn set_less(&mut self, node: Self::Ref, child: Option<Self::Ref>);

    fn set_greater(&mut self, node: Self::Ref, child: Option<Self::Ref>);

    /// Stored balance factor, `height(greater) - height(less)`.
    fn balance(&self, node: Self::Ref) -> i8;

    /// Writes the balance factor. Must preserve at least `[-2, 2]`; the
    /// engine stores values outside `[-1, 1]` only transiently.
    fn set_balance(&mut self, node: Self::Ref, balance: i8);

    /// Sign of `key` relative to the key held by `node`. Must be a total
    /// order, consistent with [`cmp_node`](Self::cmp_node).
    fn cmp_key(&self, key: &Self::Key, node: Self::Ref) -> Ordering;

    /// Sign of `a`'s key relative to `b`'s key.
    fn cmp_node(&self, a: Self::Ref, b: Self::Ref) -> Ordering;

    /// Latched read-failure flag. Stays `true` from the first failed read
    /// until the store decides the failure is gone.
    fn read_error(&self) -> bool;
}
