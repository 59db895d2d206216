//! Storage-agnostic AVL tree core.
//!
//! An ordered-map/ordered-set engine that owns no nodes. The consumer brings
//! the storage: anything that can address nodes, read and write two child
//! links and a balance factor, and compare keys can host a tree, whether the
//! nodes live in a `Vec`, behind raw pointers, or in on-disk records. The
//! engine contributes what is hard to get right: the rotation family
//! performed without parent pointers, single-pass insert and remove, and a
//! linear-time bulk build.
//!
//! Nodes never carry parent pointers. Everything that walks back up a tree
//! does so from a bounded, stack-allocated descent record, so the engine
//! performs no allocation and no call-stack recursion.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`store`] | [`NodeStore`] contract, [`Access`] hint, [`ReadError`] |
//! | [`tree`] | [`AvlTree`] engine and [`SearchMode`] |
//! | [`cursor`] | [`Cursor`] (bidirectional) and [`InOrder`] iteration |
//! | [`build`] | linear-time construction from a sorted sequence |
//! | [`bits`] | [`BranchSet`] descent record |
//! | [`arena`] | [`ArenaStore`], the reference in-memory store |
//! | [`check`] | [`audit`] invariant checker and [`render`] debug dump |
//!
//! # Examples
//!
//! ```
//! use avl_core::{audit, ArenaStore, AvlTree, SearchMode};
//!
//! let mut tree: AvlTree<ArenaStore<i64, ()>> = AvlTree::new(ArenaStore::new());
//! for key in [50, 20, 90, 10, 40] {
//!     let node = tree.store_mut().alloc(key, ());
//!     tree.insert(node).unwrap();
//! }
//!
//! let keys: Vec<i64> = tree.iter().map(|n| *tree.store().key(n)).collect();
//! assert_eq!(keys, vec![10, 20, 40, 50, 90]);
//!
//! let below = tree.search(&30, SearchMode::LessOrEqual).unwrap().unwrap();
//! assert_eq!(*tree.store().key(below), 20);
//!
//! audit(&tree).unwrap();
//! ```

pub mod arena;
pub mod bits;
pub mod build;
pub mod check;
pub mod cursor;
pub mod store;
pub mod tree;

pub use arena::{ArenaNode, ArenaStore};
pub use bits::BranchSet;
pub use build::BuildError;
pub use check::{audit, render, CheckError, TreeStats};
pub use cursor::{Cursor, InOrder};
pub use store::{Access, NodeStore, ReadError};
pub use tree::{AvlTree, SearchMode};
