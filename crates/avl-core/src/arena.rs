//! Reference [`NodeStore`] backed by a `Vec` arena.
//!
//! Every test and example in this crate runs on this store. It is also the
//! template for writing one: handles are `u32` indices into the arena, links
//! are `Option<u32>`, reads never fail, and comparisons come straight from
//! `K: Ord`.

use core::cmp::Ordering;

use crate::store::{Access, NodeStore};

/// Node record held in an [`ArenaStore`].
#[derive(Clone, Debug)]
pub struct ArenaNode<K, V> {
    pub key: K,
    pub value: V,
    less: Option<u32>,
    greater: Option<u32>,
    balance: i8,
}

impl<K, V> ArenaNode<K, V> {
    pub fn less(&self) -> Option<u32> {
        self.less
    }

    pub fn greater(&self) -> Option<u32> {
        self.greater
    }

    pub fn balance(&self) -> i8 {
        self.balance
    }
}

/// Growable in-memory node store. Nodes are never freed; a slot stays live
/// for the lifetime of the arena whether or not a tree references it.
#[derive(Clone, Debug)]
pub struct ArenaStore<K, V> {
    nodes: Vec<ArenaNode<K, V>>,
}

impl<K, V> Default for ArenaStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ArenaStore<K, V> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a node to the arena and returns its handle. The node is not yet
    /// in any tree; hand the handle to `insert`, `replace` or `build`.
    pub fn alloc(&mut self, key: K, value: V) -> u32 {
        let index = u32::try_from(self.nodes.len()).expect("arena holds at most u32::MAX nodes");
        self.nodes.push(ArenaNode {
            key,
            value,
            less: None,
            greater: None,
            balance: 0,
        });
        index
    }

    pub fn node(&self, node: u32) -> &ArenaNode<K, V> {
        &self.nodes[node as usize]
    }

    pub fn node_mut(&mut self, node: u32) -> &mut ArenaNode<K, V> {
        &mut self.nodes[node as usize]
    }

    pub fn key(&self, node: u32) -> &K {
        &self.nodes[node as usize].key
    }

    pub fn value(&self, node: u32) -> &V {
        &self.nodes[node as usize].value
    }

    pub fn value_mut(&mut self, node: u32) -> &mut V {
        &mut self.nodes[node as usize].value
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over every arena slot, referenced by a tree or not.
    pub fn nodes(&self) -> impl Iterator<Item = (u32, &ArenaNode<K, V>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index as u32, node))
    }
}

impl<K: Ord, V> NodeStore for ArenaStore<K, V> {
    type Ref = u32;
    type Key = K;

    fn less(&self, node: u32, _access: Access) -> Option<u32> {
        self.nodes[node as usize].less
    }

    fn greater(&self, node: u32, _access: Access) -> Option<u32> {
        self.nodes[node as usize].greater
    }

    fn set_less(&mut self, node: u32, child: Option<u32>) {
        self.nodes[node as usize].less = child;
    }

    fn set_greater(&mut self, node: u32, child: Option<u32>) {
        self.nodes[node as usize].greater = child;
    }

    fn balance(&self, node: u32) -> i8 {
        self.nodes[node as usize].balance
    }

    fn set_balance(&mut self, node: u32, balance: i8) {
        self.nodes[node as usize].balance = balance;
    }

    fn cmp_key(&self, key: &K, node: u32) -> Ordering {
        key.cmp(&self.nodes[node as usize].key)
    }

    fn cmp_node(&self, a: u32, b: u32) -> Ordering {
        self.nodes[a as usize].key.cmp(&self.nodes[b as usize].key)
    }

    fn read_error(&self) -> bool {
        false
    }
}
