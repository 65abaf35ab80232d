use smallvec::SmallVec;

use super::handle::Handle;
use crate::key_order::KeyOrder;
use crate::order::Order;

// Inline room for the keys of an overflowing order-4 node (2m - 1 = 7) plus one.
// Larger orders spill to the heap.
const INLINE_KEYS: usize = 8;

type KeyVec<K> = SmallVec<[K; INLINE_KEYS]>;
type ValueVec<V> = SmallVec<[V; INLINE_KEYS]>;
type ChildVec = SmallVec<[Handle; INLINE_KEYS + 1]>;

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

// Separators route: child[i] holds keys < keys[i], child[i + 1] holds keys >= keys[i],
// and keys[i] is the smallest key stored under child[i + 1].
pub(crate) struct InternalNode<K> {
    keys: KeyVec<K>,
    children: ChildVec,
}

pub(crate) struct LeafNode<K, V> {
    // Non-owning link to the next leaf in key order.
    next: Option<Handle>,
    keys: KeyVec<K>,
    values: ValueVec<V>,
}

/// Outcome of a linear scan for a key within one node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// `keys[i]` equals the probe.
    Found(usize),
    /// No key equals the probe; `i` is the first key not less than it.
    NotFound(usize),
}

/// Finds the smallest index whose key is not less than `key`.
pub(crate) fn search_keys<K, C: KeyOrder<K>>(keys: &[K], key: &K, cmp: &C) -> SearchResult {
    let idx = keys.iter().position(|k| !cmp.less(k, key)).unwrap_or(keys.len());
    if idx < keys.len() && cmp.equal(&keys[idx], key) {
        SearchResult::Found(idx)
    } else {
        SearchResult::NotFound(idx)
    }
}

impl<K, V> Node<K, V> {
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_internal(&self) -> &InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<K> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Internal(internal) => &internal.keys,
            Node::Leaf(leaf) => &leaf.keys,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    /// Fewer keys than a non-root node may hold; the parent must fill it.
    pub(crate) fn is_underfull(&self, order: Order) -> bool {
        self.key_count() < order.min_keys()
    }

    /// Can give one key to a sibling and stay legal.
    pub(crate) fn can_lend(&self, order: Order) -> bool {
        self.key_count() > order.min_keys()
    }
}

impl<K> InternalNode<K> {
    /// Builds the node that replaces a root which just split.
    pub(crate) fn new_root(left: Handle, separator: K, right: Handle) -> Self {
        let mut keys = KeyVec::new();
        keys.push(separator);
        let mut children = ChildVec::new();
        children.push(left);
        children.push(right);
        Self { keys, children }
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn first_child(&self) -> Handle {
        self.children[0]
    }

    pub(crate) fn last_child(&self) -> Handle {
        self.children[self.children.len() - 1]
    }

    pub(crate) fn search<C: KeyOrder<K>>(&self, key: &K, cmp: &C) -> SearchResult {
        search_keys(&self.keys, key, cmp)
    }

    /// Index of the child whose subtree may hold `key`.
    #[inline]
    pub(crate) fn child_slot<C: KeyOrder<K>>(&self, key: &K, cmp: &C) -> usize {
        match self.search(key, cmp) {
            SearchResult::Found(idx) => idx + 1,
            SearchResult::NotFound(idx) => idx,
        }
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) -> K {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Inserts `key` at `index` with `child` to its right.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes `keys[index]` and the child to its right.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, Handle) {
        (self.keys.remove(index), self.children.remove(index + 1))
    }

    pub(crate) fn push_child(&mut self, key: K, child: Handle) {
        self.keys.push(key);
        self.children.push(child);
    }

    pub(crate) fn push_child_front(&mut self, key: K, child: Handle) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Removes the last key and the last child.
    pub(crate) fn pop_child(&mut self) -> Option<(K, Handle)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Removes the first key and the first child.
    pub(crate) fn pop_child_front(&mut self) -> Option<(K, Handle)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Splits an overflowing node (`2m - 1` keys, `2m` children).
    ///
    /// This node keeps `m - 1` keys and `m` children; key `m - 1` is returned for
    /// the parent and the right node takes the rest.
    pub(crate) fn split(&mut self, order: Order) -> (K, InternalNode<K>) {
        let mid = order.min_keys();
        let keys: KeyVec<K> = self.keys.drain(mid + 1..).collect();
        let children: ChildVec = self.children.drain(mid + 1..).collect();
        let median = self.keys.pop().expect("overflowing internal node has a median key");
        (median, InternalNode { keys, children })
    }

    /// Absorbs `separator` and every key and child of `right`.
    pub(crate) fn merge_with_right(&mut self, separator: K, right: InternalNode<K>) {
        self.keys.push(separator);
        self.keys.extend(right.keys);
        self.children.extend(right.children);
    }

    /// Hands over the only child of a keyless node.
    pub(crate) fn into_only_child(self) -> Option<Handle> {
        match self.children.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            next: None,
            keys: KeyVec::new(),
            values: ValueVec::new(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    pub(crate) fn entry(&self, index: usize) -> Option<(&K, &V)> {
        Some((self.keys.get(index)?, self.values.get(index)?))
    }

    pub(crate) fn search<C: KeyOrder<K>>(&self, key: &K, cmp: &C) -> SearchResult {
        search_keys(&self.keys, key, cmp)
    }

    pub(crate) fn insert(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    pub(crate) fn push(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
    }

    pub(crate) fn push_front(&mut self, key: K, value: V) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }

    pub(crate) fn pop(&mut self) -> Option<(K, V)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value))
    }

    pub(crate) fn pop_front(&mut self) -> Option<(K, V)> {
        if self.keys.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.values.remove(0)))
    }

    /// Splits an overflowing leaf (`2m - 1` entries).
    ///
    /// This leaf keeps the lower `m - 1` entries and the returned leaf takes the
    /// upper `m`. The separator is a copy of the right leaf's first key. Linking
    /// the new leaf into the chain is left to the caller, which owns the handles.
    pub(crate) fn split(&mut self, order: Order) -> (K, LeafNode<K, V>)
    where
        K: Clone,
    {
        let mid = order.min_keys();
        let right = LeafNode {
            next: self.next,
            keys: self.keys.drain(mid..).collect(),
            values: self.values.drain(mid..).collect(),
        };
        let separator = right.keys[0].clone();
        (separator, right)
    }

    /// Absorbs every entry of `right`, the leaf directly after this one, and
    /// adopts its forward link.
    pub(crate) fn merge_with_right(&mut self, right: LeafNode<K, V>) {
        self.keys.extend(right.keys);
        self.values.extend(right.values);
        self.next = right.next;
    }
}
