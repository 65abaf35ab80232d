use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{InternalNode, LeafNode, Node, SearchResult};
use crate::key_order::KeyOrder;
use crate::order::Order;

/// The B+ tree engine backing `BPlusTreeMap`.
///
/// Nodes live in an arena and refer to each other by [`Handle`]. Internal nodes
/// own their children; the `next` link of a leaf is a plain handle used for
/// ordered scans only. All restructuring (split, borrow, merge) is done by the
/// parent of the nodes involved, one level at a time.
pub(crate) struct RawBPlusTree<K, V, C> {
    nodes: Arena<Node<K, V>>,
    root: Option<Handle>,
    /// Total number of entries; always the sum of the leaf key counts.
    len: usize,
    order: Order,
    cmp: C,
}

/// Result of inserting below a node.
enum InsertResult<K> {
    /// The key was already present; nothing changed.
    Duplicate,
    /// Inserted without the node overflowing.
    Done,
    /// The node split; the parent must link `right` after `separator`.
    Split { separator: K, right: Handle },
}

impl<K, V, C> RawBPlusTree<K, V, C> {
    pub(crate) const fn new(order: Order, cmp: C) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            order,
            cmp,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn order(&self) -> Order {
        self.order
    }

    pub(crate) const fn key_order(&self) -> &C {
        &self.cmp
    }

    /// Number of live nodes, internal and leaf.
    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn clear(&mut self) {
        tracing::debug!(len = self.len, "clearing tree");
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Levels from the root down to the leaves inclusive; zero when empty.
    pub(crate) fn height(&self) -> usize {
        let Some(mut current) = self.root else {
            return 0;
        };
        let mut height = 1;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.first_child();
            height += 1;
        }
        height
    }

    /// Leftmost leaf under `handle`.
    fn leftmost_leaf(&self, mut handle: Handle) -> Handle {
        while let Node::Internal(internal) = self.nodes.get(handle) {
            handle = internal.first_child();
        }
        handle
    }

    /// Rightmost leaf under `handle`.
    fn rightmost_leaf(&self, mut handle: Handle) -> Handle {
        while let Node::Internal(internal) = self.nodes.get(handle) {
            handle = internal.last_child();
        }
        handle
    }

    /// Head of the leaf chain.
    pub(crate) fn first_leaf(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost_leaf(root))
    }

    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.first_leaf()?).as_leaf();
        leaf.entry(0)
    }

    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let leaf = self.nodes.get(self.rightmost_leaf(self.root?)).as_leaf();
        leaf.entry(leaf.key_count().checked_sub(1)?)
    }

    /// In-order successor of `parent.keys[idx]`: the first key of the leftmost
    /// leaf under the child to its right. `None` only while that child is an
    /// empty leaf awaiting a fill.
    fn successor(&self, parent: Handle, idx: usize) -> Option<&K> {
        let right = self.nodes.get(parent).as_internal().child(idx + 1);
        self.nodes.get(self.leftmost_leaf(right)).as_leaf().first_key()
    }

    /// Every key, collected by walking the tree structure depth-first.
    pub(crate) fn keys(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            self.collect_keys(root, &mut keys);
        }
        keys
    }

    fn collect_keys<'a>(&'a self, handle: Handle, keys: &mut Vec<&'a K>) {
        match self.nodes.get(handle) {
            Node::Leaf(leaf) => keys.extend(leaf.keys()),
            Node::Internal(internal) => {
                for &child in internal.children() {
                    self.collect_keys(child, keys);
                }
            }
        }
    }

    /// Number of leaves, counted along the leaf chain.
    pub(crate) fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut current = self.first_leaf();
        while let Some(handle) = current {
            count += 1;
            current = self.nodes.get(handle).as_leaf().next();
        }
        count
    }
}

impl<K, V, C: KeyOrder<K>> RawBPlusTree<K, V, C> {
    /// Finds the leaf slot holding `key`.
    ///
    /// Separators only route; the descent always ends at a leaf, so a stored
    /// value is only ever read from the leaf that owns it.
    pub(crate) fn search(&self, key: &K) -> Option<(Handle, usize)> {
        let mut current = self.root?;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.child_slot(key, &self.cmp)),
                Node::Leaf(leaf) => {
                    return match leaf.search(key, &self.cmp) {
                        SearchResult::Found(idx) => Some((current, idx)),
                        SearchResult::NotFound(_) => None,
                    };
                }
            }
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        let (leaf, idx) = self.search(key)?;
        Some(self.nodes.get(leaf).as_leaf().value(idx))
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Leaf and index of the first entry whose key is strictly greater than `start`.
    ///
    /// The index may equal the leaf's key count, in which case the scan continues
    /// at the next leaf.
    pub(crate) fn seek_after(&self, start: &K) -> Option<(Handle, usize)> {
        let mut current = self.root?;
        loop {
            match self.nodes.get(current) {
                Node::Internal(internal) => current = internal.child(internal.child_slot(start, &self.cmp)),
                Node::Leaf(leaf) => {
                    let idx = match leaf.search(start, &self.cmp) {
                        SearchResult::Found(idx) => idx + 1,
                        SearchResult::NotFound(idx) => idx,
                    };
                    return Some((current, idx));
                }
            }
        }
    }
}

impl<K: Clone, V, C: KeyOrder<K>> RawBPlusTree<K, V, C> {
    /// Inserts `key` unless an equal key is already stored.
    ///
    /// Returns `false`, leaving the tree untouched, when the key exists.
    pub(crate) fn insert(&mut self, key: K, value: V) -> bool {
        let Some(root) = self.root else {
            let mut leaf = LeafNode::new();
            leaf.push(key, value);
            self.root = Some(self.nodes.alloc(Node::Leaf(leaf)));
            self.len = 1;
            return true;
        };

        match self.insert_into(root, key, value) {
            InsertResult::Duplicate => return false,
            InsertResult::Done => {}
            InsertResult::Split { separator, right } => {
                let new_root = self.nodes.alloc(Node::Internal(InternalNode::new_root(root, separator, right)));
                tracing::trace!(old_root = ?root, new_root = ?new_root, "root split, tree grew one level");
                self.root = Some(new_root);
            }
        }
        self.len += 1;
        true
    }

    fn insert_into(&mut self, handle: Handle, key: K, value: V) -> InsertResult<K> {
        if self.nodes.get(handle).is_leaf() {
            return self.insert_into_leaf(handle, key, value);
        }

        let internal = self.nodes.get(handle).as_internal();
        let slot = internal.child_slot(&key, &self.cmp);
        let child = internal.child(slot);

        let (separator, right) = match self.insert_into(child, key, value) {
            InsertResult::Split { separator, right } => (separator, right),
            other => return other,
        };

        let order = self.order;
        let internal = self.nodes.get_mut(handle).as_internal_mut();
        internal.insert_child(slot, separator, right);
        if internal.keys().len() <= order.max_keys() {
            return InsertResult::Done;
        }

        let (median, sibling) = internal.split(order);
        let right = self.nodes.alloc(Node::Internal(sibling));
        tracing::trace!(left = ?handle, right = ?right, "internal split");
        InsertResult::Split { separator: median, right }
    }

    fn insert_into_leaf(&mut self, handle: Handle, key: K, value: V) -> InsertResult<K> {
        let order = self.order;
        let leaf = self.nodes.get_mut(handle).as_leaf_mut();
        let idx = match leaf.search(&key, &self.cmp) {
            SearchResult::Found(_) => return InsertResult::Duplicate,
            SearchResult::NotFound(idx) => idx,
        };
        leaf.insert(idx, key, value);
        if leaf.key_count() <= order.max_keys() {
            return InsertResult::Done;
        }

        // The new leaf inherits the old forward link; the old leaf then points at it.
        let (separator, sibling) = leaf.split(order);
        let right = self.nodes.alloc(Node::Leaf(sibling));
        self.nodes.get_mut(handle).as_leaf_mut().set_next(Some(right));
        tracing::trace!(left = ?handle, right = ?right, "leaf split");
        InsertResult::Split { separator, right }
    }

    /// Removes `key`, returning its value if it was present.
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root?;
        let (_, value) = self.remove_from(root, key)?;
        self.len -= 1;
        self.collapse_root(root);
        Some(value)
    }

    /// Shrinks the tree when a removal left the root without keys.
    fn collapse_root(&mut self, root: Handle) {
        let node = self.nodes.get(root);
        if node.key_count() > 0 {
            return;
        }
        if node.is_leaf() {
            tracing::trace!("last key removed, tree is empty");
            self.nodes.free(root);
            self.root = None;
            return;
        }
        let Node::Internal(internal) = self.nodes.take(root) else {
            unreachable!("root role checked above");
        };
        let child = internal.into_only_child();
        tracing::trace!(old_root = ?root, new_root = ?child, "root collapsed, tree shrank one level");
        self.root = child;
    }

    /// Removes `key` from the subtree at `handle`.
    ///
    /// On return every child of `handle` is legal again; `handle` itself may be
    /// one key short, which its own parent repairs.
    fn remove_from(&mut self, handle: Handle, key: &K) -> Option<(K, V)> {
        let (slot, child) = match self.nodes.get_mut(handle) {
            Node::Leaf(leaf) => {
                return match leaf.search(key, &self.cmp) {
                    SearchResult::Found(idx) => Some(leaf.remove(idx)),
                    SearchResult::NotFound(_) => None,
                };
            }
            Node::Internal(internal) => {
                let slot = internal.child_slot(key, &self.cmp);
                (slot, internal.child(slot))
            }
        };

        let removed = self.remove_from(child, key)?;

        // A separator equal to the removed key must not survive; replace it with
        // the in-order successor before any rotation can move it down a level.
        self.replace_separator(handle, key);
        if self.nodes.get(child).is_underfull(self.order) {
            self.fill(handle, slot);
            self.replace_separator(handle, key);
        }
        Some(removed)
    }

    /// Overwrites the separator equal to `removed` with its in-order successor.
    fn replace_separator(&mut self, handle: Handle, removed: &K) {
        let SearchResult::Found(idx) = self.nodes.get(handle).as_internal().search(removed, &self.cmp) else {
            return;
        };
        let Some(successor) = self.successor(handle, idx).cloned() else {
            return;
        };
        self.nodes.get_mut(handle).as_internal_mut().set_key(idx, successor);
    }

    /// Brings the child at `slot`, one key short, back to the minimum.
    ///
    /// Tries a rotation from the left sibling, then from the right sibling, and
    /// otherwise merges with the right sibling, or the left one for the last child.
    fn fill(&mut self, parent: Handle, slot: usize) {
        let order = self.order;
        let internal = self.nodes.get(parent).as_internal();
        let left = slot.checked_sub(1).map(|idx| internal.child(idx));
        let right = (slot + 1 < internal.child_count()).then(|| internal.child(slot + 1));

        if let Some(left) = left
            && self.nodes.get(left).can_lend(order)
        {
            self.borrow_from_prev(parent, slot);
        } else if let Some(right) = right
            && self.nodes.get(right).can_lend(order)
        {
            self.borrow_from_next(parent, slot);
        } else if right.is_some() {
            self.merge(parent, slot);
        } else {
            self.merge(parent, slot - 1);
        }
    }

    /// Rotates the last entry of `children[slot - 1]` into `children[slot]`
    /// through the separator at `slot - 1`.
    fn borrow_from_prev(&mut self, parent: Handle, slot: usize) {
        let internal = self.nodes.get(parent).as_internal();
        let (sibling, child) = (internal.child(slot - 1), internal.child(slot));
        tracing::trace!(from = ?sibling, to = ?child, "borrow from left sibling");

        match self.nodes.get_mut(sibling) {
            Node::Leaf(leaf) => {
                let (key, value) = leaf.pop().expect("lending leaf is above the minimum");
                let separator = key.clone();
                self.nodes.get_mut(child).as_leaf_mut().push_front(key, value);
                self.nodes.get_mut(parent).as_internal_mut().set_key(slot - 1, separator);
            }
            Node::Internal(internal) => {
                let (key, grandchild) = internal.pop_child().expect("lending node is above the minimum");
                let separator = self.nodes.get_mut(parent).as_internal_mut().set_key(slot - 1, key);
                self.nodes.get_mut(child).as_internal_mut().push_child_front(separator, grandchild);
            }
        }
    }

    /// Rotates the first entry of `children[slot + 1]` into `children[slot]`
    /// through the separator at `slot`.
    fn borrow_from_next(&mut self, parent: Handle, slot: usize) {
        let internal = self.nodes.get(parent).as_internal();
        let (child, sibling) = (internal.child(slot), internal.child(slot + 1));
        tracing::trace!(from = ?sibling, to = ?child, "borrow from right sibling");

        match self.nodes.get_mut(sibling) {
            Node::Leaf(leaf) => {
                let (key, value) = leaf.pop_front().expect("lending leaf is above the minimum");
                let separator = leaf.first_key().expect("lending leaf keeps a key").clone();
                self.nodes.get_mut(child).as_leaf_mut().push(key, value);
                self.nodes.get_mut(parent).as_internal_mut().set_key(slot, separator);
            }
            Node::Internal(internal) => {
                let (key, grandchild) = internal.pop_child_front().expect("lending node is above the minimum");
                let separator = self.nodes.get_mut(parent).as_internal_mut().set_key(slot, key);
                self.nodes.get_mut(child).as_internal_mut().push_child(separator, grandchild);
            }
        }
    }

    /// Merges `children[idx + 1]` into `children[idx]` and drops the separator
    /// between them from the parent.
    fn merge(&mut self, parent: Handle, idx: usize) {
        let (separator, right) = self.nodes.get_mut(parent).as_internal_mut().remove_child(idx);
        let left = self.nodes.get(parent).as_internal().child(idx);
        tracing::trace!(left = ?left, right = ?right, "merge siblings");

        match self.nodes.take(right) {
            // Leaves hold every key already; the separator copy is dropped.
            Node::Leaf(right) => self.nodes.get_mut(left).as_leaf_mut().merge_with_right(right),
            Node::Internal(right) => self.nodes.get_mut(left).as_internal_mut().merge_with_right(separator, right),
        }
    }
}
