use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;

use crate::error::{Error, Result};
use crate::key_order::{KeyOrder, NaturalOrder, Predicates};
use crate::order::Order;
use crate::raw::{Handle, LeafNode, RawBPlusTree};

mod stats;

pub use stats::TreeStats;

/// An ordered map based on a [B+ tree].
///
/// Entries live in the leaves, which are chained left to right so that ordered
/// traversal and range scans walk the chain instead of re-descending the tree.
/// Internal nodes hold separator keys only. Point lookups, insertions and
/// removals cost O(m · log n) for a tree of order `m`.
///
/// Keys are compared through a [`KeyOrder`]: [`NaturalOrder`] for any `K: Ord`
/// (the default), or a pair of closures given to
/// [`with_predicates`](BPlusTreeMap::with_predicates).
///
/// Unlike `std::collections::BTreeMap`, [`insert`](BPlusTreeMap::insert) never
/// overwrites: use [`update`](BPlusTreeMap::update) to replace a value.
///
/// # Examples
///
/// ```
/// use leafline::BPlusTreeMap;
///
/// let mut map = BPlusTreeMap::new();
/// map.insert("b", "2");
/// map.insert("a", "1");
/// map.insert("c", "3");
///
/// assert_eq!(map.keys(), [&"a", &"b", &"c"]);
/// assert_eq!(map.get(&"a"), Some(&"1"));
///
/// // Keys strictly between the bounds.
/// let inner: Vec<_> = map.range(&"a", &"c").collect();
/// assert_eq!(inner, [(&"b", &"2")]);
/// ```
///
/// [B+ tree]: https://en.wikipedia.org/wiki/B%2B_tree
pub struct BPlusTreeMap<K, V, C = NaturalOrder> {
    raw: RawBPlusTree<K, V, C>,
}

/// An iterator over the entries of a [`BPlusTreeMap`], in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTreeMap`].
///
/// [`iter`]: BPlusTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C> {
    tree: &'a RawBPlusTree<K, V, C>,
    leaf: Option<Handle>,
    index: usize,
    remaining: usize,
}

/// An iterator over the entries of a [`BPlusTreeMap`] whose keys lie strictly
/// between two bounds.
///
/// This `struct` is created by the [`range`] method on [`BPlusTreeMap`].
///
/// [`range`]: BPlusTreeMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V, C> {
    tree: &'a RawBPlusTree<K, V, C>,
    leaf: Option<Handle>,
    index: usize,
    end: &'a K,
}

impl<K: Ord, V> BPlusTreeMap<K, V> {
    /// Makes a new, empty map of order [`Order::DEFAULT`] using `K`'s [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.height(), 1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_order(Order::DEFAULT)
    }

    /// Makes a new, empty map of the given order using `K`'s [`Ord`].
    #[must_use]
    pub const fn with_order(order: Order) -> Self {
        Self::with_key_order(order, NaturalOrder)
    }
}

impl<K, V, L, E> BPlusTreeMap<K, V, Predicates<L, E>>
where
    L: Fn(&K, &K) -> bool,
    E: Fn(&K, &K) -> bool,
{
    /// Makes a new, empty map that compares keys with `less` and `equal`.
    ///
    /// The two predicates must agree with each other; see [`KeyOrder`].
    #[must_use]
    pub const fn with_predicates(order: Order, less: L, equal: E) -> Self {
        Self::with_key_order(order, Predicates::new(less, equal))
    }
}

impl<K, V, C> BPlusTreeMap<K, V, C> {
    /// Makes a new, empty map that compares keys with `cmp`.
    #[must_use]
    pub const fn with_key_order(order: Order, cmp: C) -> Self {
        Self {
            raw: RawBPlusTree::new(order, cmp),
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the map holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// The branching order the map was built with.
    #[must_use]
    pub const fn order(&self) -> Order {
        self.raw.order()
    }

    /// The comparison the map routes keys with.
    #[must_use]
    pub const fn key_order(&self) -> &C {
        self.raw.key_order()
    }

    /// Number of levels from the root to the leaves, inclusive. An empty map has
    /// height 0 and a map whose root is a leaf has height 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::{BPlusTreeMap, Order};
    ///
    /// let mut map = BPlusTreeMap::with_order(Order::new(3)?);
    /// assert_eq!(map.height(), 0);
    /// for key in 1..=5 {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.height(), 2);
    /// # Ok::<(), leafline::Error>(())
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Removes every entry. The map keeps its order and comparison.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.height(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Every key in ascending order, gathered by a depth-first walk of the tree
    /// structure rather than the leaf chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// for key in [3, 1, 2] {
    ///     map.insert(key, ());
    /// }
    /// assert_eq!(map.keys(), [&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.raw.keys()
    }

    /// Gets an iterator over the entries of the map, sorted by key, following the
    /// leaf chain from the leftmost leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert(3, "c");
    /// map.insert(1, "a");
    ///
    /// let mut iter = map.iter();
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// assert_eq!(iter.next(), Some((&3, &"c")));
    /// assert_eq!(iter.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: &self.raw,
            leaf: self.raw.first_leaf(),
            index: 0,
            remaining: self.raw.len(),
        }
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }
}

impl<K, V, C: KeyOrder<K>> BPlusTreeMap<K, V, C> {
    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.raw.get(key)
    }

    /// Returns true if the map holds `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.contains_key(key)
    }

    /// Gets an iterator over the entries whose keys lie strictly between `start`
    /// and `end`; both bounds are excluded. Yields nothing when `start` is not
    /// less than `end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// for key in 1..=5 {
    ///     map.insert(key, key * 10);
    /// }
    /// let inner: Vec<_> = map.range(&1, &5).map(|(k, _)| *k).collect();
    /// assert_eq!(inner, [2, 3, 4]);
    /// ```
    pub fn range<'a>(&'a self, start: &K, end: &'a K) -> Range<'a, K, V, C> {
        let (leaf, index) = if self.raw.key_order().less(start, end) {
            self.raw.seek_after(start).map_or((None, 0), |(leaf, index)| (Some(leaf), index))
        } else {
            (None, 0)
        };
        Range {
            tree: &self.raw,
            leaf,
            index,
            end,
        }
    }
}

impl<K: Clone, V, C: KeyOrder<K>> BPlusTreeMap<K, V, C> {
    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Returns `true` if the entry was added. If an equal key is stored the map
    /// is left unchanged, `value` is dropped and `false` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(key, value)
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.raw.remove(key)
    }

    /// Replaces the value stored under `key`, returning the previous value.
    ///
    /// The entry is removed and inserted again, so the tree rebalances exactly
    /// as it would for the two separate operations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is absent; the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::{BPlusTreeMap, Error};
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert("k", 1);
    /// assert_eq!(map.update("k", 2), Ok(1));
    /// assert_eq!(map.get(&"k"), Some(&2));
    /// assert_eq!(map.update("missing", 3), Err(Error::KeyNotFound));
    /// ```
    pub fn update(&mut self, key: K, value: V) -> Result<V> {
        let previous = self.raw.remove(&key).ok_or(Error::KeyNotFound)?;
        self.raw.insert(key, value);
        Ok(previous)
    }
}

impl<K, V, C> BPlusTreeMap<K, V, C> {
    /// Gathers size and shape figures for the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use leafline::BPlusTreeMap;
    ///
    /// let mut map = BPlusTreeMap::new();
    /// map.insert(1, ());
    /// assert_eq!(map.stats().to_string(), "Total keys: 1, Height: 1");
    /// ```
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            len: self.raw.len(),
            height: self.raw.height(),
            order: self.raw.order(),
            nodes: self.raw.node_count(),
            leaves: self.raw.leaf_count(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for BPlusTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Default for BPlusTreeMap<K, V> {
    /// Creates an empty map of order [`Order::DEFAULT`].
    fn default() -> Self {
        Self::new()
    }
}

/// Inserts every pair; pairs whose key is already present are skipped.
impl<K: Clone, V, C: KeyOrder<K>> Extend<(K, V)> for BPlusTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + Clone, V> FromIterator<(K, V)> for BPlusTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, C> IntoIterator for &'a BPlusTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

/// Reads the entry at `index` of `leaf`, or moves to the next leaf.
enum Step<'a, K, V> {
    Entry(&'a K, &'a V),
    NextLeaf(Option<Handle>),
}

fn step<K, V>(leaf: &LeafNode<K, V>, index: usize) -> Step<'_, K, V> {
    match leaf.entry(index) {
        Some((key, value)) => Step::Entry(key, value),
        None => Step::NextLeaf(leaf.next()),
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.tree.node(self.leaf?).as_leaf();
            match step(leaf, self.index) {
                Step::Entry(key, value) => {
                    self.index += 1;
                    self.remaining -= 1;
                    return Some((key, value));
                }
                Step::NextLeaf(next) => {
                    self.leaf = next;
                    self.index = 0;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<K, V, C> fmt::Debug for Iter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

impl<'a, K, V, C: KeyOrder<K>> Iterator for Range<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.tree.node(self.leaf?).as_leaf();
            match step(leaf, self.index) {
                Step::Entry(key, value) => {
                    if !self.tree.key_order().less(key, self.end) {
                        self.leaf = None;
                        return None;
                    }
                    self.index += 1;
                    return Some((key, value));
                }
                Step::NextLeaf(next) => {
                    self.leaf = next;
                    self.index = 0;
                }
            }
        }
    }
}

impl<K, V, C: KeyOrder<K>> FusedIterator for Range<'_, K, V, C> {}

impl<K, V, C> Clone for Range<'_, K, V, C> {
    fn clone(&self) -> Self {
        Range { ..*self }
    }
}

impl<K, V, C> fmt::Debug for Range<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range").field("leaf", &self.leaf).field("index", &self.index).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::{String, ToString};
    use pretty_assertions::assert_eq;

    #[test]
    fn range_on_empty_map_is_empty() {
        let map: BPlusTreeMap<i32, i32> = BPlusTreeMap::new();
        assert_eq!(map.range(&0, &10).count(), 0);
    }

    #[test]
    fn inverted_or_touching_range_is_empty() {
        let map: BPlusTreeMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
        assert_eq!(map.range(&5, &5).count(), 0);
        assert_eq!(map.range(&6, &5).count(), 0);
        assert_eq!(map.range(&5, &6).count(), 0);
        assert_eq!(map.range(&4, &6).map(|(k, _)| *k).collect::<Vec<_>>(), [5]);
    }

    #[test]
    fn range_crosses_leaf_boundaries() {
        let map: BPlusTreeMap<i32, i32> = (0..100).map(|k| (k, -k)).collect();
        let keys: Vec<i32> = map.range(&17, &83).map(|(k, _)| *k).collect();
        assert_eq!(keys, (18..83).collect::<Vec<_>>());
    }

    #[test]
    fn range_bounds_need_not_be_stored() {
        let map: BPlusTreeMap<i32, i32> = (0..50).map(|k| (k * 2, k)).collect();
        let keys: Vec<i32> = map.range(&9, &21).map(|(k, _)| *k).collect();
        assert_eq!(keys, [10, 12, 14, 16, 18, 20]);
        assert_eq!(map.range(&-5, &3).map(|(k, _)| *k).collect::<Vec<_>>(), [0, 2]);
        assert_eq!(map.range(&97, &500).map(|(k, _)| *k).collect::<Vec<_>>(), [98]);
    }

    #[test]
    fn iter_reports_exact_length() {
        let map: BPlusTreeMap<i32, i32> = (0..37).map(|k| (k, k)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 37);
        iter.next();
        assert_eq!(iter.len(), 36);
        assert_eq!(iter.clone().count(), 36);
    }

    #[test]
    fn debug_renders_as_map() {
        let mut map = BPlusTreeMap::new();
        map.insert(2, "b");
        map.insert(1, "a");
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn extend_skips_existing_keys() {
        let mut map = BPlusTreeMap::new();
        map.insert("k".to_string(), 1);
        map.extend([("k".to_string(), 2), ("j".to_string(), 3)]);
        assert_eq!(map.get(&"k".to_string()), Some(&1));
        assert_eq!(map.get(&String::from("j")), Some(&3));
    }

    #[test]
    fn predicates_drive_ordering() {
        let mut map = BPlusTreeMap::with_predicates(Order::MIN, |a: &i32, b: &i32| a > b, |a: &i32, b: &i32| a == b);
        for key in 0..20 {
            map.insert(key, ());
        }
        let keys: Vec<i32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, (0..20).rev().collect::<Vec<_>>());
        // Descending order: "strictly between 15 and 10" means 14..=11.
        let inner: Vec<i32> = map.range(&15, &10).map(|(k, _)| *k).collect();
        assert_eq!(inner, [14, 13, 12, 11]);
    }

    #[test]
    fn failed_update_leaves_map_unchanged() {
        let mut map: BPlusTreeMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
        let before: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(map.update(42, 0), Err(Error::KeyNotFound));
        let after: Vec<(i32, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
    }
}
