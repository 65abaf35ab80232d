//! Key comparison injected into a [`BPlusTreeMap`](crate::BPlusTreeMap).
//!
//! The map never calls [`Ord`] or [`PartialEq`] on its keys directly. Every
//! routing and matching decision goes through a [`KeyOrder`], which supplies a
//! strict-order predicate and a separate equality predicate. The two must
//! describe the same notion of key identity: keys that neither sort before the
//! other are the same key.

/// A strict weak order plus an equality test over keys of type `K`.
///
/// Implementations must be consistent:
///
/// - `less(a, b)` and `less(b, a)` are never both true;
/// - `equal(a, b)` holds exactly when neither `less(a, b)` nor `less(b, a)` does.
///
/// Node searches stop at the first key not less than the probe, so two keys that
/// are equivalent under `less` but not `equal` would both be stored and one of
/// them could never be found again. Violating the contract is a logic error; the
/// map stays memory-safe but lookups may return wrong answers.
pub trait KeyOrder<K: ?Sized> {
    /// Returns true if `a` sorts strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Returns true if `a` and `b` denote the same key.
    fn equal(&self, a: &K, b: &K) -> bool;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> KeyOrder<K> for NaturalOrder {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// A pair of caller-supplied closures: `less` then `equal`.
///
/// # Examples
///
/// ```
/// use leafline::{BPlusTreeMap, Order};
///
/// // Case-insensitive keys.
/// let mut map = BPlusTreeMap::with_predicates(
///     Order::DEFAULT,
///     |a: &String, b: &String| a.to_lowercase() < b.to_lowercase(),
///     |a: &String, b: &String| a.eq_ignore_ascii_case(b),
/// );
/// assert!(map.insert("Apple".to_string(), 1));
/// assert!(!map.insert("APPLE".to_string(), 2));
/// assert_eq!(map.get(&"apple".to_string()), Some(&1));
/// ```
#[derive(Clone, Copy)]
pub struct Predicates<L, E> {
    less: L,
    equal: E,
}

impl<L, E> Predicates<L, E> {
    pub const fn new(less: L, equal: E) -> Self {
        Self { less, equal }
    }
}

impl<K: ?Sized, L, E> KeyOrder<K> for Predicates<L, E>
where
    L: Fn(&K, &K) -> bool,
    E: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        (self.less)(a, b)
    }

    #[inline]
    fn equal(&self, a: &K, b: &K) -> bool {
        (self.equal)(a, b)
    }
}

impl<L, E> core::fmt::Debug for Predicates<L, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Predicates")
    }
}
