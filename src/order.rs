use core::fmt;

use crate::error::{Error, Result};

/// The branching order `m` of a tree.
///
/// A node holds at most `2 * (m - 1)` keys. Every node except the root holds at
/// least `m - 1` keys once an operation returns.
///
/// # Examples
///
/// ```
/// use leafline::{Error, Order};
///
/// let order = Order::new(3)?;
/// assert_eq!(order.max_keys(), 4);
/// assert_eq!(order.min_keys(), 2);
///
/// assert_eq!(Order::new(1), Err(Error::InvalidOrder(1)));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Order(usize);

impl Order {
    /// Smallest order that yields non-empty nodes.
    pub const MIN: Self = Self(2);
    /// Order 3: up to four keys per node.
    pub const DEFAULT: Self = Self(3);

    /// Validates `m`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `m < 2`.
    pub const fn new(m: usize) -> Result<Self> {
        if m < Self::MIN.0 { Err(Error::InvalidOrder(m)) } else { Ok(Self(m)) }
    }

    /// The raw order `m`.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Largest key count any node may hold.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        2 * (self.0 - 1)
    }

    /// Smallest key count a non-root node may hold.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.0 - 1
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<usize> for Order {
    type Error = Error;

    fn try_from(m: usize) -> Result<Self> {
        Self::new(m)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_orders_below_two() {
        assert_eq!(Order::new(0), Err(Error::InvalidOrder(0)));
        assert_eq!(Order::new(1), Err(Error::InvalidOrder(1)));
        assert_eq!(Order::try_from(2), Ok(Order::MIN));
    }

    proptest! {
        #[test]
        fn bounds_leave_room_for_a_split(m in 2usize..512) {
            let order = Order::new(m).unwrap();
            // An overflowing node (max + 1 keys) must split into two legal halves.
            prop_assert!(order.max_keys() + 1 >= 2 * order.min_keys());
            prop_assert!(order.min_keys() >= 1);
        }
    }
}
