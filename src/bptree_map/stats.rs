use core::fmt;

use crate::order::Order;

/// Size and shape figures for a [`BPlusTreeMap`](super::BPlusTreeMap).
///
/// Created by [`BPlusTreeMap::stats`](super::BPlusTreeMap::stats).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TreeStats {
    /// Stored entries.
    pub len: usize,
    /// Levels from root to leaf inclusive.
    pub height: usize,
    /// Branching order of the map.
    pub order: Order,
    /// Live nodes, internal and leaf.
    pub nodes: usize,
    /// Leaves on the leaf chain.
    pub leaves: usize,
}

impl TreeStats {
    /// Average number of entries per leaf, or zero for an empty map.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn leaf_fill(&self) -> f64 {
        if self.leaves == 0 { 0.0 } else { self.len as f64 / self.leaves as f64 }
    }
}

impl fmt::Display for TreeStats {
    /// Renders `Total keys: N, Height: H`; the alternate form (`{:#}`) adds the
    /// node breakdown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total keys: {}, Height: {}", self.len, self.height)?;
        if f.alternate() {
            write!(
                f,
                ", Order: {}, Nodes: {}, Leaves: {}, Leaf fill: {:.2}",
                self.order,
                self.nodes,
                self.leaves,
                self.leaf_fill()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{BPlusTreeMap, Order};
    use alloc::format;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_map() {
        let map: BPlusTreeMap<u8, u8> = BPlusTreeMap::new();
        let stats = map.stats();
        assert_eq!((stats.len, stats.height, stats.nodes, stats.leaves), (0, 0, 0, 0));
        assert_eq!(format!("{stats}"), "Total keys: 0, Height: 0");
        assert_eq!(stats.leaf_fill(), 0.0);
    }

    #[test]
    fn counts_nodes_after_split() {
        let mut map = BPlusTreeMap::with_order(Order::new(3).unwrap());
        for key in 1..=5 {
            map.insert(key, ());
        }
        let stats = map.stats();
        assert_eq!((stats.len, stats.height, stats.nodes, stats.leaves), (5, 2, 3, 2));
        assert_eq!(
            format!("{stats:#}"),
            "Total keys: 5, Height: 2, Order: 3, Nodes: 3, Leaves: 2, Leaf fill: 2.50"
        );
    }
}
