//! An in-memory ordered map backed by a B+ tree.
//!
//! [`BPlusTreeMap`] keeps every entry in its leaves and chains the leaves left to
//! right, so it offers logarithmic point lookups, insertions and removals along
//! with sorted traversal and range scans that simply walk the chain.
//!
//! # Example
//!
//! ```
//! use leafline::{BPlusTreeMap, Error, Order};
//!
//! let mut map = BPlusTreeMap::with_order(Order::new(3)?);
//! for (key, value) in [(5, "e"), (1, "a"), (3, "c"), (2, "b"), (4, "d")] {
//!     map.insert(key, value);
//! }
//!
//! // Five keys overflow an order-3 leaf, so the root is now an internal node.
//! assert_eq!(map.height(), 2);
//!
//! // Insert never overwrites; update does, and reports missing keys.
//! assert!(!map.insert(1, "z"));
//! assert_eq!(map.update(1, "A"), Ok("a"));
//! assert_eq!(map.update(9, "i"), Err(Error::KeyNotFound));
//!
//! // Ranges exclude both bounds.
//! let inner: Vec<_> = map.range(&1, &5).map(|(k, _)| *k).collect();
//! assert_eq!(inner, [2, 3, 4]);
//! # Ok::<(), Error>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Injected comparison** - Keys are compared through a [`KeyOrder`]: a strict
//!   order plus an independent equality test, either `Ord` or two closures
//! - **Runtime order** - The branching order is chosen per map with [`Order`]
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to one another by index. Internal nodes own
//! their children; a leaf's link to the next leaf is a plain index that never
//! owns anything. Splits, rotations and merges are always carried out by the
//! parent of the nodes involved.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod key_order;
mod order;
mod raw;

pub mod bptree_map;

pub use bptree_map::{BPlusTreeMap, TreeStats};
pub use error::{Error, Result};
pub use key_order::{KeyOrder, NaturalOrder, Predicates};
pub use order::Order;
