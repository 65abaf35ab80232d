use thiserror::Error;

/// Errors surfaced by [`BPlusTreeMap`](crate::BPlusTreeMap) operations.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// An update named a key the map does not hold.
    #[error("key not found for update")]
    KeyNotFound,
    /// A branching order below two was requested.
    #[error("invalid tree order {0}: must be at least 2")]
    InvalidOrder(usize),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
