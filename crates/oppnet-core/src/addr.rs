//! Node addressing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network-layer address of a simulated node.
///
/// Addresses are handed out sequentially from zero by the
/// [`AddressAllocator`] that the world owns, so within a single run an
/// address doubles as a dense index into the node table. A fresh run
/// starts from a fresh allocator, which resets numbering.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeAddress(pub u32);

impl NodeAddress {
    /// Dense index form of the address.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential address allocator.
///
/// Owned by the world rather than kept as process-wide state, so two
/// worlds in one process number their nodes independently and a fresh
/// run restarts from zero by constructing a new allocator.
#[derive(Clone, Debug, Default)]
pub struct AddressAllocator {
    next: u32,
}

impl AddressAllocator {
    /// Create an allocator that starts numbering at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next address and advance the counter.
    pub fn allocate(&mut self) -> NodeAddress {
        let addr = NodeAddress(self.next);
        self.next += 1;
        addr
    }

    /// Number of addresses handed out so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.next as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_sequential_from_zero() {
        let mut alloc = AddressAllocator::new();
        assert_eq!(alloc.allocate(), NodeAddress(0));
        assert_eq!(alloc.allocate(), NodeAddress(1));
        assert_eq!(alloc.allocate(), NodeAddress(2));
        assert_eq!(alloc.allocated(), 3);
    }

    #[test]
    fn fresh_allocator_restarts_numbering() {
        let mut first = AddressAllocator::new();
        first.allocate();
        first.allocate();

        let mut second = AddressAllocator::new();
        assert_eq!(second.allocate(), NodeAddress(0));
    }

    #[test]
    fn address_orders_by_value() {
        assert!(NodeAddress(1) < NodeAddress(2));
        assert_eq!(NodeAddress(7).index(), 7);
        assert_eq!(NodeAddress(7).to_string(), "7");
    }
}
