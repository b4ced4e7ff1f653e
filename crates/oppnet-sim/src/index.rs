//! Spatial neighbor index seam (the "connectivity optimizer").
//!
//! The production optimizer is an excluded collaborator; this module pins
//! down its contract and provides a full-scan reference implementation.
//! The connectivity gate consumes interfaces *newly* in range: an
//! interface that stays within range across queries is reported once, when
//! it enters, and again only after it has left and come back. This is what
//! keeps the blacklist veto effective, since the gate would otherwise
//! re-establish a pruned connection on the very same tick.

use std::collections::{BTreeMap, BTreeSet};

use oppnet_core::Coord;

use crate::iface::InterfaceId;

/// Spatial index over interface positions.
pub trait NeighborIndex {
    /// Record `iface`'s position for this tick. Called once per tick per
    /// interface before any `nearby` query.
    fn update_location(&mut self, iface: InterfaceId, location: Coord);

    /// Interfaces that entered `range` of `iface` since the previous
    /// query, in ascending id order, excluding `iface` itself.
    fn nearby(&mut self, iface: InterfaceId, range: f64) -> Vec<InterfaceId>;

    /// Discard the entry event consumed for `candidate` so the next
    /// `nearby` query reports it again if it is still in range. Called
    /// when a connect attempt was blocked for a transient reason.
    fn forget(&mut self, iface: InterfaceId, candidate: InterfaceId);
}

/// Reference implementation scanning every registered interface.
///
/// Quadratic in the number of interfaces; fine for tests and small demo
/// worlds, which is all this crate runs.
#[derive(Debug, Default)]
pub struct RangeScanIndex {
    positions: BTreeMap<InterfaceId, Coord>,
    in_range: BTreeMap<InterfaceId, BTreeSet<InterfaceId>>,
}

impl RangeScanIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl NeighborIndex for RangeScanIndex {
    fn update_location(&mut self, iface: InterfaceId, location: Coord) {
        self.positions.insert(iface, location);
    }

    fn nearby(&mut self, iface: InterfaceId, range: f64) -> Vec<InterfaceId> {
        let Some(origin) = self.positions.get(&iface).copied() else {
            return Vec::new();
        };

        let now: BTreeSet<InterfaceId> = self
            .positions
            .iter()
            .filter(|&(other, location)| *other != iface && origin.distance(location) <= range)
            .map(|(other, _)| *other)
            .collect();

        let previous = self.in_range.entry(iface).or_default();
        let entered: Vec<InterfaceId> = now.difference(previous).copied().collect();
        *previous = now;
        entered
    }

    fn forget(&mut self, iface: InterfaceId, candidate: InterfaceId) {
        if let Some(known) = self.in_range.get_mut(&iface) {
            known.remove(&candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oppnet_core::NodeAddress;

    fn id(node: u32) -> InterfaceId {
        InterfaceId {
            node: NodeAddress(node),
            index: 0,
        }
    }

    #[test]
    fn reports_interfaces_entering_range() {
        let mut index = RangeScanIndex::new();
        index.update_location(id(0), Coord::new(0.0, 0.0));
        index.update_location(id(1), Coord::new(5.0, 0.0));
        index.update_location(id(2), Coord::new(50.0, 0.0));

        assert_eq!(index.nearby(id(0), 10.0), vec![id(1)]);
    }

    #[test]
    fn steady_neighbors_are_reported_once() {
        let mut index = RangeScanIndex::new();
        index.update_location(id(0), Coord::new(0.0, 0.0));
        index.update_location(id(1), Coord::new(5.0, 0.0));

        assert_eq!(index.nearby(id(0), 10.0), vec![id(1)]);
        // still in range, but not newly so
        assert!(index.nearby(id(0), 10.0).is_empty());
    }

    #[test]
    fn leaving_and_returning_is_a_new_entry() {
        let mut index = RangeScanIndex::new();
        index.update_location(id(0), Coord::new(0.0, 0.0));
        index.update_location(id(1), Coord::new(5.0, 0.0));
        index.nearby(id(0), 10.0);

        index.update_location(id(1), Coord::new(100.0, 0.0));
        assert!(index.nearby(id(0), 10.0).is_empty());

        index.update_location(id(1), Coord::new(3.0, 0.0));
        assert_eq!(index.nearby(id(0), 10.0), vec![id(1)]);
    }

    #[test]
    fn forgotten_candidates_are_reported_again() {
        let mut index = RangeScanIndex::new();
        index.update_location(id(0), Coord::new(0.0, 0.0));
        index.update_location(id(1), Coord::new(5.0, 0.0));

        assert_eq!(index.nearby(id(0), 10.0), vec![id(1)]);
        index.forget(id(0), id(1));
        assert_eq!(index.nearby(id(0), 10.0), vec![id(1)]);
        // without another forget the entry is consumed as usual
        assert!(index.nearby(id(0), 10.0).is_empty());
    }

    #[test]
    fn unknown_origin_reports_nothing() {
        let mut index = RangeScanIndex::new();
        index.update_location(id(1), Coord::new(0.0, 0.0));
        assert!(index.nearby(id(0), 10.0).is_empty());
    }

    #[test]
    fn candidates_come_in_ascending_order() {
        let mut index = RangeScanIndex::new();
        index.update_location(id(3), Coord::new(1.0, 0.0));
        index.update_location(id(1), Coord::new(2.0, 0.0));
        index.update_location(id(2), Coord::new(3.0, 0.0));
        index.update_location(id(0), Coord::new(0.0, 0.0));

        assert_eq!(index.nearby(id(0), 10.0), vec![id(1), id(2), id(3)]);
    }
}
