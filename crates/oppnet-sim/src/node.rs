//! Network nodes and the pairwise trust exchange.

use tracing::debug;

use oppnet_core::{Coord, NodeAddress, SimConfig};
use oppnet_trust::{
    synchronize, MaliciousRegistry, MessageLedger, ObservationTable, TransferRecord,
};

use crate::iface::{InterfaceId, NetworkInterface};
use crate::movement::MovementModel;

/// A simulated node: position, radio interfaces and the per-node trust
/// state (hop ledger, neighbor observations, blacklist).
pub struct Node {
    address: NodeAddress,
    name: String,
    location: Coord,
    movement: Box<dyn MovementModel>,
    interfaces: Vec<NetworkInterface>,
    ledger: MessageLedger,
    observations: ObservationTable,
    registry: MaliciousRegistry,
}

impl Node {
    pub(crate) fn new(
        address: NodeAddress,
        name: String,
        movement: Box<dyn MovementModel>,
        interface_count: usize,
        config: &SimConfig,
    ) -> Self {
        let location = movement.location();
        let interfaces = (0..interface_count)
            .map(|index| NetworkInterface::new(InterfaceId { node: address, index }, config.radio))
            .collect();
        Self {
            address,
            name,
            location,
            movement,
            interfaces,
            ledger: MessageLedger::new(),
            observations: ObservationTable::new(config.trust),
            registry: MaliciousRegistry::new(),
        }
    }

    /// Stable address of this node.
    #[must_use]
    pub fn address(&self) -> NodeAddress {
        self.address
    }

    /// Group-prefixed display name, e.g. `n3`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current position.
    #[must_use]
    pub fn location(&self) -> Coord {
        self.location
    }

    /// Whether the node participates in connectivity this tick.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.movement.is_active()
    }

    /// Radio interfaces, in index order.
    #[must_use]
    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.interfaces
    }

    pub(crate) fn interface(&self, index: usize) -> Option<&NetworkInterface> {
        self.interfaces.get(index)
    }

    pub(crate) fn interface_mut(&mut self, index: usize) -> Option<&mut NetworkInterface> {
        self.interfaces.get_mut(index)
    }

    /// Hop ledger accumulated so far.
    #[must_use]
    pub fn ledger(&self) -> &MessageLedger {
        &self.ledger
    }

    /// Per-neighbor forward/receive observations.
    #[must_use]
    pub fn observations(&self) -> &ObservationTable {
        &self.observations
    }

    /// Blacklist as currently held.
    #[must_use]
    pub fn registry(&self) -> &MaliciousRegistry {
        &self.registry
    }

    /// Mutable blacklist access, for seeding adversarial scenarios.
    pub fn registry_mut(&mut self) -> &mut MaliciousRegistry {
        &mut self.registry
    }

    pub(crate) fn poll_movement(&mut self, dt: f64) {
        self.movement.advance(dt);
        self.location = self.movement.location();
    }

    /// Witness a hop transfer first-hand. Returns whether the record was
    /// new to this node's ledger.
    pub fn witness(&mut self, record: TransferRecord) -> bool {
        if !self.ledger.record(record.clone()) {
            return false;
        }
        self.observe_records(std::slice::from_ref(&record));
        true
    }

    /// Fold `records` into the observation table and blacklist whichever
    /// neighbors cross the suspicion thresholds.
    fn observe_records(&mut self, records: &[TransferRecord]) {
        for record in records {
            for suspect in self.observations.observe(record) {
                if self.registry.record_suspicion(suspect) {
                    debug!(
                        node = %self.address,
                        %suspect,
                        "neighbor crossed suspicion thresholds"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("address", &self.address)
            .field("name", &self.name)
            .field("location", &self.location)
            .field("interfaces", &self.interfaces.len())
            .finish_non_exhaustive()
    }
}

/// Pairwise trust exchange between two freshly connected nodes.
///
/// Each side imports the records it was missing from the other's ledger,
/// re-evaluates its observations against them, and finally both gossip
/// their blacklists into a shared merged table.
pub fn exchange(a: &mut Node, b: &mut Node) {
    let (new_for_a, new_for_b) = synchronize(&mut a.ledger, &mut b.ledger);
    a.observe_records(&new_for_a);
    b.observe_records(&new_for_b);
    oppnet_trust::merge(&mut a.registry, &mut b.registry);
    debug!(
        a = %a.address,
        b = %b.address,
        imported_a = new_for_a.len(),
        imported_b = new_for_b.len(),
        "trust exchange complete"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::Stationary;
    use oppnet_core::SimConfigBuilder;

    fn node(addr: u32) -> Node {
        let config = SimConfigBuilder::new().build();
        Node::new(
            NodeAddress(addr),
            format!("n{addr}"),
            Box::new(Stationary::new(Coord::new(0.0, 0.0))),
            1,
            &config,
        )
    }

    fn hop(id: &str, stamp: &str, from: u32, to: u32) -> TransferRecord {
        TransferRecord::new(id, stamp, NodeAddress(from), NodeAddress(to))
    }

    #[test]
    fn witnessing_updates_ledger_and_observations() {
        let mut n = node(0);
        assert!(n.witness(hop("m1", "00.00.01", 1, 2)));

        assert!(n.ledger().contains(&hop("m1", "00.00.01", 1, 2)));
        let sender = n.observations().get(NodeAddress(1)).unwrap();
        assert_eq!(sender.forward_count, 1.0);
        assert_eq!(sender.receive_count, 0.0);
        let receiver = n.observations().get(NodeAddress(2)).unwrap();
        assert_eq!(receiver.receive_count, 1.0);
    }

    #[test]
    fn duplicate_witness_changes_nothing() {
        let mut n = node(0);
        assert!(n.witness(hop("m1", "00.00.01", 1, 2)));
        assert!(!n.witness(hop("m1", "00.00.01", 1, 2)));

        let sender = n.observations().get(NodeAddress(1)).unwrap();
        assert_eq!(sender.forward_count, 1.0);
    }

    #[test]
    fn source_only_sender_ends_up_blacklisted() {
        // Default thresholds: ratio > 1.0 and total > 5.0. Six sends with
        // no receives gives (6, 0, inf) which crosses both.
        let mut n = node(0);
        for i in 0..6 {
            n.witness(hop(&format!("m{i}"), "00.00.01", 7, 0));
        }
        assert!(n.registry().contains(NodeAddress(7)));
        assert_eq!(n.registry().find(NodeAddress(7)), Some(1));
    }

    #[test]
    fn exchange_reaches_ledger_agreement() {
        let mut a = node(0);
        let mut b = node(1);
        a.witness(hop("m1", "00.00.01", 0, 1));
        b.witness(hop("m2", "00.00.02", 1, 0));

        exchange(&mut a, &mut b);

        assert_eq!(a.ledger().records().len(), 2);
        assert_eq!(b.ledger().records().len(), 2);
        assert!(a.ledger().contains(&hop("m2", "00.00.02", 1, 0)));
        assert!(b.ledger().contains(&hop("m1", "00.00.01", 0, 1)));
    }

    #[test]
    fn exchange_gossips_blacklists_both_ways() {
        let mut a = node(0);
        let mut b = node(1);
        a.registry_mut().insert(NodeAddress(9), 1);

        exchange(&mut a, &mut b);

        assert!(a.registry().contains(NodeAddress(9)));
        assert!(b.registry().contains(NodeAddress(9)));
        assert_eq!(b.registry().find(NodeAddress(9)), Some(1));
    }

    #[test]
    fn exchanged_records_feed_observations() {
        let mut a = node(0);
        let mut b = node(1);
        for i in 0..6 {
            b.witness(hop(&format!("m{i}"), "00.00.01", 7, 1));
        }
        assert!(!a.registry().contains(NodeAddress(7)));

        exchange(&mut a, &mut b);

        // a imported the six hop records and reached the same verdict.
        assert!(a.registry().contains(NodeAddress(7)));
    }
}
