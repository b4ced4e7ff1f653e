//! Routing seam.
//!
//! Message routing proper is out of scope for this crate; the world only
//! needs to tell *something* when links come up or go down and ask it
//! which transfers to perform on a given tick. [`ScriptedRouter`] drives
//! deterministic scenarios in tests and the demo binary.

use std::collections::BTreeMap;

use oppnet_core::NodeAddress;

use crate::iface::InterfaceId;

/// A single hop transfer the router wants executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Message identifier carried on the hop record.
    pub message_id: String,
    /// Sending node.
    pub from: NodeAddress,
    /// Receiving node.
    pub to: NodeAddress,
}

impl Transfer {
    /// Convenience constructor.
    #[must_use]
    pub fn new(message_id: impl Into<String>, from: NodeAddress, to: NodeAddress) -> Self {
        Self {
            message_id: message_id.into(),
            from,
            to,
        }
    }
}

/// Routing-layer callbacks driven by the world.
pub trait MessageRouter {
    /// A link between `local` and `peer` was established.
    fn connection_up(&mut self, local: InterfaceId, peer: InterfaceId) {
        let _ = (local, peer);
    }

    /// A link between `local` and `peer` was torn down.
    fn connection_down(&mut self, local: InterfaceId, peer: InterfaceId) {
        let _ = (local, peer);
    }

    /// Transfers the router wants attempted on `tick`.
    fn deliverable(&mut self, tick: u64) -> Vec<Transfer> {
        let _ = tick;
        Vec::new()
    }

    /// A transfer was carried out and witnessed by both endpoints.
    fn message_transferred(&mut self, transfer: &Transfer) {
        let _ = transfer;
    }
}

/// Router that does nothing. Default for worlds driven externally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRouter;

impl MessageRouter for NullRouter {}

/// Router that replays a fixed tick-indexed script of transfers.
#[derive(Debug, Default)]
pub struct ScriptedRouter {
    script: BTreeMap<u64, Vec<Transfer>>,
    delivered: Vec<Transfer>,
}

impl ScriptedRouter {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `transfer` for attempt on `tick`.
    pub fn schedule(&mut self, tick: u64, transfer: Transfer) {
        self.script.entry(tick).or_default().push(transfer);
    }

    /// Transfers that actually completed, in completion order.
    #[must_use]
    pub fn delivered(&self) -> &[Transfer] {
        &self.delivered
    }
}

impl MessageRouter for ScriptedRouter {
    fn deliverable(&mut self, tick: u64) -> Vec<Transfer> {
        self.script.remove(&tick).unwrap_or_default()
    }

    fn message_transferred(&mut self, transfer: &Transfer) {
        self.delivered.push(transfer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_router_replays_per_tick() {
        let mut router = ScriptedRouter::new();
        router.schedule(2, Transfer::new("m1", NodeAddress(0), NodeAddress(1)));
        router.schedule(2, Transfer::new("m2", NodeAddress(1), NodeAddress(0)));
        router.schedule(5, Transfer::new("m3", NodeAddress(0), NodeAddress(2)));

        assert!(router.deliverable(1).is_empty());
        assert_eq!(router.deliverable(2).len(), 2);
        // the slot is consumed
        assert!(router.deliverable(2).is_empty());
        assert_eq!(router.deliverable(5).len(), 1);
    }

    #[test]
    fn completed_transfers_are_recorded() {
        let mut router = ScriptedRouter::new();
        let transfer = Transfer::new("m1", NodeAddress(3), NodeAddress(4));
        router.message_transferred(&transfer);
        assert_eq!(router.delivered(), &[transfer]);
    }

    #[test]
    fn null_router_reports_nothing() {
        let mut router = NullRouter;
        assert!(router.deliverable(0).is_empty());
    }
}
