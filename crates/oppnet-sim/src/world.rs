//! The simulated world: node roster, clock, tick loop.
//!
//! The world runs single-threaded and visits nodes in ascending address
//! order everywhere, so a given configuration plus movement script always
//! produces the same ledgers, observation tables and blacklists.

use tracing::{debug, info};

use oppnet_core::{AddressAllocator, NodeAddress, SimClock, SimConfig};
use oppnet_trust::TransferRecord;

use crate::error::{Result, SimError};
use crate::gate;
use crate::index::{NeighborIndex, RangeScanIndex};
use crate::movement::MovementModel;
use crate::node::{exchange, Node};
use crate::router::{MessageRouter, NullRouter};

/// Simulation state and tick driver.
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) clock: SimClock,
    pub(crate) tick: u64,
    allocator: AddressAllocator,
    pub(crate) nodes: Vec<Node>,
    pub(crate) index: Box<dyn NeighborIndex>,
    pub(crate) router: Box<dyn MessageRouter>,
}

impl World {
    /// Create an empty world from a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let clock = SimClock::new(config.tick_secs);
        Ok(Self {
            config,
            clock,
            tick: 0,
            allocator: AddressAllocator::new(),
            nodes: Vec::new(),
            index: Box::new(RangeScanIndex::new()),
            router: Box::new(NullRouter),
        })
    }

    /// Replace the routing seam. Call before the first tick.
    pub fn set_router(&mut self, router: Box<dyn MessageRouter>) {
        self.router = router;
    }

    /// Builder-style variant of [`World::set_router`].
    #[must_use]
    pub fn with_router(mut self, router: Box<dyn MessageRouter>) -> Self {
        self.set_router(router);
        self
    }

    /// Add a node with a single radio interface.
    ///
    /// Addresses are handed out sequentially from zero, so roster order
    /// is also address order. The display name is the group prefix plus
    /// the address, matching how hosts are labelled in traces.
    pub fn add_node(&mut self, group: &str, movement: Box<dyn MovementModel>) -> NodeAddress {
        self.add_node_with_interfaces(group, movement, 1)
    }

    /// Add a node with `interface_count` radio interfaces.
    pub fn add_node_with_interfaces(
        &mut self,
        group: &str,
        movement: Box<dyn MovementModel>,
        interface_count: usize,
    ) -> NodeAddress {
        let address = self.allocator.allocate();
        let name = format!("{group}{address}");
        let node = Node::new(address, name, movement, interface_count, &self.config);
        for nic in node.interfaces() {
            self.index.update_location(nic.id(), node.location());
        }
        info!(%address, name = %node.name(), "node added");
        self.nodes.push(node);
        address
    }

    /// Number of simulated seconds elapsed.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Ticks executed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// All node addresses, ascending.
    #[must_use]
    pub fn addresses(&self) -> Vec<NodeAddress> {
        self.nodes.iter().map(Node::address).collect()
    }

    /// Look up a node by address.
    pub fn node(&self, address: NodeAddress) -> Result<&Node> {
        self.nodes
            .get(address.index())
            .filter(|node| node.address() == address)
            .ok_or(SimError::UnknownAddress(address))
    }

    /// Look up a node mutably.
    pub fn node_mut(&mut self, address: NodeAddress) -> Result<&mut Node> {
        self.nodes
            .get_mut(address.index())
            .filter(|node| node.address() == address)
            .ok_or(SimError::UnknownAddress(address))
    }

    /// Disjoint mutable borrows of two distinct nodes, lower address
    /// first.
    pub(crate) fn pair_mut(
        &mut self,
        x: NodeAddress,
        y: NodeAddress,
    ) -> Result<(&mut Node, &mut Node)> {
        if x == y {
            return Err(SimError::SelfEncounter(x));
        }
        let (lo, hi) = if x < y { (x, y) } else { (y, x) };
        if hi.index() >= self.nodes.len() {
            return Err(SimError::UnknownAddress(hi));
        }
        let (head, tail) = self.nodes.split_at_mut(hi.index());
        Ok((&mut head[lo.index()], &mut tail[0]))
    }

    /// Run the pairwise trust exchange between two nodes, lower address
    /// evaluating first.
    pub(crate) fn exchange_pair(&mut self, x: NodeAddress, y: NodeAddress) -> Result<()> {
        let (lower, higher) = self.pair_mut(x, y)?;
        exchange(lower, higher);
        Ok(())
    }

    /// Whether any interface of `x` holds a link to any interface of `y`.
    pub fn linked(&self, x: NodeAddress, y: NodeAddress) -> Result<bool> {
        let node = self.node(x)?;
        self.node(y)?;
        Ok(node
            .interfaces()
            .iter()
            .any(|nic| nic.links().iter().any(|link| link.peer.node == y)))
    }

    /// Carry one message hop from `from` to `to` over an existing link.
    ///
    /// Both endpoints witness the hop record, stamped with the current
    /// clock, and then run a full trust exchange. Returns `Ok(false)`
    /// without side effects when the nodes are not linked.
    pub fn deliver_message(
        &mut self,
        message_id: &str,
        from: NodeAddress,
        to: NodeAddress,
    ) -> Result<bool> {
        if !self.linked(from, to)? {
            debug!(message_id, %from, %to, "transfer skipped, nodes not linked");
            return Ok(false);
        }
        let record = TransferRecord::new(message_id, self.clock.timestamp(), from, to);
        let (lower, higher) = self.pair_mut(from, to)?;
        lower.witness(record.clone());
        higher.witness(record);
        self.exchange_pair(from, to)?;
        info!(message_id, %from, %to, "message transferred");
        Ok(true)
    }

    /// Advance the world by one tick.
    ///
    /// Order within a tick: clock, movement, neighbor index updates,
    /// connectivity refresh, then router-driven transfers.
    pub fn step(&mut self) -> Result<()> {
        self.tick += 1;
        self.clock.advance();
        let dt = self.clock.tick_secs();
        for node in &mut self.nodes {
            node.poll_movement(dt);
        }
        for node in &self.nodes {
            for nic in node.interfaces() {
                self.index.update_location(nic.id(), node.location());
            }
        }
        gate::refresh(self)?;
        for transfer in self.router.deliverable(self.tick) {
            if self.deliver_message(&transfer.message_id, transfer.from, transfer.to)? {
                self.router.message_transferred(&transfer);
            }
        }
        Ok(())
    }

    /// Run `ticks` consecutive steps.
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}
