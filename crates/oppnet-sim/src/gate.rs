//! Connectivity gate: per-tick link maintenance with the trust veto.
//!
//! Every refresh walks interfaces in ascending order and, for each one,
//! first prunes links whose peer has moved out of range or landed on the
//! host's blacklist, then attempts connections to interfaces the neighbor
//! index reports newly in range. The veto lives in the prune phase, not in
//! [`try_connect`]: a peer blacklisted only through gossip received during
//! the connect handshake still gets its link torn down on the next
//! refresh.

use tracing::info;

use crate::error::{Result, SimError};
use crate::iface::{InterfaceId, Link};
use crate::world::World;

/// Refresh every interface's links for the current tick.
///
/// Interfaces are visited in ascending `(node, index)` order so a given
/// world state always produces the same sequence of connect and
/// disconnect events.
pub fn refresh(world: &mut World) -> Result<()> {
    for address in world.addresses() {
        let interface_count = world.node(address)?.interfaces().len();
        for index in 0..interface_count {
            refresh_interface(world, InterfaceId { node: address, index })?;
        }
    }
    Ok(())
}

fn refresh_interface(world: &mut World, iface: InterfaceId) -> Result<()> {
    let host = world.node(iface.node)?;
    let host_active = host.is_active();
    let origin = host.location();
    let nic = host
        .interface(iface.index)
        .ok_or(SimError::UnknownInterface(iface))?;
    let range = nic.range();

    let mut to_drop = Vec::new();
    for link in nic.links() {
        let peer_node = world.node(link.peer.node)?;
        let out_of_range = origin.distance(&peer_node.location()) > range;
        let vetoed = host.registry().contains(link.peer.node);
        if !host_active || !peer_node.is_active() || out_of_range || vetoed {
            to_drop.push((link.peer, vetoed));
        }
    }
    for (peer, vetoed) in to_drop {
        disconnect(world, iface, peer)?;
        if vetoed {
            info!(local = %iface, %peer, "link vetoed by blacklist");
        }
    }

    if !host_active {
        return Ok(());
    }
    for candidate in world.index.nearby(iface, range) {
        if try_connect(world, iface, candidate)? {
            continue;
        }
        // a candidate blocked transiently (peer not scanning, inactive)
        // must not have its entry event consumed, or two stationary
        // in-range nodes would stay unlinked after the peer recovers
        if retry_later(world, iface, candidate)? {
            world.index.forget(iface, candidate);
        }
    }
    Ok(())
}

/// Whether a failed connect attempt toward `b` should be retried on a
/// later refresh. Linked and vetoed candidates are settled; anything
/// else failed for a condition that can clear on its own.
fn retry_later(world: &World, a: InterfaceId, b: InterfaceId) -> Result<bool> {
    if a == b || a.node == b.node {
        return Ok(false);
    }
    let host = world.node(a.node)?;
    let nic = host
        .interface(a.index)
        .ok_or(SimError::UnknownInterface(a))?;
    Ok(!nic.is_linked(b) && !host.registry().contains(b.node))
}

/// Attempt to establish a link from `a` to `b`.
///
/// Returns `Ok(false)` when the pair is ineligible (same node, inactive,
/// not scanning, out of the initiator's range, or already linked). On
/// success both interfaces gain a mirrored link at the slower of the two
/// transmit speeds and the nodes run a trust exchange before the router
/// hears about the connection.
pub fn try_connect(world: &mut World, a: InterfaceId, b: InterfaceId) -> Result<bool> {
    if a == b || a.node == b.node {
        return Ok(false);
    }

    let host = world.node(a.node)?;
    let peer = world.node(b.node)?;
    let nic_a = host
        .interface(a.index)
        .ok_or(SimError::UnknownInterface(a))?;
    let nic_b = peer
        .interface(b.index)
        .ok_or(SimError::UnknownInterface(b))?;
    if !host.is_active() || !peer.is_active() {
        return Ok(false);
    }
    if !nic_a.is_scanning() || !nic_b.is_scanning() {
        return Ok(false);
    }
    if nic_a.is_linked(b) {
        return Ok(false);
    }
    if host.location().distance(&peer.location()) > nic_a.range() {
        return Ok(false);
    }
    let speed = nic_a.transmit_speed().min(nic_b.transmit_speed());

    link_one_side(world, a, Link { peer: b, speed })?;
    link_one_side(world, b, Link { peer: a, speed })?;
    world.exchange_pair(a.node, b.node)?;
    world.router.connection_up(a, b);
    world.router.connection_up(b, a);
    info!(local = %a, peer = %b, speed, "link established");
    Ok(true)
}

fn link_one_side(world: &mut World, iface: InterfaceId, link: Link) -> Result<()> {
    world
        .node_mut(iface.node)?
        .interface_mut(iface.index)
        .ok_or(SimError::UnknownInterface(iface))?
        .add_link(link);
    Ok(())
}

/// Tear down the link between `a` and `b` on both sides.
pub(crate) fn disconnect(world: &mut World, a: InterfaceId, b: InterfaceId) -> Result<()> {
    let removed_a = world
        .node_mut(a.node)?
        .interface_mut(a.index)
        .ok_or(SimError::UnknownInterface(a))?
        .remove_link(b);
    let removed_b = world
        .node_mut(b.node)?
        .interface_mut(b.index)
        .ok_or(SimError::UnknownInterface(b))?
        .remove_link(a);
    if removed_a || removed_b {
        world.router.connection_down(a, b);
        world.router.connection_down(b, a);
        info!(local = %a, peer = %b, "link torn down");
    }
    Ok(())
}
