//! Network interfaces and the links between them.

use std::fmt;

use oppnet_core::{NodeAddress, RadioConfig};
use serde::{Deserialize, Serialize};

/// Identity of one network interface: its host plus the interface's
/// position in the host's interface list.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct InterfaceId {
    /// Address of the owning node.
    pub node: NodeAddress,
    /// Index into the owning node's interface list.
    pub index: usize,
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.index)
    }
}

/// An active link to a peer interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    /// The interface on the far side.
    pub peer: InterfaceId,
    /// Negotiated speed: the lower of the two interfaces' transmit speeds.
    pub speed: u32,
}

/// One radio on a node.
///
/// An interface is scanning by default (accepting new peers) and may hold
/// any number of simultaneous links on top of that; scanning and being
/// connected are not exclusive states.
#[derive(Clone, Debug)]
pub struct NetworkInterface {
    id: InterfaceId,
    radio: RadioConfig,
    scanning: bool,
    links: Vec<Link>,
}

impl NetworkInterface {
    /// Create an interface with the run's radio parameters.
    #[must_use]
    pub fn new(id: InterfaceId, radio: RadioConfig) -> Self {
        Self {
            id,
            radio,
            scanning: true,
            links: Vec::new(),
        }
    }

    /// This interface's identity.
    #[must_use]
    pub fn id(&self) -> InterfaceId {
        self.id
    }

    /// Transmit range in meters.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.radio.range
    }

    /// Transmit speed in bytes per second.
    #[must_use]
    pub fn transmit_speed(&self) -> u32 {
        self.radio.transmit_speed
    }

    /// Whether this interface accepts new peers.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Turn scanning on or off.
    pub fn set_scanning(&mut self, scanning: bool) {
        self.scanning = scanning;
    }

    /// Active links, in the order they were established.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Whether a link to `peer` is currently up.
    #[must_use]
    pub fn is_linked(&self, peer: InterfaceId) -> bool {
        self.links.iter().any(|link| link.peer == peer)
    }

    /// Establish a link. The caller is responsible for adding the mirror
    /// link on the peer interface.
    pub(crate) fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    /// Tear down the link to `peer`, if one is up. Returns whether a link
    /// was removed.
    pub(crate) fn remove_link(&mut self, peer: InterfaceId) -> bool {
        let before = self.links.len();
        self.links.retain(|link| link.peer != peer);
        self.links.len() != before
    }
}
