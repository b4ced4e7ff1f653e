//! Error types for the simulation driver.
//!
//! The trust tables themselves never fail; a neighbor not yet known or an
//! address not yet blacklisted is a normal first-encounter case. The
//! errors here all indicate a broken simulation invariant (an identity
//! that resolves to no live node) or a rejected configuration, and
//! callers are expected to treat the former as fatal.

use thiserror::Error;

use oppnet_core::{ConfigError, NodeAddress};

use crate::iface::InterfaceId;

/// Errors raised by the simulation driver.
#[derive(Error, Debug)]
pub enum SimError {
    /// A connection or transfer referenced a node address that resolves
    /// to no live node. This is fatal: the simulation's identity
    /// invariant is broken.
    #[error("no node with address {0}")]
    UnknownAddress(NodeAddress),

    /// An interface id referenced an interface its host does not have.
    #[error("no interface {0}")]
    UnknownInterface(InterfaceId),

    /// A pairwise exchange was requested between a node and itself.
    #[error("pairwise exchange of node {0} with itself")]
    SelfEncounter(NodeAddress),

    /// The run configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
