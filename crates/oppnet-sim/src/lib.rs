//! # oppnet-sim
//!
//! Deterministic discrete-time driver for the oppnet trust core.
//!
//! This crate provides:
//! - **Node**: a simulated endpoint owning its interfaces and trust tables
//! - **Connectivity gate**: per-tick pruning and connection attempts,
//!   including the reputation-driven veto against blacklisted peers
//! - **World**: the tick driver wiring movement, connectivity, trust
//!   exchange and message delivery together
//! - Collaborator seams for the excluded components: movement model,
//!   spatial neighbor index, and message router, each with simple
//!   implementations for tests and demos
//!
//! ## Determinism
//!
//! Everything steps single-threaded in a fixed order: nodes in ascending
//! address order, interfaces in ascending index order, and in every
//! pairwise trust exchange the lower-address node evaluates first. Two
//! runs of the same scripted scenario produce identical final tables.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod gate;
pub mod iface;
pub mod index;
pub mod movement;
pub mod node;
pub mod router;
pub mod world;

pub use error::{Result, SimError};
pub use iface::{InterfaceId, Link, NetworkInterface};
pub use index::{NeighborIndex, RangeScanIndex};
pub use movement::{MovementModel, Scripted, Stationary};
pub use node::{exchange, Node};
pub use router::{MessageRouter, NullRouter, ScriptedRouter, Transfer};
pub use world::World;
