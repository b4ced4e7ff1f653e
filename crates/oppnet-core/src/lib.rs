//! # oppnet-core
//!
//! Shared node and identity model for the oppnet DTN simulator.
//!
//! This crate provides:
//! - **NodeAddress**: dense integer node identity and its allocator
//! - **Coord**: 2D positions with Euclidean distance
//! - **SimClock**: discrete simulation time and low-resolution timestamps
//! - **SimConfig**: run-wide configuration (trust thresholds, radio)
//!
//! Everything here is deterministic and free of I/O; the higher layers
//! (`oppnet-trust`, `oppnet-sim`) build the trust protocol and the
//! connectivity machinery on top of these types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod addr;
pub mod config;
pub mod coord;
pub mod time;

pub use addr::{AddressAllocator, NodeAddress};
pub use config::{
    ConfigError, RadioConfig, SimConfig, SimConfigBuilder, TrustThresholds,
    DEFAULT_RATIO_THRESHOLD, DEFAULT_SUM_THRESHOLD,
};
pub use coord::Coord;
pub use time::SimClock;
