//! # oppnet-trust
//!
//! Trust-based misbehavior detection for opportunistic networks.
//!
//! This crate provides:
//! - **MessageLedger**: append-only record of observed hop transfers,
//!   synchronized pairwise on every encounter
//! - **ObservationTable**: per-neighbor forward/receive counters and their
//!   ratio, updated incrementally as ledger records arrive
//! - **MaliciousRegistry**: the local blacklist of suspect addresses,
//!   reconciled with every encountered peer via a gossip merge
//!
//! ## Detection rule
//!
//! A neighbor whose forwarding activity is disproportionately larger than
//! its receiving activity is treated as anomalous once enough observations
//! accumulate: `ratio > ratio_threshold && forward + receive > sum_threshold`.
//!
//! None of the operations here fail: a neighbor not yet known or an
//! address not yet blacklisted is a normal first-encounter case, surfaced
//! as `Option::None` rather than an error.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ledger;
pub mod observation;
pub mod registry;

pub use ledger::{synchronize, MessageLedger, TransferRecord};
pub use observation::{Observation, ObservationTable};
pub use registry::{merge, merged_evidence, MaliciousRegistry};

#[cfg(test)]
mod proptests;
