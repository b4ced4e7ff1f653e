//! Per-neighbor forward/receive counters, the raw reputation signal.

use std::collections::BTreeMap;

use oppnet_core::{NodeAddress, TrustThresholds};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::TransferRecord;

/// Forward/receive counters for one known neighbor.
///
/// Invariant: `ratio == f64::INFINITY` exactly when `receive_count == 0`;
/// otherwise `ratio == forward_count / receive_count` (so a neighbor never
/// seen forwarding has ratio zero). Entries are created on first sighting
/// in either role and only ever mutated in place; both roles accumulate in
/// the same entry over time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Times this neighbor was observed as a forwarder.
    pub forward_count: f64,
    /// Times this neighbor was observed as a receiver.
    pub receive_count: f64,
    /// `forward_count / receive_count`, or `+inf` when `receive_count` is zero.
    pub ratio: f64,
}

impl Observation {
    fn first_forward() -> Self {
        Self {
            forward_count: 1.0,
            receive_count: 0.0,
            ratio: f64::INFINITY,
        }
    }

    fn first_receive() -> Self {
        Self {
            forward_count: 0.0,
            receive_count: 1.0,
            ratio: 0.0,
        }
    }

    /// Total number of observations in either role.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.forward_count + self.receive_count
    }

    fn recompute_ratio(&mut self) {
        self.ratio = if self.receive_count == 0.0 {
            f64::INFINITY
        } else {
            self.forward_count / self.receive_count
        };
    }

    fn is_suspect(&self, thresholds: &TrustThresholds) -> bool {
        self.ratio > thresholds.ratio_threshold && self.total() > thresholds.sum_threshold
    }
}

/// A node's table of per-neighbor observations.
///
/// Updates are incremental: [`observe`](ObservationTable::observe) must be
/// called exactly once per ledger record the node newly accepts, gossiped
/// records included. The table never recomputes itself from the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    thresholds: TrustThresholds,
    entries: BTreeMap<NodeAddress, Observation>,
}

impl ObservationTable {
    /// Create an empty table with the run's suspicion thresholds.
    #[must_use]
    pub fn new(thresholds: TrustThresholds) -> Self {
        Self {
            thresholds,
            entries: BTreeMap::new(),
        }
    }

    /// The thresholds this table was constructed with.
    #[must_use]
    pub fn thresholds(&self) -> &TrustThresholds {
        &self.thresholds
    }

    /// Observation entry for a neighbor, if one exists yet.
    #[must_use]
    pub fn get(&self, neighbor: NodeAddress) -> Option<&Observation> {
        self.entries.get(&neighbor)
    }

    /// Number of known neighbors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no neighbor has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over neighbors in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeAddress, &Observation)> {
        self.entries.iter().map(|(addr, obs)| (*addr, obs))
    }

    /// Process one newly accepted ledger record.
    ///
    /// Increments the forwarder count for `record.from` and the receiver
    /// count for `record.to`, creating entries lazily, and recomputes each
    /// touched ratio. Returns the addresses whose updated entry crossed
    /// the suspicion thresholds, in the order they were updated; the
    /// caller records each into its malicious registry.
    pub fn observe(&mut self, record: &TransferRecord) -> Vec<NodeAddress> {
        let mut suspects = Vec::new();

        let forwarder = self
            .entries
            .entry(record.from)
            .and_modify(|obs| {
                obs.forward_count += 1.0;
                obs.recompute_ratio();
            })
            .or_insert_with(Observation::first_forward);
        if forwarder.is_suspect(&self.thresholds) {
            debug!(
                neighbor = %record.from,
                ratio = forwarder.ratio,
                total = forwarder.total(),
                "neighbor crossed suspicion thresholds as forwarder"
            );
            suspects.push(record.from);
        }

        let receiver = self
            .entries
            .entry(record.to)
            .and_modify(|obs| {
                obs.receive_count += 1.0;
                obs.recompute_ratio();
            })
            .or_insert_with(Observation::first_receive);
        if receiver.is_suspect(&self.thresholds) {
            debug!(
                neighbor = %record.to,
                ratio = receiver.ratio,
                total = receiver.total(),
                "neighbor crossed suspicion thresholds as receiver"
            );
            suspects.push(record.to);
        }

        suspects
    }
}
