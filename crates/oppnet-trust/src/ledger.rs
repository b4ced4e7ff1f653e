//! Append-only ledger of observed hop transfers.

use std::collections::HashSet;

use oppnet_core::NodeAddress;
use serde::{Deserialize, Serialize};

/// One observed hop transfer between two directly connected nodes.
///
/// Nodes are referenced by address only; a record never owns or borrows
/// the node objects themselves. Equality is field-wise over the whole
/// tuple, which is what the ledger's duplicate suppression keys on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Identifier of the transferred message.
    pub message_id: String,
    /// Low-resolution stamp (`HH.MM.SS`) taken when the hop was observed.
    /// Fast successive events may carry equal stamps; that is tolerated.
    pub timestamp: String,
    /// Node observed acting as forwarder.
    pub from: NodeAddress,
    /// Node observed acting as receiver.
    pub to: NodeAddress,
}

impl TransferRecord {
    /// Create a record of one hop transfer.
    pub fn new(
        message_id: impl Into<String>,
        timestamp: impl Into<String>,
        from: NodeAddress,
        to: NodeAddress,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            timestamp: timestamp.into(),
            from,
            to,
        }
    }
}

/// A node's append-only record of hop transfers, directly observed or
/// received via gossip.
///
/// Records are never expired or capped: the ledger grows monotonically
/// with the number of distinct hop events ever observed. Retention or
/// eviction policies would be added behind this type without changing any
/// call site.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TransferRecord>", into = "Vec<TransferRecord>")]
pub struct MessageLedger {
    records: Vec<TransferRecord>,
    // value-equality index over `records`, kept in sync by `record`
    seen: HashSet<TransferRecord>,
}

impl MessageLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded transfers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a field-equal record is already present.
    #[must_use]
    pub fn contains(&self, record: &TransferRecord) -> bool {
        self.seen.contains(record)
    }

    /// Append a record unless a field-equal one is already present.
    ///
    /// Returns `true` if the record was newly appended. Duplicate
    /// suppression compares every field by value, never object identity.
    pub fn record(&mut self, record: TransferRecord) -> bool {
        if self.seen.contains(&record) {
            return false;
        }
        self.seen.insert(record.clone());
        self.records.push(record);
        true
    }

    /// All records in append order.
    #[must_use]
    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    /// Records ordered newest-first by timestamp stamp.
    ///
    /// Equal stamps keep their append order. This is a view; the ledger
    /// itself stays in append order.
    #[must_use]
    pub fn records_by_time(&self) -> Vec<&TransferRecord> {
        let mut view: Vec<&TransferRecord> = self.records.iter().collect();
        view.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        view
    }
}

impl From<Vec<TransferRecord>> for MessageLedger {
    fn from(records: Vec<TransferRecord>) -> Self {
        let mut ledger = MessageLedger::new();
        for record in records {
            ledger.record(record);
        }
        ledger
    }
}

impl From<MessageLedger> for Vec<TransferRecord> {
    fn from(ledger: MessageLedger) -> Self {
        ledger.records
    }
}

/// Pairwise ledger synchronization, run in both directions on every
/// encounter.
///
/// Every record of `b` missing from `a` is appended to `a`, then
/// symmetrically for `b` using `a`'s records. Returns the records newly
/// accepted by each side, in the order they were appended, so the caller
/// can feed each one through the reputation engine exactly once.
pub fn synchronize(
    a: &mut MessageLedger,
    b: &mut MessageLedger,
) -> (Vec<TransferRecord>, Vec<TransferRecord>) {
    let accepted_by_a: Vec<TransferRecord> = b
        .records
        .iter()
        .filter(|r| !a.contains(r))
        .cloned()
        .collect();
    for record in &accepted_by_a {
        a.record(record.clone());
    }

    let accepted_by_b: Vec<TransferRecord> = a
        .records
        .iter()
        .filter(|r| !b.contains(r))
        .cloned()
        .collect();
    for record in &accepted_by_b {
        b.record(record.clone());
    }

    (accepted_by_a, accepted_by_b)
}
