//! Local blacklist of suspected nodes and its pairwise gossip merge.

use std::collections::BTreeMap;

use oppnet_core::NodeAddress;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Evidence attached to a freshly detected suspect.
const INITIAL_EVIDENCE: i64 = 1;

/// A node's blacklist of suspected addresses.
///
/// Presence in the registry is itself the blacklist signal consulted by
/// the connectivity gate; the evidence count rides along through gossip
/// but has no further effect in this subsystem. Entries are never removed,
/// even if misbehavior ceases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaliciousRegistry {
    entries: BTreeMap<NodeAddress, i64>,
}

impl MaliciousRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `suspect` is blacklisted.
    #[must_use]
    pub fn contains(&self, suspect: NodeAddress) -> bool {
        self.entries.contains_key(&suspect)
    }

    /// Evidence recorded against `suspect`, if listed. Pure lookup with no
    /// side effect.
    #[must_use]
    pub fn find(&self, suspect: NodeAddress) -> Option<i64> {
        self.entries.get(&suspect).copied()
    }

    /// Explicitly add one unit of evidence against an already-listed
    /// suspect. Does nothing for an unlisted address.
    pub fn bump(&mut self, suspect: NodeAddress) {
        if let Some(evidence) = self.entries.get_mut(&suspect) {
            *evidence += 1;
        }
    }

    /// Adopt an entry reported by a peer, overwriting any existing
    /// evidence. Used by the gossip merge.
    pub fn insert(&mut self, suspect: NodeAddress, evidence: i64) {
        self.entries.insert(suspect, evidence);
    }

    /// Record a suspicion signal against `suspect`.
    ///
    /// A first detection inserts the address with evidence 1 and returns
    /// `true`. A repeat detection leaves the evidence unchanged and
    /// returns `false`; callers that genuinely want another unit of
    /// evidence use [`bump`](MaliciousRegistry::bump) explicitly.
    pub fn record_suspicion(&mut self, suspect: NodeAddress) -> bool {
        match self.find(suspect) {
            Some(_) => false,
            None => {
                self.entries.insert(suspect, INITIAL_EVIDENCE);
                info!(%suspect, "node blacklisted");
                true
            }
        }
    }

    /// Number of blacklisted addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the blacklist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blacklisted addresses in ascending order.
    pub fn suspects(&self) -> impl Iterator<Item = NodeAddress> + '_ {
        self.entries.keys().copied()
    }

    /// Iterate over `(suspect, evidence)` pairs in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeAddress, i64)> + '_ {
        self.entries.iter().map(|(addr, ev)| (*addr, *ev))
    }
}

/// Evidence resulting when both sides of a merge already list the same
/// suspect.
///
/// The constant 2 removes the double count produced by each side's own
/// initial self-detection. There is no floor and no decay: across many
/// repeated merges between the same pair the value can drift arbitrarily,
/// including negative. That drift is the contracted behavior; alternative
/// policies (max, capped sum, time-decayed evidence) would replace this
/// one function without touching the merge control flow.
#[must_use]
pub fn merged_evidence(ours: i64, theirs: i64) -> i64 {
    ours + theirs - 2
}

/// Pairwise gossip reconciliation of two blacklists, run on every
/// successful connection.
///
/// Entries unique to one side are copied to the other with their evidence
/// unchanged; entries present in both are set to
/// [`merged_evidence`] on both sides. The rules are applied to the
/// pre-merge tables, so afterwards both registries are identical
/// regardless of argument order.
pub fn merge(a: &mut MaliciousRegistry, b: &mut MaliciousRegistry) {
    if a.entries.is_empty() && b.entries.is_empty() {
        return;
    }

    let mut merged = BTreeMap::new();
    for (&suspect, &ours) in &a.entries {
        let evidence = match b.find(suspect) {
            Some(theirs) => merged_evidence(ours, theirs),
            None => ours,
        };
        merged.insert(suspect, evidence);
    }
    for (&suspect, &theirs) in &b.entries {
        merged.entry(suspect).or_insert(theirs);
    }

    debug!(
        ours = a.entries.len(),
        theirs = b.entries.len(),
        merged = merged.len(),
        "merged malicious registries"
    );

    a.entries = merged.clone();
    b.entries = merged;
}
