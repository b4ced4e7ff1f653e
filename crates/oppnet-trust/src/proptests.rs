//! Property-based tests for the trust subsystem.
//!
//! These tests verify the counting and merge invariants:
//!
//! - Forward/receive counters exactly tally observed roles
//! - The ratio invariant holds after any observation sequence
//! - Ledger deduplication is idempotent under re-recording
//! - The gossip merge always leaves both registries identical

use proptest::prelude::*;

use oppnet_core::{NodeAddress, TrustThresholds};

use crate::ledger::{synchronize, MessageLedger, TransferRecord};
use crate::observation::ObservationTable;
use crate::registry::{merge, merged_evidence, MaliciousRegistry};

/// A hop between two of a handful of addresses, with message ids drawn
/// from a small pool so duplicates actually occur.
fn arb_record() -> impl Strategy<Value = TransferRecord> {
    (0u32..8, 0u32..8, 0u32..16, 0u32..4).prop_map(|(from, to, msg, stamp)| {
        TransferRecord::new(
            format!("M{msg}"),
            format!("00.00.0{stamp}"),
            NodeAddress(from),
            NodeAddress(to),
        )
    })
}

fn arb_registry() -> impl Strategy<Value = MaliciousRegistry> {
    prop::collection::btree_map(0u32..16, -10i64..10, 0..8).prop_map(|entries| {
        let mut registry = MaliciousRegistry::new();
        for (addr, evidence) in entries {
            registry.insert(NodeAddress(addr), evidence);
        }
        registry
    })
}

proptest! {
    /// forward_count(k) equals exactly the number of observed records with
    /// k as source; receive_count(k) the number with k as destination.
    #[test]
    fn counters_tally_roles_exactly(records in prop::collection::vec(arb_record(), 0..64)) {
        // thresholds high enough that suspicion never interferes
        let mut table = ObservationTable::new(TrustThresholds {
            ratio_threshold: f64::MAX,
            sum_threshold: f64::MAX,
        });
        for record in &records {
            table.observe(record);
        }

        for (neighbor, obs) in table.iter() {
            let forwards = records.iter().filter(|r| r.from == neighbor).count();
            let receives = records.iter().filter(|r| r.to == neighbor).count();
            prop_assert_eq!(obs.forward_count, forwards as f64);
            prop_assert_eq!(obs.receive_count, receives as f64);
        }
    }

    /// ratio is +inf iff the neighbor was never a receiver (and appeared at
    /// all); ratio is 0 iff it was never a forwarder.
    #[test]
    fn ratio_invariant_holds(records in prop::collection::vec(arb_record(), 1..64)) {
        let mut table = ObservationTable::new(TrustThresholds::default());
        for record in &records {
            table.observe(record);
        }

        for (_, obs) in table.iter() {
            prop_assert!(obs.total() >= 1.0);
            if obs.receive_count == 0.0 {
                prop_assert!(obs.forward_count > 0.0);
                prop_assert_eq!(obs.ratio, f64::INFINITY);
            } else {
                prop_assert_eq!(obs.ratio, obs.forward_count / obs.receive_count);
            }
            if obs.forward_count == 0.0 {
                prop_assert_eq!(obs.ratio, 0.0);
            }
        }
    }

    /// Recording the same batch twice leaves the ledger unchanged, and the
    /// ledger size equals the number of distinct records.
    #[test]
    fn ledger_dedup_is_idempotent(records in prop::collection::vec(arb_record(), 0..64)) {
        let mut ledger = MessageLedger::new();
        for record in &records {
            ledger.record(record.clone());
        }
        let size = ledger.len();

        let distinct: std::collections::HashSet<_> = records.iter().collect();
        prop_assert_eq!(size, distinct.len());

        for record in &records {
            prop_assert!(!ledger.record(record.clone()));
        }
        prop_assert_eq!(ledger.len(), size);
    }

    /// After synchronization both ledgers hold the same record set, and
    /// each side accepted exactly the records it was missing.
    #[test]
    fn synchronize_reaches_agreement(
        left in prop::collection::vec(arb_record(), 0..32),
        right in prop::collection::vec(arb_record(), 0..32),
    ) {
        let mut a = MessageLedger::new();
        let mut b = MessageLedger::new();
        for record in &left { a.record(record.clone()); }
        for record in &right { b.record(record.clone()); }
        let a_before = a.len();
        let b_before = b.len();

        let (to_a, to_b) = synchronize(&mut a, &mut b);

        prop_assert_eq!(a.len(), a_before + to_a.len());
        prop_assert_eq!(b.len(), b_before + to_b.len());
        prop_assert_eq!(a.len(), b.len());
        for record in a.records() {
            prop_assert!(b.contains(record));
        }
    }

    /// The gossip merge leaves both sides identical, covering the key
    /// union, with unique entries copied and shared entries combined by
    /// the merge arithmetic.
    #[test]
    fn merge_agrees_on_both_sides(a0 in arb_registry(), b0 in arb_registry()) {
        let mut a = a0.clone();
        let mut b = b0.clone();
        merge(&mut a, &mut b);

        prop_assert_eq!(&a, &b);

        for (suspect, evidence) in a.iter() {
            let expected = match (a0.find(suspect), b0.find(suspect)) {
                (Some(ours), Some(theirs)) => merged_evidence(ours, theirs),
                (Some(ours), None) => ours,
                (None, Some(theirs)) => theirs,
                (None, None) => unreachable!("merged entry missing from both inputs"),
            };
            prop_assert_eq!(evidence, expected);
        }
        for suspect in a0.suspects().chain(b0.suspects()) {
            prop_assert!(a.contains(suspect));
        }
    }
}
