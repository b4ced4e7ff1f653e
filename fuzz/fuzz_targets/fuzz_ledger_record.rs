//! Fuzz target for ledger recording and pairwise synchronization.
//!
//! Arbitrary record streams must leave the dedup index consistent with
//! the record list, and synchronizing two ledgers must make them agree.

#![no_main]

use libfuzzer_sys::fuzz_target;
use oppnet_core::NodeAddress;
use oppnet_trust::{synchronize, MessageLedger, TransferRecord};

fn build(records: &[(String, String, u32, u32)]) -> MessageLedger {
    let mut ledger = MessageLedger::new();
    for (id, stamp, from, to) in records {
        let record = TransferRecord::new(id.clone(), stamp.clone(), NodeAddress(*from), NodeAddress(*to));
        let fresh = !ledger.contains(&record);
        let accepted = ledger.record(record);
        // record() accepts exactly the records not yet present
        assert_eq!(fresh, accepted);
    }
    ledger
}

fuzz_target!(|input: (Vec<(String, String, u32, u32)>, Vec<(String, String, u32, u32)>)| {
    let (ours, theirs) = input;

    let mut a = build(&ours);
    let mut b = build(&theirs);

    let total_a = a.records().len();
    let total_b = b.records().len();

    let (new_for_a, new_for_b) = synchronize(&mut a, &mut b);

    // agreement: same set of records on both sides
    assert_eq!(a.records().len(), b.records().len());
    for record in a.records() {
        assert!(b.contains(record));
    }

    // each side grew by exactly what it reported importing
    assert_eq!(a.records().len(), total_a + new_for_a.len());
    assert_eq!(b.records().len(), total_b + new_for_b.len());

    // a second synchronization is a no-op
    let (again_a, again_b) = synchronize(&mut a, &mut b);
    assert!(again_a.is_empty());
    assert!(again_b.is_empty());
});
