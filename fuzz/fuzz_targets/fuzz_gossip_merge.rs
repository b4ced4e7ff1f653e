//! Fuzz target for the malicious registry gossip merge.
//!
//! Feeds arbitrary pre-merge tables through `merge` and checks the
//! contracted outcome: both sides end identical, nobody loses an entry,
//! and shared entries carry the pre-merge arithmetic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use oppnet_core::NodeAddress;
use oppnet_trust::{merge, merged_evidence, MaliciousRegistry};

fuzz_target!(|input: (Vec<(u32, i32)>, Vec<(u32, i32)>)| {
    let (ours, theirs) = input;

    // i32 evidence keeps the merge arithmetic well inside i64 range
    let mut a = MaliciousRegistry::new();
    for (addr, evidence) in &ours {
        a.insert(NodeAddress(*addr), i64::from(*evidence));
    }
    let mut b = MaliciousRegistry::new();
    for (addr, evidence) in &theirs {
        b.insert(NodeAddress(*addr), i64::from(*evidence));
    }
    let pre_a = a.clone();
    let pre_b = b.clone();

    merge(&mut a, &mut b);

    // both sides agree after the merge
    assert_eq!(a, b);

    // nothing blacklisted beforehand is forgotten
    for suspect in pre_a.suspects().chain(pre_b.suspects()) {
        assert!(a.contains(suspect));
    }

    // evidence follows the pre-merge tables
    for (suspect, evidence) in a.iter() {
        let expected = match (pre_a.find(suspect), pre_b.find(suspect)) {
            (Some(x), Some(y)) => merged_evidence(x, y),
            (Some(x), None) | (None, Some(x)) => x,
            (None, None) => unreachable!("merge invented an entry"),
        };
        assert_eq!(evidence, expected);
    }
});
