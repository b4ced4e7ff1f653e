//! Fuzz target for the observation table update path.
//!
//! Any record stream must preserve the counter invariants: counts tally
//! the roles seen so far and the ratio tracks the counters exactly.

#![no_main]

use std::collections::BTreeMap;

use libfuzzer_sys::fuzz_target;
use oppnet_core::{NodeAddress, TrustThresholds};
use oppnet_trust::{ObservationTable, TransferRecord};

fuzz_target!(|records: Vec<(u32, u32)>| {
    let mut table = ObservationTable::new(TrustThresholds::default());
    let mut forwards: BTreeMap<u32, u64> = BTreeMap::new();
    let mut receives: BTreeMap<u32, u64> = BTreeMap::new();

    for (i, (from, to)) in records.iter().enumerate() {
        let record = TransferRecord::new(
            format!("M{i}"),
            "00.00.00",
            NodeAddress(*from),
            NodeAddress(*to),
        );
        table.observe(&record);
        *forwards.entry(*from).or_default() += 1;
        *receives.entry(*to).or_default() += 1;
    }

    for (addr, obs) in table.iter() {
        let f = forwards.get(&addr.0).copied().unwrap_or(0);
        let r = receives.get(&addr.0).copied().unwrap_or(0);
        assert_eq!(obs.forward_count, f as f64);
        assert_eq!(obs.receive_count, r as f64);
        if r == 0 {
            assert_eq!(obs.ratio, f64::INFINITY);
        } else {
            assert_eq!(obs.ratio, obs.forward_count / obs.receive_count);
        }
    }
});
