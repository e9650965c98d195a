//! Routing stability and spread

use proptest::prelude::*;
use signal_engine::shard_for;

#[test]
fn test_assignment_is_reasonably_uniform() {
    const SHARDS: usize = 8;
    const IDS: usize = 40_000;

    let mut counts = [0usize; SHARDS];
    for i in 0..IDS {
        // Exchange-style codes: 600000.SH, 000001.SZ, ...
        let suffix = if i % 2 == 0 { "SH" } else { "SZ" };
        let id = format!("{:06}.{}", i, suffix);
        counts[shard_for(&id, SHARDS)] += 1;
    }

    let expected = IDS / SHARDS;
    for (shard, count) in counts.iter().enumerate() {
        let deviation = (*count as f64 - expected as f64).abs() / expected as f64;
        assert!(
            deviation < 0.15,
            "shard {} got {} ids, expected about {}",
            shard,
            count,
            expected
        );
    }
}

#[test]
fn test_single_shard_takes_everything() {
    for id in ["600000", "AAPL", "BTC-USD", ""] {
        assert_eq!(shard_for(id, 1), 0);
    }
}

proptest! {
    #[test]
    fn prop_same_id_same_shard(id in "\\PC{0,24}", shards in 1usize..128) {
        let shard = shard_for(&id, shards);
        prop_assert!(shard < shards);
        for _ in 0..3 {
            prop_assert_eq!(shard_for(&id.clone(), shards), shard);
        }
    }
}
