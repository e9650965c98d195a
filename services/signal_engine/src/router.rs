//! Instrument → shard routing
//!
//! CRC32 is used instead of `std`'s `DefaultHasher`, whose output is not
//! guaranteed across Rust releases. The hash is unsigned, so the modulo is
//! always a valid index.

/// Shard owning `instrument_id` among `shard_count` shards
///
/// `shard_count` of zero is treated as one.
pub fn shard_for(instrument_id: &str, shard_count: usize) -> usize {
    let hash = crc32fast::hash(instrument_id.as_bytes()) as usize;
    hash % shard_count.max(1)
}
