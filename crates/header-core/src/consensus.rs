//! Fixed consensus constants for the header format.

/// Size of a serialized block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Size of each hash field (previous block id, merkle root) in bytes.
pub const HASH_SIZE: usize = 32;

/// Offset of the header inside a raw block record.
///
/// Raw block records carry an 8-byte prefix (network magic and record size)
/// ahead of the header. The prefix is skipped, never interpreted.
pub const RAW_BLOCK_HEADER_OFFSET: usize = 8;

/// Maximum number of seconds a header timestamp may lie in the future.
pub const MAX_TIME_OFFSET: u64 = 2 * 60 * 60;

/// Compact bits of the difficulty-1 target (the genesis block's bits).
pub const DIFFICULTY_1_BITS: u32 = 0x1d00ffff;
