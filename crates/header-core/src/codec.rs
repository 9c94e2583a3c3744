//! Reader and writer for the 80-byte block header layout.
//!
//! Layout (all integers little-endian, hashes as raw bytes):
//!
//! ```text
//! offset  size  field
//! 0       4     version
//! 4       32    prev_block_id
//! 36      32    merkle_root
//! 68      4     time
//! 72      4     bits
//! 76      4     nonce
//! ```

use crate::consensus::{BLOCK_HEADER_SIZE, HASH_SIZE};
use crate::error::{HeaderError, Result};
use crate::header::BlockHeader;

/// Cursor over a byte slice.
///
/// A failed read leaves the position untouched.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    /// Current read position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Fail with `TruncatedInput` unless `needed` more bytes are available.
    pub fn require(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(HeaderError::TruncatedInput { needed, remaining });
        }
        Ok(())
    }

    /// Advance past `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.require(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array::<4>().map(u32::from_le_bytes)
    }
}

/// Decode one header from the reader's current position.
///
/// Exactly 80 bytes are consumed on success; nothing is consumed on failure.
pub fn decode(reader: &mut ByteReader<'_>) -> Result<BlockHeader> {
    reader.require(BLOCK_HEADER_SIZE)?;

    let version = reader.read_u32_le()?;
    let prev_block_id = reader.read_array::<HASH_SIZE>()?;
    let merkle_root = reader.read_array::<HASH_SIZE>()?;
    let time = reader.read_u32_le()?;
    let bits = reader.read_u32_le()?;
    let nonce = reader.read_u32_le()?;

    Ok(BlockHeader::new(
        version,
        prev_block_id,
        merkle_root,
        time,
        bits,
        nonce,
    ))
}

/// Append the 80-byte form of `header` to `out` and hand the sink back.
///
/// Returning the same sink lets callers keep appending, e.g. the transaction
/// list of a full block.
pub fn encode<'w>(header: &BlockHeader, out: &'w mut Vec<u8>) -> &'w mut Vec<u8> {
    out.reserve(BLOCK_HEADER_SIZE);
    out.extend_from_slice(&header.version().to_le_bytes());
    out.extend_from_slice(header.prev_block_id());
    out.extend_from_slice(header.merkle_root());
    out.extend_from_slice(&header.time().to_le_bytes());
    out.extend_from_slice(&header.bits().to_le_bytes());
    out.extend_from_slice(&header.nonce().to_le_bytes());
    out
}
