//! Difficulty target decoding.
//!
//! The compact "bits" format is `[exponent (1 byte)][mantissa (3 bytes)]` and
//! encodes `target = mantissa * 256^(exponent - 3)`. A full-range exponent
//! pushes the target far past 256 bits, so targets are held in a 2048-bit
//! integer: the largest encodable value needs 24 + 8 * 252 = 2040 bits.

use core::fmt;

use crate::consensus::DIFFICULTY_1_BITS;

uint::construct_uint! {
    /// Unsigned 2048-bit integer (32 x 64-bit words, little-endian).
    pub struct U2048(32);
}

/// A proof-of-work target decoded from compact bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Target(U2048);

impl Target {
    /// Interpret 32 bytes as a big-endian integer.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        Target(U2048::from_big_endian(bytes))
    }

    /// The underlying integer.
    pub fn as_uint(&self) -> &U2048 {
        &self.0
    }

    /// Number of significant bits.
    pub fn bit_len(&self) -> usize {
        self.0.bits()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The target as 32 big-endian bytes, or `None` if it needs more than 256 bits.
    pub fn to_be_bytes_32(&self) -> Option<[u8; 32]> {
        if self.bit_len() > 256 {
            return None;
        }
        let mut wide = [0u8; 256];
        self.0.to_big_endian(&mut wide);
        let mut out = [0u8; 32];
        out.copy_from_slice(&wide[224..]);
        Some(out)
    }
}

impl fmt::LowerHex for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Decode compact "bits" into a target.
///
/// `mantissa` is the low three bytes taken as-is. When `exponent <= 3` the
/// mantissa is the target unchanged; otherwise it is shifted left by
/// `8 * (exponent - 3)` bits.
pub fn bits_to_target(bits: u32) -> Target {
    let exponent = bits >> 24;
    let mantissa = U2048::from(bits & 0x00ff_ffff);

    if exponent <= 3 {
        return Target(mantissa);
    }

    Target(mantissa << (8 * (exponent - 3)))
}

/// Check a display-order identifier against a target.
///
/// The identifier is read as a big-endian integer and must not exceed the
/// target.
#[inline]
pub fn meets_target(id: &[u8; 32], target: &Target) -> bool {
    Target::from_be_bytes(id) <= *target
}

/// Difficulty of `bits` relative to the difficulty-1 target.
///
/// The ratio is computed in integers scaled by 10^8, giving eight decimal
/// places before the final float conversion.
pub fn difficulty(bits: u32) -> f64 {
    const SCALE: u64 = 100_000_000;

    let current = bits_to_target(bits);
    if current.is_zero() {
        return f64::INFINITY;
    }

    let genesis = bits_to_target(DIFFICULTY_1_BITS);
    let scaled = genesis.0 * U2048::from(SCALE) / current.0;

    uint_to_f64(&scaled) / SCALE as f64
}

/// Approximate a wide integer as f64 from its top 64 bits.
fn uint_to_f64(value: &U2048) -> f64 {
    let bits = value.bits();
    if bits <= 64 {
        return value.low_u64() as f64;
    }
    let shift = bits - 64;
    let top = (*value >> shift).low_u64() as f64;
    top * 2f64.powi(shift as i32)
}
