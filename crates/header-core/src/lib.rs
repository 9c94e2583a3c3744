//! Block header parsing, hashing and proof-of-work validation.
//!
//! This crate provides pure Rust implementations of:
//! - Block header construction from raw bytes, JSON, or typed fields
//! - Serialization to the canonical 80-byte wire form
//! - SHA256 double-hashing for block ids
//! - Difficulty target decoding from compact "bits"
//! - Timestamp and proof-of-work checks with an injectable clock
//!
//! The crate always links `std`: JSON and error formatting need it. The
//! default `std` feature only forwards `sha2/std` and `hex/std` and enables
//! `SystemClock`. Building with `default-features = false` does not give a
//! `no_std` crate; it just leaves the wall clock out, so callers supply their
//! own [`Clock`].

pub mod clock;
pub mod codec;
pub mod consensus;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod header;

#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{Clock, FixedClock};
pub use codec::ByteReader;
pub use consensus::{BLOCK_HEADER_SIZE, MAX_TIME_OFFSET, RAW_BLOCK_HEADER_OFFSET};
pub use difficulty::{bits_to_target, meets_target, Target};
pub use error::{HeaderError, Result};
pub use hash::double_sha256;
pub use header::{BlockHeader, HeaderFields, HeaderInput, HeaderJson};
