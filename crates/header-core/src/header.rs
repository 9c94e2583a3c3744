//! Block header construction, serialization and validation.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;
use crate::codec::{self, ByteReader};
use crate::consensus::{BLOCK_HEADER_SIZE, MAX_TIME_OFFSET, RAW_BLOCK_HEADER_OFFSET};
use crate::difficulty::{self, bits_to_target, meets_target, Target};
use crate::error::{HeaderError, Result};
use crate::hash::{double_sha256, hash_to_display_hex, reverse_bytes};

/// A block header (80 bytes on the wire).
///
/// Immutable once built; hash, id and target are recomputed from the fields
/// on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHeader {
    version: u32,
    prev_block_id: [u8; 32],
    merkle_root: [u8; 32],
    time: u32,
    bits: u32,
    nonce: u32,
}

/// The JSON form of a header.
///
/// Hash fields are hex of the raw (internal order) bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderJson {
    pub version: u32,
    pub prevblockidbuf: String,
    pub merklerootbuf: String,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

/// Header fields supplied directly by the caller.
///
/// Hash fields are raw bytes and must be exactly 32 long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub version: u32,
    pub prev_block_id: Vec<u8>,
    pub merkle_root: Vec<u8>,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

/// The input shapes a header can be built from.
#[derive(Debug, Clone)]
pub enum HeaderInput<'a> {
    /// A bare 80-byte header.
    RawBytes(&'a [u8]),
    /// A raw block record: 8-byte prefix followed by the header.
    RawBlock(&'a [u8]),
    /// JSON text of the [`HeaderJson`] shape.
    JsonText(&'a str),
    /// An already-parsed JSON value.
    Json(&'a Value),
    /// Fields carried as-is.
    Fields(HeaderFields),
}

impl BlockHeader {
    /// Create a header from typed fields.
    pub fn new(
        version: u32,
        prev_block_id: [u8; 32],
        merkle_root: [u8; 32],
        time: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        BlockHeader {
            version,
            prev_block_id,
            merkle_root,
            time,
            bits,
            nonce,
        }
    }

    /// Build a header from any supported input shape.
    pub fn from_input(input: HeaderInput<'_>) -> Result<Self> {
        match input {
            HeaderInput::RawBytes(bytes) => Self::from_bytes(bytes),
            HeaderInput::RawBlock(bytes) => Self::from_raw_block(bytes),
            HeaderInput::JsonText(text) => Self::from_json_str(text),
            HeaderInput::Json(value) => Self::from_json_value(value),
            HeaderInput::Fields(fields) => Self::try_from(fields),
        }
    }

    /// Decode a header from the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode(&mut ByteReader::new(bytes))
    }

    /// Decode the header embedded in a raw block record.
    pub fn from_raw_block(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        reader.skip(RAW_BLOCK_HEADER_OFFSET)?;
        codec::decode(&mut reader)
    }

    /// Decode a header at the reader's position, advancing it by 80 bytes.
    pub fn from_reader(reader: &mut ByteReader<'_>) -> Result<Self> {
        codec::decode(reader)
    }

    /// Decode a header from the hex of its 80-byte form.
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| HeaderError::invalid(format!("header hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Parse a header from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| HeaderError::invalid(format!("not valid JSON: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Build a header from a parsed JSON object.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(HeaderError::invalid(format!(
                "expected a JSON object, got {}",
                json_kind(value)
            )));
        }
        let json = HeaderJson::deserialize(value)
            .map_err(|e| HeaderError::invalid(format!("header JSON: {}", e)))?;
        Self::try_from(json)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Previous block id in internal byte order.
    pub fn prev_block_id(&self) -> &[u8; 32] {
        &self.prev_block_id
    }

    pub fn merkle_root(&self) -> &[u8; 32] {
        &self.merkle_root
    }

    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// Serialize the header to 80 bytes.
    pub fn to_bytes(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE);
        codec::encode(self, &mut out);

        let mut header = [0u8; BLOCK_HEADER_SIZE];
        header.copy_from_slice(&out);
        header
    }

    /// Serialize the header into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_HEADER_SIZE);
        codec::encode(self, &mut out);
        out
    }

    /// Append the header to `out`, returning the same sink.
    pub fn encode_into<'w>(&self, out: &'w mut Vec<u8>) -> &'w mut Vec<u8> {
        codec::encode(self, out)
    }

    /// Double SHA256 of the header, internal byte order.
    pub fn hash(&self) -> [u8; 32] {
        double_sha256(&self.to_bytes())
    }

    /// Block id: the hash in display byte order.
    pub fn id(&self) -> [u8; 32] {
        reverse_bytes(&self.hash())
    }

    /// Block id as lowercase hex.
    pub fn id_hex(&self) -> String {
        hash_to_display_hex(&self.hash())
    }

    /// Target decoded from the header's bits.
    pub fn target(&self) -> Target {
        bits_to_target(self.bits)
    }

    /// Difficulty relative to the difficulty-1 target.
    pub fn difficulty(&self) -> f64 {
        difficulty::difficulty(self.bits)
    }

    /// True unless the timestamp is more than two hours ahead of `clock`.
    pub fn timestamp_is_plausible<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        u64::from(self.time) <= clock.now().saturating_add(MAX_TIME_OFFSET)
    }

    /// True if the block id, read as a big-endian integer, does not exceed the target.
    pub fn satisfies_proof_of_work(&self) -> bool {
        meets_target(&self.id(), &self.target())
    }

    /// The JSON form of the header.
    pub fn to_json(&self) -> HeaderJson {
        HeaderJson {
            version: self.version,
            prevblockidbuf: hex::encode(self.prev_block_id),
            merklerootbuf: hex::encode(self.merkle_root),
            time: self.time,
            bits: self.bits,
            nonce: self.nonce,
        }
    }

    /// The JSON form as a `serde_json::Value`.
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.to_json())
    }

    /// Compact JSON text with keys in wire order.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_json())
    }
}

impl TryFrom<HeaderFields> for BlockHeader {
    type Error = HeaderError;

    fn try_from(fields: HeaderFields) -> Result<Self> {
        Ok(BlockHeader::new(
            fields.version,
            hash_field("prev_block_id", &fields.prev_block_id)?,
            hash_field("merkle_root", &fields.merkle_root)?,
            fields.time,
            fields.bits,
            fields.nonce,
        ))
    }
}

impl TryFrom<HeaderJson> for BlockHeader {
    type Error = HeaderError;

    fn try_from(json: HeaderJson) -> Result<Self> {
        Ok(BlockHeader::new(
            json.version,
            hex_hash_field("prevblockidbuf", &json.prevblockidbuf)?,
            hex_hash_field("merklerootbuf", &json.merklerootbuf)?,
            json.time,
            json.bits,
            json.nonce,
        ))
    }
}

impl From<&BlockHeader> for HeaderJson {
    fn from(header: &BlockHeader) -> Self {
        header.to_json()
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

impl FromStr for BlockHeader {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self> {
        BlockHeader::from_hex(s)
    }
}

fn hash_field(field: &'static str, bytes: &[u8]) -> Result<[u8; 32]> {
    <[u8; 32]>::try_from(bytes).map_err(|_| HeaderError::MalformedField {
        field,
        len: bytes.len(),
    })
}

fn hex_hash_field(field: &'static str, text: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(text)
        .map_err(|e| HeaderError::invalid(format!("{}: {}", field, e)))?;
    hash_field(field, &bytes)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const PREV_HEX: &str = "1212121212121212121212121212121212121212121212121212121212121212";
    const MERKLE_HEX: &str = "3434343434343434343434343434343434343434343434343434343434343434";

    fn sample_header() -> BlockHeader {
        BlockHeader::new(0x2000_0000, [0x12; 32], [0x34; 32], 1_700_000_000, 0x1703_4219, 0xDEAD_BEEF)
    }

    fn sample_json() -> Value {
        serde_json::json!({
            "version": 0x2000_0000u32,
            "prevblockidbuf": PREV_HEX,
            "merklerootbuf": MERKLE_HEX,
            "time": 1_700_000_000u32,
            "bits": 0x1703_4219u32,
            "nonce": 0xDEAD_BEEFu32,
        })
    }

    #[test]
    fn test_block_header_serialization() {
        let serialized = sample_header().to_bytes();

        assert_eq!(serialized.len(), 80);

        // Version (0x20000000 in little-endian)
        assert_eq!(&serialized[0..4], &[0x00, 0x00, 0x00, 0x20]);
        assert_eq!(&serialized[4..36], &[0x12; 32]);
        assert_eq!(&serialized[36..68], &[0x34; 32]);
        // Nonce (0xDEADBEEF in little-endian)
        assert_eq!(&serialized[76..80], &[0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let header = sample_header();
        let bytes = header.to_bytes();
        let decoded = BlockHeader::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(decoded.to_bytes(), bytes);
        assert_eq!(header.to_vec(), bytes.to_vec());
    }

    #[test]
    fn test_encode_into_appends() {
        let header = sample_header();
        let mut block = vec![0xF9, 0xBE];
        header.encode_into(&mut block).push(0x00);

        assert_eq!(block.len(), 83);
        assert_eq!(&block[2..82], &header.to_bytes()[..]);
    }

    #[test]
    fn test_from_raw_block() {
        let header = sample_header();
        let mut record = vec![0xF9, 0xBE, 0xB4, 0xD9, 0x51, 0x00, 0x00, 0x00];
        header.encode_into(&mut record).push(0x00);

        assert_eq!(BlockHeader::from_raw_block(&record).unwrap(), header);
        assert_eq!(
            BlockHeader::from_input(HeaderInput::RawBlock(&record)).unwrap(),
            header
        );
    }

    #[test]
    fn test_from_raw_block_truncated() {
        let header = sample_header();
        let mut record = vec![0u8; 8];
        header.encode_into(&mut record);
        record.truncate(60);

        assert_eq!(
            BlockHeader::from_raw_block(&record),
            Err(HeaderError::TruncatedInput { needed: 80, remaining: 52 })
        );
        assert_eq!(
            BlockHeader::from_raw_block(&[0u8; 4]),
            Err(HeaderError::TruncatedInput { needed: 8, remaining: 4 })
        );
    }

    #[test]
    fn test_from_reader_leaves_position() {
        let header = sample_header();
        let mut stream = Vec::new();
        header.encode_into(&mut stream);
        header.encode_into(&mut stream);

        let mut reader = ByteReader::new(&stream);
        assert_eq!(BlockHeader::from_reader(&mut reader).unwrap(), header);
        assert_eq!(reader.position(), 80);
        assert_eq!(BlockHeader::from_reader(&mut reader).unwrap(), header);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_identifier_is_reversed_hash() {
        let header = sample_header();
        let hash = header.hash();
        let id = header.id();

        let mut reversed = hash;
        reversed.reverse();
        assert_eq!(id, reversed);
        assert_eq!(header.id_hex(), hex::encode(id));
        assert_eq!(hash, double_sha256(&header.to_bytes()));
    }

    #[test]
    fn test_hash_tracks_fields() {
        let a = sample_header();
        let b = BlockHeader::new(a.version(), *a.prev_block_id(), *a.merkle_root(), a.time(), a.bits(), a.nonce() + 1);
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.hash(), a.hash());
    }

    #[test]
    fn test_id_hex_is_display_order() {
        let header = sample_header();
        assert_eq!(header.id_hex(), hash_to_display_hex(&header.hash()));
        assert_eq!(header.id_hex(), hex::encode(header.id()));
    }

    #[test]
    fn test_timestamp_boundary() {
        let now = 1_700_000_000u64;
        let clock = FixedClock(now);

        let at_limit = BlockHeader::new(1, [0; 32], [0; 32], (now + 7200) as u32, 0x1d00ffff, 0);
        let past_limit = BlockHeader::new(1, [0; 32], [0; 32], (now + 7201) as u32, 0x1d00ffff, 0);
        let in_past = BlockHeader::new(1, [0; 32], [0; 32], 0, 0x1d00ffff, 0);

        assert!(at_limit.timestamp_is_plausible(&clock));
        assert!(!past_limit.timestamp_is_plausible(&clock));
        assert!(in_past.timestamp_is_plausible(&clock));
    }

    #[test]
    fn test_timestamp_with_closure_clock() {
        let header = BlockHeader::new(1, [0; 32], [0; 32], u32::MAX, 0x1d00ffff, 0);
        assert!(header.timestamp_is_plausible(&|| u64::from(u32::MAX) - 7200));
        assert!(!header.timestamp_is_plausible(&|| u64::from(u32::MAX) - 7201));
        assert!(header.timestamp_is_plausible(&|| u64::MAX));
    }

    #[test]
    fn test_proof_of_work_extremes() {
        // Max-exponent bits decode to a target above every 256-bit id
        let easy = BlockHeader::new(1, [0; 32], [0; 32], 0, 0xffff_ffff, 0);
        assert!(easy.satisfies_proof_of_work());

        // Target of 1: no realistic id passes
        let hard = BlockHeader::new(1, [0; 32], [0; 32], 0, 0x0300_0001, 0);
        assert!(!hard.satisfies_proof_of_work());

        // Zero target
        let zero = BlockHeader::new(1, [0; 32], [0; 32], 0, 0, 0);
        assert!(!zero.satisfies_proof_of_work());
    }

    #[test]
    fn test_target_and_difficulty() {
        let header = BlockHeader::new(1, [0; 32], [0; 32], 0, 0x1d00ffff, 0);
        assert_eq!(header.target(), bits_to_target(0x1d00ffff));
        assert_eq!(header.difficulty(), 1.0);
    }

    #[test]
    fn test_from_json_value() {
        let header = BlockHeader::from_json_value(&sample_json()).unwrap();
        assert_eq!(header, sample_header());
        assert_eq!(header.to_json_value().unwrap(), sample_json());
    }

    #[test]
    fn test_json_text_roundtrip() {
        let text = sample_header().to_json_string().unwrap();
        let header = BlockHeader::from_input(HeaderInput::JsonText(&text)).unwrap();

        assert_eq!(header, sample_header());
        assert_eq!(header.to_json_string().unwrap(), text);
        assert!(text.starts_with("{\"version\":536870912,\"prevblockidbuf\":\"1212"));
        assert_eq!(serde_json::to_string(&header.to_json()).unwrap(), text);

        let keys: Vec<usize> = ["version", "prevblockidbuf", "merklerootbuf", "time", "bits", "nonce"]
            .iter()
            .map(|key| text.find(&format!("\"{}\":", key)).unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, header.to_json_value().unwrap());
    }

    #[test]
    fn test_json_hex_case_normalized() {
        let mut json = sample_json();
        json["merklerootbuf"] = Value::String("ABCDEF".repeat(10) + "ABCD");

        let header = BlockHeader::from_json_value(&json).unwrap();
        assert_eq!(
            header.to_json().merklerootbuf,
            ("abcdef".repeat(10) + "abcd")
        );
    }

    #[test]
    fn test_json_structs_convert() {
        let json = HeaderJson::from(&sample_header());
        assert_eq!(json.prevblockidbuf, PREV_HEX);
        assert_eq!(BlockHeader::try_from(json).unwrap(), sample_header());
    }

    #[test]
    fn test_rejects_non_object_json() {
        for value in [
            serde_json::json!(42),
            serde_json::json!("header"),
            serde_json::json!([1, 2, 3]),
            serde_json::json!(null),
            serde_json::json!(true),
        ] {
            let err = BlockHeader::from_input(HeaderInput::Json(&value)).unwrap_err();
            assert!(matches!(err, HeaderError::InvalidArgument(_)), "{:?}", err);
        }

        let err = BlockHeader::from_json_str("42").unwrap_err();
        assert!(matches!(err, HeaderError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_unrecognized_object() {
        let err = BlockHeader::from_json_value(&serde_json::json!({ "height": 1 })).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidArgument(_)));

        let err = BlockHeader::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, HeaderError::InvalidArgument(_)));

        let mut json = sample_json();
        json["nonce"] = serde_json::json!(-1);
        let err = BlockHeader::from_json_value(&json).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidArgument(_)));
    }

    #[test]
    fn test_rejects_bad_hex_fields() {
        let mut json = sample_json();
        json["prevblockidbuf"] = Value::String("zz".repeat(32));
        let err = BlockHeader::from_json_value(&json).unwrap_err();
        assert!(matches!(err, HeaderError::InvalidArgument(_)));

        let mut json = sample_json();
        json["prevblockidbuf"] = Value::String("12".repeat(31));
        assert_eq!(
            BlockHeader::from_json_value(&json),
            Err(HeaderError::MalformedField { field: "prevblockidbuf", len: 31 })
        );
    }

    #[test]
    fn test_from_fields() {
        let fields = HeaderFields {
            version: 0x2000_0000,
            prev_block_id: vec![0x12; 32],
            merkle_root: vec![0x34; 32],
            time: 1_700_000_000,
            bits: 0x1703_4219,
            nonce: 0xDEAD_BEEF,
        };
        assert_eq!(
            BlockHeader::from_input(HeaderInput::Fields(fields)).unwrap(),
            sample_header()
        );
    }

    #[test]
    fn test_fields_wrong_hash_length() {
        let short = HeaderFields {
            prev_block_id: vec![0; 31],
            merkle_root: vec![0; 32],
            ..Default::default()
        };
        assert_eq!(
            BlockHeader::try_from(short),
            Err(HeaderError::MalformedField { field: "prev_block_id", len: 31 })
        );

        let long = HeaderFields {
            prev_block_id: vec![0; 32],
            merkle_root: vec![0; 33],
            ..Default::default()
        };
        assert_eq!(
            BlockHeader::try_from(long),
            Err(HeaderError::MalformedField { field: "merkle_root", len: 33 })
        );
    }

    #[test]
    fn test_hex_string_roundtrip() {
        let header = sample_header();
        let text = header.to_string();

        assert_eq!(text.len(), 160);
        assert_eq!(text.parse::<BlockHeader>().unwrap(), header);
        assert!(matches!(
            BlockHeader::from_hex("xyz"),
            Err(HeaderError::InvalidArgument(_))
        ));
        assert_eq!(
            BlockHeader::from_hex(&text[..158]),
            Err(HeaderError::TruncatedInput { needed: 80, remaining: 79 })
        );
    }
}
