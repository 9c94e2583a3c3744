//! JS-facing block header class.

use header_core::{BlockHeader, FixedClock, HeaderError};
use wasm_bindgen::prelude::*;

use crate::console_log;
use crate::input::header_from_js;

/// A block header exposed to JavaScript.
#[wasm_bindgen(js_name = BlockHeader)]
pub struct JsBlockHeader {
    inner: BlockHeader,
}

#[wasm_bindgen(js_class = BlockHeader)]
impl JsBlockHeader {
    /// Create a header from a `Uint8Array`, JSON text, a JSON-shaped object
    /// or an object of raw fields.
    #[wasm_bindgen(constructor)]
    pub fn new(input: JsValue) -> Result<JsBlockHeader, JsValue> {
        header_from_js(&input).map(JsBlockHeader::from).map_err(|e| {
            console_log(&format!("BlockHeader rejected input: {}", e));
            to_js_error(e)
        })
    }

    /// Parse the header embedded in a raw block record (8-byte prefix skipped).
    #[wasm_bindgen(js_name = fromRawBlock)]
    pub fn from_raw_block(bytes: &[u8]) -> Result<JsBlockHeader, JsValue> {
        BlockHeader::from_raw_block(bytes)
            .map(JsBlockHeader::from)
            .map_err(to_js_error)
    }

    /// Parse the hex of an 80-byte header.
    #[wasm_bindgen(js_name = fromString)]
    pub fn from_string(hex: &str) -> Result<JsBlockHeader, JsValue> {
        BlockHeader::from_hex(hex)
            .map(JsBlockHeader::from)
            .map_err(to_js_error)
    }

    /// The 80-byte wire form.
    #[wasm_bindgen(js_name = toBuffer)]
    pub fn to_buffer(&self) -> Vec<u8> {
        self.inner.to_vec()
    }

    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.to_json())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }

    /// Hex of the 80-byte wire form.
    #[wasm_bindgen(js_name = toString)]
    pub fn to_hex_string(&self) -> String {
        self.inner.to_string()
    }

    pub fn inspect(&self) -> String {
        format!("<BlockHeader {}>", self.inner.id_hex())
    }

    /// Block id in display byte order.
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> String {
        self.inner.id_hex()
    }

    /// Header hash in internal byte order.
    #[wasm_bindgen(getter)]
    pub fn hash(&self) -> String {
        hex::encode(self.inner.hash())
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> u32 {
        self.inner.version()
    }

    #[wasm_bindgen(getter, js_name = prevBlockId)]
    pub fn prev_block_id(&self) -> String {
        hex::encode(self.inner.prev_block_id())
    }

    #[wasm_bindgen(getter, js_name = merkleRoot)]
    pub fn merkle_root(&self) -> String {
        hex::encode(self.inner.merkle_root())
    }

    #[wasm_bindgen(getter)]
    pub fn time(&self) -> u32 {
        self.inner.time()
    }

    #[wasm_bindgen(getter)]
    pub fn bits(&self) -> u32 {
        self.inner.bits()
    }

    #[wasm_bindgen(getter)]
    pub fn nonce(&self) -> u32 {
        self.inner.nonce()
    }

    /// Decoded target as hex, zero-padded to 64 digits.
    #[wasm_bindgen(js_name = targetHex)]
    pub fn target_hex(&self) -> String {
        format!("{:0>64}", format!("{:x}", self.inner.target()))
    }

    pub fn difficulty(&self) -> f64 {
        self.inner.difficulty()
    }

    /// Check the timestamp against `now` (Unix seconds), or the current time.
    #[wasm_bindgen(js_name = validTimestamp)]
    pub fn valid_timestamp(&self, now: Option<f64>) -> bool {
        let now = now.unwrap_or_else(|| js_sys::Date::now() / 1000.0);
        self.inner.timestamp_is_plausible(&FixedClock(now.max(0.0) as u64))
    }

    #[wasm_bindgen(js_name = validProofOfWork)]
    pub fn valid_proof_of_work(&self) -> bool {
        self.inner.satisfies_proof_of_work()
    }
}

impl From<BlockHeader> for JsBlockHeader {
    fn from(inner: BlockHeader) -> Self {
        JsBlockHeader { inner }
    }
}

impl JsBlockHeader {
    /// The wrapped core header.
    pub fn inner(&self) -> &BlockHeader {
        &self.inner
    }
}

fn to_js_error(err: HeaderError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
