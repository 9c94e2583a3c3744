//! Resolution of JS constructor arguments into header inputs.

use header_core::{BlockHeader, HeaderError, HeaderFields, HeaderInput, HeaderJson};
use js_sys::{Array, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

/// Build a header from whatever the JS caller passed in.
///
/// Accepted shapes:
/// - `Uint8Array`: the 80-byte header
/// - `string`: JSON text
/// - object whose `prevblockidbuf` is a string: JSON-shaped object (hex hashes)
/// - object whose `prevblockidbuf` is a `Uint8Array`: raw fields
pub fn header_from_js(input: &JsValue) -> Result<BlockHeader, HeaderError> {
    if let Some(bytes) = input.dyn_ref::<Uint8Array>() {
        let bytes = bytes.to_vec();
        return BlockHeader::from_input(HeaderInput::RawBytes(&bytes));
    }

    if let Some(text) = input.as_string() {
        return BlockHeader::from_input(HeaderInput::JsonText(&text));
    }

    if input.is_object() && !Array::is_array(input) {
        let prev = get(input, "prevblockidbuf")?;
        if prev.is_string() {
            let json: HeaderJson = serde_wasm_bindgen::from_value(input.clone())
                .map_err(|e| HeaderError::InvalidArgument(format!("header JSON: {}", e)))?;
            return BlockHeader::try_from(json);
        }
        if prev.is_instance_of::<Uint8Array>() {
            return BlockHeader::from_input(HeaderInput::Fields(fields_from_js(input)?));
        }
    }

    Err(HeaderError::InvalidArgument(format!(
        "unrecognized header input of type {}",
        input.js_typeof().as_string().unwrap_or_default()
    )))
}

fn fields_from_js(obj: &JsValue) -> Result<HeaderFields, HeaderError> {
    Ok(HeaderFields {
        version: u32_field(obj, "version")?,
        prev_block_id: bytes_field(obj, "prevblockidbuf")?,
        merkle_root: bytes_field(obj, "merklerootbuf")?,
        time: u32_field(obj, "time")?,
        bits: u32_field(obj, "bits")?,
        nonce: u32_field(obj, "nonce")?,
    })
}

fn get(obj: &JsValue, name: &str) -> Result<JsValue, HeaderError> {
    Reflect::get(obj, &JsValue::from_str(name))
        .map_err(|_| HeaderError::InvalidArgument(format!("cannot read field {}", name)))
}

fn u32_field(obj: &JsValue, name: &str) -> Result<u32, HeaderError> {
    let value = get(obj, name)?
        .as_f64()
        .ok_or_else(|| HeaderError::InvalidArgument(format!("{} must be a number", name)))?;

    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(HeaderError::InvalidArgument(format!(
            "{} out of range: {}",
            name, value
        )));
    }
    Ok(value as u32)
}

fn bytes_field(obj: &JsValue, name: &str) -> Result<Vec<u8>, HeaderError> {
    get(obj, name)?
        .dyn_into::<Uint8Array>()
        .map(|bytes| bytes.to_vec())
        .map_err(|_| HeaderError::InvalidArgument(format!("{} must be a Uint8Array", name)))
}
