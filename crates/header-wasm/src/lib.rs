//! WebAssembly bindings for block header parsing and validation.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Building a header from bytes, JSON, or raw fields
//! - Serializing it back to bytes and JSON
//! - Computing its id and checking timestamp and proof of work

use wasm_bindgen::prelude::*;

pub mod header;
pub mod input;

// Re-export main types for JS access
pub use header::JsBlockHeader;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
