//! Console logging for the browser side.
//!
//! There is no tracing subscriber in the page; messages go straight to
//! the developer console with an `anki-export:` prefix.

use wasm_bindgen::JsValue;

fn line(message: &str) -> JsValue {
    JsValue::from_str(&format!("anki-export: {message}"))
}

pub fn info(message: &str) {
    web_sys::console::info_1(&line(message));
}

pub fn warn(message: &str) {
    web_sys::console::warn_1(&line(message));
}
