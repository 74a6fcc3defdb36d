//! Errors raised by browser API calls.

use wasm_bindgen::JsValue;

/// Errors that can occur when talking to the browser.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),

    /// A global object or element the page relies on is absent.
    #[error("no {0} available")]
    Missing(&'static str),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}
