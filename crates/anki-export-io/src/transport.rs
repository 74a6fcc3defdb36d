//! `fetch`-based transport for the export endpoint.

use anki_export_form::{ExportTransport, ResponseStatus, TransportError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::payload::FormFields;

/// POSTs the form payload with `window.fetch`.
///
/// The browser sets the multipart `Content-Type` (with boundary) itself
/// because the body is a `FormData`. Only the response status is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

fn transport_error(value: &JsValue) -> TransportError {
    TransportError(format!("{value:?}"))
}

impl ExportTransport<FormFields> for FetchTransport {
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    async fn post(
        &self,
        path: &str,
        payload: &FormFields,
    ) -> Result<ResponseStatus, TransportError> {
        let window =
            web_sys::window().ok_or_else(|| TransportError("no global window".into()))?;

        let init = web_sys::RequestInit::new();
        init.set_method("POST");
        init.set_body(payload.form_data());

        let response = JsFuture::from(window.fetch_with_str_and_init(path, &init))
            .await
            .map_err(|e| transport_error(&e))?;
        let response: web_sys::Response = response
            .dyn_into()
            .map_err(|e| transport_error(&e))?;

        Ok(ResponseStatus::new(response.status()))
    }
}
