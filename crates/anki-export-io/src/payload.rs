//! Multipart form payload.

use anki_export_form::FormPayload;
use anki_export_form::endpoint::{FILE_FIELD, FORMAT_FIELD};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::BlobPropertyBag;

use crate::error::BrowserError;

/// MIME type attached to the uploaded deck. `.apkg` has no registered type.
const DECK_MIME_TYPE: &str = "application/octet-stream";

/// The `FormData` sent to the export endpoint.
#[derive(Debug, Clone)]
pub struct FormFields {
    data: web_sys::FormData,
}

impl FormFields {
    /// Wrap an existing `FormData`.
    #[must_use]
    pub const fn new(data: web_sys::FormData) -> Self {
        Self { data }
    }

    /// Serialize the form's current values.
    ///
    /// `deck` is the chosen file as `(bytes, filename)`; when `None` the
    /// `file` field is left out. `format` is added verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::JsError`] if `FormData` or `Blob`
    /// creation fails.
    pub fn build(deck: Option<(&[u8], &str)>, format: &str) -> Result<Self, BrowserError> {
        let data = web_sys::FormData::new()?;

        if let Some((bytes, file_name)) = deck {
            let parts = js_sys::Array::new();
            parts.push(&js_sys::Uint8Array::from(bytes));

            let opts = BlobPropertyBag::new();
            opts.set_type(DECK_MIME_TYPE);
            let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

            data.append_with_blob_and_filename(FILE_FIELD, &blob, file_name)?;
        }
        data.append_with_str(FORMAT_FIELD, format)?;

        Ok(Self::new(data))
    }

    #[must_use]
    pub const fn form_data(&self) -> &web_sys::FormData {
        &self.data
    }
}

impl FormPayload for FormFields {
    fn file_name(&self) -> Option<String> {
        let entry: JsValue = self.data.get(FILE_FIELD);
        entry.dyn_into::<web_sys::File>().ok().map(|file| file.name())
    }

    fn format(&self) -> Option<String> {
        self.data.get(FORMAT_FIELD).as_string()
    }
}
