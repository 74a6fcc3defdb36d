//! File download via a hidden `<a download>` element.
//!
//! The converted file is served by a GET on the export endpoint. This
//! module points a pre-existing hidden anchor at that URL, sets its
//! `download` attribute to the output filename, and programmatically
//! clicks it. Because the anchor carries `download`, the browser starts
//! its save flow instead of navigating away from the form.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use anki_export_form::{DownloadDescriptor, DownloadTarget};
use wasm_bindgen::JsCast;

use crate::error::BrowserError;

/// The hidden download anchor of the form.
///
/// Wraps the element so the submit flow receives it as a parameter
/// instead of querying the document itself. The form captures it when
/// the anchor mounts.
#[derive(Debug, Clone)]
pub struct DownloadLink {
    anchor: web_sys::HtmlAnchorElement,
}

impl DownloadLink {
    #[must_use]
    pub const fn new(anchor: web_sys::HtmlAnchorElement) -> Self {
        Self { anchor }
    }

    /// Wrap a mounted element, which must be an `<a>`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::JsError`] if the element is not an anchor.
    pub fn from_element(element: web_sys::Element) -> Result<Self, BrowserError> {
        let anchor = element
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|e| BrowserError::JsError(format!("download link is not an anchor: {e:?}")))?;
        Ok(Self::new(anchor))
    }
}

impl DownloadTarget for DownloadLink {
    fn assign(&self, descriptor: &DownloadDescriptor) {
        self.anchor.set_href(descriptor.url().as_str());
        self.anchor.set_download(descriptor.filename());
    }

    fn activate(&self) {
        self.anchor.click();
    }
}

/// Origin of the current page, e.g. `http://localhost:5173`.
///
/// # Errors
///
/// Returns [`BrowserError`] if there is no window or the location
/// cannot be read.
pub fn page_origin() -> Result<String, BrowserError> {
    let window = web_sys::window().ok_or(BrowserError::Missing("global window"))?;
    Ok(window.location().origin()?)
}
