//! anki-export-io: Browser I/O and Dioxus component library.
//!
//! Implements the submit-flow traits of `anki-export-form` on top of
//! `web_sys` (multipart `FormData`, `fetch`, the hidden download
//! anchor, the page origin) and provides the upload form component
//! for the anki-export web application.

pub mod components;
pub mod console;
pub mod error;
pub mod link;
pub mod payload;
pub mod transport;

pub use components::{DeckPicker, ExportForm, PickedDeck};
pub use error::BrowserError;
pub use link::{DownloadLink, page_origin};
pub use payload::FormFields;
pub use transport::FetchTransport;
