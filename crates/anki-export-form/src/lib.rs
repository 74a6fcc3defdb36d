//! anki-export-form: Pure submission logic for the upload form (sans-IO).
//!
//! Turns one form submission into one POST to the export endpoint and,
//! when the server accepts it, one download descriptor for the hidden
//! download link:
//!
//! prevent default -> guard -> read fields -> POST -> classify status ->
//! derive descriptor -> assign + activate link.
//!
//! This crate has **no browser dependencies** -- the event, the network
//! call and the link are reached through the traits in [`submit`]. The
//! `web_sys` implementations live in `anki-export-io`.

pub mod descriptor;
pub mod endpoint;
pub mod format;
pub mod guard;
pub mod submit;

pub use descriptor::{DescriptorError, DownloadDescriptor, download_filename};
pub use endpoint::EXPORT_PATH;
pub use format::{ExportFormat, FormatToken};
pub use guard::{SubmitGuard, SubmitState};
pub use submit::{
    DownloadTarget, ExportTransport, FormPayload, PendingSubmit, ResponseStatus, SubmitError,
    SubmitEvent, Submission, TransportError, begin_submit,
};
