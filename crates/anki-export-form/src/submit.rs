//! The submit flow, generic over the browser.
//!
//! A submission is split in two so that the default navigation is
//! always suppressed before anything can suspend:
//!
//! 1. [`begin_submit`] is synchronous. It calls
//!    [`SubmitEvent::prevent_default`] first, unconditionally, then
//!    checks the [`SubmitGuard`] and the required fields.
//! 2. [`PendingSubmit::run`] is asynchronous. It POSTs the payload,
//!    and on a success status assigns a [`DownloadDescriptor`] to the
//!    injected [`DownloadTarget`] and activates it. On any failure the
//!    target is left untouched.

use std::fmt;
use std::rc::Rc;

use crate::descriptor::{DescriptorError, DownloadDescriptor};
use crate::endpoint::{EXPORT_PATH, FILE_FIELD, FORMAT_FIELD};
use crate::format::FormatToken;
use crate::guard::SubmitGuard;

/// The submit event of the form.
pub trait SubmitEvent {
    /// Suppress the browser's native form submission.
    fn prevent_default(&self);
}

/// Read access to the serialized form fields.
pub trait FormPayload {
    /// Name of the file in the `file` field, if the field holds a file.
    fn file_name(&self) -> Option<String>;

    /// Value of the `format` field, if present.
    fn format(&self) -> Option<String>;
}

/// Sends the form payload to the server.
// Browser futures are `!Send`; implementors never need the bound.
#[allow(async_fn_in_trait)]
pub trait ExportTransport<P> {
    /// POST `payload` to `path` and return the response status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received at all
    /// (network failure, blocked request).
    async fn post(&self, path: &str, payload: &P) -> Result<ResponseStatus, TransportError>;
}

/// The hidden download anchor.
pub trait DownloadTarget {
    /// Set the anchor's `href` and `download` attributes.
    fn assign(&self, descriptor: &DownloadDescriptor);

    /// Click the anchor, starting the browser's save flow.
    fn activate(&self);
}

/// A request that produced no response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request failed: {0}")]
pub struct TransportError(pub String);

/// HTTP status of the POST response. The body is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseStatus(u16);

impl ResponseStatus {
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// The `fetch` notion of `ok`: 200 through 299.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.0, 200..=299)
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.0)
    }
}

/// Errors that can end a submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Another submission of the same form is still in flight.
    #[error("an export is already in progress")]
    Busy,

    /// A required form field is absent or empty.
    #[error("missing form field `{0}`")]
    MissingField(&'static str),

    /// The server answered with a non-success status.
    #[error("export rejected by server ({status})")]
    Rejected { status: ResponseStatus },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The download link could not be built.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Fields read from the payload when the submission starts.
///
/// Held for the success path so the download descriptor never depends
/// on the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub file_name: String,
    pub format: FormatToken,
}

impl Submission {
    /// Read the required fields from `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::MissingField`] if there is no file (or the
    /// file has an empty name) or no format value.
    pub fn from_payload<P: FormPayload + ?Sized>(payload: &P) -> Result<Self, SubmitError> {
        let file_name = payload
            .file_name()
            .filter(|name| !name.is_empty())
            .ok_or(SubmitError::MissingField(FILE_FIELD))?;
        let format = payload
            .format()
            .ok_or(SubmitError::MissingField(FORMAT_FIELD))?;
        Ok(Self {
            file_name,
            format: FormatToken::new(format),
        })
    }
}

/// Start a submission.
///
/// Always suppresses the default navigation before doing anything
/// else. Then rejects the submission if one is already in flight or a
/// required field is missing; otherwise marks the guard in flight and
/// returns the pending request.
///
/// # Errors
///
/// Returns [`SubmitError::Busy`] or [`SubmitError::MissingField`]. In
/// both cases nothing has been sent and the guard is unchanged.
pub fn begin_submit<E, P>(
    event: &E,
    guard: &Rc<SubmitGuard>,
    payload: P,
) -> Result<PendingSubmit<P>, SubmitError>
where
    E: SubmitEvent + ?Sized,
    P: FormPayload,
{
    event.prevent_default();

    if guard.is_in_flight() {
        return Err(SubmitError::Busy);
    }
    let submission = Submission::from_payload(&payload)?;

    if !guard.try_begin() {
        return Err(SubmitError::Busy);
    }

    Ok(PendingSubmit {
        payload,
        submission,
        guard: Rc::clone(guard),
    })
}

/// A submission that has passed the guard and is ready to be sent.
///
/// The guard returns to [`SubmitState::Done`](crate::SubmitState::Done)
/// when this value is dropped, whether or not [`run`](Self::run)
/// completed.
#[derive(Debug)]
pub struct PendingSubmit<P> {
    payload: P,
    submission: Submission,
    guard: Rc<SubmitGuard>,
}

impl<P> PendingSubmit<P> {
    /// The fields that will name the download.
    #[must_use]
    pub const fn submission(&self) -> &Submission {
        &self.submission
    }

    /// POST the payload and, on success, trigger the download.
    ///
    /// `origin` is the page origin (e.g. `http://localhost:5173`); the
    /// download URL is built against it.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Transport`] if no response arrived,
    /// [`SubmitError::Rejected`] for a non-success status, and
    /// [`SubmitError::Descriptor`] if `origin` is unusable. The target is
    /// only touched when `Ok` is returned.
    #[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
    pub async fn run<T, A>(
        self,
        transport: &T,
        target: &A,
        origin: &str,
    ) -> Result<DownloadDescriptor, SubmitError>
    where
        T: ExportTransport<P> + ?Sized,
        A: DownloadTarget + ?Sized,
    {
        let status = transport.post(EXPORT_PATH, &self.payload).await?;
        if !status.is_success() {
            return Err(SubmitError::Rejected { status });
        }

        let descriptor = DownloadDescriptor::new(
            origin,
            &self.submission.file_name,
            &self.submission.format,
        )?;
        target.assign(&descriptor);
        target.activate();
        Ok(descriptor)
    }
}

impl<P> Drop for PendingSubmit<P> {
    fn drop(&mut self) {
        self.guard.finish();
    }
}
