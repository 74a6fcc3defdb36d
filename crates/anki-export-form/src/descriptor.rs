//! Download descriptor derivation.
//!
//! After the server accepts an upload, the converted file is fetched by
//! a plain GET on the export endpoint. The browser only treats that GET
//! as a download when it comes from an anchor carrying a `download`
//! attribute, so the handler needs two things for the anchor: the URL
//! and the filename to save under. Both are derived here from the
//! original upload filename and the chosen format token.

use url::Url;

use crate::endpoint::{EXPORT_PATH, FILE_FIELD, FORMAT_FIELD, SOURCE_SUFFIX};
use crate::format::FormatToken;

/// Errors that can occur while building a [`DownloadDescriptor`].
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The page origin could not be parsed as a URL.
    #[error("invalid page origin {origin:?}: {source}")]
    InvalidOrigin {
        origin: String,
        #[source]
        source: url::ParseError,
    },
}

/// Compute the filename the converted file is saved under.
///
/// Removes one trailing `.apkg` (any case) from `original` and appends
/// `.` followed by the format token. Nothing else is changed.
///
/// # Examples
///
/// ```
/// use anki_export_form::{FormatToken, download_filename};
///
/// assert_eq!(download_filename("MyDeck.apkg", &FormatToken::new("csv")), "MyDeck.csv");
/// assert_eq!(download_filename("MyDeck.APKG", &FormatToken::new("txt")), "MyDeck.txt");
/// assert_eq!(download_filename("Notes.pdf", &FormatToken::new("csv")), "Notes.pdf.csv");
/// ```
#[must_use]
pub fn download_filename(original: &str, format: &FormatToken) -> String {
    let stem = strip_source_suffix(original);
    format!("{stem}.{format}")
}

/// `original` without a trailing case-insensitive [`SOURCE_SUFFIX`].
fn strip_source_suffix(original: &str) -> &str {
    let Some(split) = original.len().checked_sub(SOURCE_SUFFIX.len()) else {
        return original;
    };
    // `get` returns `None` when `split` is not a char boundary, in which
    // case the tail cannot be the ASCII suffix.
    match (original.get(..split), original.get(split..)) {
        (Some(stem), Some(tail)) if tail.eq_ignore_ascii_case(SOURCE_SUFFIX) => stem,
        _ => original,
    }
}

/// The `(URL, filename)` pair assigned to the hidden download anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    url: Url,
    filename: String,
}

impl DownloadDescriptor {
    /// Build the descriptor for a successful upload.
    ///
    /// The URL has the same origin as the page, points at
    /// [`EXPORT_PATH`], and carries exactly two query parameters:
    /// `file` (the original upload filename, unmodified) and `format`.
    /// It never has a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::InvalidOrigin`] if `origin` is not an
    /// absolute URL that can serve as a base (e.g. the opaque `"null"`
    /// origin of a `file://` page).
    pub fn new(
        origin: &str,
        file_name: &str,
        format: &FormatToken,
    ) -> Result<Self, DescriptorError> {
        let invalid = |source| DescriptorError::InvalidOrigin {
            origin: origin.to_owned(),
            source,
        };
        let base = Url::parse(origin).map_err(invalid)?;
        let mut url = base.join(EXPORT_PATH).map_err(invalid)?;
        url.set_fragment(None);
        url.query_pairs_mut()
            .clear()
            .append_pair(FILE_FIELD, file_name)
            .append_pair(FORMAT_FIELD, format.as_str());

        Ok(Self {
            url,
            filename: download_filename(file_name, format),
        })
    }

    /// Absolute URL of the converted file.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Value for the anchor's `download` attribute.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}
