//! Fixed names shared by the form, the download link and the server.

/// Path of the export endpoint.
///
/// The form POSTs its multipart payload here, and the synthesized
/// download link GETs the converted file from the same path.
pub const EXPORT_PATH: &str = "/api/anki-export";

/// Form field (and query parameter) carrying the uploaded deck.
pub const FILE_FIELD: &str = "file";

/// Form field (and query parameter) carrying the format token.
pub const FORMAT_FIELD: &str = "format";

/// Source suffix removed from the uploaded filename before the output
/// extension is appended. Compared case-insensitively.
pub const SOURCE_SUFFIX: &str = ".apkg";
