//! Output format tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The output format token chosen in the form.
///
/// Opaque: the token is sent and appended to the download filename
/// exactly as selected, with no case folding or validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatToken(String);

impl FormatToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ExportFormat> for FormatToken {
    fn from(format: ExportFormat) -> Self {
        Self::new(format.token())
    }
}

/// Output formats the export server is known to produce.
///
/// Used to populate the format selector. The submit flow itself does
/// not restrict tokens to this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One worksheet per note type.
    #[default]
    Xlsx,
    /// Rows grouped by note type, as JSON.
    Json,
}

impl ExportFormat {
    /// All formats, in selector order.
    pub const ALL: [Self; 2] = [Self::Xlsx, Self::Json];

    /// The token sent in the `format` field.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }

    /// Human-readable label for the selector.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Xlsx => "Excel workbook (.xlsx)",
            Self::Json => "JSON (.json)",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
