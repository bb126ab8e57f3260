//! Document formats the pandoc host accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A supported input or output format, identified on the wire by its
/// lower-case name.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Markdown,
    Html,
    Pdf,
    Docx,
    Rst,
    Latex,
    Epub,
    /// Plain text.
    Txt,
}

impl Format {
    pub const ALL: [Format; 8] = [
        Format::Markdown,
        Format::Html,
        Format::Pdf,
        Format::Docx,
        Format::Rst,
        Format::Latex,
        Format::Epub,
        Format::Txt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Markdown => "markdown",
            Format::Html => "html",
            Format::Pdf => "pdf",
            Format::Docx => "docx",
            Format::Rst => "rst",
            Format::Latex => "latex",
            Format::Epub => "epub",
            Format::Txt => "txt",
        }
    }

    /// Formats the host may return as base64 file content, which can only be
    /// delivered by saving to `output_file`.
    pub fn is_advanced(self) -> bool {
        matches!(
            self,
            Format::Pdf | Format::Docx | Format::Rst | Format::Latex | Format::Epub
        )
    }

    /// Comma-separated list of every supported name, for error messages.
    pub fn supported_list() -> String {
        Self::ALL.map(Format::as_str).join(", ")
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a name is not in [`Format::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    /// Case-insensitive: `"HTML"` and `"html"` are the same format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == lowered)
            .ok_or(UnknownFormat(s.to_string()))
    }
}
