// Known response formats, keyed by the extension found on an entity URL

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Html,
    Xml,
    Json,
    Txt,
    Rss,
    Atom,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Html,
        Format::Xml,
        Format::Json,
        Format::Txt,
        Format::Rss,
        Format::Atom,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Txt => "txt",
            Format::Rss => "rss",
            Format::Atom => "atom",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Html => "text/html",
            Format::Xml => "application/xml",
            Format::Json => "application/json",
            Format::Txt => "text/plain",
            Format::Rss => "application/rss+xml",
            Format::Atom => "application/atom+xml",
        }
    }

    /// Look up a format by extension, ignoring case
    pub fn from_extension(extension: &str) -> Option<Format> {
        Format::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Format::from_extension("xml"), Some(Format::Xml));
        assert_eq!(Format::from_extension("JSON"), Some(Format::Json));
        assert_eq!(Format::from_extension("docx"), None);
        assert_eq!(Format::from_extension(""), None);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(Format::Rss.mime_type(), "application/rss+xml");
        assert_eq!(Format::Txt.mime_type(), "text/plain");
    }
}
