//! Lyrics documents and the LRCLIB provider client
//!
//! A document is plain text split into lines. Blank lines are kept: they are
//! positions the user can select like any other.

pub mod lrclib;

pub use lrclib::LrclibClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsDocument {
    pub lines: Vec<String>,
    /// Provider label, e.g. "LRCLIB". May be empty if the backend sent none.
    pub source: String,
    /// Whether the lyrics carry timing data. Plain lyrics only, so always false today.
    pub synced: bool,
}

impl LyricsDocument {
    pub fn parse(text: &str, source: impl Into<String>, synced: bool) -> Self {
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self {
            lines,
            source: source.into(),
            synced,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_kept() {
        let doc = LyricsDocument::parse("a\n\nc\nd", "LRCLIB", false);
        assert_eq!(doc.lines, vec!["a", "", "c", "d"]);
        assert_eq!(doc.line(1), Some(""));
        assert_eq!(doc.line(4), None);
    }

    #[test]
    fn test_crlf_is_normalised() {
        let doc = LyricsDocument::parse("one\r\n\r\ntwo", "LRCLIB", false);
        assert_eq!(doc.lines, vec!["one", "", "two"]);
    }
}
