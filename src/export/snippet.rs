use super::style::{Background, SnippetConfig, SnippetFont};
use crate::api::models::Track;
use crate::lyrics::LyricsDocument;
use crate::selection::Selection;

/// Stands in for an empty lyric line so it keeps its height when rendered.
pub const BLANK_LINE_MARKER: &str = "\u{00a0}";

/// Attribution used when the backend did not name a provider.
pub const DEFAULT_SOURCE: &str = "LRCLIB";

const FILE_SUFFIX: &str = "_selection";
pub const FILE_EXTENSION: &str = "png";

/// Everything needed to draw one exported card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub title: String,
    pub artist: String,
    /// Selected lines in ascending index order.
    pub lines: Vec<String>,
    pub source: String,
    pub synced: bool,
    pub font: SnippetFont,
    pub background: Background,
}

impl Snippet {
    pub fn attribution(&self) -> String {
        let synced = if self.synced { ", Synced" } else { "" };
        format!("Lyrics from {}{}", self.source, synced)
    }
}

pub fn build_snippet(
    track: &Track,
    doc: &LyricsDocument,
    selection: &Selection,
    config: &SnippetConfig,
) -> Snippet {
    let lines = selection
        .iter()
        .filter_map(|i| doc.line(i))
        .map(|line| {
            if line.trim().is_empty() {
                BLANK_LINE_MARKER.to_string()
            } else {
                line.to_string()
            }
        })
        .collect();

    let source = if doc.source.trim().is_empty() {
        DEFAULT_SOURCE.to_string()
    } else {
        doc.source.clone()
    };

    Snippet {
        title: track.title.clone(),
        artist: track.artist.clone(),
        lines,
        source,
        synced: doc.synced,
        font: config.font,
        background: config.background,
    }
}

/// `"Mr. Brightside!"` becomes `"mrbrightside_selection.png"`.
pub fn export_file_name(title: &str) -> String {
    let slug: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    format!("{slug}{FILE_SUFFIX}.{FILE_EXTENSION}")
}
