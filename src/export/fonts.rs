//! Locating font files for the card rasterizer.

use super::ExportError;
use super::style::SnippetFont;
use ab_glyph::FontVec;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Font directories searched after the configured ones.
fn platform_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(base) = directories::BaseDirs::new() {
        dirs.push(base.home_dir().join(".fonts"));
        dirs.push(base.data_local_dir().join("fonts"));
        dirs.push(base.home_dir().join("Library").join("Fonts"));
    }
    dirs
}

/// Resolves [`SnippetFont`]s to font files.
#[derive(Debug, Clone, Default)]
pub struct FontBook {
    explicit: HashMap<SnippetFont, PathBuf>,
    dirs: Vec<PathBuf>,
}

impl FontBook {
    pub fn new(explicit: HashMap<SnippetFont, PathBuf>, extra_dirs: Vec<PathBuf>) -> Self {
        let mut dirs = extra_dirs;
        dirs.extend(platform_font_dirs());
        Self { explicit, dirs }
    }

    /// Load the font for `font`, falling back to the sans candidates.
    pub fn load(&self, font: SnippetFont) -> Result<FontVec, ExportError> {
        let path = self
            .locate(font)
            .or_else(|| self.locate(SnippetFont::Sans))
            .ok_or(ExportError::FontUnavailable(font.label()))?;
        tracing::debug!(font = font.label(), path = %path.display(), "loading font");
        let bytes = std::fs::read(&path).map_err(|e| ExportError::Io {
            path: path.clone(),
            source: e,
        })?;
        FontVec::try_from_vec(bytes).map_err(|_| ExportError::FontUnavailable(font.label()))
    }

    pub fn locate(&self, font: SnippetFont) -> Option<PathBuf> {
        if let Some(path) = self.explicit.get(&font)
            && path.is_file()
        {
            return Some(path.clone());
        }
        let candidates = font.file_candidates();
        self.dirs
            .iter()
            .filter(|d| d.is_dir())
            .find_map(|dir| find_in_dir(dir, candidates))
    }
}

fn find_in_dir(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    let mut best: Option<(usize, PathBuf)> = None;
    for entry in WalkDir::new(dir).follow_links(true).max_depth(6).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let rank = {
            let name = entry.file_name().to_string_lossy();
            candidates.iter().position(|c| c.eq_ignore_ascii_case(&name))
        };
        if let Some(rank) = rank
            && best.as_ref().is_none_or(|(r, _)| rank < *r)
        {
            best = Some((rank, entry.into_path()));
            if rank == 0 {
                break;
            }
        }
    }
    best.map(|(_, p)| p)
}
