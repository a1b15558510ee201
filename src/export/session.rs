//! Export modal state machine.
//!
//! A session exists from the moment the modal opens until the image is
//! written or the modal is cancelled; "idle" is the absence of a session.

use super::ExportError;
use super::raster::RenderTarget;
use super::snippet::{Snippet, build_snippet};
use super::style::{Background, SnippetConfig, SnippetFont};
use crate::api::models::Track;
use crate::lyrics::LyricsDocument;
use crate::selection::{Selection, SelectionError};
use image::RgbaImage;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    /// No modal open. Sessions themselves never report this.
    Idle,
    /// Waiting for the cover image of the current cache key.
    Configuring,
    Ready,
    Capturing,
}

/// Cover download the UI should start for the current configuring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverRequest {
    pub url: String,
    pub key: u64,
}

#[derive(Debug, Clone)]
pub struct ExportSession {
    track: Track,
    snippet: Snippet,
    config: SnippetConfig,
    phase: ExportPhase,
    cover_key: u64,
    cover: Option<Arc<RgbaImage>>,
}

impl ExportSession {
    /// Open the modal for a validated selection, with default styling.
    pub fn open(track: &Track, doc: &LyricsDocument, selection: &Selection) -> Result<Self, SelectionError> {
        selection.validate_for_export()?;
        let config = SnippetConfig::default();
        let snippet = build_snippet(track, doc, selection, &config);
        let mut session = Self {
            track: track.clone(),
            snippet,
            config,
            phase: ExportPhase::Configuring,
            cover_key: 0,
            cover: None,
        };
        session.start_configuring();
        tracing::debug!(track = %track.id, lines = selection.len(), "export session opened");
        Ok(session)
    }

    fn start_configuring(&mut self) {
        self.cover_key = fresh_key(self.cover_key);
        self.cover = None;
        // Nothing to wait for without artwork.
        self.phase = if self.track.thumbnail.is_some() {
            ExportPhase::Configuring
        } else {
            ExportPhase::Ready
        };
    }

    pub fn phase(&self) -> ExportPhase {
        self.phase
    }

    pub fn snippet(&self) -> &Snippet {
        &self.snippet
    }

    pub fn config(&self) -> SnippetConfig {
        self.config
    }

    pub fn cover(&self) -> Option<&Arc<RgbaImage>> {
        self.cover.as_ref()
    }

    pub fn cover_key(&self) -> u64 {
        self.cover_key
    }

    /// The cover download for this configuring pass, if one is still needed.
    pub fn cover_request(&self) -> Option<CoverRequest> {
        if self.phase != ExportPhase::Configuring {
            return None;
        }
        let thumbnail = self.track.thumbnail.as_deref()?;
        Some(CoverRequest {
            url: cache_busted(thumbnail, self.cover_key),
            key: self.cover_key,
        })
    }

    /// Record a finished cover download. `None` means the download or decode
    /// failed; the card is then drawn without artwork.
    ///
    /// Returns false when the result belongs to an older pass and was ignored.
    pub fn cover_loaded(&mut self, key: u64, cover: Option<Arc<RgbaImage>>) -> bool {
        if key != self.cover_key || self.phase != ExportPhase::Configuring {
            tracing::debug!(key, current = self.cover_key, "ignoring stale cover");
            return false;
        }
        self.cover = cover;
        self.phase = ExportPhase::Ready;
        true
    }

    pub fn set_font(&mut self, font: SnippetFont) {
        if self.phase == ExportPhase::Capturing {
            return;
        }
        self.config.font = font;
        self.snippet.font = font;
    }

    pub fn set_background(&mut self, background: Background) {
        if self.phase == ExportPhase::Capturing {
            return;
        }
        self.config.background = background;
        self.snippet.background = background;
    }

    pub fn cycle_font(&mut self, forward: bool) {
        let font = if forward { self.config.font.next() } else { self.config.font.prev() };
        self.set_font(font);
    }

    pub fn cycle_background(&mut self, forward: bool) {
        let bg = if forward {
            self.config.background.next()
        } else {
            self.config.background.prev()
        };
        self.set_background(bg);
    }

    /// Confirm the export. Only allowed once the cover gate is satisfied.
    pub fn begin_capture(&mut self) -> Result<RenderTarget, ExportError> {
        if self.phase != ExportPhase::Ready {
            return Err(ExportError::NotReady);
        }
        self.phase = ExportPhase::Capturing;
        Ok(RenderTarget {
            snippet: self.snippet.clone(),
            cover: self.cover.clone(),
        })
    }

    /// Capture failed: back to configuring with a new cache key so the cover
    /// reloads. The styling is kept.
    pub fn capture_failed(&mut self) {
        if self.phase == ExportPhase::Capturing {
            self.start_configuring();
        }
    }
}

fn fresh_key(previous: u64) -> u64 {
    loop {
        let key = rand::random::<u64>();
        if key != previous {
            return key;
        }
    }
}

fn cache_busted(url: &str, key: u64) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair("cb", &key.to_string());
            parsed.into()
        }
        Err(_) => {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{url}{sep}cb={key}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::MAX_SELECTED_LINES;

    fn track(thumbnail: Option<&str>) -> Track {
        Track {
            id: "t1".into(),
            title: "Hey Jude".into(),
            artist: "The Beatles".into(),
            album: "Hey Jude".into(),
            duration_ms: 431_333,
            thumbnail: thumbnail.map(str::to_string),
            preview_url: None,
        }
    }

    fn doc() -> LyricsDocument {
        LyricsDocument::parse("a\n\nc\nd", "LRCLIB", false)
    }

    fn selection() -> Selection {
        [1, 2].into_iter().collect()
    }

    #[test]
    fn test_open_rejects_empty_and_gapped() {
        let t = track(None);
        assert!(matches!(
            ExportSession::open(&t, &doc(), &Selection::empty()),
            Err(SelectionError::Empty)
        ));
        let gapped: Selection = [0, 2].into_iter().collect();
        assert!(matches!(
            ExportSession::open(&t, &doc(), &gapped),
            Err(SelectionError::NonContiguous)
        ));
    }

    #[test]
    fn test_no_thumbnail_is_ready_immediately() {
        let session = ExportSession::open(&track(None), &doc(), &selection()).unwrap();
        assert_eq!(session.phase(), ExportPhase::Ready);
        assert!(session.cover_request().is_none());
        assert_eq!(session.config(), SnippetConfig::default());
    }

    #[test]
    fn test_cover_gate() {
        let mut session =
            ExportSession::open(&track(Some("https://i.scdn.co/image/abc")), &doc(), &selection()).unwrap();
        assert_eq!(session.phase(), ExportPhase::Configuring);
        assert!(matches!(session.begin_capture(), Err(ExportError::NotReady)));

        let req = session.cover_request().unwrap();
        assert_eq!(req.url, format!("https://i.scdn.co/image/abc?cb={}", req.key));

        assert!(!session.cover_loaded(req.key.wrapping_add(1), None));
        assert_eq!(session.phase(), ExportPhase::Configuring);

        let cover = Arc::new(RgbaImage::new(4, 4));
        assert!(session.cover_loaded(req.key, Some(cover)));
        assert_eq!(session.phase(), ExportPhase::Ready);
        assert!(session.cover().is_some());
    }

    #[test]
    fn test_failed_cover_still_unblocks() {
        let mut session =
            ExportSession::open(&track(Some("https://x/y.jpg")), &doc(), &selection()).unwrap();
        let key = session.cover_key();
        assert!(session.cover_loaded(key, None));
        assert_eq!(session.phase(), ExportPhase::Ready);
        assert!(session.begin_capture().is_ok());
    }

    #[test]
    fn test_capture_failure_returns_to_configuring_with_new_key() {
        let mut session =
            ExportSession::open(&track(Some("https://x/y.jpg")), &doc(), &selection()).unwrap();
        let first = session.cover_key();
        session.cover_loaded(first, None);
        session.cycle_background(true);

        let target = session.begin_capture().unwrap();
        assert_eq!(target.snippet.background, Background::Ocean);
        assert_eq!(session.phase(), ExportPhase::Capturing);

        session.capture_failed();
        assert_eq!(session.phase(), ExportPhase::Configuring);
        assert_ne!(session.cover_key(), first);
        assert_eq!(session.config().background, Background::Ocean);

        // A late answer for the first pass does not unlock the gate.
        assert!(!session.cover_loaded(first, None));
        assert_eq!(session.phase(), ExportPhase::Configuring);
    }

    #[test]
    fn test_styling_is_frozen_while_capturing() {
        let mut session = ExportSession::open(&track(None), &doc(), &selection()).unwrap();
        session.set_font(SnippetFont::Mono);
        session.begin_capture().unwrap();
        session.set_font(SnippetFont::Serif);
        session.cycle_background(false);
        assert_eq!(session.snippet().font, SnippetFont::Mono);
        assert_eq!(session.snippet().background, Background::Sunset);
    }

    #[test]
    fn test_snippet_reflects_selection() {
        let mut sel = Selection::empty();
        for i in [2, 3, 1, 0] {
            sel = sel.apply_click(i, MAX_SELECTED_LINES).unwrap();
        }
        let session = ExportSession::open(&track(None), &doc(), &sel).unwrap();
        assert_eq!(session.snippet().lines, vec!["a", "\u{00a0}", "c", "d"]);
    }

    #[test]
    fn test_cache_busted_keeps_existing_query() {
        assert_eq!(cache_busted("https://h/p?size=64", 7), "https://h/p?size=64&cb=7");
        assert_eq!(cache_busted("not a url", 7), "not a url?cb=7");
    }
}
