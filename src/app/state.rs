use crate::api::models::Track;
use crate::auth::implicit::AuthorizeRequest;
use crate::export::{ExportPhase, ExportSession};
use crate::lyrics::LyricsDocument;
use crate::selection::Selection;
use ratatui::layout::Rect;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Search,
    Lyrics,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    Input,
    Results,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: std::time::Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > std::time::Duration::from_secs(3)
    }
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Screen::Login => Screen::Search,
            Screen::Search => Screen::Lyrics,
            Screen::Lyrics => Screen::Help,
            Screen::Help => Screen::Login,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Screen::Login => Screen::Help,
            Screen::Search => Screen::Login,
            Screen::Lyrics => Screen::Search,
            Screen::Help => Screen::Lyrics,
        }
    }
}

/// Search results with cursor and virtual scroll.
#[derive(Debug, Clone, Default)]
pub struct TrackListState {
    pub items: Vec<String>,
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub scroll_offset: usize,
    pub loading: bool,
    pub loaded: bool,
}

impl TrackListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.items = tracks
            .iter()
            .map(|t| {
                if t.artist.is_empty() {
                    t.title.clone()
                } else {
                    format!("{} - {}", t.title, t.artist)
                }
            })
            .collect();
        self.tracks = tracks;
        self.selected = 0;
        self.scroll_offset = 0;
        self.loaded = true;
        self.loading = false;
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.tracks.clear();
        self.selected = 0;
        self.scroll_offset = 0;
        self.loaded = false;
    }
}

/// The song currently opened on the Lyrics screen and its line selection.
#[derive(Debug, Clone, Default)]
pub struct LyricsView {
    pub track: Option<Track>,
    pub doc: Option<LyricsDocument>,
    pub loading: bool,
    /// Inline "not found" or failure text shown instead of lines.
    pub notice: Option<String>,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub selection: Selection,
    /// Where the lines were last drawn, for mapping mouse clicks.
    pub area: Option<Rect>,
}

impl LyricsView {
    /// Forget the current song. Clears lyrics and selection together.
    pub fn clear(&mut self) {
        *self = Self {
            area: self.area,
            ..Self::default()
        };
    }

    /// Start loading `track`; nothing from the previous song survives.
    pub fn begin(&mut self, track: Track) {
        self.clear();
        self.track = Some(track);
        self.loading = true;
    }

    pub fn is_for(&self, track_id: &str) -> bool {
        self.track.as_ref().is_some_and(|t| t.id == track_id)
    }

    pub fn line_count(&self) -> usize {
        self.doc.as_ref().map_or(0, LyricsDocument::len)
    }

    pub fn cursor_up(&mut self, by: usize) {
        self.cursor = self.cursor.saturating_sub(by);
    }

    pub fn cursor_down(&mut self, by: usize) {
        let last = self.line_count().saturating_sub(1);
        self.cursor = self.cursor.saturating_add(by).min(last);
    }

    pub fn update_scroll(&mut self, visible_height: usize) {
        if visible_height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + visible_height {
            self.scroll_offset = self.cursor - visible_height + 1;
        }
    }

    /// Line index under terminal cell (`column`, `row`), if any.
    pub fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.area?;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        let index = self.scroll_offset + (row - area.y) as usize;
        (index < self.line_count()).then_some(index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginState {
    pub request: Option<AuthorizeRequest>,
    /// Pasted redirect URL. Replaced with the fragment-free URL after login.
    pub input: String,
    pub notice: Option<String>,
}

pub struct AppState {
    pub should_quit: bool,
    pub tick: u64,

    pub screen: Screen,
    pub sidebar_selected: usize,

    /// Mirrors the credential held by the app, for rendering.
    pub signed_in: bool,
    pub login: LoginState,

    // Search
    pub search_query: String,
    pub last_search: Option<String>,
    pub search_focus: SearchFocus,
    pub search_list: TrackListState,
    /// Bumped per search; results carrying an older number are dropped.
    pub search_seq: u64,

    pub lyrics: LyricsView,

    /// Open export modal. `None` is the idle phase.
    pub export: Option<ExportSession>,
    pub last_export: Option<PathBuf>,

    pub toast: Option<Toast>,
    pub status: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            tick: 0,
            screen: Screen::Login,
            sidebar_selected: 0,
            signed_in: false,
            login: LoginState::default(),
            search_query: String::new(),
            last_search: None,
            search_focus: SearchFocus::Input,
            search_list: TrackListState::new(),
            search_seq: 0,
            lyrics: LyricsView::default(),
            export: None,
            last_export: None,
            toast: None,
            status: String::new(),
        }
    }

    /// `Idle` while no export modal is open.
    pub fn export_phase(&self) -> ExportPhase {
        self.export.as_ref().map_or(ExportPhase::Idle, ExportSession::phase)
    }

    /// Drop everything tied to the open song: lyrics, selection and the
    /// export modal.
    pub fn discard_song(&mut self) {
        self.lyrics.clear();
        self.export = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.into(),
            title: "T".into(),
            artist: "A".into(),
            album: "B".into(),
            duration_ms: 1000,
            thumbnail: None,
            preview_url: None,
        }
    }

    #[test]
    fn test_export_phase_is_idle_without_session() {
        let state = AppState::new();
        assert_eq!(state.export_phase(), ExportPhase::Idle);
    }

    #[test]
    fn test_begin_resets_selection() {
        let mut view = LyricsView {
            doc: Some(LyricsDocument::parse("a\nb", "LRCLIB", false)),
            selection: Selection::single(1),
            cursor: 1,
            ..LyricsView::default()
        };
        view.begin(track("x"));
        assert!(view.selection.is_empty());
        assert!(view.doc.is_none());
        assert_eq!(view.cursor, 0);
        assert!(view.loading);
        assert!(view.is_for("x"));
        assert!(!view.is_for("y"));
    }

    #[test]
    fn test_line_at_maps_rows() {
        let view = LyricsView {
            doc: Some(LyricsDocument::parse("a\nb\nc\nd", "LRCLIB", false)),
            scroll_offset: 1,
            area: Some(Rect::new(10, 5, 20, 2)),
            ..LyricsView::default()
        };
        assert_eq!(view.line_at(10, 5), Some(1));
        assert_eq!(view.line_at(29, 6), Some(2));
        assert_eq!(view.line_at(9, 5), None);
        assert_eq!(view.line_at(10, 7), None);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut view = LyricsView {
            doc: Some(LyricsDocument::parse("a\nb\nc", "LRCLIB", false)),
            ..LyricsView::default()
        };
        view.cursor_down(10);
        assert_eq!(view.cursor, 2);
        view.cursor_up(10);
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn test_screen_cycle() {
        let mut s = Screen::Login;
        for _ in 0..4 {
            s = s.next();
        }
        assert_eq!(s, Screen::Login);
        assert_eq!(Screen::Login.prev(), Screen::Help);
    }
}
