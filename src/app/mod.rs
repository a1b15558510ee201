pub mod actions;
pub mod events;
pub mod state;

use crate::api::{ApiClient, ApiError, LyricsOutcome};
use crate::api::models::Track;
use crate::auth::Credential;
use crate::auth::implicit::AuthorizeRequest;
use crate::config::Config;
use crate::export::fonts::FontBook;
use crate::export::session::CoverRequest;
use crate::export::{CaptureOptions, CardRasterizer, ExportPhase, ExportSession, export_image};
use crate::input;
use crate::selection::{MAX_SELECTED_LINES, Selection};
use crate::tui::{self, TuiTerminal};
use actions::Action;
use anyhow::Context;
use events::{Event, NetworkEvent, RequestFailure};
use image::RgbaImage;
use state::{AppState, LoginState, Screen, SearchFocus, Toast};
use std::sync::Arc;
use tokio::sync::mpsc;

const LIST_HEIGHT: usize = 20;

pub struct App {
    cfg: Config,
    state: AppState,
    /// The only writer of the user's token.
    credential: Credential,
    api: ApiClient,
    http: reqwest::Client,
    rasterizer: CardRasterizer,
}

impl App {
    pub fn new(cfg: Config, credential: Credential) -> anyhow::Result<Self> {
        let api = ApiClient::new(&cfg.proxy.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .context("build reqwest client")?;
        let fonts = FontBook::new(cfg.export.font_files.clone(), cfg.export.font_dirs.clone());

        let mut state = AppState::new();
        state.signed_in = credential.is_authenticated();
        state.screen = if state.signed_in { Screen::Search } else { Screen::Login };
        state.sidebar_selected = screen_to_sidebar(state.screen);

        Ok(Self {
            cfg,
            state,
            credential,
            api,
            http,
            rasterizer: CardRasterizer::new(fonts),
        })
    }

    pub async fn run(&mut self, terminal: &mut TuiTerminal) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.input.mouse);
        // Redraws happen on input and network events only.

        if !self.state.signed_in {
            self.new_authorize_url();
        }

        tui::draw(terminal, &mut self.state)?;

        while let Some(ev) = rx.recv().await {
            match ev {
                Event::Input(input_ev) => {
                    if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                        self.handle_action(action, &tx);
                    }
                }
                Event::Network(ne) => {
                    self.handle_network(ne, &tx);
                }
            }

            if self.state.should_quit {
                break;
            }

            self.state.tick = self.state.tick.wrapping_add(1);
            tui::draw(terminal, &mut self.state)?;
        }

        Ok(())
    }

    fn on_screen_enter(&mut self) {
        if self.state.screen == Screen::Login && !self.state.signed_in && self.state.login.request.is_none() {
            self.new_authorize_url();
        }
    }

    fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        match action {
            Action::SetScreen(_)
            | Action::NextScreen
            | Action::PrevScreen
            | Action::SidebarUp
            | Action::SidebarDown => {
                self.reduce(action);
                self.on_screen_enter();
            }
            Action::StartSearch => self.spawn_search(tx),
            Action::Refresh => match self.state.screen {
                Screen::Search => self.spawn_search(tx),
                Screen::Lyrics => {
                    if let Some(track) = self.state.lyrics.track.clone() {
                        self.open_track(track, tx);
                    }
                }
                Screen::Login => self.new_authorize_url(),
                Screen::Help => {}
            },
            Action::Activate => match self.state.screen {
                Screen::Search => {
                    if let Some(track) = self.state.search_list.selected_track().cloned() {
                        self.open_track(track, tx);
                    }
                }
                Screen::Login => self.submit_redirect(),
                Screen::Lyrics => self.click_line(self.state.lyrics.cursor),
                Screen::Help => {}
            },
            Action::NewAuthorizeUrl => self.new_authorize_url(),
            Action::SubmitRedirect => self.submit_redirect(),
            Action::Logout => self.logout(),
            Action::ToggleLine => self.click_line(self.state.lyrics.cursor),
            Action::ClickLine(index) => {
                self.state.lyrics.cursor = index;
                self.click_line(index);
            }
            Action::ClearSelection => {
                if self.state.export.is_none() {
                    self.state.lyrics.selection = Selection::empty();
                }
            }
            Action::OpenExport => self.open_export(tx),
            Action::ExportNextFont => self.with_export(|s| s.cycle_font(true)),
            Action::ExportPrevFont => self.with_export(|s| s.cycle_font(false)),
            Action::ExportNextBackground => self.with_export(|s| s.cycle_background(true)),
            Action::ExportPrevBackground => self.with_export(|s| s.cycle_background(false)),
            Action::ConfirmExport => self.confirm_export(tx),
            Action::CancelExport => self.cancel_export(),
            _ => self.reduce(action),
        }
    }

    fn reduce(&mut self, action: Action) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::NextScreen => {
                self.set_screen(self.state.screen.next());
            }
            Action::PrevScreen => {
                self.set_screen(self.state.screen.prev());
            }
            Action::SidebarUp => {
                let idx = self.state.sidebar_selected.saturating_sub(1);
                self.set_screen(sidebar_to_screen(idx));
            }
            Action::SidebarDown => {
                let idx = (self.state.sidebar_selected + 1).min(3);
                self.set_screen(sidebar_to_screen(idx));
            }
            Action::SetScreen(screen) => self.set_screen(screen),
            Action::SetSearchFocus(f) => self.state.search_focus = f,
            Action::ListUp => self.move_cursor(-1),
            Action::ListDown => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-10),
            Action::PageDown => self.move_cursor(10),
            Action::GoTop => self.move_cursor(isize::MIN),
            Action::GoBottom => self.move_cursor(isize::MAX),
            Action::InputChar(c) => self.active_input().push(c),
            Action::Backspace => {
                self.active_input().pop();
            }
            Action::ClearInput => self.active_input().clear(),
            Action::Resize => {}
            // Side effects live in handle_action.
            Action::Activate
            | Action::StartSearch
            | Action::Refresh
            | Action::NewAuthorizeUrl
            | Action::SubmitRedirect
            | Action::Logout
            | Action::ToggleLine
            | Action::ClickLine(_)
            | Action::ClearSelection
            | Action::OpenExport
            | Action::ExportNextFont
            | Action::ExportPrevFont
            | Action::ExportNextBackground
            | Action::ExportPrevBackground
            | Action::ConfirmExport
            | Action::CancelExport => {}
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        self.state.screen = screen;
        self.state.sidebar_selected = screen_to_sidebar(screen);
        if screen == Screen::Search && self.state.search_list.items.is_empty() {
            self.state.search_focus = SearchFocus::Input;
        }
    }

    fn active_input(&mut self) -> &mut String {
        match self.state.screen {
            Screen::Login => &mut self.state.login.input,
            _ => &mut self.state.search_query,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.state.screen {
            Screen::Search => {
                let list = &mut self.state.search_list;
                let last = list.items.len().saturating_sub(1);
                list.selected = list.selected.saturating_add_signed(delta).min(last);
                list.update_scroll(LIST_HEIGHT);
            }
            Screen::Lyrics => {
                let view = &mut self.state.lyrics;
                if delta < 0 {
                    view.cursor_up(delta.unsigned_abs());
                } else {
                    view.cursor_down(delta.unsigned_abs());
                }
                let height = view.area.map_or(LIST_HEIGHT, |a| a.height as usize);
                view.update_scroll(height);
            }
            Screen::Login | Screen::Help => {}
        }
    }

    fn with_export(&mut self, f: impl FnOnce(&mut ExportSession)) {
        if let Some(session) = self.state.export.as_mut() {
            f(session);
        }
    }

    // Login

    fn new_authorize_url(&mut self) {
        match AuthorizeRequest::new(&self.cfg.auth) {
            Ok(request) => {
                self.state.login.request = Some(request);
                self.state.login.notice = None;
            }
            Err(e) => {
                self.state.login.request = None;
                self.state.login.notice = Some(e.to_string());
            }
        }
    }

    fn submit_redirect(&mut self) {
        let Some(request) = self.state.login.request.as_ref() else {
            self.state.toast = Some(Toast::error("No login in progress"));
            return;
        };
        match request.complete(&self.state.login.input) {
            Ok(callback) => {
                self.credential.set(callback.token);
                self.state.signed_in = true;
                self.state.login = LoginState {
                    input: callback.clean_url,
                    ..LoginState::default()
                };
                tracing::info!(expires_in = ?callback.expires_in, "signed in");
                self.state.toast = Some(Toast::success("Signed in"));
                self.set_screen(Screen::Search);
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.state.login.notice = Some(e.to_string());
                self.state.toast = Some(Toast::error(e.to_string()));
            }
        }
    }

    fn logout(&mut self) {
        self.credential.clear();
        self.state.signed_in = false;
        self.state.discard_song();
        self.state.search_list.clear();
        self.state.login = LoginState::default();
        self.new_authorize_url();
        self.set_screen(Screen::Login);
        self.state.toast = Some(Toast::success("Signed out"));
    }

    fn require_token(&mut self) -> Option<crate::auth::BearerToken> {
        let token = self.credential.token().cloned();
        if token.is_none() {
            self.state.toast = Some(Toast::error(ApiError::AuthRequired.user_message()));
            self.set_screen(Screen::Login);
            self.on_screen_enter();
        }
        token
    }

    /// A request failed with 401. Only a failure issued under the current
    /// credential logs the user out.
    fn expire_session(&mut self, generation: u64, message: &str) {
        if !self.credential.expire(generation) {
            tracing::debug!(generation, current = self.credential.generation(), "ignoring 401 from an older session");
            return;
        }
        tracing::info!("session expired");
        self.state.signed_in = false;
        self.state.discard_song();
        self.state.search_list.loading = false;
        self.state.login = LoginState::default();
        self.new_authorize_url();
        self.set_screen(Screen::Login);
        self.state.toast = Some(Toast::error(message.to_string()));
    }

    fn report_failure(&mut self, failure: RequestFailure) {
        if failure.auth {
            self.expire_session(failure.generation, &failure.message);
        } else {
            self.state.toast = Some(Toast::error(failure.message.clone()));
            self.state.status = failure.message;
        }
    }

    // Search and lyrics

    fn spawn_search(&mut self, tx: &mpsc::Sender<Event>) {
        if self.state.search_list.loading {
            return;
        }
        let query = self.state.search_query.trim().to_string();
        if query.is_empty() {
            self.state.status = "Type a query first".into();
            return;
        }
        let Some(token) = self.require_token() else {
            return;
        };

        self.state.search_seq += 1;
        let seq = self.state.search_seq;
        let generation = self.credential.generation();

        // A new search discards the open song.
        self.state.discard_song();
        self.state.search_list.clear();
        self.state.search_list.loading = true;
        self.state.status = format!("Searching: {query}");

        let api = self.api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let event = match api.search(&token, &query).await {
                Ok(tracks) => NetworkEvent::SearchResults { seq, query, tracks },
                Err(e) => {
                    tracing::warn!(error = %e, "search failed");
                    NetworkEvent::SearchFailed {
                        seq,
                        failure: RequestFailure::new(&e, generation),
                    }
                }
            };
            let _ = tx.send(Event::Network(event)).await;
        });
    }

    fn open_track(&mut self, track: Track, tx: &mpsc::Sender<Event>) {
        let Some(token) = self.require_token() else {
            return;
        };
        let generation = self.credential.generation();

        // Cleared before the fetch starts so no old line can be selected.
        self.state.export = None;
        self.state.lyrics.begin(track.clone());
        self.set_screen(Screen::Lyrics);
        self.state.status = format!("Loading lyrics: {}", track.title);

        let api = self.api.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let track_id = track.id.clone();
            let event = match api.lyrics(&token, &track).await {
                Ok(LyricsOutcome::Found(doc)) => NetworkEvent::LyricsLoaded { track_id, doc },
                Ok(LyricsOutcome::NotFound { message }) => NetworkEvent::LyricsNotFound { track_id, message },
                Err(e) => {
                    tracing::warn!(error = %e, track = %track.id, "lyrics failed");
                    NetworkEvent::LyricsFailed {
                        track_id,
                        failure: RequestFailure::new(&e, generation),
                    }
                }
            };
            let _ = tx.send(Event::Network(event)).await;
        });
    }

    fn click_line(&mut self, index: usize) {
        if self.state.export.is_some() || index >= self.state.lyrics.line_count() {
            return;
        }
        match self.state.lyrics.selection.apply_click(index, MAX_SELECTED_LINES) {
            Ok(next) => self.state.lyrics.selection = next,
            Err(e) => self.state.toast = Some(Toast::error(e.to_string())),
        }
    }

    // Export

    fn open_export(&mut self, tx: &mpsc::Sender<Event>) {
        if self.state.export.is_some() {
            return;
        }
        let view = &self.state.lyrics;
        let (Some(track), Some(doc)) = (view.track.as_ref(), view.doc.as_ref()) else {
            self.state.toast = Some(Toast::error("Open a song with lyrics first"));
            return;
        };
        match ExportSession::open(track, doc, &view.selection) {
            Ok(session) => {
                let cover = session.cover_request();
                self.state.export = Some(session);
                if let Some(req) = cover {
                    self.spawn_cover(req, tx);
                }
            }
            Err(e) => self.state.toast = Some(Toast::error(e.to_string())),
        }
    }

    fn spawn_cover(&self, req: CoverRequest, tx: &mpsc::Sender<Event>) {
        let http = self.http.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let cover = match fetch_cover(&http, &req.url).await {
                Ok(img) => Some(Arc::new(img)),
                Err(e) => {
                    tracing::warn!(url = %req.url, "cover unavailable: {e:#}");
                    None
                }
            };
            let _ = tx
                .send(Event::Network(NetworkEvent::CoverLoaded { key: req.key, cover }))
                .await;
        });
    }

    fn confirm_export(&mut self, tx: &mpsc::Sender<Event>) {
        let Some(session) = self.state.export.as_mut() else {
            return;
        };
        let target = match session.begin_capture() {
            Ok(target) => target,
            Err(e) => {
                self.state.toast = Some(Toast::error(e.to_string()));
                return;
            }
        };

        self.state.status = "Exporting...".into();
        let rasterizer = self.rasterizer.clone();
        let out_dir = self.cfg.export.output_dir.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                export_image(&rasterizer, Some(&target), &CaptureOptions::default(), &out_dir)
            })
            .await
            .map_err(|e| format!("export task failed: {e}"))
            .and_then(|r| r.map_err(|e| e.to_string()));
            let _ = tx.send(Event::Network(NetworkEvent::ExportFinished { result })).await;
        });
    }

    fn cancel_export(&mut self) {
        match self.state.export.as_ref().map(ExportSession::phase) {
            Some(ExportPhase::Capturing) => self.state.status = "Export in progress".into(),
            Some(_) => self.state.export = None,
            None => {}
        }
    }

    fn handle_network(&mut self, ne: NetworkEvent, tx: &mpsc::Sender<Event>) {
        match ne {
            NetworkEvent::SearchResults { seq, query, tracks } => {
                if seq != self.state.search_seq {
                    tracing::debug!(seq, current = self.state.search_seq, "dropping stale search results");
                    return;
                }
                self.state.search_list.set_tracks(tracks);
                self.state.last_search = Some(query);
                if self.state.search_list.items.is_empty() {
                    self.state.status = "No tracks found".into();
                } else {
                    self.state.status = format!("Results: {}", self.state.search_list.items.len());
                    self.state.search_focus = SearchFocus::Results;
                }
            }
            NetworkEvent::SearchFailed { seq, failure } => {
                if seq != self.state.search_seq {
                    return;
                }
                self.state.search_list.loading = false;
                self.report_failure(failure);
            }
            NetworkEvent::LyricsLoaded { track_id, doc } => {
                let view = &mut self.state.lyrics;
                if !view.is_for(&track_id) || !view.loading {
                    return;
                }
                self.state.status = format!("{} lines", doc.len());
                view.doc = Some(doc);
                view.loading = false;
                view.cursor = 0;
                view.scroll_offset = 0;
            }
            NetworkEvent::LyricsNotFound { track_id, message } => {
                let view = &mut self.state.lyrics;
                if view.is_for(&track_id) && view.loading {
                    view.loading = false;
                    view.notice = Some(message);
                }
            }
            NetworkEvent::LyricsFailed { track_id, failure } => {
                let current = self.state.lyrics.is_for(&track_id) && self.state.lyrics.loading;
                if current {
                    self.state.lyrics.loading = false;
                    self.state.lyrics.notice = Some(failure.message.clone());
                }
                // A 401 matters even for a song the user moved away from.
                if current || failure.auth {
                    self.report_failure(failure);
                }
            }
            NetworkEvent::CoverLoaded { key, cover } => {
                if let Some(session) = self.state.export.as_mut() {
                    let failed = cover.is_none();
                    if session.cover_loaded(key, cover) && failed {
                        self.state.toast = Some(Toast::error("Cover art unavailable, exporting without it"));
                    }
                }
            }
            NetworkEvent::ExportFinished { result } => match result {
                Ok(image) => {
                    self.state.export = None;
                    self.state.status = format!("Saved {}", image.path.display());
                    self.state.toast = Some(Toast::success(format!("Saved {}", image.file_name)));
                    self.state.last_export = Some(image.path);
                }
                Err(message) => {
                    tracing::error!(%message, "export failed");
                    let retry = self.state.export.as_mut().and_then(|session| {
                        session.capture_failed();
                        session.cover_request()
                    });
                    if let Some(req) = retry {
                        self.spawn_cover(req, tx);
                    }
                    self.state.toast = Some(Toast::error(format!("Export failed: {message}")));
                }
            },
        }
    }
}

pub async fn fetch_cover(http: &reqwest::Client, url: &str) -> anyhow::Result<RgbaImage> {
    let bytes = http
        .get(url)
        .send()
        .await
        .context("request cover")?
        .error_for_status()
        .context("cover status")?
        .bytes()
        .await
        .context("read cover")?;
    let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|i| i.to_rgba8()))
        .await
        .context("decode task")?
        .context("decode cover")?;
    Ok(image)
}

fn sidebar_to_screen(idx: usize) -> Screen {
    match idx {
        0 => Screen::Login,
        1 => Screen::Search,
        2 => Screen::Lyrics,
        _ => Screen::Help,
    }
}

fn screen_to_sidebar(screen: Screen) -> usize {
    match screen {
        Screen::Login => 0,
        Screen::Search => 1,
        Screen::Lyrics => 2,
        Screen::Help => 3,
    }
}
