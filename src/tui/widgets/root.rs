//! Root layout widget - orchestrates main layout structure

use crate::app::state::{AppState, Screen, ToastKind};
use crate::export::ExportPhase;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{export_modal, help, login, lyrics, sidebar, track_list, truncate_str};

/// Main layout structure:
/// ┌──────────┬─────────────────────────────────────────┐
/// │  Menu    │           Main Content                  │
/// │          │      (Account/Search/Lyrics/Help)       │
/// │  Account │                                         │
/// │  Search  │          ┌──────────────┐               │
/// │  Lyrics  │          │ Export modal │               │
/// │          │          └──────────────┘               │
/// │  Help    │                                         │
/// ├──────────┴─────────────────────────────────────────┤
/// │ status                                   toast     │
/// └────────────────────────────────────────────────────┘
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let root = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),    // Sidebar + content
            Constraint::Length(1), // Status bar
        ])
        .split(root);

    let top_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20), // Sidebar menu
            Constraint::Min(40),    // Main content area
        ])
        .split(rows[0]);

    sidebar::render(frame, state, top_cols[0]);
    render_main_content(frame, state, top_cols[1]);
    render_status_bar(frame, state, rows[1]);

    if state.export_phase() != ExportPhase::Idle {
        export_modal::render(frame, state, top_cols[1]);
    }
}

/// Render the main content area based on current screen
fn render_main_content(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let title = match state.screen {
        Screen::Login => format!(" {} Account ", icons.account),
        Screen::Search => format!(" {} Search ", icons.search),
        Screen::Lyrics => format!(" {} Lyrics ", icons.lyrics),
        Screen::Help => format!(" {} Help ", icons.help),
    };

    let main = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(title)
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = main.inner(area);
    frame.render_widget(main, area);

    // Mouse mapping is only valid while the lines are on screen.
    if state.screen != Screen::Lyrics {
        state.lyrics.area = None;
    }

    match state.screen {
        Screen::Login => login::render(frame, state, inner),
        Screen::Search => {
            let sub = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(3)])
                .split(inner);
            track_list::render_search_box(frame, state, sub[0]);
            track_list::render(frame, state, sub[1]);
        }
        Screen::Lyrics => lyrics::render(frame, state, inner),
        Screen::Help => help::render(frame, inner),
    }
}

/// One-line bar: status text on the left, toast on the right.
fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let mut left = state.status.clone();
    if state.screen == Screen::Lyrics && !state.lyrics.selection.is_empty() {
        left = format!("{} selected  {left}", state.lyrics.selection.len());
    }
    if let Some(path) = &state.last_export
        && left.is_empty()
    {
        left = format!("Last export: {}", path.display());
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", truncate_str(&left, cols[0].width.saturating_sub(1) as usize)),
            Style::default().fg(theme.palette.muted),
        ))),
        cols[0],
    );

    if let Some(toast) = &state.toast
        && !toast.is_expired()
    {
        let (prefix, color) = match toast.kind {
            ToastKind::Success => (icons.success, theme.palette.accent),
            ToastKind::Error => (icons.error, theme.palette.error),
        };
        let toast_line = Line::from(vec![
            Span::styled(format!("{} ", prefix), Style::default().fg(color)),
            Span::styled(
                truncate_str(&toast.message, cols[1].width.saturating_sub(3) as usize),
                Style::default().fg(color),
            ),
        ])
        .right_aligned();
        frame.render_widget(Paragraph::new(toast_line), cols[1]);
    }
}
