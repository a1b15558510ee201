//! Lyrics screen: the open song's lines with cursor and selection markers

use super::truncate_str;
use crate::app::state::AppState;
use crate::selection::MAX_SELECTED_LINES;
use crate::tui::theme::{LoadingSpinner, get_theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let Some(track) = state.lyrics.track.as_ref() else {
        state.lyrics.area = None;
        let empty = Paragraph::new(Line::from("Pick a song on the Search screen"))
            .style(Style::default().fg(theme.palette.muted));
        frame.render_widget(empty, area);
        return;
    };

    let header = Line::from(vec![
        Span::styled(
            format!("{} {}", icons.music, track.title),
            Style::default().fg(theme.palette.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", track.artist),
            Style::default().fg(theme.palette.muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let body = rows[1];
    let view = &mut state.lyrics;

    if view.loading {
        view.area = None;
        let spinner = LoadingSpinner::frame(state.tick);
        let loading = Paragraph::new(Line::from(format!("{spinner} Loading lyrics...")))
            .style(Style::default().fg(theme.palette.muted));
        frame.render_widget(loading, body);
        return;
    }

    if view.doc.is_none() {
        view.area = None;
        let msg = view.notice.as_deref().unwrap_or("No lyrics available");
        let notice = Paragraph::new(Line::from(msg))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.palette.muted));
        frame.render_widget(notice, body);
        return;
    }

    // One terminal row per line so clicks map straight to indices.
    view.area = Some(body);
    view.update_scroll(body.height as usize);
    let view = &state.lyrics;
    let Some(doc) = view.doc.as_ref() else {
        return;
    };

    let max_width = body.width.saturating_sub(4) as usize;
    let lines: Vec<Line> = doc
        .lines
        .iter()
        .enumerate()
        .skip(view.scroll_offset)
        .take(body.height as usize)
        .map(|(i, text)| {
            let selected = view.selection.contains(i);
            let at_cursor = i == view.cursor;

            let marker = if selected { icons.selected } else { " " };
            let mut style = if selected {
                Style::default().fg(theme.palette.bg).bg(theme.palette.selection)
            } else {
                Style::default().fg(theme.palette.text)
            };
            if at_cursor {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }

            let shown = if text.trim().is_empty() { "·" } else { text.as_str() };
            Line::from(vec![
                Span::styled(format!("{marker} "), Style::default().fg(theme.palette.accent)),
                Span::styled(truncate_str(shown, max_width), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), body);

    // Selection counter in the top-right corner
    let counter = format!("{}/{} lines", view.selection.len(), MAX_SELECTED_LINES);
    let len = counter.len() as u16;
    let x = rows[0].x + rows[0].width.saturating_sub(len);
    if x > rows[0].x {
        frame.render_widget(
            Paragraph::new(counter).style(Style::default().fg(theme.palette.muted)),
            Rect::new(x, rows[0].y, len, 1),
        );
    }
}
