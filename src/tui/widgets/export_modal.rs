//! Export modal drawn over the Lyrics screen

use super::truncate_str;
use crate::app::state::AppState;
use crate::export::{ExportPhase, ExportSession};
use crate::tui::theme::{LoadingSpinner, Theme, get_theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let Some(session) = state.export.as_ref() else {
        return;
    };
    let theme = get_theme();

    let height = (session.snippet().lines.len() as u16 + 13).min(area.height);
    let modal = centered_rect(area, 60.min(area.width), height);
    frame.render_widget(Clear, modal);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent))
        .title(format!(" {} Export ", theme.icons.download))
        .title_style(Style::default().fg(theme.palette.accent).add_modifier(Modifier::BOLD));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4), Constraint::Length(2)])
        .split(inner);

    render_preview(frame, session, rows[0]);
    render_options(frame, session, &theme, rows[1]);
    render_footer(frame, state.export_phase(), state.tick, &theme, rows[2]);
}

fn render_preview(frame: &mut Frame, session: &ExportSession, area: Rect) {
    let snippet = session.snippet();
    let (from, _) = snippet.background.stops();
    let card_bg = Color::Rgb(from[0], from[1], from[2]);
    let [r, g, b, _] = snippet.background.text_color().0;
    let fg = Color::Rgb(r, g, b);
    let width = area.width.saturating_sub(2) as usize;

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_str(&snippet.title, width),
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(truncate_str(&snippet.artist, width), Style::default().fg(fg))),
        Line::default(),
    ];
    lines.extend(snippet.lines.iter().map(|l| {
        Line::from(Span::styled(
            truncate_str(l, width),
            Style::default().fg(fg).add_modifier(Modifier::BOLD),
        ))
    }));
    lines.push(Line::from(Span::styled(
        snippet.attribution(),
        Style::default().fg(fg).add_modifier(Modifier::ITALIC),
    )));

    let preview = Paragraph::new(lines).style(Style::default().bg(card_bg));
    frame.render_widget(preview, area);
}

fn render_options(frame: &mut Frame, session: &ExportSession, theme: &Theme, area: Rect) {
    let config = session.config();
    let label = Style::default().fg(theme.palette.muted);
    let value = Style::default().fg(theme.palette.accent).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::default(),
        Line::from(vec![
            Span::styled("Font        ", label),
            Span::styled(format!("‹ {} ›", config.font.label()), value),
            Span::styled("  f/F", label),
        ]),
        Line::from(vec![
            Span::styled("Background  ", label),
            Span::styled(format!("‹ {} ›", config.background.label()), value),
            Span::styled("  b/B", label),
        ]),
        Line::from(vec![
            Span::styled("Cover       ", label),
            Span::styled(if session.cover().is_some() { "yes" } else { "none" }, value),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_footer(frame: &mut Frame, phase: ExportPhase, tick: u64, theme: &Theme, area: Rect) {
    let status = match phase {
        ExportPhase::Configuring => format!("{} Loading cover art...", LoadingSpinner::frame(tick)),
        ExportPhase::Ready => "Enter saves the image · Esc cancels".to_string(),
        ExportPhase::Capturing => format!("{} Rendering...", LoadingSpinner::frame(tick)),
        ExportPhase::Idle => String::new(),
    };
    let footer = Paragraph::new(vec![Line::default(), Line::from(status)])
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.palette.muted));
    frame.render_widget(footer, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
