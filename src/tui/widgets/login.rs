//! Account screen: authorize URL and the redirect paste box

use super::truncate_str;
use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(area);

    let status = if state.signed_in {
        Line::from(vec![
            Span::styled(format!("{} ", icons.success), Style::default().fg(theme.palette.accent)),
            Span::styled(
                "Signed in. Ctrl+x signs out.",
                Style::default().fg(theme.palette.text).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "Open the URL below in a browser, approve, then paste the address you land on.",
            Style::default().fg(theme.palette.text),
        ))
    };
    frame.render_widget(Paragraph::new(status), rows[0]);

    let url_text = match &state.login.request {
        Some(req) => req.url.as_str(),
        None => "Press Ctrl+o to create a login URL",
    };
    let url_block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Authorize URL ")
        .title_style(Style::default().fg(theme.palette.accent));
    let url = Paragraph::new(url_text)
        .style(Style::default().fg(theme.palette.muted))
        .wrap(Wrap { trim: false })
        .block(url_block);
    frame.render_widget(url, rows[1]);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.accent))
        .title(" Redirect URL ")
        .title_style(Style::default().fg(theme.palette.accent));
    let width = rows[2].width.saturating_sub(3) as usize;
    // Show the tail; pasted URLs are longer than the box.
    let chars = state.login.input.chars().count();
    let shown: String = state.login.input.chars().skip(chars.saturating_sub(width)).collect();
    let input = Paragraph::new(Line::from(format!("{shown}▏")))
        .style(Style::default().fg(theme.palette.text))
        .block(input_block);
    frame.render_widget(input, rows[2]);

    if let Some(notice) = &state.login.notice {
        let line = Line::from(vec![
            Span::styled(format!("{} ", icons.error), Style::default().fg(theme.palette.error)),
            Span::styled(
                truncate_str(notice, rows[3].width.saturating_sub(3) as usize),
                Style::default().fg(theme.palette.error),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), rows[3]);
    }
}
