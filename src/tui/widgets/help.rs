//! Help screen showing keybindings

use crate::selection::MAX_SELECTED_LINES;
use crate::tui::theme::get_theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the help screen
pub fn render(frame: &mut Frame, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Keybinds ", icons.help))
        .title_style(Style::default().fg(theme.palette.accent));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Split into columns
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    // Left column - Navigation & Lyrics
    let left_content = vec![
        section_header("Navigation", &theme),
        keybind("j / Down", "Move down", &theme),
        keybind("k / Up", "Move up", &theme),
        keybind("g / G", "Top / bottom", &theme),
        keybind("Ctrl+d / u", "Page down / up", &theme),
        keybind("h / l", "Previous / next menu item", &theme),
        keybind("Tab", "Next screen", &theme),
        keybind("1-3", "Account / Search / Lyrics", &theme),
        keybind("?", "This screen", &theme),
        Line::default(),
        section_header("Lyrics", &theme),
        keybind("Space", "Select / deselect line", &theme),
        keybind("Click", "Select / deselect line", &theme),
        keybind("c", "Clear selection", &theme),
        keybind("e", "Export selection", &theme),
        keybind("Esc", "Back to search", &theme),
        Line::default(),
        section_header("Export", &theme),
        keybind("f / F", "Next / previous font", &theme),
        keybind("b / B", "Next / previous background", &theme),
        keybind("Enter", "Save image", &theme),
        keybind("Esc", "Cancel", &theme),
    ];

    let left_para = Paragraph::new(left_content).wrap(Wrap { trim: false });
    frame.render_widget(left_para, cols[0]);

    // Right column - Search & Account
    let right_content = vec![
        section_header("Search", &theme),
        keybind("Enter", "Search / open song", &theme),
        keybind("Ctrl+u", "Clear input", &theme),
        keybind("Down", "Focus results", &theme),
        keybind("/ or i", "Return to search bar", &theme),
        Line::default(),
        section_header("Account", &theme),
        keybind("Ctrl+o", "New login URL", &theme),
        keybind("Enter", "Submit pasted redirect", &theme),
        keybind("Ctrl+x", "Sign out", &theme),
        Line::default(),
        section_header("General", &theme),
        keybind("q", "Quit application", &theme),
        keybind("Ctrl+r", "Refresh current screen", &theme),
        keybind("Esc", "Quit", &theme),
        Line::default(),
        Line::from(Span::styled(
            format!("  Up to {} adjacent lines per export", MAX_SELECTED_LINES),
            Style::default().fg(theme.palette.muted),
        )),
    ];

    let right_para = Paragraph::new(right_content).wrap(Wrap { trim: false });
    frame.render_widget(right_para, cols[1]);
}

fn section_header(title: &str, theme: &crate::tui::theme::Theme) -> Line<'static> {
    Line::from(vec![Span::styled(
        format!("━━ {} ━━", title),
        Style::default()
            .fg(theme.palette.accent)
            .add_modifier(Modifier::BOLD),
    )])
}

fn keybind(key: &str, desc: &str, theme: &crate::tui::theme::Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            format!("{:12}", key),
            Style::default()
                .fg(theme.palette.highlight)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(theme.palette.text)),
    ])
}
