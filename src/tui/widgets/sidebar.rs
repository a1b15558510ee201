//! Screen menu on the left edge

use crate::app::state::{AppState, Screen};
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

/// Menu order. Help sits below a blank row.
const ENTRIES: [Screen; 4] = [Screen::Login, Screen::Search, Screen::Lyrics, Screen::Help];

/// List row of `screen`, counting the blank row above Help.
fn row_of(screen: Screen) -> usize {
    match screen {
        Screen::Login => 0,
        Screen::Search => 1,
        Screen::Lyrics => 2,
        Screen::Help => 4,
    }
}

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Menu ")
        .title_style(Style::default().fg(theme.palette.accent));

    let mut items = Vec::with_capacity(ENTRIES.len() + 1);
    for screen in ENTRIES {
        if screen == Screen::Help {
            items.push(ListItem::new(Line::default()));
        }

        let (icon, label) = match screen {
            Screen::Login if state.signed_in => (icons.account, "Signed in"),
            Screen::Login => (icons.account, "Account"),
            Screen::Search => (icons.search, "Search"),
            Screen::Lyrics => (icons.lyrics, "Lyrics"),
            Screen::Help => (icons.help, "Help"),
        };
        let active = screen == state.screen;
        let (marker, icon_style, label_style) = if active {
            (
                icons.selected,
                Style::default().fg(theme.palette.accent),
                Style::default().fg(theme.palette.accent).add_modifier(Modifier::BOLD),
            )
        } else {
            (
                icons.unselected,
                Style::default().fg(theme.palette.muted),
                Style::default().fg(theme.palette.text),
            )
        };

        let mut spans = vec![
            Span::styled(format!("{marker} {icon} "), icon_style),
            Span::styled(label, label_style),
        ];
        // Lyrics shows how many lines are picked so far.
        if screen == Screen::Lyrics && !state.lyrics.selection.is_empty() {
            spans.push(Span::styled(
                format!(" ({})", state.lyrics.selection.len()),
                Style::default().fg(theme.palette.muted),
            ));
        }
        items.push(ListItem::new(Line::from(spans)));
    }

    let mut list_state = ListState::default();
    list_state.select(Some(row_of(state.screen)));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(theme.palette.bg)
            .bg(theme.palette.accent)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(list, area, &mut list_state);
}
