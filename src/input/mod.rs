use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::{AppState, Screen, SearchFocus};
use crate::export::ExportPhase;
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use tokio::sync::mpsc;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                match event::read() {
                    Ok(CtEvent::Key(k)) => {
                        if k.kind == KeyEventKind::Press
                            && tx.blocking_send(Event::Input(InputEvent::Key(k))).is_err()
                        {
                            break;
                        }
                    }
                    Ok(CtEvent::Mouse(m)) if mouse_enabled => {
                        if tx.blocking_send(Event::Input(InputEvent::Mouse(m))).is_err() {
                            break;
                        }
                    }
                    Ok(CtEvent::Resize(_, _)) => {
                        if tx.blocking_send(Event::Input(InputEvent::Resize)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(_) => {}
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => match m.kind {
            MouseEventKind::ScrollUp => Some(Action::ListUp),
            MouseEventKind::ScrollDown => Some(Action::ListDown),
            MouseEventKind::Down(MouseButton::Left)
                if state.screen == Screen::Lyrics && state.export_phase() == ExportPhase::Idle =>
            {
                state.lyrics.line_at(m.column, m.row).map(Action::ClickLine)
            }
            _ => None,
        },
        InputEvent::Key(k) => {
            // The export modal swallows every key while open.
            if state.export_phase() != ExportPhase::Idle {
                return handle_export_modal(k);
            }
            match state.screen {
                Screen::Login => handle_login_screen(k),
                Screen::Search => handle_search_screen(state, k),
                Screen::Lyrics => handle_lyrics_screen(k),
                Screen::Help => handle_common(k),
            }
        }
    }
}

fn ctrl(k: &KeyEvent, c: char) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char(c)
}

/// Navigation keys shared by the list screens.
fn handle_common(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Quit),

        KeyCode::Up | KeyCode::Char('k') => Some(Action::ListUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ListDown),
        KeyCode::Char('g') => Some(Action::GoTop),
        KeyCode::Char('G') => Some(Action::GoBottom),
        KeyCode::Char('d') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageDown),
        KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::PageUp),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),

        KeyCode::Left | KeyCode::Char('h') => Some(Action::SidebarUp),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::SidebarDown),

        KeyCode::Tab => Some(Action::NextScreen),
        KeyCode::BackTab => Some(Action::PrevScreen),
        KeyCode::Char('1') => Some(Action::SetScreen(Screen::Login)),
        KeyCode::Char('2') => Some(Action::SetScreen(Screen::Search)),
        KeyCode::Char('3') => Some(Action::SetScreen(Screen::Lyrics)),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::SetScreen(Screen::Help)),

        KeyCode::Enter => Some(Action::Activate),
        KeyCode::Char('r') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Refresh),
        KeyCode::F(5) => Some(Action::Refresh),

        _ => None,
    }
}

fn handle_login_screen(k: KeyEvent) -> Option<Action> {
    if ctrl(&k, 'o') {
        return Some(Action::NewAuthorizeUrl);
    }
    if ctrl(&k, 'x') {
        return Some(Action::Logout);
    }
    if ctrl(&k, 'u') {
        return Some(Action::ClearInput);
    }
    match k.code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Tab => Some(Action::NextScreen),
        KeyCode::BackTab => Some(Action::PrevScreen),
        KeyCode::Enter => Some(Action::SubmitRedirect),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::F(5) => Some(Action::NewAuthorizeUrl),
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        _ => None,
    }
}

fn handle_search_screen(state: &AppState, k: KeyEvent) -> Option<Action> {
    match state.search_focus {
        SearchFocus::Input => match k.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab => Some(Action::NextScreen),
            KeyCode::BackTab => Some(Action::PrevScreen),
            KeyCode::Enter => Some(Action::StartSearch),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Down if !state.search_list.items.is_empty() => {
                Some(Action::SetSearchFocus(SearchFocus::Results))
            }
            KeyCode::Left => Some(Action::SidebarUp),
            KeyCode::Right => Some(Action::SidebarDown),
            KeyCode::F(5) => Some(Action::Refresh),
            KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::ClearInput),
            KeyCode::Char(c) => Some(Action::InputChar(c)),
            _ => None,
        },
        SearchFocus::Results => match k.code {
            KeyCode::Esc | KeyCode::Char('/') | KeyCode::Char('i') => {
                Some(Action::SetSearchFocus(SearchFocus::Input))
            }
            _ => handle_common(k),
        },
    }
}

fn handle_lyrics_screen(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc => Some(Action::SetScreen(Screen::Search)),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::ToggleLine),
        KeyCode::Char('c') => Some(Action::ClearSelection),
        KeyCode::Char('e') | KeyCode::Char('x') => Some(Action::OpenExport),
        _ => handle_common(k),
    }
}

fn handle_export_modal(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('f') | KeyCode::Right => Some(Action::ExportNextFont),
        KeyCode::Char('F') | KeyCode::Left => Some(Action::ExportPrevFont),
        KeyCode::Char('b') | KeyCode::Down => Some(Action::ExportNextBackground),
        KeyCode::Char('B') | KeyCode::Up => Some(Action::ExportPrevBackground),
        KeyCode::Enter | KeyCode::Char('s') => Some(Action::ConfirmExport),
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::CancelExport),
        _ => None,
    }
}
