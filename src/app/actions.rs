use super::state::{Screen, SearchFocus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextScreen,
    PrevScreen,
    SetScreen(Screen),
    SetSearchFocus(SearchFocus),

    SidebarUp,
    SidebarDown,
    ListUp,
    ListDown,
    GoTop,
    GoBottom,
    PageUp,
    PageDown,
    Activate,

    InputChar(char),
    Backspace,
    ClearInput,
    StartSearch,
    Refresh,

    // Login
    NewAuthorizeUrl,
    SubmitRedirect,
    Logout,

    // Lyrics
    ToggleLine,
    ClickLine(usize),
    ClearSelection,
    OpenExport,

    // Export modal
    ExportNextFont,
    ExportPrevFont,
    ExportNextBackground,
    ExportPrevBackground,
    ConfirmExport,
    CancelExport,

    Resize,
}
