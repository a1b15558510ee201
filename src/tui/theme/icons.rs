//! Nerd Font icons for TUI display
//! Requires a Nerd Font to be installed (https://www.nerdfonts.com)

/// Icon set using Nerd Font glyphs
#[derive(Debug, Clone)]
pub struct Icons {
    // Navigation
    pub account: &'static str,
    pub search: &'static str,
    pub lyrics: &'static str,
    pub help: &'static str,

    // Status
    pub success: &'static str,
    pub error: &'static str,

    // Content
    pub music: &'static str,
    pub download: &'static str,

    // Selection
    pub selected: &'static str,
    pub unselected: &'static str,
}

impl Icons {
    /// Nerd Font icon set
    pub const fn nerd() -> Self {
        Self {
            account: "\u{f007}",        // nf-fa-user
            search: "\u{f002}",         // nf-fa-search
            lyrics: "\u{f15c}",         // nf-fa-file_text_o
            help: "\u{f059}",           // nf-fa-question_circle

            success: "\u{f00c}",        // nf-fa-check
            error: "\u{f00d}",          // nf-fa-times

            music: "\u{f001}",          // nf-fa-music
            download: "\u{f019}",       // nf-fa-download

            selected: "\u{f054}",       // nf-fa-chevron_right
            unselected: " ",
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self::nerd()
    }
}

/// Loading spinner frames
pub struct LoadingSpinner;

impl LoadingSpinner {
    /// Braille-based smooth spinner
    pub const BRAILLE: [&'static str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

    pub fn frame(tick: u64) -> &'static str {
        let idx = (tick / 4) as usize % Self::BRAILLE.len();
        Self::BRAILLE[idx]
    }
}
