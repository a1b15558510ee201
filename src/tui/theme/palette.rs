//! Screen colours. Grayscale, so the lyric card preview is the only colour on screen.

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub text: Color,
    /// Secondary text: artists, hints, the status bar.
    pub muted: Color,
    pub accent: Color,
    /// Query matches in the result list.
    pub highlight: Color,
    /// Background of selected lyric lines.
    pub selection: Color,
    pub border: Color,
    pub error: Color,
}

impl Palette {
    pub const GRAYSCALE: Self = Self {
        bg: Color::Rgb(0, 0, 0),
        text: Color::Rgb(255, 255, 255),
        muted: Color::Rgb(136, 136, 136),
        accent: Color::Rgb(255, 255, 255),
        highlight: Color::Rgb(200, 200, 200),
        selection: Color::Rgb(224, 224, 224),
        border: Color::Rgb(64, 64, 64),
        // Errors are told apart by their icon.
        error: Color::Rgb(255, 255, 255),
    };
}

impl Default for Palette {
    fn default() -> Self {
        Self::GRAYSCALE
    }
}
