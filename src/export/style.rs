//! Font and background palettes for exported cards.

use image::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnippetFont {
    #[default]
    Sans,
    Serif,
    Mono,
    Condensed,
}

impl SnippetFont {
    pub const ALL: [SnippetFont; 4] = [
        SnippetFont::Sans,
        SnippetFont::Serif,
        SnippetFont::Mono,
        SnippetFont::Condensed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SnippetFont::Sans => "Sans",
            SnippetFont::Serif => "Serif",
            SnippetFont::Mono => "Mono",
            SnippetFont::Condensed => "Condensed",
        }
    }

    /// Well-known font file names, most preferred first.
    pub fn file_candidates(self) -> &'static [&'static str] {
        match self {
            SnippetFont::Sans => &[
                "DejaVuSans.ttf",
                "LiberationSans-Regular.ttf",
                "NotoSans-Regular.ttf",
                "Arial.ttf",
                "arial.ttf",
            ],
            SnippetFont::Serif => &[
                "DejaVuSerif.ttf",
                "LiberationSerif-Regular.ttf",
                "NotoSerif-Regular.ttf",
                "Georgia.ttf",
                "times.ttf",
            ],
            SnippetFont::Mono => &[
                "DejaVuSansMono.ttf",
                "LiberationMono-Regular.ttf",
                "NotoSansMono-Regular.ttf",
                "Courier New.ttf",
                "cour.ttf",
            ],
            SnippetFont::Condensed => &[
                "DejaVuSansCondensed.ttf",
                "LiberationSansNarrow-Regular.ttf",
                "Arial Narrow.ttf",
                "ARIALN.TTF",
            ],
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Background {
    #[default]
    Sunset,
    Ocean,
    Forest,
    Midnight,
    Candy,
}

impl Background {
    pub const ALL: [Background; 5] = [
        Background::Sunset,
        Background::Ocean,
        Background::Forest,
        Background::Midnight,
        Background::Candy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Background::Sunset => "Sunset",
            Background::Ocean => "Ocean",
            Background::Forest => "Forest",
            Background::Midnight => "Midnight",
            Background::Candy => "Candy",
        }
    }

    /// Top-left and bottom-right gradient stops.
    pub fn stops(self) -> ([u8; 3], [u8; 3]) {
        match self {
            Background::Sunset => ([0xff, 0x7e, 0x5f], [0xfe, 0xb4, 0x7b]),
            Background::Ocean => ([0x2b, 0x58, 0x76], [0x4e, 0x43, 0x76]),
            Background::Forest => ([0x13, 0x4e, 0x5e], [0x71, 0xb2, 0x80]),
            Background::Midnight => ([0x0f, 0x20, 0x27], [0x2c, 0x53, 0x64]),
            Background::Candy => ([0xd3, 0x95, 0xff], [0xff, 0x9a, 0xc6]),
        }
    }

    pub fn text_color(self) -> Rgba<u8> {
        match self {
            Background::Sunset | Background::Candy => Rgba([0x1d, 0x1d, 0x1f, 0xff]),
            _ => Rgba([0xff, 0xff, 0xff, 0xff]),
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

/// Styling chosen in the export modal. Reset on every new export session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnippetConfig {
    pub font: SnippetFont,
    pub background: Background,
}
