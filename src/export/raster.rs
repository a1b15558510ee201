//! Turning a composed snippet into pixels.
//!
//! [`Rasterizer`] is the capture capability; [`CardRasterizer`] is the
//! built-in implementation that draws the card with `image` and `ab_glyph`.

use super::ExportError;
use super::fonts::FontBook;
use super::snippet::{Snippet, export_file_name};
use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Capture settings. The defaults are what every export uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Device pixels per layout point.
    pub pixel_ratio: u32,
    /// Fill behind the card; transparent so rounded corners stay clear.
    pub fill: Rgba<u8>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 2,
            fill: Rgba([0, 0, 0, 0]),
        }
    }
}

/// The fully laid out region to capture: snippet plus a loaded cover, if any.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub snippet: Snippet,
    pub cover: Option<Arc<RgbaImage>>,
}

pub trait Rasterizer {
    fn capture(&self, target: &RenderTarget, options: &CaptureOptions) -> Result<RgbaImage, ExportError>;
}

#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Capture `target` and write it as PNG into `out_dir`.
///
/// The file is written under a `.part` name and renamed at the end, so a
/// failed export never leaves a partial image behind.
pub fn export_image<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    target: Option<&RenderTarget>,
    options: &CaptureOptions,
    out_dir: &Path,
) -> Result<ExportedImage, ExportError> {
    let target = target.ok_or(ExportError::MissingTarget)?;
    let bitmap = rasterizer.capture(target, options)?;

    std::fs::create_dir_all(out_dir).map_err(|e| ExportError::Io {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let file_name = export_file_name(&target.snippet.title);
    let path = out_dir.join(&file_name);
    let part = out_dir.join(format!("{file_name}.part"));

    if let Err(e) = bitmap.save_with_format(&part, ImageFormat::Png) {
        let _ = std::fs::remove_file(&part);
        return Err(e.into());
    }
    if let Err(e) = std::fs::rename(&part, &path) {
        let _ = std::fs::remove_file(&part);
        return Err(ExportError::Io { path, source: e });
    }

    tracing::info!(path = %path.display(), width = bitmap.width(), height = bitmap.height(), "exported snippet");
    Ok(ExportedImage {
        path,
        file_name,
        width: bitmap.width(),
        height: bitmap.height(),
    })
}

// Card layout, in points.
const CARD_WIDTH: f32 = 540.0;
const PADDING: f32 = 32.0;
const RADIUS: f32 = 24.0;
const COVER_SIZE: f32 = 56.0;
const COVER_GAP: f32 = 14.0;
const TITLE_SIZE: f32 = 20.0;
const ARTIST_SIZE: f32 = 15.0;
const LYRIC_SIZE: f32 = 24.0;
const LYRIC_LINE_HEIGHT: f32 = 34.0;
const FOOTER_SIZE: f32 = 13.0;
const SECTION_GAP: f32 = 24.0;

#[derive(Debug, Clone)]
pub struct CardRasterizer {
    fonts: FontBook,
}

impl CardRasterizer {
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }
}

impl Rasterizer for CardRasterizer {
    fn capture(&self, target: &RenderTarget, options: &CaptureOptions) -> Result<RgbaImage, ExportError> {
        if target.snippet.lines.is_empty() {
            return Err(ExportError::Render("no lines to draw".into()));
        }
        let font = self.fonts.load(target.snippet.font)?;
        Ok(draw_card(&font, target, options))
    }
}

fn draw_card(font: &FontVec, target: &RenderTarget, options: &CaptureOptions) -> RgbaImage {
    let snippet = &target.snippet;
    let s = options.pixel_ratio.max(1) as f32;
    let text_color = snippet.background.text_color();

    let content_width = (CARD_WIDTH - 2.0 * PADDING) * s;
    let wrapped: Vec<String> = snippet
        .lines
        .iter()
        .flat_map(|line| wrap_text(font, LYRIC_SIZE * s, line, content_width))
        .collect();

    let height = PADDING
        + COVER_SIZE
        + SECTION_GAP
        + wrapped.len() as f32 * LYRIC_LINE_HEIGHT
        + SECTION_GAP
        + FOOTER_SIZE * 1.4
        + PADDING;
    let (w, h) = ((CARD_WIDTH * s).round() as u32, (height * s).round() as u32);

    let mut canvas = RgbaImage::from_pixel(w, h, options.fill);
    paint_background(&mut canvas, snippet.background.stops(), RADIUS * s);

    let mut text_x = PADDING * s;
    if let Some(cover) = &target.cover {
        let size = (COVER_SIZE * s).round() as u32;
        let thumb = imageops::resize(cover.as_ref(), size, size, FilterType::Triangle);
        imageops::overlay(&mut canvas, &thumb, (PADDING * s) as i64, (PADDING * s) as i64);
        text_x += (COVER_SIZE + COVER_GAP) * s;
    }

    let header_width = w as f32 - text_x - PADDING * s;
    let title = truncate_to_width(font, TITLE_SIZE * s, &snippet.title, header_width);
    let artist = truncate_to_width(font, ARTIST_SIZE * s, &snippet.artist, header_width);
    let header_top = PADDING * s + (COVER_SIZE * s - (TITLE_SIZE + 6.0 + ARTIST_SIZE) * s) / 2.0;
    draw_text(&mut canvas, font, TITLE_SIZE * s, text_x, header_top, text_color, &title);
    draw_text(
        &mut canvas,
        font,
        ARTIST_SIZE * s,
        text_x,
        header_top + (TITLE_SIZE + 6.0) * s,
        with_alpha(text_color, 0.8),
        &artist,
    );

    let mut y = (PADDING + COVER_SIZE + SECTION_GAP) * s;
    for line in &wrapped {
        let top = y + (LYRIC_LINE_HEIGHT - LYRIC_SIZE) * s / 2.0;
        draw_text(&mut canvas, font, LYRIC_SIZE * s, PADDING * s, top, text_color, line);
        y += LYRIC_LINE_HEIGHT * s;
    }

    y += SECTION_GAP * s;
    draw_text(
        &mut canvas,
        font,
        FOOTER_SIZE * s,
        PADDING * s,
        y,
        with_alpha(text_color, 0.7),
        &snippet.attribution(),
    );

    canvas
}

fn paint_background(canvas: &mut RgbaImage, stops: ([u8; 3], [u8; 3]), radius: f32) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    for (x, y, px) in canvas.enumerate_pixels_mut() {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        if !inside_rounded_rect(fx, fy, w, h, radius) {
            continue;
        }
        let t = ((fx / w) + (fy / h)) / 2.0;
        *px = gradient_at(stops, t);
    }
}

fn gradient_at((from, to): ([u8; 3], [u8; 3]), t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Rgba([mix(from[0], to[0]), mix(from[1], to[1]), mix(from[2], to[2]), 0xff])
}

fn inside_rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> bool {
    let cx = if x < r {
        r
    } else if x > w - r {
        w - r
    } else {
        return true;
    };
    let cy = if y < r {
        r
    } else if y > h - r {
        h - r
    } else {
        return true;
    };
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= r * r
}

fn with_alpha(color: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], (color[3] as f32 * alpha).round() as u8])
}

fn text_width(font: &FontVec, px: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Greedy word wrap. A word wider than the line is left to overflow.
fn wrap_text(font: &FontVec, px: f32, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && text_width(font, px, &candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        // Keeps blank lines (the non-breaking marker has no words) as one row.
        lines.push(if current.is_empty() { text.to_string() } else { current });
    }
    lines
}

fn truncate_to_width(font: &FontVec, px: f32, text: &str, max_width: f32) -> String {
    if text_width(font, px, text) <= max_width {
        return text.to_string();
    }
    let mut out: String = text.to_string();
    while !out.is_empty() && text_width(font, px, &format!("{out}…")) > max_width {
        out.pop();
    }
    format!("{}…", out.trim_end())
}

fn draw_text(canvas: &mut RgbaImage, font: &FontVec, px: f32, x: f32, top: f32, color: Rgba<u8>, text: &str) {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let baseline = top + scaled.ascent();
    let mut caret = x;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                blend(canvas, px, py, color, coverage);
            });
        }
    }
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
        return;
    }
    let a = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    if a <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let da = dst[3] as f32 / 255.0;
    let out_a = a + da * (1.0 - a);
    for c in 0..3 {
        let v = (color[c] as f32 * a + dst[c] as f32 * da * (1.0 - a)) / out_a;
        dst[c] = v.round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}
