use fontdue::FontSettings;

use crate::{
    canvas::{Canvas, over_px},
    color::Rgba,
    error::{StatcardError, StatcardResult},
};

/// Shadow offset used by every important label: a dark copy first, then the
/// lighter fill copy on top, so text stays legible on any background color.
pub const SHADOW_OFFSET: f32 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Loaded typeface shared by every compositor of one renderer.
#[derive(Debug)]
pub struct Font {
    inner: fontdue::Font,
}

impl Font {
    pub fn from_bytes(bytes: &[u8]) -> StatcardResult<Self> {
        let inner = fontdue::Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| StatcardError::asset(format!("failed to parse font: {e}")))?;
        Ok(Self { inner })
    }

    /// Advance-sum width and line height of a single-line string.
    pub fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        let mut width = 0.0f32;
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            if let Some(p) = prev {
                width += self.inner.horizontal_kern(p, ch, size).unwrap_or(0.0);
            }
            width += self.inner.metrics(ch, size).advance_width;
            prev = Some(ch);
        }
        (width, self.line_height(size))
    }

    pub fn line_height(&self, size: f32) -> f32 {
        match self.inner.horizontal_line_metrics(size) {
            Some(m) => m.ascent - m.descent,
            None => size,
        }
    }

    fn ascent(&self, size: f32) -> f32 {
        match self.inner.horizontal_line_metrics(size) {
            Some(m) => m.ascent,
            None => size * 0.8,
        }
    }
}

/// Draw a single line with its top-left corner at `(x, y)`.
pub fn draw_text(canvas: &mut Canvas, font: &Font, size: f32, text: &str, color: Rgba, x: f32, y: f32) {
    let baseline = y + font.ascent(size);
    let mut pen = x;
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if let Some(p) = prev {
            pen += font.inner.horizontal_kern(p, ch, size).unwrap_or(0.0);
        }
        let (metrics, bitmap) = font.inner.rasterize(ch, size);
        let gx = (pen + metrics.xmin as f32).round() as i64;
        let gy = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i64;
        blit_coverage(canvas, &bitmap, metrics.width, metrics.height, gx, gy, color);
        pen += metrics.advance_width;
        prev = Some(ch);
    }
}

/// Draw a single line positioned by alignment relative to `(x, y)`.
pub fn draw_text_aligned(
    canvas: &mut Canvas,
    font: &Font,
    size: f32,
    text: &str,
    color: Rgba,
    x: f32,
    y: f32,
    halign: HAlign,
    valign: VAlign,
) {
    let (w, h) = font.measure(text, size);
    let x = match halign {
        HAlign::Left => x,
        HAlign::Center => x - w / 2.0,
        HAlign::Right => x - w,
    };
    let y = match valign {
        VAlign::Top => y,
        VAlign::Center => y - h / 2.0,
        VAlign::Bottom => y - h,
    };
    draw_text(canvas, font, size, text, color, x, y);
}

/// The legibility pair: dark shadow copy offset down-right, then the fill.
pub fn draw_text_with_shadow(
    canvas: &mut Canvas,
    font: &Font,
    size: f32,
    text: &str,
    fill: Rgba,
    shadow: Rgba,
    x: f32,
    y: f32,
) {
    draw_text(canvas, font, size, text, shadow, x + SHADOW_OFFSET, y + SHADOW_OFFSET);
    draw_text(canvas, font, size, text, fill, x, y);
}

fn blit_coverage(
    canvas: &mut Canvas,
    bitmap: &[u8],
    w: usize,
    h: usize,
    x: i64,
    y: i64,
    color: Rgba,
) {
    if w == 0 || h == 0 {
        return;
    }
    let cw = i64::from(canvas.width());
    let ch = i64::from(canvas.height());
    for row in 0..h as i64 {
        let gy = y + row;
        if gy < 0 || gy >= ch {
            continue;
        }
        for col in 0..w as i64 {
            let gx = x + col;
            if gx < 0 || gx >= cw {
                continue;
            }
            let cov = bitmap[(row as usize) * w + col as usize];
            if cov == 0 {
                continue;
            }
            let src = color.with_alpha_scaled(f32::from(cov) / 255.0);
            let px = canvas.pixel_mut(gx as u32, gy as u32);
            over_px(px, src, 1.0);
        }
    }
}
