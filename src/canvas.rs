use image::{RgbaImage, imageops};

use crate::color::Rgba;

/// Mutable straight-alpha RGBA8 draw surface.
///
/// One canvas belongs to one compositor invocation; it is consumed by the
/// encoder when the draw program finishes. All blit/fill operations clip to
/// the canvas bounds, so draw programs may position layers partially (or
/// entirely) outside the surface.
pub struct Canvas {
    img: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(img: RgbaImage) -> Self {
        Self { img }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Raw access for glyph-coverage blits; callers must stay in bounds.
    pub(crate) fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8; 4] {
        &mut self.img.get_pixel_mut(x, y).0
    }

    /// Replace every pixel with `color` (no blending).
    pub fn clear(&mut self, color: Rgba) {
        let px = color.to_pixel();
        for p in self.img.pixels_mut() {
            *p = px;
        }
    }

    /// Source-over blend a solid rectangle.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: Rgba) {
        let (x0, y0, x1, y1) = match self.clip_rect(x, y, w, h) {
            Some(r) => r,
            None => return,
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let dst = self.img.get_pixel_mut(px, py);
                over_px(&mut dst.0, color, 1.0);
            }
        }
    }

    /// 2px-style separator line (a thin filled rectangle).
    pub fn fill_hline(&mut self, x0: i64, x1: i64, y: i64, thickness: u32, color: Rgba) {
        let w = (x1 - x0).max(0) as u32;
        self.fill_rect(x0, y, w, thickness, color);
    }

    /// Source-over blit of `src` at `(x, y)`, clipped to the canvas.
    pub fn draw_image(&mut self, src: &RgbaImage, x: i64, y: i64) {
        self.blit(src, x, y, BlendMode::Normal);
    }

    /// Blit with the Overlay separable blend mode (background texture pass).
    pub fn draw_image_overlay(&mut self, src: &RgbaImage, x: i64, y: i64) {
        self.blit(src, x, y, BlendMode::Overlay);
    }

    fn blit(&mut self, src: &RgbaImage, x: i64, y: i64, mode: BlendMode) {
        let (dw, dh) = (i64::from(self.img.width()), i64::from(self.img.height()));
        let (sw, sh) = (i64::from(src.width()), i64::from(src.height()));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + sw).min(dw);
        let y1 = (y + sh).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        for dy in y0..y1 {
            for dx in x0..x1 {
                let sp = src.get_pixel((dx - x) as u32, (dy - y) as u32);
                let dst = self.img.get_pixel_mut(dx as u32, dy as u32);
                match mode {
                    BlendMode::Normal => over_px(
                        &mut dst.0,
                        Rgba::rgba(sp.0[0], sp.0[1], sp.0[2], sp.0[3]),
                        1.0,
                    ),
                    BlendMode::Overlay => overlay_px(&mut dst.0, sp.0),
                }
            }
        }
    }

    /// Anti-aliased filled disk.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        self.for_each_in_box(cx - radius, cy - radius, cx + radius, cy + radius, |px, py| {
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            (radius - d + 0.5).clamp(0.0, 1.0)
        }, color);
    }

    /// Anti-aliased circle outline of the given stroke width.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, width: f32, color: Rgba) {
        let reach = radius + width;
        self.for_each_in_box(cx - reach, cy - reach, cx + reach, cy + reach, |px, py| {
            let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            (width / 2.0 - (d - radius).abs() + 0.5).clamp(0.0, 1.0)
        }, color);
    }

    /// Anti-aliased rounded-rectangle fill (translucent plates, chips).
    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Rgba) {
        let radius = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        let (cx, cy) = (x + w / 2.0, y + h / 2.0);
        let (hx, hy) = (w / 2.0 - radius, h / 2.0 - radius);
        self.for_each_in_box(x, y, x + w, y + h, |px, py| {
            let qx = ((px - cx).abs() - hx).max(0.0);
            let qy = ((py - cy).abs() - hy).max(0.0);
            let d = (qx * qx + qy * qy).sqrt() - radius;
            (0.5 - d).clamp(0.0, 1.0)
        }, color);
    }

    /// Clip the whole surface to a rounded rectangle by scaling alpha in the
    /// four corner regions. Applied as the final draw-program step so every
    /// preceding layer is masked uniformly.
    pub fn apply_rounded_corners(&mut self, radius: f32) {
        let w = self.img.width();
        let h = self.img.height();
        let radius = radius
            .min(f32::from(u16::MAX))
            .min(w as f32 / 2.0)
            .min(h as f32 / 2.0);
        if radius <= 0.0 {
            return;
        }
        let r = radius.ceil() as u32;
        let centers = [
            (radius, radius, 0u32, 0u32),
            (w as f32 - radius, radius, w - r, 0),
            (radius, h as f32 - radius, 0, h - r),
            (w as f32 - radius, h as f32 - radius, w - r, h - r),
        ];
        for (cx, cy, ox, oy) in centers {
            for py in oy..(oy + r).min(h) {
                for px in ox..(ox + r).min(w) {
                    let fx = px as f32 + 0.5;
                    let fy = py as f32 + 0.5;
                    // Only the quadrant outside the corner center is masked.
                    let in_corner = (fx < cx) == (ox == 0) && (fy < cy) == (oy == 0);
                    if !in_corner {
                        continue;
                    }
                    let d = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
                    let cov = (radius - d + 0.5).clamp(0.0, 1.0);
                    if cov < 1.0 {
                        let p = self.img.get_pixel_mut(px, py);
                        p.0[3] = (f32::from(p.0[3]) * cov).round() as u8;
                    }
                }
            }
        }
    }

    fn for_each_in_box(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        coverage: impl Fn(f32, f32) -> f32,
        color: Rgba,
    ) {
        let px0 = (x0.floor().max(0.0)) as u32;
        let py0 = (y0.floor().max(0.0)) as u32;
        let px1 = (x1.ceil().max(0.0) as u32).min(self.img.width());
        let py1 = (y1.ceil().max(0.0) as u32).min(self.img.height());
        for py in py0..py1 {
            for px in px0..px1 {
                let cov = coverage(px as f32 + 0.5, py as f32 + 0.5);
                if cov > 0.0 {
                    let dst = self.img.get_pixel_mut(px, py);
                    over_px(&mut dst.0, color, cov);
                }
            }
        }
    }

    fn clip_rect(&self, x: i64, y: i64, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let (dw, dh) = (i64::from(self.img.width()), i64::from(self.img.height()));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w)).min(dw);
        let y1 = (y + i64::from(h)).min(dh);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
        }
    }
}

#[derive(Clone, Copy)]
enum BlendMode {
    Normal,
    Overlay,
}

/// Straight-alpha source-over with fractional coverage applied to src alpha.
pub(crate) fn over_px(dst: &mut [u8; 4], src: Rgba, coverage: f32) {
    let sa = (f32::from(src.a) * coverage.clamp(0.0, 1.0)).round() as u32;
    if sa == 0 {
        return;
    }
    let da = u32::from(dst[3]);
    let inv = 255 - sa;
    // out alpha scaled by 255 to keep the division exact until the end
    let out_a = sa * 255 + da * inv;
    let sc = [u32::from(src.r), u32::from(src.g), u32::from(src.b)];
    for i in 0..3 {
        let num = sc[i] * sa * 255 + u32::from(dst[i]) * da * inv;
        dst[i] = ((num + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}

/// Separable Overlay blend composited with source alpha.
fn overlay_px(dst: &mut [u8; 4], src: [u8; 4]) {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return;
    }
    let da = u32::from(dst[3]);
    let mut blended = [0u8; 3];
    for i in 0..3 {
        let s = u32::from(src[i]);
        let d = u32::from(dst[i]);
        let b = if d < 128 {
            (2 * s * d + 127) / 255
        } else {
            255 - (2 * (255 - s) * (255 - d) + 127) / 255
        };
        // Fall back toward plain src color where the backdrop is transparent.
        blended[i] = (((255 - da) * s + da * b + 127) / 255) as u8;
    }
    over_px(
        dst,
        Rgba::rgba(blended[0], blended[1], blended[2], src[3]),
        1.0,
    );
}

/// Scale the RGB channels of every pixel, leaving alpha untouched.
/// Matches the "dim inactive icon" brightness pass.
pub fn dim_image(img: &mut RgbaImage, factor: f32) {
    let factor = factor.clamp(0.0, 1.0);
    for p in img.pixels_mut() {
        for c in 0..3 {
            p.0[c] = (f32::from(p.0[c]) * factor).round() as u8;
        }
    }
}

/// Resize preserving aspect so the result has the given width.
pub fn resize_to_width(img: &RgbaImage, width: u32, filter: imageops::FilterType) -> RgbaImage {
    if img.width() == 0 || img.height() == 0 || width == 0 {
        return img.clone();
    }
    let height =
        ((u64::from(width) * u64::from(img.height())) as f64 / f64::from(img.width())).round();
    imageops::resize(img, width, (height as u32).max(1), filter)
}

/// Resize preserving aspect so the result has the given height.
pub fn resize_to_height(img: &RgbaImage, height: u32, filter: imageops::FilterType) -> RgbaImage {
    if img.width() == 0 || img.height() == 0 || height == 0 {
        return img.clone();
    }
    let width =
        ((u64::from(height) * u64::from(img.width())) as f64 / f64::from(img.height())).round();
    imageops::resize(img, (width as u32).max(1), height, filter)
}
