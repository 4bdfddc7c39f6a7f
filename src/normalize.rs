use std::sync::Mutex;

use image::{RgbaImage, imageops};
use rayon::prelude::*;

use crate::canvas::resize_to_height;

/// Targets for portrait normalization. Defaults are the character-portrait
/// pipeline constants; equipment icons override `fade_start`.
#[derive(Clone, Copy, Debug)]
pub struct NormalizeOpts {
    /// Long-edge budget for landscape sources and the cap for portrait ones.
    pub target_long_edge: u32,
    /// Fixed height for portrait-orientation sources.
    pub portrait_height: u32,
    /// Limits how far a wide source may stretch vertically.
    pub max_short_edge_ratio: f32,
    /// Final width; wider results are center-cropped to this.
    pub output_width: u32,
    /// Fraction of the width where the right-edge alpha fade begins.
    pub fade_start: f32,
}

impl Default for NormalizeOpts {
    fn default() -> Self {
        Self {
            target_long_edge: 1280,
            portrait_height: 1400,
            max_short_edge_ratio: 1.2,
            output_width: 1280,
            fade_start: 0.75,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Bounds {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

/// Find the tight bounding rectangle of all pixels with alpha > 0.
///
/// Rows are scanned in parallel; each row folds into the shared accumulator
/// under a mutex (the one genuinely concurrent inner loop of the pipeline).
fn scan_opaque_bounds(img: &RgbaImage) -> Option<Bounds> {
    let width = img.width() as usize;
    if width == 0 || img.height() == 0 {
        return None;
    }

    let acc: Mutex<Option<Bounds>> = Mutex::new(None);
    img.as_raw()
        .par_chunks_exact(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let mut row_min: Option<u32> = None;
            let mut row_max = 0u32;
            for (x, px) in row.chunks_exact(4).enumerate() {
                if px[3] > 0 {
                    if row_min.is_none() {
                        row_min = Some(x as u32);
                    }
                    row_max = x as u32;
                }
            }
            let Some(row_min) = row_min else { return };

            let mut guard = acc
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let merged = match *guard {
                None => Bounds {
                    min_x: row_min,
                    min_y: y as u32,
                    max_x: row_max,
                    max_y: y as u32,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(row_min),
                    min_y: b.min_y.min(y as u32),
                    max_x: b.max_x.max(row_max),
                    max_y: b.max_y.max(y as u32),
                },
            };
            *guard = Some(merged);
        });

    acc.into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Auto-crop, aspect-constrained resize and edge fade for portrait assets.
///
/// An input with no opaque pixel is returned unchanged. Safe to call
/// concurrently on different bitmaps.
pub fn normalize(src: &RgbaImage, opts: &NormalizeOpts) -> RgbaImage {
    let Some(bounds) = scan_opaque_bounds(src) else {
        tracing::debug!(
            width = src.width(),
            height = src.height(),
            "normalize: fully transparent source, returning unchanged"
        );
        return src.clone();
    };

    let crop_w = bounds.max_x - bounds.min_x + 1;
    let crop_h = bounds.max_y - bounds.min_y + 1;
    let mut img = imageops::crop_imm(src, bounds.min_x, bounds.min_y, crop_w, crop_h).to_image();

    if crop_w >= crop_h {
        let factor = (f64::from(crop_h) / f64::from(crop_w)
            * f64::from(opts.max_short_edge_ratio))
        .min(1.0);
        let target_h = (f64::from(opts.target_long_edge) * factor).round() as u32;
        if target_h > 0 && target_h != img.height() {
            img = resize_to_height(&img, target_h, imageops::FilterType::Lanczos3);
        }
    } else {
        if opts.portrait_height > 0 && opts.portrait_height != img.height() {
            img = resize_to_height(&img, opts.portrait_height, imageops::FilterType::Lanczos3);
        }
        // Second pass: cap the other axis if it still exceeds the long edge.
        if img.width() > opts.target_long_edge {
            img = crate::canvas::resize_to_width(
                &img,
                opts.target_long_edge,
                imageops::FilterType::Lanczos3,
            );
        }
    }

    if img.width() > opts.output_width {
        let x = (img.width() - opts.output_width) / 2;
        img = imageops::crop_imm(&img, x, 0, opts.output_width, img.height()).to_image();
    }

    apply_gradient_fade(&mut img, opts.fade_start);
    img
}

/// Fade alpha to zero toward the right edge with a quintic falloff, starting
/// at `fade_start` of the width. Portraits use the default 0.75; disk icons
/// use a gentler 0.5 so the fade reaches further in.
pub fn apply_gradient_fade(img: &mut RgbaImage, fade_start: f32) {
    let width = img.width();
    if width == 0 {
        return;
    }
    let fade_start_x = (width as f32 * fade_start.clamp(0.0, 1.0)) as u32;
    let span = width.saturating_sub(fade_start_x);
    if span == 0 {
        return;
    }

    for (x, _, px) in img.enumerate_pixels_mut() {
        if x < fade_start_x {
            continue;
        }
        let t = 1.0 - (x - fade_start_x) as f32 / span as f32;
        let alpha = t.powi(5).clamp(0.0, 1.0);
        px.0[3] = (f32::from(px.0[3]) * alpha).round() as u8;
    }
}
