use std::collections::HashMap;

use image::{RgbaImage, imageops};

use crate::{
    canvas::{Canvas, resize_to_height, resize_to_width},
    color::Rgba,
    model::Relic,
    palette,
    raster::{fill_polygon, star_points},
    text::{self, Font, HAlign, VAlign},
};

/// Rank at which a pip switches to the gold max-tier style.
pub const MAX_RANK: u32 = 6;

const STAR_SIZE: u32 = 30;

/// Row of 1..=5 gold five-point stars, centered in a 150x30 strip.
pub fn star_rating(count: u32) -> RgbaImage {
    let count = count.clamp(1, 5);
    let mut canvas = Canvas::new(5 * STAR_SIZE, STAR_SIZE);
    let offset = (5 - count) * STAR_SIZE / 2;

    for i in 0..count {
        let cx = (offset + i * STAR_SIZE + STAR_SIZE / 2) as f32;
        let cy = STAR_SIZE as f32 / 2.0;
        let pts = star_points(cx, cy, STAR_SIZE as f32 / 2.0, STAR_SIZE as f32 / 4.0, 5);
        fill_polygon(&mut canvas, &pts, palette::STAR_COLOR);
    }
    canvas.into_image()
}

/// Row or column of four-pointed challenge stars, left/top aligned, with an
/// optional enlarged drop shadow behind each pip.
pub fn four_sided_star_rating(count: u32, horizontal: bool, shadow: bool) -> RgbaImage {
    let count = count.clamp(1, 5);
    const SHADOW_EXPANSION: f32 = 1.3;

    let (w, h) = if horizontal {
        (5 * STAR_SIZE, STAR_SIZE)
    } else {
        (STAR_SIZE, 5 * STAR_SIZE)
    };
    let mut canvas = Canvas::new(w, h);

    for i in 0..count {
        let (cx, cy) = if horizontal {
            ((i * STAR_SIZE + 15) as f32, 15.0)
        } else {
            (15.0, (i * STAR_SIZE + 15) as f32)
        };
        if shadow {
            let pts = star_points(
                cx,
                cy,
                STAR_SIZE as f32 / 2.0 * SHADOW_EXPANSION,
                STAR_SIZE as f32 / 4.0 * SHADOW_EXPANSION,
                4,
            );
            fill_polygon(&mut canvas, &pts, palette::STAR_SHADOW_COLOR);
        }
        let pts = star_points(cx, cy, STAR_SIZE as f32 / 2.0, STAR_SIZE as f32 / 4.0, 4);
        fill_polygon(&mut canvas, &pts, palette::STAR_COLOR);
    }
    canvas.into_image()
}

/// 150x180 roster/team tile: rarity background, portrait, label band and
/// the three-state rank pip, clipped to rounded corners.
pub fn avatar_tile(
    font: &Font,
    portrait: &RgbaImage,
    rarity: u32,
    rank: u32,
    label: &str,
) -> RgbaImage {
    let mut canvas = Canvas::new(150, 180);
    canvas.clear(palette::rarity_color(rarity));

    let scaled = resize_to_width(portrait, 150, imageops::FilterType::CatmullRom);
    canvas.draw_image(&scaled, 0, 0);

    canvas.fill_rect(0, 150, 150, 30, palette::LABEL_BAND_COLOR);
    text::draw_text_aligned(
        &mut canvas,
        font,
        24.0,
        label,
        Rgba::BLACK,
        75.0,
        180.0,
        HAlign::Center,
        VAlign::Bottom,
    );

    draw_rank_pip(&mut canvas, font, rank, 115.0, 115.0);

    canvas.apply_rounded_corners(15.0);
    canvas.into_image()
}

/// Three-state pip: gold at max rank, neutral dark while active, omitted at
/// zero. 30x30 rounded square with the rank number centered.
fn draw_rank_pip(canvas: &mut Canvas, font: &Font, rank: u32, x: f32, y: f32) {
    if rank == 0 {
        return;
    }
    let (plate, text_color) = if rank >= MAX_RANK {
        (palette::PIP_MAX_COLOR, palette::PIP_MAX_TEXT_COLOR)
    } else {
        (palette::PIP_ACTIVE_COLOR, Rgba::WHITE)
    };
    canvas.fill_rounded_rect(x, y, 30.0, 30.0, 5.0, plate);
    text::draw_text_aligned(
        canvas,
        font,
        24.0,
        &rank.to_string(),
        text_color,
        x + 15.0,
        y + 15.0,
        HAlign::Center,
        VAlign::Center,
    );
}

/// Icon-plus-value badge on a rounded dark plate, sized to the text.
pub fn stat_badge(font: &Font, icon: Option<&RgbaImage>, value: &str) -> RgbaImage {
    let (text_w, _) = font.measure(value, 40.0);
    let width = 80 + text_w.ceil() as u32;
    let mut canvas = Canvas::new(width, 60);
    canvas.fill_rounded_rect(0.0, 0.0, width as f32, 60.0, 10.0, palette::BADGE_PLATE_COLOR);
    if let Some(icon) = icon {
        canvas.draw_image(icon, 5, 6);
    }
    text::draw_text(&mut canvas, font, 40.0, value, palette::TEXT_COLOR, 64.0, 10.0);
    canvas.into_image()
}

fn equipment_plate() -> Canvas {
    let mut canvas = Canvas::new(970, 170);
    canvas.fill_rounded_rect(0.0, 0.0, 970.0, 170.0, 15.0, palette::SLOT_PLATE_COLOR);
    canvas
}

/// Filled equipment slot: icon, main stat, level, stars and up to four
/// substats with roll markers. `stat_icons` are pre-scaled 48px icons.
pub fn equipment_slot(
    font: &Font,
    icon: &RgbaImage,
    relic: &Relic,
    stat_icons: &HashMap<u32, RgbaImage>,
) -> RgbaImage {
    let mut canvas = equipment_plate();

    canvas.draw_image(icon, -40, -40);

    if let Some(main_icon) = stat_icons.get(&relic.main_stat.stat_id) {
        canvas.draw_image(main_icon, 280, 20);
    }
    text::draw_text_aligned(
        &mut canvas,
        font,
        40.0,
        &relic.main_stat.value,
        palette::TEXT_COLOR,
        320.0,
        70.0,
        HAlign::Right,
        VAlign::Top,
    );
    text::draw_text_aligned(
        &mut canvas,
        font,
        28.0,
        &format!("+{}", relic.level),
        palette::TEXT_COLOR,
        320.0,
        130.0,
        HAlign::Right,
        VAlign::Top,
    );

    let stars = resize_to_height(&star_rating(relic.rarity), 25, imageops::FilterType::CatmullRom);
    canvas.draw_image(&stars, 120, 130);

    for (i, substat) in relic.substats.iter().take(4).enumerate() {
        let x_offset = (i % 2) as i64 * 290;
        let y_offset = (i / 2) as i64 * 80;

        let dimmed = palette::is_flat_substat(substat.stat_id);
        let color = if dimmed {
            palette::DIMMED_STAT_COLOR
        } else {
            palette::TEXT_COLOR
        };

        if let Some(sub_icon) = stat_icons.get(&substat.stat_id) {
            if dimmed {
                let mut dark = sub_icon.clone();
                crate::canvas::dim_image(&mut dark, 0.5);
                canvas.draw_image(&dark, 375 + x_offset, 26 + y_offset);
            } else {
                canvas.draw_image(sub_icon, 375 + x_offset, 26 + y_offset);
            }
        }

        text::draw_text(
            &mut canvas,
            font,
            40.0,
            &substat.value,
            color,
            (439 + x_offset) as f32,
            (30 + y_offset) as f32,
        );

        let rolls = ".".repeat(substat.rolls as usize + 1);
        text::draw_text(
            &mut canvas,
            font,
            40.0,
            &rolls,
            color,
            (575 + x_offset) as f32,
            (15 + y_offset) as f32,
        );
    }

    canvas.into_image()
}

/// Placeholder slot for an empty equipment position: same plate, optional
/// slot glyph, "Not Equipped" label. Slot positions never collapse.
pub fn empty_equipment_slot(
    font: &Font,
    position: u32,
    template_icon: Option<&RgbaImage>,
) -> RgbaImage {
    let mut canvas = equipment_plate();

    if let Some(icon) = template_icon {
        let scaled = resize_to_height(icon, 150, imageops::FilterType::CatmullRom);
        canvas.draw_image(&scaled, 25, 5);
    } else {
        // keep a visual anchor even without the glyph asset
        text::draw_text_aligned(
            &mut canvas,
            font,
            40.0,
            &position.to_string(),
            palette::DIMMED_STAT_COLOR,
            100.0,
            85.0,
            HAlign::Center,
            VAlign::Center,
        );
    }

    text::draw_text_aligned(
        &mut canvas,
        font,
        40.0,
        "Not Equipped",
        palette::TEXT_COLOR,
        525.0,
        95.0,
        HAlign::Center,
        VAlign::Center,
    );
    canvas.into_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_rating_is_fixed_size_and_clamped() {
        for count in [0, 1, 3, 5, 9] {
            let img = star_rating(count);
            assert_eq!(img.dimensions(), (150, 30));
        }
    }

    #[test]
    fn more_stars_cover_more_pixels() {
        let one: u32 = star_rating(1).pixels().filter(|p| p.0[3] > 0).count() as u32;
        let five: u32 = star_rating(5).pixels().filter(|p| p.0[3] > 0).count() as u32;
        assert!(five > one * 4);
    }

    #[test]
    fn four_sided_orientation_swaps_dimensions() {
        assert_eq!(four_sided_star_rating(3, true, true).dimensions(), (150, 30));
        assert_eq!(four_sided_star_rating(3, false, true).dimensions(), (30, 150));
    }

    #[test]
    fn shadow_extends_past_the_star() {
        let with = four_sided_star_rating(1, true, true);
        let without = four_sided_star_rating(1, true, false);
        let covered = |img: &RgbaImage| img.pixels().filter(|p| p.0[3] > 0).count();
        assert!(covered(&with) > covered(&without));
    }
}
