use image::{RgbaImage, imageops};

use crate::{
    assemble::{AssetBundle, CancelToken},
    canvas::{Canvas, dim_image, resize_to_width},
    error::{StatcardError, StatcardResult},
    model::{CardContext, ChallengeData, RankEntry},
    palette, slots,
    store::names,
    text::{self, Font, HAlign, VAlign},
};

use super::CardRenderer;

const STAR_PITCH: i64 = 30;

/// The end-game summary: season header, aggregate plate, most-used roster
/// strip, stat ranking rows, then per-floor star and team breakdowns over
/// the fetched mode background.
pub(crate) fn render(
    renderer: &CardRenderer,
    ctx: &CardContext,
    data: &ChallengeData,
    cancel: &CancelToken,
) -> StatcardResult<Vec<u8>> {
    tracing::debug!(title = %data.title, floors = data.floors.len(), "building challenge card");

    if data.floors.is_empty() {
        return Err(StatcardError::data("challenge data has no floors"));
    }

    let rank_rows: [(&str, &RankEntry); 5] = [
        ("Strongest Single Strike", &data.strongest_strike),
        ("Most Defeats", &data.most_defeats),
        ("Most Damage Taken", &data.most_damage_taken),
        ("Elemental Skills Cast", &data.skills_cast),
        ("Elemental Bursts Unleashed", &data.bursts_unleashed),
    ];

    let mut required: Vec<String> = vec![names::CHALLENGE_BACKGROUND.to_string()];
    required.extend(data.most_used.iter().map(|e| names::avatar(e.avatar_id)));
    required.extend(rank_rows.iter().map(|(_, e)| names::side_avatar(e.avatar_id)));
    for floor in &data.floors {
        for chamber in &floor.chambers {
            required.extend(chamber.teams.iter().map(|t| names::avatar(t.avatar_id)));
        }
    }
    let bundle = AssetBundle::fetch_all(renderer.store.as_ref(), &renderer.tracker, required)?;

    cancel.check()?;

    let font = &renderer.font;
    let background = bundle.get(names::CHALLENGE_BACKGROUND)?.image.clone();
    let mut canvas = Canvas::from_image(background);

    text::draw_text_aligned(
        &mut canvas,
        font,
        40.0,
        &data.title,
        palette::TEXT_COLOR,
        50.0,
        80.0,
        HAlign::Left,
        VAlign::Bottom,
    );
    text::draw_text_aligned(
        &mut canvas,
        font,
        28.0,
        &data.period,
        palette::TEXT_COLOR,
        750.0,
        80.0,
        HAlign::Right,
        VAlign::Bottom,
    );
    text::draw_text(
        &mut canvas,
        font,
        28.0,
        &format!("{}\u{00B7}AR {}", ctx.profile.nickname, ctx.profile.level),
        palette::TEXT_COLOR,
        50.0,
        110.0,
    );
    text::draw_text_aligned(
        &mut canvas,
        font,
        28.0,
        &ctx.profile.uid,
        palette::TEXT_COLOR,
        750.0,
        110.0,
        HAlign::Right,
        VAlign::Top,
    );

    draw_summary_plate(&mut canvas, font, data);
    draw_most_used(&mut canvas, font, &bundle, data)?;
    draw_rank_rows(&mut canvas, font, &bundle, &rank_rows)?;
    draw_floors(&mut canvas, font, &bundle, data)?;

    canvas.apply_rounded_corners(renderer.opts.corner_radius);
    crate::encode::encode_jpeg(canvas.image())
}

fn draw_summary_plate(canvas: &mut Canvas, font: &Font, data: &ChallengeData) {
    canvas.fill_rounded_rect(50.0, 170.0, 700.0, 250.0, 15.0, palette::PLATE_COLOR);

    let rows = [
        ("Deepest Descent: ", data.max_depth.clone()),
        (
            "Battles Fought: ",
            format!("{}/{}", data.total_wins, data.total_battles),
        ),
        ("Total Stars: ", data.total_stars.to_string()),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let y = 200.0 + i as f32 * 80.0;
        text::draw_text(canvas, font, 28.0, label, palette::TEXT_COLOR, 80.0, y);
        text::draw_text_aligned(
            canvas,
            font,
            28.0,
            value,
            palette::TEXT_COLOR,
            720.0,
            y,
            HAlign::Right,
            VAlign::Top,
        );
        if i < rows.len() - 1 {
            canvas.fill_hline(80, 720, 250 + i as i64 * 80, 2, palette::TEXT_COLOR);
        }
    }
}

fn draw_most_used(
    canvas: &mut Canvas,
    font: &Font,
    bundle: &AssetBundle,
    data: &ChallengeData,
) -> StatcardResult<()> {
    canvas.fill_rounded_rect(50.0, 440.0, 700.0, 260.0, 15.0, palette::PLATE_COLOR);
    text::draw_text(
        canvas,
        font,
        28.0,
        "Most Used Characters",
        palette::TEXT_COLOR,
        80.0,
        460.0,
    );

    for (i, entry) in data.most_used.iter().take(4).enumerate() {
        let portrait = &bundle.get(&names::avatar(entry.avatar_id))?.image;
        let tile = slots::avatar_tile(
            font,
            portrait,
            entry.rarity,
            entry.constellation,
            &entry.value.to_string(),
        );
        canvas.draw_image(&tile, 75 + i as i64 * 170, 500);
    }
    Ok(())
}

fn draw_rank_rows(
    canvas: &mut Canvas,
    font: &Font,
    bundle: &AssetBundle,
    rows: &[(&str, &RankEntry); 5],
) -> StatcardResult<()> {
    for (i, (label, entry)) in rows.iter().enumerate() {
        let top = 720 + i as i64 * 170;
        canvas.fill_rounded_rect(50.0, top as f32, 700.0, 150.0, 15.0, palette::PLATE_COLOR);

        let side = resize_to_width(
            &bundle.get(&names::side_avatar(entry.avatar_id))?.image,
            150,
            imageops::FilterType::CatmullRom,
        );
        canvas.draw_image(&side, 50, top - 20);

        let center_y = (top + 75) as f32;
        text::draw_text_aligned(
            canvas,
            font,
            28.0,
            label,
            palette::TEXT_COLOR,
            200.0,
            center_y,
            HAlign::Left,
            VAlign::Center,
        );
        text::draw_text_aligned(
            canvas,
            font,
            28.0,
            &entry.value.to_string(),
            palette::TEXT_COLOR,
            720.0,
            center_y,
            HAlign::Right,
            VAlign::Center,
        );
    }
    Ok(())
}

fn draw_floors(
    canvas: &mut Canvas,
    font: &Font,
    bundle: &AssetBundle,
    data: &ChallengeData,
) -> StatcardResult<()> {
    let mut y = 1600i64;
    for floor in &data.floors {
        text::draw_text(
            canvas,
            font,
            40.0,
            &format!("Floor {}", floor.index),
            palette::TEXT_COLOR,
            50.0,
            y as f32,
        );
        draw_star_strip(canvas, floor.stars, floor.max_stars, 720, y + 10);
        y += 60;

        for chamber in &floor.chambers {
            text::draw_text(
                canvas,
                font,
                28.0,
                &format!("Chamber {}", chamber.index),
                palette::TEXT_COLOR,
                50.0,
                y as f32,
            );
            draw_star_strip(canvas, chamber.stars, 3, 720, y);
            y += 45;

            for (j, member) in chamber.teams.iter().enumerate() {
                let portrait = &bundle.get(&names::avatar(member.avatar_id))?.image;
                let tile = slots::avatar_tile(
                    font,
                    portrait,
                    member.rarity,
                    member.constellation,
                    &format!("Lv. {}", member.level),
                );
                canvas.draw_image(&tile, 50 + j as i64 * 170, y);
            }
            y += 200;
        }
        y += 40;
    }
    Ok(())
}

/// Lit pips for earned stars, 35%-brightness pips for the remainder,
/// right-aligned so the strip ends at `right_x`.
fn draw_star_strip(canvas: &mut Canvas, earned: u32, max: u32, right_x: i64, y: i64) {
    let max = max.clamp(1, 5);
    let earned = earned.min(max);
    let x0 = right_x - i64::from(max) * STAR_PITCH;

    if earned > 0 {
        let lit = slots::four_sided_star_rating(earned, true, true);
        canvas.draw_image(&lit, x0, y);
    }
    if earned < max {
        let mut unlit: RgbaImage = slots::four_sided_star_rating(max - earned, true, false);
        dim_image(&mut unlit, 0.35);
        canvas.draw_image(&unlit, x0 + i64::from(earned) * STAR_PITCH, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_strip_dims_only_the_remainder() {
        let mut canvas = Canvas::new(300, 40);
        draw_star_strip(&mut canvas, 2, 3, 290, 5);
        let img = canvas.image();
        // lit pip region carries the gold tone, unlit region is darker
        let lit_px = img.get_pixel(215, 20).0;
        let unlit_px = img.get_pixel(275, 20).0;
        assert!(lit_px[3] > 0 && unlit_px[3] > 0);
        assert!(u32::from(lit_px[0]) > u32::from(unlit_px[0]));
    }
}
