use std::collections::{BTreeMap, BTreeSet, HashMap};

use image::{RgbaImage, imageops};

use crate::{
    assemble::{AssetBundle, AssetHandle, CancelToken, fetch_optional},
    canvas::{Canvas, dim_image, resize_to_width},
    error::{StatcardError, StatcardResult},
    model::{CardContext, CharacterInfo, StatProperty},
    normalize::{apply_gradient_fade, normalize},
    palette, slots,
    store::names,
    text::{self, HAlign, VAlign},
};

use super::CardRenderer;

const CANVAS_W: u32 = 3240;
const CANVAS_H: u32 = 1080;
const EQUIPMENT_SLOTS: u32 = 5;

/// The character sheet: element background, normalized portrait, skill and
/// constellation pips, weapon panel, stats column, equipment slots, set
/// footer. Draw order is fixed; later layers occlude earlier ones.
pub(crate) fn render(
    renderer: &CardRenderer,
    ctx: &CardContext,
    info: &CharacterInfo,
    cancel: &CancelToken,
) -> StatcardResult<Vec<u8>> {
    tracing::debug!(character = info.id, name = %info.name, "building character card");

    let stats = select_display_stats(info)?;

    let mut stat_ids: BTreeSet<u32> = stats.iter().map(|s| s.stat_id).collect();
    stat_ids.insert(info.weapon.main_stat.stat_id);
    if let Some(sub) = &info.weapon.sub_stat {
        stat_ids.insert(sub.stat_id);
    }
    for relic in &info.relics {
        stat_ids.insert(relic.main_stat.stat_id);
        for substat in &relic.substats {
            stat_ids.insert(substat.stat_id);
        }
    }

    let mut required: Vec<String> = vec![
        names::CARD_OVERLAY.to_string(),
        names::portrait(info.id),
        names::weapon(info.weapon.id),
    ];
    required.extend(info.constellations.iter().map(|c| names::constellation(c.id)));
    required.extend(info.skills.iter().map(|s| names::skill(s.id)));
    required.extend(info.relics.iter().map(|r| names::relic(r.id)));
    required.extend(stat_ids.iter().map(|id| names::stat_icon(*id)));

    let bundle = AssetBundle::fetch_all(renderer.store.as_ref(), &renderer.tracker, required)?;

    // Empty equipment positions show a slot glyph when the store has one;
    // the glyph is optional by policy, the slot itself is not.
    let equipped: BTreeSet<u32> = info.relics.iter().map(|r| r.position).collect();
    let mut templates: HashMap<u32, AssetHandle> = HashMap::new();
    for pos in 1..=EQUIPMENT_SLOTS {
        if !equipped.contains(&pos) {
            if let Some(handle) = fetch_optional(
                renderer.store.as_ref(),
                &renderer.tracker,
                &names::relic_template(pos),
            )? {
                templates.insert(pos, handle);
            }
        }
    }

    cancel.check()?;

    let font = &renderer.font;
    let stat_icons: HashMap<u32, RgbaImage> = stat_ids
        .iter()
        .map(|id| {
            let handle = bundle.get(&names::stat_icon(*id))?;
            Ok((
                *id,
                resize_to_width(&handle.image, 48, imageops::FilterType::CatmullRom),
            ))
        })
        .collect::<StatcardResult<_>>()?;

    let portrait = normalize(
        &bundle.get(&names::portrait(info.id))?.image,
        &renderer.opts.portrait,
    );

    let bg_color = palette::card_background_color(&info.element);
    let mut canvas = Canvas::new(CANVAS_W, CANVAS_H);
    canvas.clear(bg_color);
    canvas.draw_image_overlay(&bundle.get(names::CARD_OVERLAY)?.image, 0, 0);

    canvas.draw_image(
        &portrait,
        (1280 - i64::from(portrait.width())) / 2,
        100 + (1080 - i64::from(portrait.height())) / 2,
    );

    text::draw_text_with_shadow(
        &mut canvas,
        font,
        64.0,
        &info.name,
        palette::TEXT_COLOR,
        palette::SHADOW_COLOR,
        70.0,
        55.0,
    );
    text::draw_text_with_shadow(
        &mut canvas,
        font,
        40.0,
        &format!("Lv. {}", info.level),
        palette::TEXT_COLOR,
        palette::SHADOW_COLOR,
        70.0,
        135.0,
    );

    for (i, skill) in info.skills.iter().take(3).enumerate() {
        let offset = i as i64 * 150;
        let cy = (920 - offset) as f32;
        canvas.fill_circle(120.0, cy, 60.0, palette::PIP_WELL_COLOR);
        let icon = resize_to_width(
            &bundle.get(&names::skill(skill.id))?.image,
            100,
            imageops::FilterType::CatmullRom,
        );
        canvas.draw_image(&icon, 70, 870 - offset);
        canvas.stroke_circle(120.0, cy, 60.0, 5.0, bg_color);
        canvas.fill_circle(120.0, cy + 60.0, 25.0, palette::LEVEL_DISK_COLOR);
        text::draw_text_aligned(
            &mut canvas,
            font,
            32.0,
            &skill.level.to_string(),
            palette::TEXT_COLOR,
            120.0,
            cy + 63.0,
            HAlign::Center,
            VAlign::Center,
        );
    }

    text::draw_text(
        &mut canvas,
        font,
        28.0,
        &ctx.profile.uid,
        palette::TEXT_COLOR,
        60.0,
        1040.0,
    );

    for (i, constellation) in info.constellations.iter().enumerate() {
        let offset = i as i64 * 140;
        let cy = (1000 - offset) as f32;
        canvas.fill_circle(1050.0, cy, 50.0, palette::PIP_WELL_COLOR);
        let mut icon = resize_to_width(
            &bundle.get(&names::constellation(constellation.id))?.image,
            90,
            imageops::FilterType::CatmullRom,
        );
        if !constellation.active {
            dim_image(&mut icon, 0.5);
        }
        canvas.draw_image(&icon, 1005, 955 - offset);
        canvas.stroke_circle(1050.0, cy, 50.0, 5.0, bg_color);
    }

    let weapon_icon = resize_to_width(
        &bundle.get(&names::weapon(info.weapon.id))?.image,
        200,
        imageops::FilterType::CatmullRom,
    );
    canvas.draw_image(&weapon_icon, 1200, 40);
    canvas.draw_image(&slots::star_rating(info.weapon.rarity), 1220, 240);
    text::draw_text_aligned(
        &mut canvas,
        font,
        40.0,
        &info.weapon.name,
        palette::TEXT_COLOR,
        1450.0,
        120.0,
        HAlign::Left,
        VAlign::Bottom,
    );
    text::draw_text(
        &mut canvas,
        font,
        40.0,
        &format!("R{}", info.weapon.affix_level),
        palette::TEXT_COLOR,
        1450.0,
        160.0,
    );
    text::draw_text(
        &mut canvas,
        font,
        40.0,
        &format!("Lv. {}", info.weapon.level),
        palette::TEXT_COLOR,
        1550.0,
        160.0,
    );
    let main_badge = slots::stat_badge(
        font,
        stat_icons.get(&info.weapon.main_stat.stat_id),
        &info.weapon.main_stat.value,
    );
    canvas.draw_image(&main_badge, 1450, 230);
    if let Some(sub) = &info.weapon.sub_stat {
        let sub_badge = slots::stat_badge(font, stat_icons.get(&sub.stat_id), &sub.value);
        canvas.draw_image(&sub_badge, 1630, 230);
    }

    let spacing = 700 / stats.len() as i64;
    for (i, stat) in stats.iter().enumerate() {
        let y = 360 + spacing * i as i64;
        if let Some(icon) = stat_icons.get(&stat.stat_id) {
            canvas.draw_image(icon, 1200, y - 4);
        }
        text::draw_text(
            &mut canvas,
            font,
            40.0,
            palette::stat_label(stat.stat_id),
            palette::TEXT_COLOR,
            1264.0,
            y as f32,
        );
        if palette::is_base_stat(stat.stat_id) {
            text::draw_text_aligned(
                &mut canvas,
                font,
                40.0,
                &stat.final_value,
                palette::TEXT_COLOR,
                2100.0,
                (y - 15) as f32,
                HAlign::Right,
                VAlign::Top,
            );
            let mut base_x = 2100.0;
            if stat.final_numeric()? > stat.base_numeric()? {
                let bonus = format!("+{}", stat.add);
                let (bonus_w, _) = font.measure(&bonus, 28.0);
                base_x -= bonus_w + 12.0;
                text::draw_text_aligned(
                    &mut canvas,
                    font,
                    28.0,
                    &bonus,
                    palette::BONUS_COLOR,
                    2100.0,
                    (y + 25) as f32,
                    HAlign::Right,
                    VAlign::Top,
                );
            }
            text::draw_text_aligned(
                &mut canvas,
                font,
                28.0,
                &stat.base,
                palette::BASE_VALUE_COLOR,
                base_x,
                (y + 25) as f32,
                HAlign::Right,
                VAlign::Top,
            );
        } else {
            text::draw_text_aligned(
                &mut canvas,
                font,
                40.0,
                &stat.final_value,
                palette::TEXT_COLOR,
                2100.0,
                y as f32,
                HAlign::Right,
                VAlign::Top,
            );
        }
    }

    for pos in 1..=EQUIPMENT_SLOTS {
        let slot_img = match info.relics.iter().find(|r| r.position == pos) {
            Some(relic) => {
                let mut icon = resize_to_width(
                    &bundle.get(&names::relic(relic.id))?.image,
                    250,
                    imageops::FilterType::CatmullRom,
                );
                apply_gradient_fade(&mut icon, 0.5);
                slots::equipment_slot(font, &icon, relic, &stat_icons)
            }
            None => slots::empty_equipment_slot(font, pos, templates.get(&pos).map(|h| &h.image)),
        };
        canvas.draw_image(&slot_img, 2200, 40 + (i64::from(pos) - 1) * 185);
    }

    draw_set_footer(&mut canvas, font, &active_sets(info));

    canvas.apply_rounded_corners(renderer.opts.corner_radius);
    crate::encode::encode_jpeg(canvas.image())
}

/// Piece counts per equipment set that reached an activation threshold.
fn active_sets(info: &CharacterInfo) -> BTreeMap<String, u32> {
    let mut counts: BTreeMap<&str, (u32, &[u32])> = BTreeMap::new();
    for relic in &info.relics {
        let entry = counts
            .entry(&relic.set.name)
            .or_insert((0, &relic.set.activation_thresholds));
        entry.0 += 1;
    }
    counts
        .into_iter()
        .filter(|(_, (count, thresholds))| thresholds.iter().any(|t| count >= t))
        .map(|(name, (count, _))| (name.to_string(), count))
        .collect()
}

fn draw_set_footer(canvas: &mut Canvas, font: &text::Font, active: &BTreeMap<String, u32>) {
    let size = 28.0;
    if active.is_empty() {
        text::draw_text_aligned(
            canvas,
            font,
            size,
            "No active set",
            palette::TEXT_COLOR,
            2725.0,
            1020.0,
            HAlign::Center,
            VAlign::Center,
        );
        return;
    }

    let line_height = font.line_height(size) * 1.5;
    let mut y = 1020.0 - line_height * active.len() as f32 / 2.0;
    for (name, count) in active {
        text::draw_text_aligned(
            canvas,
            font,
            size,
            name,
            palette::TEXT_COLOR,
            2750.0,
            y,
            HAlign::Right,
            VAlign::Top,
        );
        text::draw_text(
            canvas,
            font,
            size,
            &count.to_string(),
            palette::TEXT_COLOR,
            2800.0,
            y,
        );
        y += line_height;
    }
}

/// The display-stat selection rule: the totals block first, then every
/// bonus stat above its baseline; when fewer than six bonus stats qualify,
/// fall back to a flat seven-row listing.
fn select_display_stats(info: &CharacterInfo) -> StatcardResult<Vec<&StatProperty>> {
    let mut bonus: Vec<&StatProperty> = Vec::new();
    for stat in &info.bonus_stats {
        if stat.final_numeric()? > palette::stat_default_value(stat.stat_id) {
            bonus.push(stat);
        }
    }
    bonus.sort_by_key(|s| s.stat_id);

    let mut out: Vec<&StatProperty> = Vec::new();
    if bonus.len() >= 6 {
        let mut seen = BTreeSet::new();
        for stat in info.base_stats.iter().take(4) {
            if stat.final_numeric()? > palette::stat_default_value(stat.stat_id)
                && seen.insert(stat.stat_id)
            {
                out.push(stat);
            }
        }
        for stat in bonus {
            if seen.insert(stat.stat_id) {
                out.push(stat);
            }
        }
    } else {
        let mut sorted_bonus: Vec<&StatProperty> = info.bonus_stats.iter().collect();
        sorted_bonus.sort_by_key(|s| s.stat_id);
        out.extend(info.base_stats.iter().take(4));
        out.extend(sorted_bonus);
        out.truncate(7);
    }

    if out.is_empty() {
        return Err(StatcardError::data("character has no displayable stats"));
    }
    Ok(out)
}
