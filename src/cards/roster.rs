use std::collections::BTreeMap;

use image::imageops;

use crate::{
    assemble::{AssetBundle, CancelToken},
    canvas::{Canvas, resize_to_width},
    error::StatcardResult,
    layout::{GridSpec, compute_layout},
    model::{CardContext, RosterData, RosterEntry},
    palette, slots,
    store::names,
    text::{self, Font, HAlign, VAlign},
};

use super::CardRenderer;

const TILE_W: u32 = 300;
const TILE_H: u32 = 180;
/// Header band plus breathing room below the grid for the summary chips.
const GRID_MARGINS: [u32; 4] = [120, 50, 50, 50];
const FOOTER_EXTRA: u32 = 50;
/// Keeps the header and chips legible when the grid itself is narrow.
const MIN_CANVAS_W: u32 = 620;

/// The roster overview: one styled tile per character on a grid, profile
/// header, per-element and per-rarity count chips below.
pub(crate) fn render(
    renderer: &CardRenderer,
    ctx: &CardContext,
    data: &RosterData,
    cancel: &CancelToken,
) -> StatcardResult<Vec<u8>> {
    tracing::debug!(characters = data.characters.len(), "building roster card");

    let mut entries: Vec<&RosterEntry> = data.characters.iter().collect();
    entries.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then(b.rarity.cmp(&a.rarity))
            .then(a.name.cmp(&b.name))
    });

    let mut required: Vec<String> = entries.iter().map(|e| names::avatar(e.id)).collect();
    required.extend(entries.iter().map(|e| names::weapon(e.weapon.id)));
    let bundle = AssetBundle::fetch_all(renderer.store.as_ref(), &renderer.tracker, required)?;

    cancel.check()?;

    let spec = GridSpec::new(TILE_W, TILE_H, GRID_MARGINS);
    let layout = compute_layout(entries.len(), &spec);
    let canvas_w = layout.canvas_width.max(MIN_CANVAS_W);
    let canvas_h = layout.canvas_height + FOOTER_EXTRA;

    let font = &renderer.font;
    let mut canvas = Canvas::new(canvas_w, canvas_h);
    canvas.clear(palette::ROSTER_BG_COLOR);

    text::draw_text_aligned(
        &mut canvas,
        font,
        40.0,
        &format!("{}\u{00B7}AR {}", ctx.profile.nickname, ctx.profile.level),
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
        &ctx.profile.uid,
        palette::TEXT_COLOR,
        50.0,
        110.0,
        HAlign::Left,
        VAlign::Bottom,
    );

    for pos in &layout.positions {
        let entry = entries[pos.item_index];
        let tile = roster_tile(font, &bundle, entry)?;
        canvas.draw_image(&tile, i64::from(pos.x), i64::from(pos.y));
    }

    draw_count_chips(&mut canvas, font, &entries, canvas_h);

    canvas.apply_rounded_corners(renderer.opts.corner_radius);
    crate::encode::encode_jpeg(canvas.image())
}

/// 300x180 tile: styled avatar on the left, weapon panel on the element
/// accent to the right.
fn roster_tile(
    font: &Font,
    bundle: &AssetBundle,
    entry: &RosterEntry,
) -> StatcardResult<image::RgbaImage> {
    let mut tile = Canvas::new(TILE_W, TILE_H);

    let (accent_fg, accent_bg) = palette::element_accent(&entry.element)
        .unwrap_or((palette::TEXT_COLOR, palette::PLATE_COLOR));
    tile.fill_rounded_rect(150.0, 0.0, 150.0, 180.0, 15.0, accent_bg);

    let portrait = &bundle.get(&names::avatar(entry.id))?.image;
    let avatar = slots::avatar_tile(
        font,
        portrait,
        entry.rarity,
        entry.constellation,
        &format!("Lv. {}", entry.level),
    );
    tile.draw_image(&avatar, 0, 0);

    let weapon_icon = resize_to_width(
        &bundle.get(&names::weapon(entry.weapon.id))?.image,
        120,
        imageops::FilterType::CatmullRom,
    );
    tile.draw_image(&weapon_icon, 165, 10);
    text::draw_text_aligned(
        &mut tile,
        font,
        20.0,
        &format!("Lv. {}", entry.weapon.level),
        accent_fg,
        225.0,
        172.0,
        HAlign::Center,
        VAlign::Bottom,
    );

    tile.apply_rounded_corners(15.0);
    Ok(tile.into_image())
}

/// Per-element then per-rarity count chips across the footer band.
fn draw_count_chips(canvas: &mut Canvas, font: &Font, entries: &[&RosterEntry], canvas_h: u32) {
    let by_element: BTreeMap<usize, u32> = entries
        .iter()
        .filter_map(|e| {
            palette::ELEMENT_ORDER
                .iter()
                .position(|el| *el == e.element)
        })
        .fold(BTreeMap::new(), |mut acc, idx| {
            *acc.entry(idx).or_insert(0) += 1;
            acc
        });
    let by_rarity: BTreeMap<u32, u32> = entries.iter().fold(BTreeMap::new(), |mut acc, e| {
        *acc.entry(e.rarity).or_insert(0) += 1;
        acc
    });

    let y = i64::from(canvas_h) - 80;
    let mut x = 50i64;

    for (element_idx, count) in by_element {
        let element = palette::ELEMENT_ORDER[element_idx];
        let (fg, bg) = palette::element_accent(element)
            .unwrap_or((palette::TEXT_COLOR, palette::PLATE_COLOR));
        x += draw_chip(canvas, font, &format!("{element} {count}"), fg, bg, x, y);
    }
    for (rarity, count) in by_rarity {
        let bg = palette::rarity_color(rarity);
        x += draw_chip(
            canvas,
            font,
            &format!("{rarity}\u{2605} {count}"),
            palette::TEXT_COLOR,
            bg,
            x,
            y,
        );
    }
}

fn draw_chip(
    canvas: &mut Canvas,
    font: &Font,
    label: &str,
    fg: crate::color::Rgba,
    bg: crate::color::Rgba,
    x: i64,
    y: i64,
) -> i64 {
    let (text_w, _) = font.measure(label, 28.0);
    let chip_w = text_w + 50.0;
    canvas.fill_rounded_rect(x as f32, y as f32, chip_w, 50.0, 10.0, bg);
    text::draw_text_aligned(
        canvas,
        font,
        28.0,
        label,
        fg,
        x as f32 + chip_w / 2.0,
        y as f32 + 25.0,
        HAlign::Center,
        VAlign::Center,
    );
    chip_w.ceil() as i64 + 15
}
