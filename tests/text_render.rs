mod common;

use statcard::{Canvas, Font, Rgba, text};

macro_rules! require_font {
    () => {
        match common::load_test_font() {
            Some(bytes) => bytes,
            None => {
                eprintln!("skipping: no parseable system font found");
                return;
            }
        }
    };
}

#[test]
fn drawn_text_marks_pixels() {
    let bytes = require_font!();
    let font = Font::from_bytes(&bytes).unwrap();
    let mut canvas = Canvas::new(400, 80);

    text::draw_text(&mut canvas, &font, 40.0, "Lv. 90", Rgba::WHITE, 10.0, 10.0);
    let covered = canvas.image().pixels().filter(|p| p.0[3] > 0).count();
    assert!(covered > 50, "expected glyph coverage, got {covered} pixels");
}

#[test]
fn measure_grows_with_text_length() {
    let bytes = require_font!();
    let font = Font::from_bytes(&bytes).unwrap();

    let (short, _) = font.measure("Lv. 9", 40.0);
    let (long, _) = font.measure("Lv. 9999", 40.0);
    assert!(long > short);
    assert!(font.line_height(40.0) > 0.0);
}

#[test]
fn shadow_pair_puts_dark_pixels_under_light_ones() {
    let bytes = require_font!();
    let font = Font::from_bytes(&bytes).unwrap();
    let mut canvas = Canvas::new(400, 100);

    text::draw_text_with_shadow(
        &mut canvas,
        &font,
        48.0,
        "Test",
        Rgba::WHITE,
        Rgba::BLACK,
        20.0,
        20.0,
    );
    let img = canvas.image();
    let mut has_light = false;
    let mut has_dark = false;
    for p in img.pixels() {
        if p.0[3] > 200 {
            if p.0[0] > 200 {
                has_light = true;
            }
            if p.0[0] < 50 {
                has_dark = true;
            }
        }
    }
    assert!(has_light && has_dark);
}

#[test]
fn right_alignment_ends_at_the_anchor() {
    let bytes = require_font!();
    let font = Font::from_bytes(&bytes).unwrap();
    let mut canvas = Canvas::new(300, 60);

    text::draw_text_aligned(
        &mut canvas,
        &font,
        32.0,
        "123",
        Rgba::WHITE,
        290.0,
        10.0,
        text::HAlign::Right,
        text::VAlign::Top,
    );
    // nothing may land right of the anchor (tiny AA spill allowed)
    let img = canvas.image();
    let spill = (295..300)
        .flat_map(|x| (0..60).map(move |y| (x, y)))
        .filter(|&(x, y)| img.get_pixel(x, y).0[3] > 0)
        .count();
    assert_eq!(spill, 0);
    // and the digits are somewhere left of it
    let covered = img.pixels().filter(|p| p.0[3] > 0).count();
    assert!(covered > 20);
}
