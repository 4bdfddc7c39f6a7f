use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::color::Rgba;

// Shared chrome colors of the draw programs.
pub const TEXT_COLOR: Rgba = Rgba::WHITE;
pub const SHADOW_COLOR: Rgba = Rgba::BLACK;
pub const STAR_COLOR: Rgba = Rgba::rgb(0xFF, 0xCC, 0x33);
pub const STAR_SHADOW_COLOR: Rgba = Rgba::rgba(0, 0, 0, 100);
pub const PLATE_COLOR: Rgba = Rgba::rgba(0, 0, 0, 128);
pub const DARK_PLATE_COLOR: Rgba = Rgba::rgba(0, 0, 0, 200);
pub const SLOT_PLATE_COLOR: Rgba = Rgba::rgba(0, 0, 0, 64);
pub const BADGE_PLATE_COLOR: Rgba = Rgba::rgba(0, 0, 0, 115);
pub const PIP_WELL_COLOR: Rgba = Rgba::rgb(47, 79, 79);
pub const LEVEL_DISK_COLOR: Rgba = Rgba::rgb(169, 169, 169);
pub const BONUS_COLOR: Rgba = Rgba::rgb(144, 238, 144);
pub const BASE_VALUE_COLOR: Rgba = Rgba::rgb(211, 211, 211);
pub const DIMMED_STAT_COLOR: Rgba = Rgba::rgb(128, 128, 128);
pub const LABEL_BAND_COLOR: Rgba = Rgba::rgb(255, 218, 185);
pub const ROSTER_BG_COLOR: Rgba = Rgba::rgb(69, 69, 69);

// Rank/constellation pip three-state rule.
pub const PIP_MAX_COLOR: Rgba = Rgba::rgb(255, 215, 0);
pub const PIP_MAX_TEXT_COLOR: Rgba = Rgba::rgb(0x8A, 0x65, 0x00);
pub const PIP_ACTIVE_COLOR: Rgba = Rgba::rgba(69, 69, 69, 200);

const FALLBACK_CARD_COLOR: Rgba = Rgba::rgb(112, 128, 144);

/// Card background color keyed by element. Unknown elements fall back to
/// slate gray with a warning; category lookup never fails a render.
pub fn card_background_color(element: &str) -> Rgba {
    match element {
        "Pyro" => Rgba::rgb(0x8F, 0x32, 0x1A),
        "Hydro" => Rgba::rgb(0x20, 0x59, 0xB9),
        "Electro" => Rgba::rgb(0x7D, 0x38, 0xB3),
        "Dendro" => Rgba::rgb(0x00, 0x6D, 0x20),
        "Cryo" => Rgba::rgb(0x40, 0xA8, 0xBB),
        "Geo" => Rgba::rgb(0x80, 0x6A, 0x00),
        "Anemo" => Rgba::rgb(0x1B, 0x9A, 0x89),
        other => {
            tracing::warn!(element = other, "unknown element, using fallback card color");
            FALLBACK_CARD_COLOR
        }
    }
}

/// Display order of elements in roster footers.
pub const ELEMENT_ORDER: [&str; 7] = [
    "Pyro", "Hydro", "Cryo", "Electro", "Anemo", "Geo", "Dendro",
];

/// Accent pair for roster chips: (foreground, translucent background).
pub fn element_accent(element: &str) -> Option<(Rgba, Rgba)> {
    static ACCENTS: Lazy<HashMap<&'static str, (Rgba, Rgba)>> = Lazy::new(|| {
        HashMap::from([
            ("Pyro", (Rgba::rgb(244, 163, 111), Rgba::rgba(198, 90, 21, 128))),
            ("Hydro", (Rgba::rgb(7, 229, 252), Rgba::rgba(25, 156, 198, 128))),
            ("Cryo", (Rgba::rgb(203, 253, 253), Rgba::rgba(108, 192, 192, 128))),
            ("Electro", (Rgba::rgb(222, 186, 255), Rgba::rgba(177, 117, 217, 128))),
            ("Anemo", (Rgba::rgb(163, 238, 202), Rgba::rgba(56, 185, 145, 128))),
            ("Geo", (Rgba::rgb(242, 213, 95), Rgba::rgba(179, 132, 36, 128))),
            ("Dendro", (Rgba::rgb(172, 230, 40), Rgba::rgba(128, 175, 18, 128))),
        ])
    });
    ACCENTS.get(element).copied()
}

/// Tier colors indexed by `rarity - 1`, clamped to the table ends.
pub const RARITY_COLORS: [Rgba; 5] = [
    Rgba::rgb(128, 128, 130),
    Rgba::rgb(79, 135, 111),
    Rgba::rgb(86, 130, 166),
    Rgba::rgb(132, 104, 173),
    Rgba::rgb(183, 125, 76),
];

pub fn rarity_color(rarity: u32) -> Rgba {
    let idx = rarity.clamp(1, RARITY_COLORS.len() as u32) - 1;
    RARITY_COLORS[idx as usize]
}

/// Stat-id display labels.
pub static STAT_LABELS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (1, "HP"),
        (2, "HP"),
        (3, "HP Percentage"),
        (4, "Base ATK"),
        (5, "ATK"),
        (6, "ATK Percentage"),
        (7, "DEF"),
        (8, "DEF"),
        (9, "DEF Percentage"),
        (20, "CRIT Rate"),
        (22, "CRIT DMG"),
        (23, "Energy Recharge"),
        (26, "Healing Bonus"),
        (27, "Incoming Healing Bonus"),
        (28, "Elemental Mastery"),
        (29, "Physical RES"),
        (30, "Physical DMG Bonus"),
        (40, "Pyro DMG Bonus"),
        (41, "Electro DMG Bonus"),
        (42, "Hydro DMG Bonus"),
        (43, "Dendro DMG Bonus"),
        (44, "Anemo DMG Bonus"),
        (45, "Geo DMG Bonus"),
        (46, "Cryo DMG Bonus"),
        (2000, "Max HP"),
        (2001, "ATK"),
        (2002, "DEF"),
    ])
});

/// Baseline values every character has; a stat only earns a display row when
/// it exceeds its baseline.
static STAT_DEFAULTS: Lazy<HashMap<u32, f32>> =
    Lazy::new(|| HashMap::from([(20, 5.0), (22, 50.0), (23, 100.0)]));

pub fn stat_label(stat_id: u32) -> &'static str {
    STAT_LABELS.get(&stat_id).copied().unwrap_or("Unknown")
}

pub fn stat_default_value(stat_id: u32) -> f32 {
    STAT_DEFAULTS.get(&stat_id).copied().unwrap_or(0.0)
}

/// The three totals rendered with base + bonus breakdown.
pub fn is_base_stat(stat_id: u32) -> bool {
    matches!(stat_id, 2000 | 2001 | 2002)
}

/// Flat HP/ATK/DEF substats render dimmed on equipment slots.
pub fn is_flat_substat(stat_id: u32) -> bool {
    matches!(stat_id, 2 | 5 | 8)
}
