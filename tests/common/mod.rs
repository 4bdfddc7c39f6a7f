// Shared fixture builders; each integration binary uses its own subset.
#![allow(dead_code)]

use std::io::Cursor;

use image::{Rgba, RgbaImage};
use statcard::{
    MemoryAssetStore,
    model::{
        CardContext, CardRequest, Chamber, ChallengeData, CharacterInfo, Constellation, Floor,
        Profile, RankEntry, Relic, RelicSet, RelicSubstat, RosterData, RosterEntry, RosterWeapon,
        Skill, StatProperty, StatValue, TeamAvatar, Weapon,
    },
    store::names,
};

/// Locate a parseable system font for text-rasterizing tests. Returns `None`
/// (tests skip) on machines without one.
pub fn load_test_font() -> Option<Vec<u8>> {
    let mut candidates: Vec<std::path::PathBuf> = Vec::new();
    if let Ok(path) = std::env::var("STATCARD_TEST_FONT") {
        candidates.push(path.into());
    }
    for path in [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ] {
        candidates.push(path.into());
    }
    collect_fonts("/usr/share/fonts".as_ref(), &mut candidates, 0);

    for path in candidates {
        if let Ok(bytes) = std::fs::read(&path) {
            if statcard::Font::from_bytes(&bytes).is_ok() {
                return Some(bytes);
            }
        }
    }
    None
}

fn collect_fonts(dir: &std::path::Path, out: &mut Vec<std::path::PathBuf>, depth: u32) {
    if depth > 4 || out.len() > 64 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fonts(&path, out, depth + 1);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ttf") | Some("otf")
        ) {
            out.push(path);
        }
    }
}

pub fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn solid_png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    png_bytes(&RgbaImage::from_pixel(w, h, Rgba(rgba)))
}

/// Deterministic multicolor bitmap with a transparent border, so the
/// normalizer has something real to crop and fade.
pub fn textured_png(w: u32, h: u32, border: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, y| {
        if x < border || y < border || x >= w - border || y >= h - border {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([
                (x * 7 % 256) as u8,
                (y * 5 % 256) as u8,
                ((x + y) * 3 % 256) as u8,
                255,
            ])
        }
    });
    png_bytes(&img)
}

pub fn test_profile() -> Profile {
    Profile {
        uid: "800000000".to_string(),
        nickname: "Test".to_string(),
        level: 60,
    }
}

fn stat(id: u32, base: &str, add: &str, final_value: &str) -> StatProperty {
    StatProperty {
        stat_id: id,
        base: base.to_string(),
        add: add.to_string(),
        final_value: final_value.to_string(),
    }
}

/// The 5-star character fixture: three skills, six constellations, four of
/// five equipment positions filled (position 4 intentionally empty).
pub fn character_fixture() -> CharacterInfo {
    CharacterInfo {
        id: 1,
        name: "Test Character".to_string(),
        element: "Pyro".to_string(),
        rarity: 5,
        level: 90,
        constellations: (0..6)
            .map(|i| Constellation {
                id: 200 + i,
                position: i as u32 + 1,
                active: i < 2,
            })
            .collect(),
        skills: vec![
            Skill { id: 301, level: 10 },
            Skill { id: 302, level: 9 },
            Skill { id: 303, level: 9 },
        ],
        weapon: Weapon {
            id: 10,
            name: "Test Claymore".to_string(),
            rarity: 5,
            level: 90,
            affix_level: 1,
            main_stat: StatValue {
                stat_id: 4,
                value: "674".to_string(),
            },
            sub_stat: Some(StatValue {
                stat_id: 22,
                value: "44.1%".to_string(),
            }),
        },
        relics: [1u32, 2, 3, 5]
            .iter()
            .map(|&pos| Relic {
                id: 400 + u64::from(pos),
                position: pos,
                rarity: 5,
                level: 20,
                set: RelicSet {
                    name: "Crimson Witch".to_string(),
                    activation_thresholds: vec![2, 4],
                },
                main_stat: StatValue {
                    stat_id: 20,
                    value: "31.1%".to_string(),
                },
                substats: vec![
                    RelicSubstat {
                        stat_id: 22,
                        value: "14.8%".to_string(),
                        rolls: 2,
                    },
                    RelicSubstat {
                        stat_id: 5,
                        value: "19".to_string(),
                        rolls: 0,
                    },
                ],
            })
            .collect(),
        base_stats: vec![
            stat(2000, "12,858", "4,780", "17,638"),
            stat(2001, "842", "1,200", "2,042"),
            stat(2002, "815", "120", "935"),
            stat(28, "0", "115", "115"),
        ],
        bonus_stats: vec![
            stat(20, "5.0%", "26.1%", "31.1%"),
            stat(22, "50.0%", "110.2%", "160.2%"),
            stat(23, "100.0%", "30.5%", "130.5%"),
            stat(40, "0.0%", "46.6%", "46.6%"),
            stat(26, "0.0%", "15.0%", "15.0%"),
            stat(28, "0", "115", "115"),
        ],
    }
}

/// Provision every asset the character fixture's render requires.
pub fn populate_character_assets(store: &MemoryAssetStore, info: &CharacterInfo) {
    store.insert(names::CARD_OVERLAY, textured_png(512, 512, 0));
    store.insert(names::portrait(info.id), textured_png(300, 400, 20));
    store.insert(names::weapon(info.weapon.id), textured_png(128, 128, 8));
    for c in &info.constellations {
        store.insert(names::constellation(c.id), textured_png(90, 90, 4));
    }
    for s in &info.skills {
        store.insert(names::skill(s.id), textured_png(100, 100, 4));
    }
    for r in &info.relics {
        store.insert(names::relic(r.id), textured_png(160, 160, 10));
    }
    for id in [4u32, 5, 20, 22, 23, 26, 28, 40, 2000, 2001, 2002] {
        store.insert(names::stat_icon(id), solid_png(48, 48, [220, 220, 220, 255]));
    }
}

pub fn character_context() -> CardContext {
    CardContext {
        user_id: 42,
        server: "os_euro".to_string(),
        profile: test_profile(),
        request: CardRequest::Character(Box::new(character_fixture())),
        params: Default::default(),
    }
}

pub fn roster_fixture(count: u32) -> RosterData {
    let elements = ["Pyro", "Hydro", "Cryo", "Electro", "Anemo", "Geo", "Dendro"];
    RosterData {
        characters: (0..count)
            .map(|i| RosterEntry {
                id: 500 + u64::from(i),
                name: format!("Char {i}"),
                element: elements[i as usize % elements.len()].to_string(),
                rarity: 4 + (i % 2),
                level: 60 + (i % 30),
                constellation: i % 7,
                weapon: RosterWeapon {
                    id: 600 + u64::from(i % 3),
                    rarity: 4,
                    level: 80,
                },
            })
            .collect(),
    }
}

pub fn populate_roster_assets(store: &MemoryAssetStore, data: &RosterData) {
    for entry in &data.characters {
        store.insert(names::avatar(entry.id), textured_png(150, 150, 6));
        store.insert(names::weapon(entry.weapon.id), textured_png(96, 96, 4));
    }
}

pub fn roster_context(count: u32) -> CardContext {
    CardContext {
        user_id: 42,
        server: "os_euro".to_string(),
        profile: test_profile(),
        request: CardRequest::Roster(roster_fixture(count)),
        params: Default::default(),
    }
}

pub fn challenge_fixture() -> ChallengeData {
    let rank = |avatar_id: u64, value: u64| RankEntry {
        avatar_id,
        value,
        rarity: 5,
        constellation: 2,
    };
    ChallengeData {
        title: "Spiral Abyss".to_string(),
        period: "01/07/2025 - 16/07/2025".to_string(),
        max_depth: "12-3".to_string(),
        total_battles: 14,
        total_wins: 12,
        total_stars: 33,
        most_used: (0..4).map(|i| rank(700 + i, 10 - i)).collect(),
        strongest_strike: rank(700, 184_220),
        most_defeats: rank(701, 46),
        most_damage_taken: rank(702, 18_905),
        skills_cast: rank(703, 120),
        bursts_unleashed: rank(700, 41),
        floors: vec![Floor {
            index: 12,
            stars: 7,
            max_stars: 9,
            chambers: vec![
                Chamber {
                    index: 1,
                    stars: 3,
                    teams: vec![
                        TeamAvatar {
                            avatar_id: 700,
                            level: 90,
                            rarity: 5,
                            constellation: 6,
                        },
                        TeamAvatar {
                            avatar_id: 701,
                            level: 80,
                            rarity: 4,
                            constellation: 1,
                        },
                    ],
                },
                Chamber {
                    index: 2,
                    stars: 2,
                    teams: vec![TeamAvatar {
                        avatar_id: 702,
                        level: 85,
                        rarity: 5,
                        constellation: 0,
                    }],
                },
            ],
        }],
    }
}

pub fn populate_challenge_assets(store: &MemoryAssetStore, data: &ChallengeData) {
    store.insert(
        names::CHALLENGE_BACKGROUND,
        solid_png(800, 2400, [30, 34, 52, 255]),
    );
    for entry in &data.most_used {
        store.insert(names::avatar(entry.avatar_id), textured_png(150, 150, 6));
    }
    for entry in [
        &data.strongest_strike,
        &data.most_defeats,
        &data.most_damage_taken,
        &data.skills_cast,
        &data.bursts_unleashed,
    ] {
        store.insert(
            names::side_avatar(entry.avatar_id),
            textured_png(120, 120, 6),
        );
    }
    for floor in &data.floors {
        for chamber in &floor.chambers {
            for member in &chamber.teams {
                store.insert(names::avatar(member.avatar_id), textured_png(150, 150, 6));
            }
        }
    }
}

pub fn challenge_context() -> CardContext {
    CardContext {
        user_id: 42,
        server: "os_euro".to_string(),
        profile: test_profile(),
        request: CardRequest::Challenge(challenge_fixture()),
        params: Default::default(),
    }
}
