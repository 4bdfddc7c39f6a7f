use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StatcardError, StatcardResult};

/// Game profile of the requesting user, rendered into card footers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub uid: String,
    pub nickname: String,
    pub level: u32,
}

/// Read-only input of one card render. No part of the pipeline mutates it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CardContext {
    pub user_id: u64,
    pub server: String,
    pub profile: Profile,
    pub request: CardRequest,
    /// Free-form per-command parameters forwarded by the application layer.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

/// The closed set of card families.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardRequest {
    Character(Box<CharacterInfo>),
    Roster(RosterData),
    Challenge(ChallengeData),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CharacterInfo {
    pub id: u64,
    pub name: String,
    pub element: String,
    pub rarity: u32,
    pub level: u32,
    pub constellations: Vec<Constellation>,
    pub skills: Vec<Skill>,
    pub weapon: Weapon,
    pub relics: Vec<Relic>,
    /// Ordered totals block (Max HP / ATK / DEF and friends).
    pub base_stats: Vec<StatProperty>,
    /// Stats the game marks as selected/bonus for this character.
    pub bonus_stats: Vec<StatProperty>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Constellation {
    pub id: u64,
    pub position: u32,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Skill {
    pub id: u64,
    pub level: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Weapon {
    pub id: u64,
    pub name: String,
    pub rarity: u32,
    pub level: u32,
    pub affix_level: u32,
    pub main_stat: StatValue,
    #[serde(default)]
    pub sub_stat: Option<StatValue>,
}

/// A display-ready stat: percentage values keep their trailing `%`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatValue {
    pub stat_id: u32,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatProperty {
    pub stat_id: u32,
    pub base: String,
    pub add: String,
    #[serde(rename = "final")]
    pub final_value: String,
}

impl StatProperty {
    pub fn final_numeric(&self) -> StatcardResult<f32> {
        parse_stat_number(&self.final_value)
    }

    pub fn base_numeric(&self) -> StatcardResult<f32> {
        parse_stat_number(&self.base)
    }
}

/// Parse a display stat ("4,780" / "49.6%") back to its numeric value.
pub fn parse_stat_number(value: &str) -> StatcardResult<f32> {
    let trimmed = value.trim().trim_end_matches('%').replace(',', "");
    trimmed
        .parse::<f32>()
        .map_err(|_| StatcardError::data(format!("unparsable stat value '{value}'")))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Relic {
    pub id: u64,
    /// 1-based slot position; slots without a relic render the placeholder.
    pub position: u32,
    pub rarity: u32,
    pub level: u32,
    pub set: RelicSet,
    pub main_stat: StatValue,
    pub substats: Vec<RelicSubstat>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelicSet {
    pub name: String,
    /// Piece counts at which set bonuses activate (usually [2, 4]).
    pub activation_thresholds: Vec<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelicSubstat {
    pub stat_id: u32,
    pub value: String,
    /// Upgrade rolls beyond the initial one; rendered as dot markers.
    pub rolls: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterData {
    pub characters: Vec<RosterEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: u64,
    pub name: String,
    pub element: String,
    pub rarity: u32,
    pub level: u32,
    pub constellation: u32,
    pub weapon: RosterWeapon,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RosterWeapon {
    pub id: u64,
    pub rarity: u32,
    pub level: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeData {
    pub title: String,
    /// Preformatted season period; clock and timezone handling stays in the
    /// application layer.
    pub period: String,
    pub max_depth: String,
    pub total_battles: u32,
    pub total_wins: u32,
    pub total_stars: u32,
    pub most_used: Vec<RankEntry>,
    pub strongest_strike: RankEntry,
    pub most_defeats: RankEntry,
    pub most_damage_taken: RankEntry,
    pub skills_cast: RankEntry,
    pub bursts_unleashed: RankEntry,
    pub floors: Vec<Floor>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RankEntry {
    pub avatar_id: u64,
    pub value: u64,
    #[serde(default)]
    pub rarity: u32,
    #[serde(default)]
    pub constellation: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Floor {
    pub index: u32,
    pub stars: u32,
    pub max_stars: u32,
    pub chambers: Vec<Chamber>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chamber {
    pub index: u32,
    pub stars: u32,
    pub teams: Vec<TeamAvatar>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TeamAvatar {
    pub avatar_id: u64,
    pub level: u32,
    pub rarity: u32,
    pub constellation: u32,
}
