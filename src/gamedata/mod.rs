//! Read-only game data lookups.
//!
//! The filter resolves duties, roulettes, class jobs and worlds by numeric
//! row ID through the [`GameData`] trait. Every lookup may return `None`;
//! callers treat a missing row as "no match" rather than an error.

pub mod table;

pub use table::{GameDataError, StaticGameData};

use tracing::info;

use crate::domain::content_type;
use crate::model::PlayerInfo;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Duty (content finder condition) metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DutyInfo {
    pub row_id: u32,
    pub name: String,
    pub content_type: u32,
    pub high_end: bool,
    /// Whether the duty is offered in the duty finder.
    #[cfg_attr(feature = "serde", serde(default))]
    pub in_duty_finder: bool,
}

/// Duty roulette metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouletteInfo {
    pub row_id: u32,
    pub name: String,
    pub is_pvp: bool,
}

/// Class/job display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassJobInfo {
    pub row_id: u8,
    pub name: String,
    pub abbreviation: String,
}

/// World metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldInfo {
    pub row_id: u32,
    pub name: String,
    pub data_centre: u32,
    pub is_public: bool,
}

/// Equippable item, used only to derive the item-level ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInfo {
    pub row_id: u32,
    pub item_level: u32,
    /// Whether the item occupies the body slot.
    pub body: bool,
}

// ---------------------------------------------------------------------------
// Lookup trait
// ---------------------------------------------------------------------------

/// Static game data resolution by row ID.
///
/// Implementations might read the game's data sheets, a JSON export or a
/// test fixture. The crate provides [`StaticGameData`].
pub trait GameData: Send + Sync {
    fn duty(&self, row_id: u32) -> Option<&DutyInfo>;
    fn roulette(&self, row_id: u32) -> Option<&RouletteInfo>;
    fn class_job(&self, row_id: u8) -> Option<&ClassJobInfo>;
    fn world(&self, row_id: u32) -> Option<&WorldInfo>;

    /// All known duties, in row order.
    fn duties(&self) -> Vec<&DutyInfo>;
    /// All known worlds, in row order.
    fn worlds(&self) -> Vec<&WorldInfo>;

    /// Highest item level among body-slot equipment.
    fn max_body_item_level(&self) -> Option<u32>;
}

// ---------------------------------------------------------------------------
// Derived lookups
// ---------------------------------------------------------------------------

/// Item-level ceiling passed to the evaluator. Computed once at startup;
/// 0 when the data carries no body equipment, which disables the check.
pub fn compute_max_item_level(data: &dyn GameData) -> u32 {
    let max = data.max_body_item_level().unwrap_or(0);
    info!(max_item_level = max, "computed item level ceiling");
    max
}

/// A duty offered for a preset's duty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyChoice {
    pub row_id: u32,
    pub display_name: String,
}

/// Duties selectable in a preset's duty list, optionally narrowed by a
/// case-insensitive name query.
pub fn searchable_duties(data: &dyn GameData, query: &str) -> Vec<DutyChoice> {
    let query = query.trim().to_lowercase();
    data.duties()
        .into_iter()
        .filter(|d| d.in_duty_finder)
        .filter(|d| content_type::SELECTABLE.contains(&d.content_type))
        .filter(|d| d.name.to_lowercase().contains(&query))
        .map(|d| DutyChoice {
            row_id: d.row_id,
            display_name: capitalize_first(&d.name),
        })
        .collect()
}

fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Public worlds sharing a data centre with `home_world`, sorted by name.
/// Empty when the home world is unknown.
pub fn worlds_on_data_centre(data: &dyn GameData, home_world: u32) -> Vec<&WorldInfo> {
    let Some(home) = data.world(home_world) else {
        return Vec::new();
    };
    let dc = home.data_centre;
    let mut worlds: Vec<_> = data
        .worlds()
        .into_iter()
        .filter(|w| w.is_public && w.data_centre == dc)
        .collect();
    worlds.sort_by(|a, b| a.name.cmp(&b.name));
    worlds
}

/// `Name@World` label for an excluded player; `?` for unknown worlds.
pub fn player_label(data: &dyn GameData, player: &PlayerInfo) -> String {
    let world = data
        .world(player.world)
        .map(|w| w.name.as_str())
        .unwrap_or("?");
    format!("{}@{}", player.name, world)
}
