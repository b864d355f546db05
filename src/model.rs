use chrono::{DateTime, Utc};

use crate::domain::{ALL_JOBS_MASK, DutyCategory, DutyType, FlagBit, SearchAreaFlag, get_flag};
use crate::filter::decision::HideReason;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifies a recruitment listing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingId(pub u32);

/// A player excluded by name and home world. Equality is exact and
/// case-sensitive on both fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerInfo {
    pub name: String,
    pub world: u32,
}

impl PlayerInfo {
    pub fn new(name: impl Into<String>, world: u32) -> Self {
        Self {
            name: name.into(),
            world,
        }
    }
}

// ---------------------------------------------------------------------------
// Listing: read-only input from the listing source
// ---------------------------------------------------------------------------

/// A single party slot of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingSlot {
    /// Job mask of the jobs this slot accepts.
    pub accepting: u32,
}

impl ListingSlot {
    pub fn accepting(mask: u32) -> Self {
        Self { accepting: mask }
    }

    /// Returns `true` if any job in `wanted` may take this slot.
    pub fn accepts_any(&self, wanted: u32) -> bool {
        self.accepting & wanted != 0
    }
}

/// A recruitment advertisement as delivered by the listing source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Listing {
    pub id: ListingId,
    /// Author's character name.
    pub name: String,
    pub home_world: u32,

    pub raw_duty: u32,
    pub duty_type: DutyType,
    pub category: DutyCategory,
    pub min_item_level: u32,

    pub search_area: u32,
    pub loot_rules: u32,
    pub duty_finder_settings: u32,
    pub conditions: u32,
    pub objective: u32,

    pub slots: Vec<ListingSlot>,
    /// Class-job row ID occupying each slot, 0 when empty. Parallel to `slots`.
    pub jobs_present: Vec<u8>,

    pub description: String,
}

impl Listing {
    /// Total number of party slots.
    pub fn slots_available(&self) -> usize {
        self.slots.len()
    }

    /// Row ID occupying slot `idx`, treating missing entries as empty.
    pub fn present_at(&self, idx: usize) -> u8 {
        self.jobs_present.get(idx).copied().unwrap_or(0)
    }

    /// Plain bit test on the listing's search area.
    pub fn has_search_area(&self, flag: SearchAreaFlag) -> bool {
        get_flag(self.search_area, flag)
    }

    /// Builds an eight-slot listing with neutral defaults, for tests and demos.
    pub fn test_default(id: u32, name: &str, raw_duty: u32) -> Self {
        Self {
            id: ListingId(id),
            name: name.to_string(),
            home_world: 0,
            raw_duty,
            duty_type: DutyType::Normal,
            category: DutyCategory::Duty,
            min_item_level: 0,
            search_area: SearchAreaFlag::DataCentre.bit(),
            loot_rules: 0,
            duty_finder_settings: 0,
            conditions: 0,
            objective: 0,
            slots: vec![ListingSlot::accepting(ALL_JOBS_MASK); 8],
            jobs_present: vec![0; 8],
            description: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Feed events
// ---------------------------------------------------------------------------

/// Events delivered by the listing source.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListingEvent {
    /// A listing was received or updated on the board.
    Received(Listing),
    /// A listing disappeared from the board.
    Withdrawn(ListingId),
    /// The user joined a listing.
    Joined(Listing),
    /// The board was closed; all tracked listings are dropped.
    Cleared,
}

/// Visibility outcome for one listing, emitted by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListingVerdict {
    pub listing_id: ListingId,
    pub visible: bool,
    pub reason: Option<HideReason>,
    /// `true` when produced by a refresh rather than a fresh listing.
    pub refresh: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// A highlight term found in a listing's description.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightMatch {
    pub term: String,
    pub listing_id: ListingId,
    pub author: String,
    pub description: String,
}
