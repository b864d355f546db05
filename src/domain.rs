//! Closed enumerations shared by listings, presets and game data.
//!
//! Flag enumerations name single bits of the integer flag fields carried by
//! listings and presets. They are never stored directly; presets keep one
//! `u32` per dimension and toggle bits through [`get_flag`] / [`set_flag`].

// ---------------------------------------------------------------------------
// Duty classification
// ---------------------------------------------------------------------------

/// How a listing's duty was picked in the recruitment board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DutyType {
    Other,
    Roulette,
    Normal,
}

impl DutyType {
    /// Raw value as sent by the game client.
    pub fn raw(self) -> u8 {
        match self {
            Self::Other => 0,
            Self::Roulette => 1 << 0,
            Self::Normal => 1 << 1,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Other),
            1 => Some(Self::Roulette),
            2 => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Board-level category a listing was posted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DutyCategory {
    Duty,
    QuestBattles,
    Fates,
    TreasureHunt,
    TheHunt,
    GatheringForays,
    DeepDungeons,
    AdventuringForays,
    VariantAndCriterion,
}

impl DutyCategory {
    pub fn raw(self) -> u32 {
        match self {
            Self::Duty => 0,
            Self::QuestBattles => 1 << 0,
            Self::Fates => 1 << 1,
            Self::TreasureHunt => 1 << 2,
            Self::TheHunt => 1 << 3,
            Self::GatheringForays => 1 << 4,
            Self::DeepDungeons => 1 << 5,
            Self::AdventuringForays => 1 << 6,
            Self::VariantAndCriterion => 1 << 7,
        }
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        [
            Self::Duty,
            Self::QuestBattles,
            Self::Fates,
            Self::TreasureHunt,
            Self::TheHunt,
            Self::GatheringForays,
            Self::DeepDungeons,
            Self::AdventuringForays,
            Self::VariantAndCriterion,
        ]
        .into_iter()
        .find(|c| c.raw() == raw)
    }
}

/// Content-type row IDs referenced by the category table and duty search.
pub mod content_type {
    pub const DUTY_ROULETTE: u32 = 1;
    pub const DUNGEONS: u32 = 2;
    pub const GUILDHESTS: u32 = 3;
    pub const TRIALS: u32 = 4;
    pub const RAIDS: u32 = 5;
    pub const PVP: u32 = 6;
    pub const QUEST_BATTLES: u32 = 7;
    pub const FATES: u32 = 8;
    pub const TREASURE_HUNT: u32 = 9;
    pub const DISCIPLES_OF_THE_LAND: u32 = 16;
    pub const DEEP_DUNGEONS: u32 = 21;
    pub const EUREKA: u32 = 26;
    pub const ULTIMATE_RAIDS: u32 = 28;
    pub const VARIANT_AND_CRITERION_DUNGEONS: u32 = 30;

    /// Content types offered when building a preset's duty list.
    pub const SELECTABLE: [u32; 11] = [2, 3, 4, 5, 6, 16, 21, 26, 28, 29, 30];
}

/// User-facing category tags a preset can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UiCategory {
    None,
    DutyRoulette,
    Dungeons,
    Guildhests,
    Trials,
    Raids,
    HighEndDuty,
    Pvp,
    QuestBattles,
    Fates,
    TreasureHunt,
    TheHunt,
    GatheringForays,
    DeepDungeons,
    AdventuringForays,
    VariantAndCriterionDungeons,
}

impl UiCategory {
    pub const ALL: [UiCategory; 16] = [
        Self::None,
        Self::DutyRoulette,
        Self::Dungeons,
        Self::Guildhests,
        Self::Trials,
        Self::Raids,
        Self::HighEndDuty,
        Self::Pvp,
        Self::QuestBattles,
        Self::Fates,
        Self::TreasureHunt,
        Self::TheHunt,
        Self::GatheringForays,
        Self::DeepDungeons,
        Self::AdventuringForays,
        Self::VariantAndCriterionDungeons,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::DutyRoulette => "Duty Roulette",
            Self::Dungeons => "Dungeons",
            Self::Guildhests => "Guildhests",
            Self::Trials => "Trials",
            Self::Raids => "Raids",
            Self::HighEndDuty => "High-end Duty",
            Self::Pvp => "PvP",
            Self::QuestBattles => "Quest Battles",
            Self::Fates => "FATEs",
            Self::TreasureHunt => "Treasure Hunt",
            Self::TheHunt => "The Hunt",
            Self::GatheringForays => "Gathering Forays",
            Self::DeepDungeons => "Deep Dungeons",
            Self::AdventuringForays => "Field Operations",
            Self::VariantAndCriterionDungeons => "V&C Dungeon Finder",
        }
    }
}

// ---------------------------------------------------------------------------
// Preset modes and UI settings
// ---------------------------------------------------------------------------

/// How a preset's duty set is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListMode {
    /// Only listed duties are shown.
    Whitelist,
    /// Listed duties are hidden.
    #[default]
    Blacklist,
}

/// Which side of the recruitment board the filter window docks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowSide {
    #[default]
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Flag enumerations
// ---------------------------------------------------------------------------

/// A named bit inside one of the integer flag fields.
pub trait FlagBit: Copy {
    fn bit(self) -> u32;
}

/// Returns `true` if `flag` is set in `field`.
pub fn get_flag<F: FlagBit>(field: u32, flag: F) -> bool {
    field & flag.bit() != 0
}

/// Sets or clears `flag` in `field`.
pub fn set_flag<F: FlagBit>(field: &mut u32, flag: F, value: bool) {
    if value {
        *field |= flag.bit();
    } else {
        *field &= !flag.bit();
    }
}

/// Listing-side containment: a listing with no bits set accepts anything,
/// otherwise it must share at least one bit with `required`.
pub fn listing_accepts(listing_bits: u32, required: u32) -> bool {
    listing_bits == 0 || listing_bits & required != 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchAreaFlag {
    DataCentre,
    Private,
    AllianceRaid,
    World,
    OnePlayerPerJob,
}

impl FlagBit for SearchAreaFlag {
    fn bit(self) -> u32 {
        match self {
            Self::DataCentre => 1 << 0,
            Self::Private => 1 << 1,
            Self::AllianceRaid => 1 << 2,
            Self::World => 1 << 3,
            Self::OnePlayerPerJob => 1 << 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LootRuleFlag {
    GreedOnly,
    Lootmaster,
}

impl FlagBit for LootRuleFlag {
    fn bit(self) -> u32 {
        match self {
            Self::GreedOnly => 1 << 0,
            Self::Lootmaster => 1 << 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DutyFinderFlag {
    UndersizedParty,
    MinimumItemLevel,
    SilenceEcho,
}

impl FlagBit for DutyFinderFlag {
    fn bit(self) -> u32 {
        match self {
            Self::UndersizedParty => 1 << 0,
            Self::MinimumItemLevel => 1 << 1,
            Self::SilenceEcho => 1 << 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionFlag {
    /// No completion requirement.
    NoCondition,
    DutyComplete,
    DutyIncomplete,
}

impl FlagBit for ConditionFlag {
    fn bit(self) -> u32 {
        match self {
            Self::NoCondition => 1 << 0,
            Self::DutyComplete => 1 << 1,
            Self::DutyIncomplete => 1 << 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveFlag {
    DutyCompletion,
    Practice,
    Loot,
}

impl FlagBit for ObjectiveFlag {
    fn bit(self) -> u32 {
        match self {
            Self::DutyCompletion => 1 << 0,
            Self::Practice => 1 << 1,
            Self::Loot => 1 << 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Classes and jobs that can occupy a party slot.
///
/// Each job owns one bit of a job mask and maps to a class-job row ID in the
/// game's static data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Job {
    Gladiator,
    Pugilist,
    Marauder,
    Lancer,
    Archer,
    Conjurer,
    Thaumaturge,
    Paladin,
    Monk,
    Warrior,
    Dragoon,
    Bard,
    WhiteMage,
    BlackMage,
    Arcanist,
    Summoner,
    Scholar,
    Rogue,
    Ninja,
    Machinist,
    DarkKnight,
    Astrologian,
    Samurai,
    RedMage,
    BlueMage,
    Gunbreaker,
    Dancer,
    Reaper,
    Sage,
    Viper,
    Pictomancer,
}

/// Mask with every job bit set.
pub const ALL_JOBS_MASK: u32 = (1 << 31) - 1;

impl Job {
    /// Declaration order equals bit order.
    pub const ALL: [Job; 31] = [
        Self::Gladiator,
        Self::Pugilist,
        Self::Marauder,
        Self::Lancer,
        Self::Archer,
        Self::Conjurer,
        Self::Thaumaturge,
        Self::Paladin,
        Self::Monk,
        Self::Warrior,
        Self::Dragoon,
        Self::Bard,
        Self::WhiteMage,
        Self::BlackMage,
        Self::Arcanist,
        Self::Summoner,
        Self::Scholar,
        Self::Rogue,
        Self::Ninja,
        Self::Machinist,
        Self::DarkKnight,
        Self::Astrologian,
        Self::Samurai,
        Self::RedMage,
        Self::BlueMage,
        Self::Gunbreaker,
        Self::Dancer,
        Self::Reaper,
        Self::Sage,
        Self::Viper,
        Self::Pictomancer,
    ];

    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Class-job row ID as reported in a listing's occupied slots.
    pub fn row_id(self) -> u8 {
        match self {
            Self::Gladiator => 1,
            Self::Pugilist => 2,
            Self::Marauder => 3,
            Self::Lancer => 4,
            Self::Archer => 5,
            Self::Conjurer => 6,
            Self::Thaumaturge => 7,
            Self::Paladin => 19,
            Self::Monk => 20,
            Self::Warrior => 21,
            Self::Dragoon => 22,
            Self::Bard => 23,
            Self::WhiteMage => 24,
            Self::BlackMage => 25,
            Self::Arcanist => 26,
            Self::Summoner => 27,
            Self::Scholar => 28,
            Self::Rogue => 29,
            Self::Ninja => 30,
            Self::Machinist => 31,
            Self::DarkKnight => 32,
            Self::Astrologian => 33,
            Self::Samurai => 34,
            Self::RedMage => 35,
            Self::BlueMage => 36,
            Self::Gunbreaker => 37,
            Self::Dancer => 38,
            Self::Reaper => 39,
            Self::Sage => 40,
            Self::Viper => 41,
            Self::Pictomancer => 42,
        }
    }

    pub fn from_row_id(row_id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.row_id() == row_id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Gladiator => "Gladiator",
            Self::Pugilist => "Pugilist",
            Self::Marauder => "Marauder",
            Self::Lancer => "Lancer",
            Self::Archer => "Archer",
            Self::Conjurer => "Conjurer",
            Self::Thaumaturge => "Thaumaturge",
            Self::Paladin => "Paladin",
            Self::Monk => "Monk",
            Self::Warrior => "Warrior",
            Self::Dragoon => "Dragoon",
            Self::Bard => "Bard",
            Self::WhiteMage => "White Mage",
            Self::BlackMage => "Black Mage",
            Self::Arcanist => "Arcanist",
            Self::Summoner => "Summoner",
            Self::Scholar => "Scholar",
            Self::Rogue => "Rogue",
            Self::Ninja => "Ninja",
            Self::Machinist => "Machinist",
            Self::DarkKnight => "Dark Knight",
            Self::Astrologian => "Astrologian",
            Self::Samurai => "Samurai",
            Self::RedMage => "Red Mage",
            Self::BlueMage => "Blue Mage",
            Self::Gunbreaker => "Gunbreaker",
            Self::Dancer => "Dancer",
            Self::Reaper => "Reaper",
            Self::Sage => "Sage",
            Self::Viper => "Viper",
            Self::Pictomancer => "Pictomancer",
        }
    }

    /// Jobs whose bit is set in `mask`, in bit order.
    pub fn in_mask(mask: u32) -> impl Iterator<Item = Job> {
        Self::ALL.into_iter().filter(move |j| mask & j.bit() != 0)
    }
}

/// Builds a job mask from a list of jobs.
pub fn job_mask(jobs: &[Job]) -> u32 {
    jobs.iter().fold(0, |acc, j| acc | j.bit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_mode_default_is_blacklist() {
        assert_eq!(ListMode::default(), ListMode::Blacklist);
    }

    #[test]
    fn window_side_default_is_left() {
        assert_eq!(WindowSide::default(), WindowSide::Left);
    }

    #[test]
    fn duty_type_raw_round_trip() {
        for t in [DutyType::Other, DutyType::Roulette, DutyType::Normal] {
            assert_eq!(DutyType::from_raw(t.raw()), Some(t));
        }
        assert_eq!(DutyType::from_raw(7), None);
    }

    #[test]
    fn duty_category_raw_values() {
        assert_eq!(DutyCategory::Duty.raw(), 0);
        assert_eq!(DutyCategory::VariantAndCriterion.raw(), 128);
        assert_eq!(
            DutyCategory::from_raw(64),
            Some(DutyCategory::AdventuringForays)
        );
        assert_eq!(DutyCategory::from_raw(3), None);
    }

    #[test]
    fn ui_category_has_sixteen_distinct_values() {
        let set: std::collections::BTreeSet<_> = UiCategory::ALL.iter().collect();
        assert_eq!(set.len(), 16);
    }

    #[test]
    fn flag_get_and_set() {
        let mut field = u32::MAX;
        assert!(get_flag(field, SearchAreaFlag::World));
        set_flag(&mut field, SearchAreaFlag::World, false);
        assert!(!get_flag(field, SearchAreaFlag::World));
        assert!(get_flag(field, SearchAreaFlag::DataCentre));
        set_flag(&mut field, SearchAreaFlag::World, true);
        assert_eq!(field, u32::MAX);
    }

    #[test]
    fn listing_accepts_zero_and_overlap() {
        assert!(listing_accepts(0, 0));
        assert!(listing_accepts(0b10, 0b11));
        assert!(!listing_accepts(0b10, 0b01));
    }

    #[test]
    fn job_bits_follow_declaration_order() {
        assert_eq!(Job::Gladiator.bit(), 1);
        assert_eq!(Job::Paladin.bit(), 1 << 7);
        assert_eq!(Job::Pictomancer.bit(), 1 << 30);
        assert_eq!(job_mask(&Job::ALL), ALL_JOBS_MASK);
    }

    #[test]
    fn job_row_ids_are_unique_and_reversible() {
        for job in Job::ALL {
            assert_eq!(Job::from_row_id(job.row_id()), Some(job));
        }
        assert_eq!(Job::from_row_id(0), None);
        assert_eq!(Job::from_row_id(8), None);
    }

    #[test]
    fn jobs_in_mask() {
        let mask = job_mask(&[Job::Bard, Job::Dancer, Job::Machinist]);
        let jobs: Vec<_> = Job::in_mask(mask).collect();
        assert_eq!(jobs, vec![Job::Bard, Job::Machinist, Job::Dancer]);
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        fn round_trip_json<T>(val: &T)
        where
            T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
        {
            let json = serde_json::to_string(val).unwrap();
            let back: T = serde_json::from_str(&json).unwrap();
            assert_eq!(*val, back);
        }

        #[test]
        fn ui_category_serde_round_trip() {
            for c in UiCategory::ALL {
                round_trip_json(&c);
            }
        }

        #[test]
        fn job_serde_round_trip() {
            for j in Job::ALL {
                round_trip_json(&j);
            }
        }

        #[test]
        fn list_mode_serializes_by_name() {
            let json = serde_json::to_string(&ListMode::Whitelist).unwrap();
            assert_eq!(json, "\"Whitelist\"");
        }
    }
}
