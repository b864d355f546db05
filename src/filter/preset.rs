//! User-editable filter presets.
//!
//! A [`Preset`] is plain data. Its identity is the [`PresetId`] key it is
//! stored under, so a duplicated preset carries no identity until the store
//! inserts it.
//!
//! Every restriction starts permissive: flag fields have all bits set, sets
//! are empty, bounds are `None`. Only `categories` is materialised, and
//! [`Preset::create`] fills it with every category.

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

use crate::domain::{
    ALL_JOBS_MASK, ConditionFlag, DutyFinderFlag, Job, ListMode, LootRuleFlag, ObjectiveFlag,
    SearchAreaFlag, UiCategory, get_flag, set_flag,
};
use crate::filter::error::PresetError;
use crate::gamedata::GameData;
use crate::model::PlayerInfo;

/// Name given to presets the user has not named yet.
pub const DEFAULT_PRESET_NAME: &str = "<unnamed preset>";

/// Appended to the name of a duplicated preset.
pub const COPY_SUFFIX: &str = " (copy)";

// ---------------------------------------------------------------------------
// PresetId
// ---------------------------------------------------------------------------

/// Stable 128-bit preset identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PresetId(pub Uuid);

impl PresetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PresetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for PresetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Description terms
// ---------------------------------------------------------------------------

/// Which description term set an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TermKind {
    /// At least one must appear for the listing to be shown.
    Required,
    /// Matches raise a notification.
    Highlight,
    /// Any match hides the listing.
    Exclude,
}

/// Trims and lowercases a term; `None` when nothing is left.
pub fn normalize_term(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Preset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Preset {
    pub name: String,

    pub duties_mode: ListMode,
    pub duties: BTreeSet<u32>,

    pub categories: BTreeSet<UiCategory>,

    /// Wanted job groups. Each entry is one recruit, as a mask of the jobs
    /// that recruit may play.
    pub jobs: Vec<u32>,
    /// Jobs that must not already be in the party. Holds at most one mask;
    /// see [`Preset::jobs_limit_mask`].
    pub jobs_limit: Vec<u32>,

    pub search_area: u32,
    pub loot_rule: u32,
    pub duty_finder_settings: u32,
    pub conditions: u32,
    pub objectives: u32,

    pub allow_huge_item_level: bool,
    pub min_item_level: Option<u32>,
    pub max_item_level: Option<u32>,

    pub players: BTreeSet<PlayerInfo>,
    pub description: BTreeSet<String>,
    pub description_like: BTreeSet<String>,
    pub description_exclude: BTreeSet<String>,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: DEFAULT_PRESET_NAME.to_string(),
            duties_mode: ListMode::Blacklist,
            duties: BTreeSet::new(),
            categories: BTreeSet::new(),
            jobs: Vec::new(),
            jobs_limit: Vec::new(),
            search_area: u32::MAX,
            loot_rule: u32::MAX,
            duty_finder_settings: u32::MAX,
            conditions: u32::MAX,
            objectives: u32::MAX,
            allow_huge_item_level: true,
            min_item_level: None,
            max_item_level: None,
            players: BTreeSet::new(),
            description: BTreeSet::new(),
            description_like: BTreeSet::new(),
            description_exclude: BTreeSet::new(),
        }
    }
}

impl Preset {
    /// A fresh preset with every category selected.
    pub fn create() -> Self {
        Self {
            categories: UiCategory::ALL.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Deep copy with the name suffixed. The copy has no identity yet.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.name.push_str(COPY_SUFFIX);
        copy
    }

    pub fn rename(&mut self, name: &str) -> Result<(), PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::BlankName);
        }
        self.name = name.to_string();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Flag accessors
    // -----------------------------------------------------------------------

    pub fn search_area_flag(&self, flag: SearchAreaFlag) -> bool {
        get_flag(self.search_area, flag)
    }

    pub fn set_search_area_flag(&mut self, flag: SearchAreaFlag, value: bool) {
        set_flag(&mut self.search_area, flag, value);
    }

    pub fn loot_rule_flag(&self, flag: LootRuleFlag) -> bool {
        get_flag(self.loot_rule, flag)
    }

    pub fn set_loot_rule_flag(&mut self, flag: LootRuleFlag, value: bool) {
        set_flag(&mut self.loot_rule, flag, value);
    }

    pub fn duty_finder_flag(&self, flag: DutyFinderFlag) -> bool {
        get_flag(self.duty_finder_settings, flag)
    }

    pub fn set_duty_finder_flag(&mut self, flag: DutyFinderFlag, value: bool) {
        set_flag(&mut self.duty_finder_settings, flag, value);
    }

    pub fn condition_flag(&self, flag: ConditionFlag) -> bool {
        get_flag(self.conditions, flag)
    }

    pub fn set_condition_flag(&mut self, flag: ConditionFlag, value: bool) {
        set_flag(&mut self.conditions, flag, value);
    }

    pub fn objective_flag(&self, flag: ObjectiveFlag) -> bool {
        get_flag(self.objectives, flag)
    }

    pub fn set_objective_flag(&mut self, flag: ObjectiveFlag, value: bool) {
        set_flag(&mut self.objectives, flag, value);
    }

    // -----------------------------------------------------------------------
    // Categories and duties
    // -----------------------------------------------------------------------

    pub fn set_category(&mut self, category: UiCategory, selected: bool) {
        if selected {
            self.categories.insert(category);
        } else {
            self.categories.remove(&category);
        }
    }

    /// Flips `category` and returns its new state.
    pub fn toggle_category(&mut self, category: UiCategory) -> bool {
        let selected = !self.categories.contains(&category);
        self.set_category(category, selected);
        selected
    }

    pub fn add_duty(&mut self, duty: u32) -> bool {
        self.duties.insert(duty)
    }

    /// Adds a duty after checking it exists in the game data.
    pub fn add_known_duty(&mut self, data: &dyn GameData, duty: u32) -> Result<bool, PresetError> {
        if data.duty(duty).is_none() {
            return Err(PresetError::UnknownDuty(duty));
        }
        Ok(self.add_duty(duty))
    }

    pub fn remove_duty(&mut self, duty: u32) -> bool {
        self.duties.remove(&duty)
    }

    pub fn clear_duties(&mut self) {
        self.duties.clear();
    }

    // -----------------------------------------------------------------------
    // Item level bounds (0 means unbounded)
    // -----------------------------------------------------------------------

    pub fn set_min_item_level(&mut self, level: u32) {
        self.min_item_level = (level != 0).then_some(level);
    }

    pub fn set_max_item_level(&mut self, level: u32) {
        self.max_item_level = (level != 0).then_some(level);
    }

    // -----------------------------------------------------------------------
    // Wanted job groups
    // -----------------------------------------------------------------------

    /// Appends an empty group and returns its index.
    pub fn add_job_group(&mut self) -> usize {
        self.jobs.push(0);
        self.jobs.len() - 1
    }

    pub fn remove_job_group(&mut self, idx: usize) -> Option<u32> {
        (idx < self.jobs.len()).then(|| self.jobs.remove(idx))
    }

    /// Sets or clears `job` in group `idx`. Returns `false` when the group
    /// does not exist.
    pub fn set_group_job(&mut self, idx: usize, job: Job, value: bool) -> bool {
        match self.jobs.get_mut(idx) {
            Some(mask) => {
                if value {
                    *mask |= job.bit();
                } else {
                    *mask &= !job.bit();
                }
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Jobs limit
    // -----------------------------------------------------------------------

    /// The single jobs-limit mask, 0 when never edited.
    pub fn jobs_limit_mask(&self) -> u32 {
        self.jobs_limit.first().copied().unwrap_or(0)
    }

    fn jobs_limit_slot(&mut self) -> &mut u32 {
        if self.jobs_limit.is_empty() {
            self.jobs_limit.push(0);
        }
        &mut self.jobs_limit[0]
    }

    pub fn set_jobs_limit_job(&mut self, job: Job, value: bool) {
        let mask = self.jobs_limit_slot();
        if value {
            *mask |= job.bit();
        } else {
            *mask &= !job.bit();
        }
    }

    pub fn select_all_jobs_limit(&mut self) {
        *self.jobs_limit_slot() = ALL_JOBS_MASK;
    }

    pub fn clear_jobs_limit(&mut self) {
        *self.jobs_limit_slot() = 0;
    }

    // -----------------------------------------------------------------------
    // Description terms
    // -----------------------------------------------------------------------

    pub fn terms(&self, kind: TermKind) -> &BTreeSet<String> {
        match kind {
            TermKind::Required => &self.description,
            TermKind::Highlight => &self.description_like,
            TermKind::Exclude => &self.description_exclude,
        }
    }

    fn terms_mut(&mut self, kind: TermKind) -> &mut BTreeSet<String> {
        match kind {
            TermKind::Required => &mut self.description,
            TermKind::Highlight => &mut self.description_like,
            TermKind::Exclude => &mut self.description_exclude,
        }
    }

    /// Adds a normalised term. Returns `false` if it was already present.
    pub fn add_term(&mut self, kind: TermKind, term: &str) -> Result<bool, PresetError> {
        let term = normalize_term(term).ok_or(PresetError::BlankTerm)?;
        Ok(self.terms_mut(kind).insert(term))
    }

    pub fn remove_term(&mut self, kind: TermKind, term: &str) -> bool {
        match normalize_term(term) {
            Some(term) => self.terms_mut(kind).remove(&term),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    pub fn add_player(&mut self, name: &str, world: u32) -> Result<bool, PresetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PresetError::BlankPlayerName);
        }
        Ok(self.players.insert(PlayerInfo::new(name, world)))
    }

    /// Adds a player after checking the world exists in the game data.
    pub fn add_known_player(
        &mut self,
        data: &dyn GameData,
        name: &str,
        world: u32,
    ) -> Result<bool, PresetError> {
        if data.world(world).is_none() {
            return Err(PresetError::UnknownWorld(world));
        }
        self.add_player(name, world)
    }

    pub fn remove_player(&mut self, player: &PlayerInfo) -> bool {
        self.players.remove(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamedata::{DutyInfo, StaticGameData, WorldInfo};

    #[test]
    fn default_is_permissive() {
        let p = Preset::default();
        assert_eq!(p.name, DEFAULT_PRESET_NAME);
        assert_eq!(p.duties_mode, ListMode::Blacklist);
        assert!(p.allow_huge_item_level);
        assert_eq!(p.search_area, u32::MAX);
        assert_eq!(p.loot_rule, u32::MAX);
        assert_eq!(p.duty_finder_settings, u32::MAX);
        assert_eq!(p.conditions, u32::MAX);
        assert_eq!(p.objectives, u32::MAX);
        assert!(p.categories.is_empty());
        assert_eq!(p.jobs_limit_mask(), 0);
    }

    #[test]
    fn create_selects_every_category() {
        let p = Preset::create();
        assert_eq!(p.categories.len(), UiCategory::ALL.len());
    }

    #[test]
    fn duplicate_is_deep_and_suffixed() {
        let mut original = Preset::create();
        original.add_duty(5);
        original.jobs.push(Job::Paladin.bit());
        original.add_term(TermKind::Highlight, "savage").unwrap();
        original.add_player("Alice", 100).unwrap();
        original.set_min_item_level(600);

        let mut copy = original.duplicate();
        assert_eq!(copy.name, format!("{DEFAULT_PRESET_NAME}{COPY_SUFFIX}"));
        assert_eq!(copy.duties, original.duties);
        assert_eq!(copy.description_like, original.description_like);
        assert_eq!(copy.min_item_level, Some(600));

        copy.add_duty(6);
        copy.jobs.clear();
        copy.remove_term(TermKind::Highlight, "savage");
        assert!(!original.duties.contains(&6));
        assert_eq!(original.jobs.len(), 1);
        assert!(original.description_like.contains("savage"));
    }

    #[test]
    fn rename_trims_and_rejects_blank() {
        let mut p = Preset::create();
        p.rename("  Savage  ").unwrap();
        assert_eq!(p.name, "Savage");
        assert_eq!(p.rename("   "), Err(PresetError::BlankName));
        assert_eq!(p.name, "Savage");
    }

    #[test]
    fn flag_accessors_narrow_one_bit() {
        let mut p = Preset::default();
        p.set_search_area_flag(SearchAreaFlag::Private, false);
        assert!(!p.search_area_flag(SearchAreaFlag::Private));
        assert!(p.search_area_flag(SearchAreaFlag::DataCentre));

        p.set_loot_rule_flag(LootRuleFlag::Lootmaster, false);
        assert!(!p.loot_rule_flag(LootRuleFlag::Lootmaster));
        p.set_duty_finder_flag(DutyFinderFlag::SilenceEcho, false);
        assert!(!p.duty_finder_flag(DutyFinderFlag::SilenceEcho));
        p.set_condition_flag(ConditionFlag::DutyComplete, false);
        assert!(!p.condition_flag(ConditionFlag::DutyComplete));
        p.set_objective_flag(ObjectiveFlag::Practice, false);
        assert!(!p.objective_flag(ObjectiveFlag::Practice));
        p.set_objective_flag(ObjectiveFlag::Practice, true);
        assert_eq!(p.objectives, u32::MAX);
    }

    #[test]
    fn toggle_category() {
        let mut p = Preset::create();
        assert!(!p.toggle_category(UiCategory::Pvp));
        assert!(!p.categories.contains(&UiCategory::Pvp));
        assert!(p.toggle_category(UiCategory::Pvp));
    }

    #[test]
    fn item_level_zero_means_unbounded() {
        let mut p = Preset::default();
        p.set_min_item_level(100);
        p.set_max_item_level(200);
        assert_eq!((p.min_item_level, p.max_item_level), (Some(100), Some(200)));
        p.set_min_item_level(0);
        assert_eq!(p.min_item_level, None);
    }

    #[test]
    fn jobs_limit_materialises_single_mask() {
        let mut p = Preset::default();
        assert!(p.jobs_limit.is_empty());
        p.set_jobs_limit_job(Job::Bard, true);
        p.set_jobs_limit_job(Job::Dancer, true);
        assert_eq!(p.jobs_limit.len(), 1);
        assert_eq!(p.jobs_limit_mask(), Job::Bard.bit() | Job::Dancer.bit());
        p.select_all_jobs_limit();
        assert_eq!(p.jobs_limit_mask(), ALL_JOBS_MASK);
        p.clear_jobs_limit();
        assert_eq!(p.jobs_limit, vec![0]);
    }

    #[test]
    fn job_groups() {
        let mut p = Preset::default();
        let idx = p.add_job_group();
        assert!(p.set_group_job(idx, Job::WhiteMage, true));
        assert!(p.set_group_job(idx, Job::Scholar, true));
        assert!(!p.set_group_job(5, Job::Scholar, true));
        let healers = Job::WhiteMage.bit() | Job::Scholar.bit();
        assert_eq!(p.jobs[idx], healers);
        assert_eq!(p.remove_job_group(idx), Some(healers));
        assert_eq!(p.remove_job_group(0), None);
    }

    #[test]
    fn terms_are_normalised() {
        let mut p = Preset::default();
        assert_eq!(p.add_term(TermKind::Required, "  Healer "), Ok(true));
        assert_eq!(p.add_term(TermKind::Required, "HEALER"), Ok(false));
        assert_eq!(
            p.add_term(TermKind::Exclude, " \t "),
            Err(PresetError::BlankTerm)
        );
        assert!(p.terms(TermKind::Required).contains("healer"));
        assert!(p.remove_term(TermKind::Required, "Healer"));
        assert!(p.description.is_empty());
    }

    #[test]
    fn players_are_trimmed_and_exact() {
        let mut p = Preset::default();
        assert_eq!(p.add_player(" Alice ", 100), Ok(true));
        assert_eq!(p.add_player("Alice", 100), Ok(false));
        assert_eq!(p.add_player("", 100), Err(PresetError::BlankPlayerName));
        assert!(p.remove_player(&PlayerInfo::new("Alice", 100)));
        assert!(!p.remove_player(&PlayerInfo::new("Alice", 100)));
    }

    #[test]
    fn known_lookups_reject_missing_rows() {
        let data = StaticGameData::default()
            .with_duty(DutyInfo {
                row_id: 5,
                name: "Duty".into(),
                content_type: 2,
                high_end: false,
                in_duty_finder: true,
            })
            .with_world(WorldInfo {
                row_id: 100,
                name: "Zalera".into(),
                data_centre: 1,
                is_public: true,
            });
        let mut p = Preset::default();
        assert_eq!(p.add_known_duty(&data, 5), Ok(true));
        assert_eq!(p.add_known_duty(&data, 6), Err(PresetError::UnknownDuty(6)));
        assert_eq!(p.add_known_player(&data, "Alice", 100), Ok(true));
        assert_eq!(
            p.add_known_player(&data, "Bob", 1),
            Err(PresetError::UnknownWorld(1))
        );
    }

    #[test]
    fn preset_id_parses_and_displays() {
        let id = PresetId::new();
        let parsed: PresetId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<PresetId>().is_err());
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn preset_round_trip_keeps_bounds_and_flags() {
            let mut p = Preset::create();
            p.set_max_item_level(650);
            p.set_search_area_flag(SearchAreaFlag::Private, false);
            p.set_jobs_limit_job(Job::Ninja, true);
            p.add_player("Alice", 100).unwrap();
            let json = serde_json::to_string(&p).unwrap();
            let back: Preset = serde_json::from_str(&json).unwrap();
            assert_eq!(back, p);
        }

        #[test]
        fn missing_fields_load_as_defaults() {
            let p: Preset = serde_json::from_str(r#"{"name": "Old"}"#).unwrap();
            assert_eq!(p.name, "Old");
            assert_eq!(p.search_area, u32::MAX);
            assert!(p.allow_huge_item_level);
            assert_eq!(p.min_item_level, None);
        }

        #[test]
        fn preset_id_serializes_as_plain_uuid() {
            let id = PresetId::new();
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{id}\""));
        }
    }
}
