//! Listing visibility evaluation.
//!
//! `evaluate()` runs for every listing the board shows. It performs no I/O
//! and never fails: each check either passes or names the [`HideReason`].
//!
//! Evaluation order (must be preserved, the first failure wins):
//! 1. Item level ceiling
//! 2. Duty whitelist/blacklist
//! 3. Item level bounds
//! 4. Search area, loot rule, duty finder settings, conditions, objectives
//! 5. Category membership
//! 6. Jobs limit
//! 7. Required description terms
//! 8. Excluded description terms
//! 9. Job joinability
//! 10. Player exclusion
//!
//! Highlight terms are matched separately and are not affected by the
//! outcome of the checks above.

use crate::domain::{DutyType, ListMode, SearchAreaFlag, listing_accepts};
use crate::filter::decision::{Decision, FilterDecision, HideReason};
use crate::filter::jobs::{JOBS_LIMIT_MIN_SLOTS, can_join, jobs_limit_present};
use crate::filter::preset::Preset;
use crate::gamedata::GameData;
use crate::model::{HighlightMatch, Listing};

/// Runtime values that are not part of a preset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalContext {
    /// Highest equippable item level; 0 disables the ceiling check.
    pub max_item_level: u32,
    /// Treat every listing as one-player-per-job for joinability.
    pub assume_one_player_per_job: bool,
}

impl EvalContext {
    pub fn new(max_item_level: u32) -> Self {
        Self {
            max_item_level,
            assume_one_player_per_job: false,
        }
    }
}

/// Evaluate `listing` against the active preset, if any.
///
/// With no preset every listing is visible and nothing is highlighted.
pub fn evaluate(
    listing: &Listing,
    preset: Option<&Preset>,
    data: &dyn GameData,
    max_item_level: u32,
) -> Decision {
    evaluate_with(listing, preset, data, &EvalContext::new(max_item_level))
}

/// Like [`evaluate`], with the full runtime context.
pub fn evaluate_with(
    listing: &Listing,
    preset: Option<&Preset>,
    data: &dyn GameData,
    ctx: &EvalContext,
) -> Decision {
    let Some(preset) = preset else {
        return Decision::show();
    };

    let description = listing.description.to_lowercase();
    let verdict = match check(listing, preset, data, ctx, &description) {
        Ok(()) => FilterDecision::Show,
        Err(reason) => FilterDecision::Hide(reason),
    };

    Decision {
        verdict,
        highlights: match_highlights(listing, preset, &description),
    }
}

fn check(
    listing: &Listing,
    preset: &Preset,
    data: &dyn GameData,
    ctx: &EvalContext,
    description: &str,
) -> Result<(), HideReason> {
    // 1) Item level ceiling
    if !preset.allow_huge_item_level
        && ctx.max_item_level > 0
        && listing.min_item_level > ctx.max_item_level
    {
        return Err(HideReason::ItemLevelCeiling);
    }

    // 2) Duty list, only for listings naming a specific duty
    if !preset.duties.is_empty() && listing.duty_type == DutyType::Normal {
        let in_list = preset.duties.contains(&listing.raw_duty);
        let hidden = match preset.duties_mode {
            ListMode::Blacklist => in_list,
            ListMode::Whitelist => !in_list,
        };
        if hidden {
            return Err(HideReason::DutyNotAllowed);
        }
    }

    // 3) Item level bounds
    if preset.min_item_level.is_some_and(|min| listing.min_item_level < min) {
        return Err(HideReason::ItemLevelBelowMin);
    }
    if preset.max_item_level.is_some_and(|max| listing.min_item_level > max) {
        return Err(HideReason::ItemLevelAboveMax);
    }

    // 4) Restriction flags
    if has_excluded_bits(listing.search_area, preset.search_area) {
        return Err(HideReason::SearchAreaExcluded);
    }
    if !listing_accepts(listing.loot_rules, preset.loot_rule) {
        return Err(HideReason::LootRuleExcluded);
    }
    if has_excluded_bits(listing.duty_finder_settings, preset.duty_finder_settings) {
        return Err(HideReason::DutyFinderSettingsExcluded);
    }
    if !listing_accepts(listing.conditions, preset.conditions) {
        return Err(HideReason::ConditionsExcluded);
    }
    if !listing_accepts(listing.objective, preset.objectives) {
        return Err(HideReason::ObjectivesExcluded);
    }

    // 5) Categories
    if !preset
        .categories
        .iter()
        .any(|category| category.listing_matches(data, listing))
    {
        return Err(HideReason::CategoryNotSelected);
    }

    // 6) Jobs limit
    let limit = preset.jobs_limit_mask();
    if limit != 0 {
        if listing.slots_available() < JOBS_LIMIT_MIN_SLOTS {
            return Err(HideReason::JobsLimitTooFewSlots);
        }
        if jobs_limit_present(limit, listing) {
            return Err(HideReason::JobsLimitPresent);
        }
    }

    // 7) Required terms: any one is enough
    if !preset.description.is_empty()
        && !preset
            .description
            .iter()
            .any(|t| description.contains(t.as_str()))
    {
        return Err(HideReason::DescriptionMissing);
    }

    // 8) Excluded terms
    if preset
        .description_exclude
        .iter()
        .any(|t| description.contains(t.as_str()))
    {
        return Err(HideReason::DescriptionExcluded);
    }

    // 9) Joinability, skipped for alliance raids
    if !preset.jobs.is_empty() && !listing.has_search_area(SearchAreaFlag::AllianceRaid) {
        let one_player_per_job = ctx.assume_one_player_per_job
            || listing.has_search_area(SearchAreaFlag::OnePlayerPerJob);
        if !can_join(&preset.jobs, listing, one_player_per_job) {
            return Err(HideReason::JobsNotJoinable);
        }
    }

    // 10) Players
    if preset
        .players
        .iter()
        .any(|p| p.name == listing.name && p.world == listing.home_world)
    {
        return Err(HideReason::PlayerExcluded);
    }

    Ok(())
}

/// The listing sets a bit the preset has turned off.
fn has_excluded_bits(listing_bits: u32, preset_bits: u32) -> bool {
    (listing_bits ^ preset_bits) & !preset_bits != 0
}

fn match_highlights(listing: &Listing, preset: &Preset, description: &str) -> Vec<HighlightMatch> {
    preset
        .description_like
        .iter()
        .filter(|t| description.contains(t.as_str()))
        .map(|t| HighlightMatch {
            term: t.clone(),
            listing_id: listing.id,
            author: listing.name.clone(),
            description: listing.description.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Owned snapshot of the active filter
// ---------------------------------------------------------------------------

/// The active preset and runtime context, detached from the store so it can
/// be sent to the feed task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveFilter {
    pub preset: Option<Preset>,
    pub ctx: EvalContext,
}

impl ActiveFilter {
    pub fn new(preset: Option<Preset>, ctx: EvalContext) -> Self {
        Self { preset, ctx }
    }

    pub fn is_active(&self) -> bool {
        self.preset.is_some()
    }

    pub fn evaluate(&self, listing: &Listing, data: &dyn GameData) -> Decision {
        evaluate_with(listing, self.preset.as_ref(), data, &self.ctx)
    }

    pub fn listing_filter<'a>(&'a self, data: &'a dyn GameData) -> ListingFilter<'a> {
        ListingFilter::new(self.preset.as_ref(), data, self.ctx)
    }
}

// ---------------------------------------------------------------------------
// Push-style adapter
// ---------------------------------------------------------------------------

/// Applies the active preset to a listing source that hands over a mutable
/// visibility flag with each listing.
pub struct ListingFilter<'a> {
    preset: Option<&'a Preset>,
    data: &'a dyn GameData,
    ctx: EvalContext,
}

impl<'a> ListingFilter<'a> {
    pub fn new(preset: Option<&'a Preset>, data: &'a dyn GameData, ctx: EvalContext) -> Self {
        Self { preset, data, ctx }
    }

    /// Clears `visible` if the preset hides the listing. A flag already
    /// cleared by the source stays cleared. Returns the highlight matches.
    pub fn apply(&self, listing: &Listing, visible: &mut bool) -> Vec<HighlightMatch> {
        let decision = evaluate_with(listing, self.preset, self.data, &self.ctx);
        *visible = *visible && decision.is_visible();
        decision.highlights
    }
}
