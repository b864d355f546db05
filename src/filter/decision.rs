//! Evaluation result types.

use crate::model::HighlightMatch;

/// Whether a listing passes the active preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Show,
    Hide(HideReason),
}

/// The first check a hidden listing failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HideReason {
    ItemLevelCeiling,
    DutyNotAllowed,
    ItemLevelBelowMin,
    ItemLevelAboveMax,
    SearchAreaExcluded,
    LootRuleExcluded,
    DutyFinderSettingsExcluded,
    ConditionsExcluded,
    ObjectivesExcluded,
    CategoryNotSelected,
    JobsLimitTooFewSlots,
    JobsLimitPresent,
    DescriptionMissing,
    DescriptionExcluded,
    JobsNotJoinable,
    PlayerExcluded,
}

/// Full evaluator output: the visibility verdict plus highlight matches.
///
/// Highlights are collected whenever a preset is active, whether or not the
/// listing ends up visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub verdict: FilterDecision,
    pub highlights: Vec<HighlightMatch>,
}

impl Decision {
    pub fn show() -> Self {
        Self {
            verdict: FilterDecision::Show,
            highlights: Vec::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.verdict == FilterDecision::Show
    }

    pub fn hide_reason(&self) -> Option<HideReason> {
        match self.verdict {
            FilterDecision::Show => None,
            FilterDecision::Hide(reason) => Some(reason),
        }
    }
}
