//! Classification of listings into the user-facing categories.
//!
//! The table is fixed game taxonomy. A listing whose duty or roulette row
//! cannot be resolved matches no category that needs that row.

use crate::domain::{DutyCategory, DutyType, UiCategory, content_type};
use crate::gamedata::GameData;
use crate::model::Listing;

impl UiCategory {
    /// Returns `true` if `listing` belongs to this category.
    pub fn listing_matches(self, data: &dyn GameData, listing: &Listing) -> bool {
        let is_duty = listing.category == DutyCategory::Duty;
        let is_normal = listing.duty_type == DutyType::Normal;
        let is_other = listing.duty_type == DutyType::Other;
        let is_roulette = listing.duty_type == DutyType::Roulette;
        let is_normal_duty = is_normal && is_duty;

        let roulette_pvp = || data.roulette(listing.raw_duty).map(|r| r.is_pvp);
        let duty = || data.duty(listing.raw_duty);
        let content_is = |ct: u32| duty().is_some_and(|d| d.content_type == ct);
        let regular_content_is =
            |ct: u32| duty().is_some_and(|d| !d.high_end && d.content_type == ct);

        match self {
            Self::None => is_other && is_duty && listing.raw_duty == 0,
            Self::DutyRoulette => is_roulette && is_duty && roulette_pvp() == Some(false),
            Self::Dungeons => is_normal_duty && content_is(content_type::DUNGEONS),
            Self::Guildhests => is_normal_duty && content_is(content_type::GUILDHESTS),
            Self::Trials => is_normal_duty && regular_content_is(content_type::TRIALS),
            Self::Raids => is_normal_duty && regular_content_is(content_type::RAIDS),
            Self::HighEndDuty => is_normal_duty && duty().is_some_and(|d| d.high_end),
            Self::Pvp => {
                (is_roulette && is_duty && roulette_pvp() == Some(true))
                    || (is_normal_duty && content_is(content_type::PVP))
            }
            Self::QuestBattles => is_other && listing.category == DutyCategory::QuestBattles,
            Self::Fates => is_other && listing.category == DutyCategory::Fates,
            Self::TreasureHunt => is_other && listing.category == DutyCategory::TreasureHunt,
            Self::TheHunt => is_other && listing.category == DutyCategory::TheHunt,
            Self::GatheringForays => is_normal && listing.category == DutyCategory::GatheringForays,
            Self::DeepDungeons => is_other && listing.category == DutyCategory::DeepDungeons,
            Self::AdventuringForays => {
                is_normal && listing.category == DutyCategory::AdventuringForays
            }
            Self::VariantAndCriterionDungeons => {
                is_normal && listing.category == DutyCategory::VariantAndCriterion
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamedata::{DutyInfo, RouletteInfo, StaticGameData};

    fn data() -> StaticGameData {
        let duty = |row_id, content_type, high_end| DutyInfo {
            row_id,
            name: format!("duty {row_id}"),
            content_type,
            high_end,
            in_duty_finder: true,
        };
        StaticGameData::default()
            .with_duty(duty(10, content_type::DUNGEONS, false))
            .with_duty(duty(11, content_type::GUILDHESTS, false))
            .with_duty(duty(12, content_type::TRIALS, false))
            .with_duty(duty(13, content_type::TRIALS, true))
            .with_duty(duty(14, content_type::RAIDS, false))
            .with_duty(duty(15, content_type::RAIDS, true))
            .with_duty(duty(16, content_type::PVP, false))
            .with_roulette(RouletteInfo {
                row_id: 1,
                name: "Leveling".into(),
                is_pvp: false,
            })
            .with_roulette(RouletteInfo {
                row_id: 40,
                name: "Crystalline Conflict".into(),
                is_pvp: true,
            })
    }

    fn normal(raw_duty: u32) -> Listing {
        Listing::test_default(1, "Alice", raw_duty)
    }

    fn with_type(raw_duty: u32, duty_type: DutyType, category: DutyCategory) -> Listing {
        let mut l = normal(raw_duty);
        l.duty_type = duty_type;
        l.category = category;
        l
    }

    fn matching(data: &StaticGameData, listing: &Listing) -> Vec<UiCategory> {
        UiCategory::ALL
            .into_iter()
            .filter(|c| c.listing_matches(data, listing))
            .collect()
    }

    #[test]
    fn normal_duties_by_content_type() {
        let data = data();
        assert_eq!(matching(&data, &normal(10)), vec![UiCategory::Dungeons]);
        assert_eq!(matching(&data, &normal(11)), vec![UiCategory::Guildhests]);
        assert_eq!(matching(&data, &normal(12)), vec![UiCategory::Trials]);
        assert_eq!(matching(&data, &normal(14)), vec![UiCategory::Raids]);
        assert_eq!(matching(&data, &normal(16)), vec![UiCategory::Pvp]);
    }

    #[test]
    fn high_end_duties_leave_trials_and_raids() {
        let data = data();
        assert_eq!(matching(&data, &normal(13)), vec![UiCategory::HighEndDuty]);
        assert_eq!(matching(&data, &normal(15)), vec![UiCategory::HighEndDuty]);
    }

    #[test]
    fn roulettes_split_by_pvp_flag() {
        let data = data();
        let pve = with_type(1, DutyType::Roulette, DutyCategory::Duty);
        let pvp = with_type(40, DutyType::Roulette, DutyCategory::Duty);
        assert_eq!(matching(&data, &pve), vec![UiCategory::DutyRoulette]);
        assert_eq!(matching(&data, &pvp), vec![UiCategory::Pvp]);
    }

    #[test]
    fn unresolvable_rows_match_nothing() {
        let data = data();
        assert!(matching(&data, &normal(999)).is_empty());
        let unknown_roulette = with_type(77, DutyType::Roulette, DutyCategory::Duty);
        assert!(matching(&data, &unknown_roulette).is_empty());
    }

    #[test]
    fn none_category_needs_zero_duty() {
        let data = data();
        let none = with_type(0, DutyType::Other, DutyCategory::Duty);
        assert_eq!(matching(&data, &none), vec![UiCategory::None]);
        let other = with_type(3, DutyType::Other, DutyCategory::Duty);
        assert!(matching(&data, &other).is_empty());
    }

    #[test]
    fn other_type_board_categories() {
        let data = data();
        let cases = [
            (DutyCategory::QuestBattles, UiCategory::QuestBattles),
            (DutyCategory::Fates, UiCategory::Fates),
            (DutyCategory::TreasureHunt, UiCategory::TreasureHunt),
            (DutyCategory::TheHunt, UiCategory::TheHunt),
            (DutyCategory::DeepDungeons, UiCategory::DeepDungeons),
        ];
        for (board, ui) in cases {
            let l = with_type(0, DutyType::Other, board);
            assert_eq!(matching(&data, &l), vec![ui], "{board:?}");
        }
    }

    #[test]
    fn normal_type_board_categories() {
        let data = data();
        let cases = [
            (DutyCategory::GatheringForays, UiCategory::GatheringForays),
            (DutyCategory::AdventuringForays, UiCategory::AdventuringForays),
            (DutyCategory::VariantAndCriterion, UiCategory::VariantAndCriterionDungeons),
        ];
        for (board, ui) in cases {
            let l = with_type(0, DutyType::Normal, board);
            assert_eq!(matching(&data, &l), vec![ui], "{board:?}");
        }
    }
}
