//! Ranking: orders evaluated cards into the final recommendation list.
//!
//! Ordering is fully deterministic: preference partition first, then
//! descending net value, then descending effective rate, then ascending
//! card name.

use crate::calculator::RewardCalculation;
use crate::card::CreditCard;
use crate::decimal::Fixed4;
use crate::transaction::{Preferences, Transaction};
use serde::{Deserialize, Serialize};

/// One ranked entry in the recommendation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecommendation {
    pub card: CreditCard,
    pub calculation: RewardCalculation,

    /// 1-based position; contiguous and unique across the result.
    pub rank: u32,

    /// True only for rank 1.
    pub is_recommended: bool,

    pub net_value: Fixed4,
}

/// The full outcome of one recommendation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    /// Recommendations in rank order.
    pub recommendations: Vec<CardRecommendation>,

    pub transaction: Transaction,

    /// Every card supplied in the catalog, active or not.
    pub total_cards_evaluated: u32,

    /// Active cards only; equals the number of recommendations.
    pub eligible_cards_count: u32,

    pub has_recommendation: bool,
}

/// Orders evaluated cards and assigns contiguous 1-based ranks.
///
/// The preference partition applies only when the caller supplied a
/// non-empty preferred unit set that intersects the evaluated cards'
/// units; preferred cards then form a block strictly above all others,
/// irrespective of net value.
pub fn rank(
    evaluated: Vec<(CreditCard, RewardCalculation)>,
    preferences: Option<&Preferences>,
) -> Vec<CardRecommendation> {
    let partition_active = preferences
        .filter(|p| !p.is_empty())
        .map(|p| evaluated.iter().any(|(_, calc)| p.prefers(&calc.reward_unit)))
        .unwrap_or(false);

    let prefers = |calc: &RewardCalculation| -> bool {
        partition_active
            && preferences
                .map(|p| p.prefers(&calc.reward_unit))
                .unwrap_or(false)
    };

    let mut entries = evaluated;
    entries.sort_by(|(card_a, calc_a), (card_b, calc_b)| {
        prefers(calc_b)
            .cmp(&prefers(calc_a))
            .then(calc_b.net_value.cmp(&calc_a.net_value))
            .then(calc_b.effective_rate.cmp(&calc_a.effective_rate))
            .then(card_a.name.cmp(&card_b.name))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (card, calculation))| {
            let rank = idx as u32 + 1;
            let net_value = calculation.net_value;
            CardRecommendation {
                card,
                calculation,
                rank,
                is_recommended: rank == 1,
                net_value,
            }
        })
        .collect()
}
