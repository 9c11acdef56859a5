//! Reward calculation: turns an applied rule set into a per-card
//! calculation with cap pro-ration, fee deduction and a common value
//! score for cross-unit ranking.
//!
//! The calculator is pure; prior cap usage enters only through an
//! explicit caller-owned [`UsageLedger`].

use crate::card::{CreditCard, RewardUnit};
use crate::decimal::Fixed4;
use crate::matcher::RuleMatch;
use crate::transaction::Transaction;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-unit conversion factors used to compare rewards across units.
///
/// Strictly a ranking device: the native `reward_amount`/`reward_unit`
/// are never converted in the output. Defaults value one mile at
/// HK$0.04 and one point at HK$0.01.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitValues {
    pub cash: Fixed4,
    pub miles: Fixed4,
    pub points: Fixed4,
}

impl Default for UnitValues {
    fn default() -> Self {
        UnitValues {
            cash: Fixed4::ONE,
            miles: Fixed4::new(Decimal::new(4, 2)),
            points: Fixed4::new(Decimal::new(1, 2)),
        }
    }
}

impl UnitValues {
    /// Conversion factor for a unit; `None` for units this engine does
    /// not know how to value.
    pub fn value_of(&self, unit: &RewardUnit) -> Option<Fixed4> {
        match unit {
            RewardUnit::Cash => Some(self.cash),
            RewardUnit::Miles => Some(self.miles),
            RewardUnit::Points => Some(self.points),
            RewardUnit::Unknown(_) => None,
        }
    }
}

/// What to do with a rule whose reward unit has no conversion factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownUnitPolicy {
    /// Keep the native-unit reward but score it at zero for ranking.
    #[default]
    ZeroValue,
    /// Drop the rule from the applied set entirely.
    Reject,
}

/// Caller-owned record of reward already earned against monthly caps in
/// a given billing month, keyed by rule ID.
///
/// The engine itself retains no cross-call state; accurate cap tracking
/// across multiple transactions is the caller's job via this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageLedger {
    pub year: i32,
    pub month: u32,

    #[serde(default)]
    pub used: BTreeMap<String, Fixed4>,
}

impl UsageLedger {
    pub fn new(year: i32, month: u32) -> Self {
        UsageLedger {
            year,
            month,
            used: BTreeMap::new(),
        }
    }

    /// Adds earned reward against a rule's cap.
    pub fn record(&mut self, rule_id: &str, amount: Fixed4) {
        *self.used.entry(rule_id.to_string()).or_insert(Fixed4::ZERO) += amount;
    }

    /// Prior usage for a rule within this ledger's month.
    pub fn used_for(&self, rule_id: &str) -> Fixed4 {
        self.used.get(rule_id).copied().unwrap_or(Fixed4::ZERO)
    }

    /// Whether this ledger describes the given `(year, month)` period.
    /// A stale ledger means a fresh month: zero prior usage.
    pub fn covers(&self, period: (i32, u32)) -> bool {
        (self.year, self.month) == period
    }
}

/// The computed reward outcome for one card and one transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCalculation {
    pub card_id: String,

    /// Post-cap, post-stacking total in the rules' native unit.
    pub reward_amount: Fixed4,
    pub reward_unit: RewardUnit,

    /// Post-cap native-unit reward divided by the transaction amount.
    pub effective_rate: Fixed4,

    /// IDs of the rules that contributed, winner first.
    pub applied_rules: Vec<String>,

    /// Total fees charged on this transaction by the card.
    pub fees: Fixed4,

    /// True if any contributing rule was pro-rated down to cap headroom.
    pub capped_out: bool,

    /// Reward converted to the common value score (ranking only).
    pub value_score: Fixed4,

    /// `value_score - fees`; the quantity the ranker orders by.
    pub net_value: Fixed4,

    /// Non-fatal computation warnings (e.g. unvalued reward units).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Computes the reward for one card given its applied rule set.
///
/// A card with an empty applied set still gets a calculation: zero
/// reward, no applied rules, fees still charged.
pub fn calculate(
    card: &CreditCard,
    transaction: &Transaction,
    matches: &[RuleMatch<'_>],
    ledger: Option<&UsageLedger>,
    unit_values: &UnitValues,
    unknown_unit_policy: UnknownUnitPolicy,
) -> RewardCalculation {
    let mut reward_amount = Fixed4::ZERO;
    let mut value_score = Fixed4::ZERO;
    let mut applied_rules = Vec::with_capacity(matches.len());
    let mut capped_out = false;
    let mut warnings = Vec::new();

    // All stacked rules share the winner's unit; default to cash when
    // nothing applied so the struct stays total.
    let mut reward_unit = RewardUnit::Cash;

    let month = transaction.billing_month();
    let ledger = ledger.filter(|l| l.covers(month));

    for m in matches {
        let rule = m.rule;
        let factor = unit_values.value_of(&rule.reward_unit);

        if factor.is_none() && unknown_unit_policy == UnknownUnitPolicy::Reject {
            warn!(
                "card {}: rule {} has unvalued reward unit '{}', rejected",
                card.id, rule.id, rule.reward_unit
            );
            warnings.push(format!(
                "rule {} rejected: no conversion factor for unit '{}'",
                rule.id, rule.reward_unit
            ));
            continue;
        }

        let raw = transaction.amount * rule.rate;
        let contribution = match rule.cap {
            Some(cap) => {
                let prior = ledger
                    .map(|l| l.used_for(&rule.id))
                    .unwrap_or(Fixed4::ZERO);
                let headroom = cap.amount.saturating_sub(prior);
                if raw > headroom {
                    capped_out = true;
                    headroom
                } else {
                    raw
                }
            }
            None => raw,
        };

        reward_amount += contribution;
        reward_unit = rule.reward_unit.clone();
        applied_rules.push(rule.id.clone());

        match factor {
            Some(f) => value_score += contribution * f,
            None => {
                warn!(
                    "card {}: rule {} has unvalued reward unit '{}', scored at zero",
                    card.id, rule.id, rule.reward_unit
                );
                warnings.push(format!(
                    "rule {} scored at zero: no conversion factor for unit '{}'",
                    rule.id, rule.reward_unit
                ));
            }
        }
    }

    let fees = card
        .fees
        .as_ref()
        .map(|schedule| {
            transaction.amount
                * schedule.applicable_rate(transaction.category, transaction.is_overseas)
        })
        .unwrap_or(Fixed4::ZERO);

    // Transaction amount is validated > 0 before calculation; the
    // fallback keeps this function total regardless.
    let effective_rate = reward_amount
        .checked_div(transaction.amount)
        .unwrap_or(Fixed4::ZERO);

    RewardCalculation {
        card_id: card.id.clone(),
        reward_amount,
        reward_unit,
        effective_rate,
        applied_rules,
        fees,
        capped_out,
        value_score,
        net_value: value_score - fees,
        warnings,
    }
}
