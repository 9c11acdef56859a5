//! Recommendation engine facade.
//!
//! Wires the pipeline together: validate the transaction, match rules
//! per card, calculate rewards, rank. The engine holds only valuation
//! configuration; every call is stateless and safe to run concurrently
//! over a shared read-only catalog.

use crate::calculator::{calculate, UnitValues, UnknownUnitPolicy, UsageLedger};
use crate::card::CreditCard;
use crate::error::Result;
use crate::matcher::match_rules;
use crate::normalize::normalize_merchant_id;
use crate::ranker::{rank, RecommendationResult};
use crate::transaction::{Preferences, Transaction};
use log::{debug, warn};
use std::io::{Read, Write};

/// The card recommendation engine.
///
/// Holds per-unit conversion factors and the unknown-unit policy; all
/// transaction state is passed per call and discarded afterwards.
///
/// # Output Ordering
///
/// Recommendations are ranked deterministically: two calls with
/// identical inputs produce byte-identical output.
pub struct RecommendationEngine {
    unit_values: UnitValues,
    unknown_unit_policy: UnknownUnitPolicy,
}

impl RecommendationEngine {
    /// Creates an engine with default unit values and the zero-value
    /// unknown-unit policy.
    pub fn new() -> Self {
        RecommendationEngine {
            unit_values: UnitValues::default(),
            unknown_unit_policy: UnknownUnitPolicy::default(),
        }
    }

    /// Creates an engine with explicit valuation configuration.
    pub fn with_config(unit_values: UnitValues, unknown_unit_policy: UnknownUnitPolicy) -> Self {
        RecommendationEngine {
            unit_values,
            unknown_unit_policy,
        }
    }

    /// Loads a card catalog from JSON.
    ///
    /// Merchant identifiers on every rule are re-slugged through the
    /// shared normalizer so hand-authored catalogs compare correctly.
    pub fn load_catalog<R: Read>(&self, reader: R) -> Result<Vec<CreditCard>> {
        let mut catalog: Vec<CreditCard> = serde_json::from_reader(reader)?;
        for card in &mut catalog {
            for rule in &mut card.rewards {
                rule.normalize_merchants();
            }
        }
        Ok(catalog)
    }

    /// Produces the ranked recommendation list for one transaction.
    ///
    /// The catalog may contain inactive cards; they are excluded from
    /// the output and from `eligible_cards_count` but still counted in
    /// `total_cards_evaluated`. An empty catalog is not an error.
    pub fn recommend(
        &self,
        catalog: &[CreditCard],
        transaction: &Transaction,
        preferences: Option<&Preferences>,
        ledger: Option<&UsageLedger>,
    ) -> Result<RecommendationResult> {
        transaction.validate()?;

        // Slugging is idempotent; re-applying it here keeps merchant
        // comparison identical no matter what the caller supplied.
        let merchant = transaction
            .merchant_id
            .as_deref()
            .map(normalize_merchant_id);

        let mut evaluated = Vec::new();
        for card in catalog {
            if !card.is_active {
                debug!("card {}: inactive, skipped", card.id);
                continue;
            }

            for rule_id in card.unmatchable_rule_ids() {
                warn!(
                    "card {}: rule {} has neither categories nor merchants and can never match",
                    card.id, rule_id
                );
            }
            for rule_id in card.negative_config_rule_ids() {
                warn!(
                    "card {}: rule {} has a negative rate or cap amount",
                    card.id, rule_id
                );
            }

            let matches = match_rules(card, transaction.category, merchant.as_deref());
            let calculation = calculate(
                card,
                transaction,
                &matches,
                ledger,
                &self.unit_values,
                self.unknown_unit_policy,
            );
            evaluated.push((card.clone(), calculation));
        }

        let eligible_cards_count = evaluated.len() as u32;
        let recommendations = rank(evaluated, preferences);

        Ok(RecommendationResult {
            has_recommendation: !recommendations.is_empty(),
            recommendations,
            transaction: transaction.clone(),
            total_cards_evaluated: catalog.len() as u32,
            eligible_cards_count,
        })
    }

    /// Writes the ranked result as CSV.
    ///
    /// One row per recommendation in rank order; all decimal values are
    /// formatted with exactly 4 decimal places.
    pub fn write_output<W: Write>(&self, result: &RecommendationResult, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "rank",
            "card",
            "reward_amount",
            "reward_unit",
            "effective_rate",
            "net_value",
            "capped_out",
            "recommended",
        ])?;

        for rec in &result.recommendations {
            csv_writer.write_record([
                rec.rank.to_string(),
                rec.card.name.clone(),
                rec.calculation.reward_amount.to_string(),
                rec.calculation.reward_unit.to_string(),
                rec.calculation.effective_rate.to_string(),
                rec.net_value.to_string(),
                rec.calculation.capped_out.to_string(),
                rec.is_recommended.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new()
    }
}
