//! Transaction input model and caller preferences.
//!
//! Transactions arrive from an external builder with the category
//! already canonical and the merchant already slugged; validation here
//! guards the engine's own preconditions, not free-text cleanup.

use crate::card::RewardUnit;
use crate::decimal::Fixed4;
use crate::error::{RecommendError, Result};
use crate::normalize::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single purchase to recommend a card for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Purchase amount. Must be strictly positive.
    pub amount: Fixed4,

    #[serde(default = "default_currency")]
    pub currency: String,

    pub category: Category,

    /// Merchant slug, when the merchant is known.
    #[serde(default)]
    pub merchant_id: Option<String>,

    #[serde(default)]
    pub is_overseas: bool,

    #[serde(default = "Utc::now")]
    pub occurred_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "HKD".to_string()
}

impl Transaction {
    /// Checks the engine's input preconditions.
    ///
    /// Rejects non-positive amounts; the engine performs no partial
    /// computation over an invalid transaction.
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_positive() {
            return Err(RecommendError::InvalidTransaction {
                message: format!("amount must be > 0, got {}", self.amount),
            });
        }
        Ok(())
    }

    /// The transaction's billing period as a `(year, month)` pair.
    pub fn billing_month(&self) -> (i32, u32) {
        use chrono::Datelike;
        (self.occurred_at.year(), self.occurred_at.month())
    }
}

/// Optional caller preferences influencing rank order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Reward units to place strictly above all others in the ranking.
    #[serde(default)]
    pub preferred_reward_types: Vec<RewardUnit>,
}

impl Preferences {
    /// Returns `true` when no preference partitioning should happen.
    pub fn is_empty(&self) -> bool {
        self.preferred_reward_types.is_empty()
    }

    pub fn prefers(&self, unit: &RewardUnit) -> bool {
        self.preferred_reward_types.contains(unit)
    }
}
