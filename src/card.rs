//! Card catalog data model: cards, reward rules, caps and fee schedules.
//!
//! The catalog is supplied by an external collaborator and consumed
//! read-only; the engine never mutates a `CreditCard`.

use crate::decimal::Fixed4;
use crate::normalize::{normalize_category, normalize_merchant_id, Category};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The unit a rule pays its reward in.
///
/// Catalog data occasionally carries units this engine does not know;
/// those are preserved verbatim in `Unknown` rather than rejected at
/// parse time, and the calculator decides how to treat them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RewardUnit {
    Cash,
    Miles,
    Points,
    Unknown(String),
}

impl RewardUnit {
    pub fn as_str(&self) -> &str {
        match self {
            RewardUnit::Cash => "cash",
            RewardUnit::Miles => "miles",
            RewardUnit::Points => "points",
            RewardUnit::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for RewardUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RewardUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RewardUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "cash" | "cashback" => RewardUnit::Cash,
            "miles" | "mile" => RewardUnit::Miles,
            "points" | "point" => RewardUnit::Points,
            _ => RewardUnit::Unknown(raw),
        })
    }
}

/// One entry in a rule's category set: either a concrete canonical
/// category or the `all` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelector {
    All,
    Only(Category),
}

impl Serialize for CategorySelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CategorySelector::All => serializer.serialize_str("all"),
            CategorySelector::Only(cat) => serializer.serialize_str(cat.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for CategorySelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw.trim().eq_ignore_ascii_case("all") {
            CategorySelector::All
        } else {
            CategorySelector::Only(normalize_category(&raw))
        })
    }
}

/// How often a reward cap resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapPeriod {
    Monthly,
}

/// The maximum reward a rule can pay within its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCap {
    pub amount: Fixed4,
    pub period: CapPeriod,
}

/// A single reward rule on a card.
///
/// At least one of `categories` or `specific_merchants` should be
/// non-empty; a rule with both empty can never match and is reported as
/// a configuration warning, not a call-time error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRule {
    pub id: String,

    /// Categories this rule covers, possibly including the `all` wildcard.
    #[serde(default)]
    pub categories: Vec<CategorySelector>,

    /// Merchant slugs this rule targets directly.
    #[serde(default)]
    pub specific_merchants: BTreeSet<String>,

    /// Merchant slugs this rule never applies to, regardless of other matches.
    #[serde(default)]
    pub excluded_merchants: BTreeSet<String>,

    /// Reward per unit of spend, e.g. `0.02` for 2% or 2 miles per dollar.
    pub rate: Fixed4,

    pub reward_unit: RewardUnit,

    #[serde(default)]
    pub cap: Option<RewardCap>,

    /// Explicit precedence override; highest declared priority wins.
    #[serde(default)]
    pub priority: Option<i32>,

    /// Whether this rule may combine with another stackable rule of a
    /// different specificity class on the same card.
    #[serde(default)]
    pub stackable: bool,
}

impl RewardRule {
    /// Returns `true` if the rule covers the given category, either
    /// directly or through the `all` wildcard.
    pub fn covers_category(&self, category: Category) -> bool {
        self.categories.iter().any(|sel| match sel {
            CategorySelector::All => true,
            CategorySelector::Only(c) => *c == category,
        })
    }

    /// Returns `true` if the category set contains the `all` wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.categories
            .iter()
            .any(|sel| matches!(sel, CategorySelector::All))
    }

    /// Returns `true` if the rule lists the category concretely (not via
    /// the wildcard).
    pub fn lists_category(&self, category: Category) -> bool {
        self.categories
            .iter()
            .any(|sel| matches!(sel, CategorySelector::Only(c) if *c == category))
    }

    /// Returns `true` if the rule targets the merchant slug directly.
    pub fn targets_merchant(&self, merchant_id: &str) -> bool {
        self.specific_merchants.contains(merchant_id)
    }

    /// Returns `true` if the merchant slug is excluded from this rule.
    pub fn excludes_merchant(&self, merchant_id: &str) -> bool {
        self.excluded_merchants.contains(merchant_id)
    }

    /// A rule with neither categories nor specific merchants can never
    /// match any transaction.
    pub fn is_unmatchable(&self) -> bool {
        self.categories.is_empty() && self.specific_merchants.is_empty()
    }

    /// Rates and cap amounts are required to be non-negative; a rule
    /// violating that would pay out negative rewards.
    pub fn has_negative_config(&self) -> bool {
        self.rate < Fixed4::ZERO
            || self
                .cap
                .map(|cap| cap.amount < Fixed4::ZERO)
                .unwrap_or(false)
    }

    /// Re-slugs all merchant identifiers through the shared normalizer.
    ///
    /// Catalog tooling is expected to have slugged merchants already;
    /// this makes hand-authored rule data safe to compare anyway.
    pub fn normalize_merchants(&mut self) {
        self.specific_merchants = self
            .specific_merchants
            .iter()
            .map(|m| normalize_merchant_id(m))
            .collect();
        self.excluded_merchants = self
            .excluded_merchants
            .iter()
            .map(|m| normalize_merchant_id(m))
            .collect();
    }
}

/// Fee schedule for a card, keyed by category plus an optional
/// overseas-transaction surcharge. All entries are rates applied to the
/// transaction amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    #[serde(default)]
    pub overseas: Option<Fixed4>,

    #[serde(default)]
    pub categories: BTreeMap<Category, Fixed4>,
}

impl FeeSchedule {
    /// Sums every fee rate that applies to the given transaction shape.
    pub fn applicable_rate(&self, category: Category, is_overseas: bool) -> Fixed4 {
        let mut rate = Fixed4::ZERO;
        if is_overseas {
            if let Some(overseas) = self.overseas {
                rate += overseas;
            }
        }
        if let Some(cat_rate) = self.categories.get(&category) {
            rate += *cat_rate;
        }
        rate
    }
}

/// A credit card as supplied by the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    pub issuer: String,

    #[serde(default)]
    pub rewards: Vec<RewardRule>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub annual_fee: Option<Fixed4>,

    #[serde(default)]
    pub fees: Option<FeeSchedule>,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl CreditCard {
    /// IDs of rules on this card that can never match anything.
    pub fn unmatchable_rule_ids(&self) -> Vec<&str> {
        self.rewards
            .iter()
            .filter(|r| r.is_unmatchable())
            .map(|r| r.id.as_str())
            .collect()
    }

    /// IDs of rules on this card carrying a negative rate or cap.
    pub fn negative_config_rule_ids(&self) -> Vec<&str> {
        self.rewards
            .iter()
            .filter(|r| r.has_negative_config())
            .map(|r| r.id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rule_json(body: &str) -> RewardRule {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_parse_rule_with_categories() {
        let rule = rule_json(
            r#"{"id":"r1","categories":["dining","Restaurant"],"rate":"0.02","rewardUnit":"cash"}"#,
        );
        assert!(rule.lists_category(Category::Dining));
        assert!(!rule.has_wildcard());
        assert_eq!(rule.rate, Fixed4::from_str("0.02").unwrap());
        assert_eq!(rule.reward_unit, RewardUnit::Cash);
        assert!(!rule.stackable);
    }

    #[test]
    fn test_parse_wildcard_category() {
        let rule = rule_json(r#"{"id":"r1","categories":["all"],"rate":0.01,"rewardUnit":"cash"}"#);
        assert!(rule.has_wildcard());
        assert!(rule.covers_category(Category::Fuel));
        assert!(!rule.lists_category(Category::Fuel));
    }

    #[test]
    fn test_parse_unknown_unit_preserved() {
        let rule = rule_json(r#"{"id":"r1","categories":["all"],"rate":1,"rewardUnit":"stars"}"#);
        assert_eq!(rule.reward_unit, RewardUnit::Unknown("stars".to_string()));
        assert_eq!(rule.reward_unit.as_str(), "stars");
    }

    #[test]
    fn test_unit_aliases() {
        let cash: RewardUnit = serde_json::from_str("\"Cashback\"").unwrap();
        assert_eq!(cash, RewardUnit::Cash);
        let miles: RewardUnit = serde_json::from_str("\"MILES\"").unwrap();
        assert_eq!(miles, RewardUnit::Miles);
    }

    #[test]
    fn test_unmatchable_rule_detection() {
        let rule = rule_json(r#"{"id":"dead","rate":"0.05","rewardUnit":"points"}"#);
        assert!(rule.is_unmatchable());

        let card: CreditCard = serde_json::from_str(
            r#"{"id":"c1","name":"Card","issuer":"Bank",
                "rewards":[{"id":"dead","rate":"0.05","rewardUnit":"points"},
                           {"id":"ok","categories":["dining"],"rate":"0.02","rewardUnit":"cash"}]}"#,
        )
        .unwrap();
        assert_eq!(card.unmatchable_rule_ids(), vec!["dead"]);
        assert!(card.is_active);
    }

    #[test]
    fn test_negative_rate_and_cap_detection() {
        let rule = rule_json(r#"{"id":"bad","categories":["dining"],"rate":"-0.02","rewardUnit":"cash"}"#);
        assert!(rule.has_negative_config());

        let rule = rule_json(
            r#"{"id":"bad-cap","categories":["dining"],"rate":"0.02","rewardUnit":"cash",
                "cap":{"amount":"-20","period":"monthly"}}"#,
        );
        assert!(rule.has_negative_config());

        let rule = rule_json(r#"{"id":"ok","categories":["dining"],"rate":"0","rewardUnit":"cash"}"#);
        assert!(!rule.has_negative_config());

        let card: CreditCard = serde_json::from_str(
            r#"{"id":"c1","name":"Card","issuer":"Bank",
                "rewards":[{"id":"bad","categories":["dining"],"rate":"-0.02","rewardUnit":"cash"},
                           {"id":"ok","categories":["dining"],"rate":"0.02","rewardUnit":"cash"}]}"#,
        )
        .unwrap();
        assert_eq!(card.negative_config_rule_ids(), vec!["bad"]);
    }

    #[test]
    fn test_normalize_merchants_reslugs() {
        let mut rule = rule_json(
            r#"{"id":"r1","specificMerchants":["McDonald's HK"],"excludedMerchants":["Pizza  Hut"],"rate":"0.05","rewardUnit":"cash"}"#,
        );
        rule.normalize_merchants();
        assert!(rule.targets_merchant("mcdonalds-hk"));
        assert!(rule.excludes_merchant("pizza-hut"));
    }

    #[test]
    fn test_fee_schedule_sums_applicable_rates() {
        let fees: FeeSchedule = serde_json::from_str(
            r#"{"overseas":"0.0195","categories":{"fuel":"0.01"}}"#,
        )
        .unwrap();

        assert_eq!(
            fees.applicable_rate(Category::Dining, false),
            Fixed4::ZERO
        );
        assert_eq!(
            fees.applicable_rate(Category::Dining, true),
            Fixed4::from_str("0.0195").unwrap()
        );
        assert_eq!(
            fees.applicable_rate(Category::Fuel, true),
            Fixed4::from_str("0.0295").unwrap()
        );
    }
}
