//! Rule matching: which of a card's reward rules apply to a transaction.
//!
//! Candidate rules are resolved to an applied set through a strict
//! precedence order: declared priority, then specificity
//! (merchant > category > wildcard), then rate, then declaration order.
//! Stackable rules of different specificity classes may combine.

use crate::card::{CreditCard, RewardRule};
use crate::normalize::Category;
use log::debug;

/// How specifically a rule matched the transaction.
///
/// Declaration order matters: variants are ordered from least to most
/// specific so the derived `Ord` gives merchant > category > wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Specificity {
    /// Matched only through the `all` wildcard.
    Wildcard,
    /// The transaction's category is listed concretely on the rule.
    CategoryMatch,
    /// The transaction's merchant slug is targeted directly.
    MerchantMatch,
}

/// A rule that applies to the transaction, with the specificity class
/// it matched under.
#[derive(Debug, Clone, Copy)]
pub struct RuleMatch<'a> {
    pub rule: &'a RewardRule,
    pub specificity: Specificity,
}

/// A candidate before precedence resolution.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    rule: &'a RewardRule,
    specificity: Specificity,
    index: usize,
}

/// Selects the applied rule set for one card and one transaction shape.
///
/// Returns the winning rule first, followed by any stacked rules in
/// precedence order. An empty result means the card earns nothing on
/// this transaction; that is not an error.
pub fn match_rules<'a>(
    card: &'a CreditCard,
    category: Category,
    merchant: Option<&str>,
) -> Vec<RuleMatch<'a>> {
    let mut candidates: Vec<Candidate<'a>> = Vec::new();

    for (index, rule) in card.rewards.iter().enumerate() {
        match classify(rule, category, merchant) {
            Some(specificity) => candidates.push(Candidate {
                rule,
                specificity,
                index,
            }),
            None => continue,
        }
    }

    if candidates.is_empty() {
        debug!("card {}: no eligible rules", card.id);
        return Vec::new();
    }

    // Precedence: declared priority (None sorts below any Some), then
    // specificity, then rate, all descending; declaration order breaks
    // remaining ties, earliest first.
    candidates.sort_by(|a, b| {
        b.rule
            .priority
            .cmp(&a.rule.priority)
            .then(b.specificity.cmp(&a.specificity))
            .then(b.rule.rate.cmp(&a.rule.rate))
            .then(a.index.cmp(&b.index))
    });

    let winner = candidates[0];
    let mut applied = vec![RuleMatch {
        rule: winner.rule,
        specificity: winner.specificity,
    }];

    if winner.rule.stackable {
        for extra in &candidates[1..] {
            let class_taken = applied.iter().any(|m| m.specificity == extra.specificity);
            if extra.rule.stackable
                && !class_taken
                && extra.rule.reward_unit == winner.rule.reward_unit
            {
                applied.push(RuleMatch {
                    rule: extra.rule,
                    specificity: extra.specificity,
                });
            }
        }
    }

    debug!(
        "card {}: applied rules [{}]",
        card.id,
        applied
            .iter()
            .map(|m| m.rule.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    applied
}

/// Determines whether a rule is a candidate and at what specificity.
///
/// An excluded merchant vetoes the rule outright; otherwise a direct
/// merchant target beats a listed category, which beats the wildcard.
fn classify(rule: &RewardRule, category: Category, merchant: Option<&str>) -> Option<Specificity> {
    if let Some(m) = merchant {
        if rule.excludes_merchant(m) {
            return None;
        }
        if rule.targets_merchant(m) {
            return Some(Specificity::MerchantMatch);
        }
    }

    if rule.lists_category(category) {
        return Some(Specificity::CategoryMatch);
    }
    if rule.has_wildcard() {
        return Some(Specificity::Wildcard);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CategorySelector, RewardUnit};
    use crate::decimal::Fixed4;
    use std::collections::BTreeSet;
    use std::str::FromStr;

    fn rule(id: &str, rate: &str) -> RewardRule {
        RewardRule {
            id: id.to_string(),
            categories: Vec::new(),
            specific_merchants: BTreeSet::new(),
            excluded_merchants: BTreeSet::new(),
            rate: Fixed4::from_str(rate).unwrap(),
            reward_unit: RewardUnit::Cash,
            cap: None,
            priority: None,
            stackable: false,
        }
    }

    fn category_rule(id: &str, rate: &str, category: Category) -> RewardRule {
        let mut r = rule(id, rate);
        r.categories = vec![CategorySelector::Only(category)];
        r
    }

    fn merchant_rule(id: &str, rate: &str, merchant: &str) -> RewardRule {
        let mut r = rule(id, rate);
        r.specific_merchants = BTreeSet::from([merchant.to_string()]);
        r
    }

    fn wildcard_rule(id: &str, rate: &str) -> RewardRule {
        let mut r = rule(id, rate);
        r.categories = vec![CategorySelector::All];
        r
    }

    fn card(rules: Vec<RewardRule>) -> CreditCard {
        CreditCard {
            id: "c1".to_string(),
            name: "Test Card".to_string(),
            issuer: "Test Bank".to_string(),
            rewards: rules,
            is_active: true,
            annual_fee: None,
            fees: None,
            last_updated: None,
        }
    }

    fn ids<'a>(matches: &'a [RuleMatch<'a>]) -> Vec<&'a str> {
        matches.iter().map(|m| m.rule.id.as_str()).collect()
    }

    #[test]
    fn test_specificity_ordering() {
        assert!(Specificity::MerchantMatch > Specificity::CategoryMatch);
        assert!(Specificity::CategoryMatch > Specificity::Wildcard);
    }

    #[test]
    fn test_merchant_match_beats_category_match() {
        let c = card(vec![
            category_rule("cat", "0.10", Category::Dining),
            merchant_rule("merch", "0.02", "mcdonalds"),
        ]);
        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert_eq!(ids(&applied), vec!["merch"]);
        assert_eq!(applied[0].specificity, Specificity::MerchantMatch);
    }

    #[test]
    fn test_category_match_beats_wildcard() {
        let c = card(vec![
            wildcard_rule("any", "0.10"),
            category_rule("cat", "0.02", Category::Dining),
        ]);
        let applied = match_rules(&c, Category::Dining, None);
        assert_eq!(ids(&applied), vec!["cat"]);
    }

    #[test]
    fn test_priority_overrides_specificity() {
        let mut low = merchant_rule("merch", "0.05", "mcdonalds");
        low.priority = None;
        let mut high = wildcard_rule("boosted", "0.01");
        high.priority = Some(10);

        let c = card(vec![low, high]);
        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert_eq!(ids(&applied), vec!["boosted"]);
    }

    #[test]
    fn test_higher_rate_wins_within_specificity() {
        let c = card(vec![
            category_rule("low", "0.01", Category::Dining),
            category_rule("high", "0.03", Category::Dining),
        ]);
        let applied = match_rules(&c, Category::Dining, None);
        assert_eq!(ids(&applied), vec!["high"]);
    }

    #[test]
    fn test_declaration_order_breaks_full_tie() {
        let c = card(vec![
            category_rule("first", "0.02", Category::Dining),
            category_rule("second", "0.02", Category::Dining),
        ]);
        let applied = match_rules(&c, Category::Dining, None);
        assert_eq!(ids(&applied), vec!["first"]);
    }

    #[test]
    fn test_excluded_merchant_vetoes_rule() {
        let mut r = category_rule("dining", "0.05", Category::Dining);
        r.excluded_merchants = BTreeSet::from(["mcdonalds".to_string()]);
        let c = card(vec![r, wildcard_rule("any", "0.01")]);

        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert_eq!(ids(&applied), vec!["any"]);

        // Without the excluded merchant the dining rule applies.
        let applied = match_rules(&c, Category::Dining, Some("pizza-hut"));
        assert_eq!(ids(&applied), vec!["dining"]);
    }

    #[test]
    fn test_no_candidates_yields_empty_set() {
        let c = card(vec![category_rule("groceries", "0.02", Category::Groceries)]);
        let applied = match_rules(&c, Category::Dining, None);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_unmatchable_rule_never_matches() {
        let c = card(vec![rule("dead", "0.99")]);
        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert!(applied.is_empty());
    }

    #[test]
    fn test_stackable_rules_of_different_classes_combine() {
        let mut merch = merchant_rule("merch", "0.05", "mcdonalds");
        merch.stackable = true;
        let mut wild = wildcard_rule("base", "0.01");
        wild.stackable = true;

        let c = card(vec![merch, wild]);
        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert_eq!(ids(&applied), vec!["merch", "base"]);
    }

    #[test]
    fn test_stacking_requires_both_flags() {
        let mut merch = merchant_rule("merch", "0.05", "mcdonalds");
        merch.stackable = true;
        let wild = wildcard_rule("base", "0.01"); // not stackable

        let c = card(vec![merch, wild]);
        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert_eq!(ids(&applied), vec!["merch"]);
    }

    #[test]
    fn test_stacking_skips_same_specificity_class() {
        let mut a = category_rule("a", "0.03", Category::Dining);
        a.stackable = true;
        let mut b = category_rule("b", "0.02", Category::Dining);
        b.stackable = true;

        let c = card(vec![a, b]);
        let applied = match_rules(&c, Category::Dining, None);
        assert_eq!(ids(&applied), vec!["a"]);
    }

    #[test]
    fn test_stacking_requires_matching_unit() {
        let mut merch = merchant_rule("merch", "0.05", "mcdonalds");
        merch.stackable = true;
        let mut wild = wildcard_rule("base-miles", "1");
        wild.stackable = true;
        wild.reward_unit = RewardUnit::Miles;

        let c = card(vec![merch, wild]);
        let applied = match_rules(&c, Category::Dining, Some("mcdonalds"));
        assert_eq!(ids(&applied), vec!["merch"]);
    }
}
