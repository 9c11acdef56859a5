//! Canonical category taxonomy and merchant slug normalization.
//!
//! Every component that compares categories or merchant identities goes
//! through these two functions, so rule authoring, transaction input and
//! catalog tooling all agree on identity. Merchant slugs are compared by
//! exact string equality only, never fuzzy-matched.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The fixed spending-category taxonomy all transactions and rules are
/// normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dining,
    Groceries,
    Online,
    Travel,
    Transport,
    Entertainment,
    Utilities,
    Fuel,
    Others,
}

impl Category {
    /// Canonical lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dining => "dining",
            Category::Groceries => "groceries",
            Category::Online => "online",
            Category::Travel => "travel",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Utilities => "utilities",
            Category::Fuel => "fuel",
            Category::Others => "others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(normalize_category(&raw))
    }
}

/// Maps a heterogeneous category string to its canonical category.
///
/// Alias table first, then canonical names, then the fixed `others`
/// fallback for anything unrecognized. Never fails.
pub fn normalize_category(raw: &str) -> Category {
    match raw.trim().to_lowercase().as_str() {
        "dining" | "restaurant" | "restaurants" | "food" | "cafe" | "fastfood" => Category::Dining,
        "groceries" | "grocery" | "supermarket" | "supermarkets" | "wet-market" => {
            Category::Groceries
        }
        "online" | "ecommerce" | "e-commerce" | "internet" | "online-shopping" => Category::Online,
        "travel" | "airline" | "airlines" | "hotel" | "hotels" | "flights" => Category::Travel,
        "transport" | "transportation" | "transit" | "taxi" | "ride-hailing" | "mtr" => {
            Category::Transport
        }
        "entertainment" | "cinema" | "movies" | "streaming" | "leisure" => Category::Entertainment,
        "utilities" | "utility" | "bills" | "telecom" | "mobile" => Category::Utilities,
        "fuel" | "gas" | "petrol" | "gas-station" => Category::Fuel,
        _ => Category::Others,
    }
}

/// Normalizes a free-form merchant name into its slug identifier.
///
/// Lower-cases, collapses whitespace runs to a single `-`, and strips
/// every character outside `[a-z0-9-]`.
///
/// # Examples
///
/// ```
/// use card_recommender::normalize::normalize_merchant_id;
///
/// assert_eq!(normalize_merchant_id("McDonald's  HK"), "mcdonalds-hk");
/// ```
pub fn normalize_merchant_id(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_hyphen = false;

    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_hyphen = !slug.is_empty();
            continue;
        }
        match ch {
            'a'..='z' | '0'..='9' | '-' => {
                if pending_hyphen {
                    slug.push('-');
                    pending_hyphen = false;
                }
                slug.push(ch);
            }
            _ => {}
        }
    }

    slug
}
