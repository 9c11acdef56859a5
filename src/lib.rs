//! # Card Recommender
//!
//! A reward-matching engine that ranks credit cards by net reward value
//! for a single purchase, given its category, merchant and amount.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 4 decimal places via `rust_decimal`
//! - **Pure computation**: no I/O or shared state in the core path;
//!   safe to call concurrently over a read-only catalog
//! - **Explicit cap state**: prior monthly usage enters only through a
//!   caller-owned [`UsageLedger`]
//! - **Deterministic output**: identical inputs produce byte-identical
//!   rank order
//!
//! ## Example
//!
//! ```no_run
//! use card_recommender::RecommendationEngine;
//! use std::io::Cursor;
//!
//! let catalog_json = r#"[{"id":"c1","name":"CardA","issuer":"Bank",
//!     "rewards":[{"id":"r1","categories":["dining"],"rate":"0.02","rewardUnit":"cash"}]}]"#;
//! let txn_json = r#"{"amount":"100","category":"dining"}"#;
//!
//! let engine = RecommendationEngine::new();
//! let catalog = engine.load_catalog(Cursor::new(catalog_json)).unwrap();
//! let txn = serde_json::from_str(txn_json).unwrap();
//! let result = engine.recommend(&catalog, &txn, None, None).unwrap();
//! engine.write_output(&result, std::io::stdout()).unwrap();
//! ```

pub mod calculator;
pub mod card;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod ranker;
pub mod transaction;

pub use calculator::{RewardCalculation, UnitValues, UnknownUnitPolicy, UsageLedger};
pub use card::{CreditCard, FeeSchedule, RewardCap, RewardRule, RewardUnit};
pub use decimal::Fixed4;
pub use engine::RecommendationEngine;
pub use error::{RecommendError, Result};
pub use matcher::{match_rules, RuleMatch, Specificity};
pub use normalize::{normalize_category, normalize_merchant_id, Category};
pub use ranker::{CardRecommendation, RecommendationResult};
pub use transaction::{Preferences, Transaction};
