//! Card Recommender CLI
//!
//! Loads a card catalog and a transaction from JSON files and prints
//! the ranked recommendation table as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- catalog.json transaction.json > ranking.csv
//! cargo run -- catalog.json transaction.json preferences.json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use card_recommender::{Preferences, RecommendError, RecommendationEngine, Result, Transaction};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        return Err(RecommendError::MissingArgument);
    }

    let engine = RecommendationEngine::new();

    let catalog_file = File::open(&args[1])?;
    let catalog = engine.load_catalog(BufReader::new(catalog_file))?;

    let txn_file = File::open(&args[2])?;
    let transaction: Transaction = serde_json::from_reader(BufReader::new(txn_file))?;

    let preferences: Option<Preferences> = match args.get(3) {
        Some(path) => {
            let prefs_file = File::open(path)?;
            Some(serde_json::from_reader(BufReader::new(prefs_file))?)
        }
        None => None,
    };

    let result = engine.recommend(&catalog, &transaction, preferences.as_ref(), None)?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    engine.write_output(&result, handle)?;

    Ok(())
}
