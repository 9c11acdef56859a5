//! Error types for the recommendation engine.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, RecommendError>;

/// Errors that can occur during recommendation.
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed catalog, transaction or preferences JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure writing the ranked output table
    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    /// Transaction failed input validation
    #[error("invalid transaction: {message}")]
    InvalidTransaction { message: String },

    /// Missing CLI arguments
    #[error("Missing arguments. Usage: card-recommender <catalog.json> <transaction.json> [preferences.json]")]
    MissingArgument,
}
