//! Error types for the transaction insights engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, FinsightError>;

#[derive(Error, Debug)]
pub enum FinsightError {

    // =============================
    // Engine Errors
    // =============================

    /// Out-of-range limit, malformed filter, empty question, bad credential.
    /// Detected at the filter / prompt / API boundary, before aggregation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Aggregation attempted over zero rows.
    #[error("Empty sample: no transactions available for aggregation")]
    EmptySample,

    /// The sample holds no expense rows, so the average expense is undefined.
    #[error("No expenses: the sample contains no expense transactions")]
    NoExpenses,

    /// Store unreachable or timed out.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// External text-generation call failed or returned no content.
    #[error("Upstream provider failure: {0}")]
    UpstreamFailure(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FinsightError {
    /// Stable machine-readable kind, carried in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::EmptySample => "empty_sample",
            Self::NoExpenses => "no_expenses",
            Self::Unavailable(_) => "unavailable",
            Self::UpstreamFailure(_) => "upstream_failure",
            Self::Database(_) => "database",
            Self::Serialization(_) => "serialization",
            Self::Http(_) => "http",
            Self::Csv(_) => "csv",
            Self::Io(_) => "io",
        }
    }
}
