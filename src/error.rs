//! Error type shared by the loader, parameter accessor and sensitivity sweeps

use thiserror::Error;

/// Errors raised by the forecasting library
///
/// Numerical degeneracies (zero debt service, non-positive equity, IRR
/// non-convergence) are not errors: they resolve to documented sentinels.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Invalid range for {parameter}: {reason}")]
    InvalidRange { parameter: String, reason: String },

    #[error("Unknown parameter path: {0}")]
    UnknownParameter(String),

    #[error("Expense line {index} does not exist ({len} lines defined)")]
    MissingExpenseLine { index: usize, len: usize },

    #[error("Invalid inputs: {0}")]
    InvalidInputs(String),

    #[error("Sweep cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ForecastError>;
