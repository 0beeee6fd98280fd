use std::result::Result as StdResult;

use rust_decimal::Decimal;
use thiserror::Error;

/// Error type that captures ledger validation and boundary failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Unknown currency: {0} has no registered rate")]
    UnknownCurrency(String),
    #[error("Split mismatch: expected {expected}, shares sum to {actual}")]
    SplitMismatch { expected: Decimal, actual: Decimal },
    #[error("Unknown member: {0}")]
    UnknownMember(String),
    #[error("Invalid subscription schedule: {0}")]
    InvalidSubscriptionSchedule(String),
    #[error("Malformed import row {line}: {reason}")]
    MalformedImportRow { line: usize, reason: String },
    #[error("Unknown project: {0}")]
    UnknownProject(String),
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    #[error("Project `{0}` is built in and cannot be deleted")]
    ProtectedProject(String),
    #[error("Project `{0}` is still referenced by ledger entries")]
    ProjectInUse(String),
    #[error("Project `{0}` already exists")]
    DuplicateProject(String),
    #[error("No member holds the `{0}` role")]
    MissingRole(String),
    #[error("Ledger has no members")]
    NoMembers,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("At most {max} favorite categories are allowed, got {actual}")]
    TooManyFavorites { max: usize, actual: usize },
    #[error("Malformed assistant response: {0}")]
    MalformedAssistResponse(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = StdResult<T, LedgerError>;
