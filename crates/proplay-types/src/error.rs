//! Error types for the ProPlay wallet core.
//!
//! All errors use the `PP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Account / auth errors
//! - 2xx: Balance errors
//! - 3xx: Transaction errors
//! - 4xx: Match errors
//! - 5xx: External collaborator errors
//! - 9xx: General / internal errors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{MatchId, TransactionId, UserId};

/// Central error enum for all ProPlay operations.
#[derive(Debug, Error)]
pub enum ProplayError {
    // =================================================================
    // Account / Auth Errors (1xx)
    // =================================================================
    /// No user with this id exists in the ledger.
    #[error("PP_ERR_100: User not found: {0}")]
    UserNotFound(UserId),

    /// Email / password pair did not match any account.
    #[error("PP_ERR_101: Invalid credentials")]
    InvalidCredentials,

    /// Registration attempted with an email that is already taken.
    #[error("PP_ERR_102: Email already registered: {email}")]
    EmailAlreadyExists { email: String },

    /// Too many failed logins; the account is locked until `until`.
    #[error("PP_ERR_103: Account {email} locked until {until}")]
    AccountLocked { email: String, until: DateTime<Utc> },

    /// The operation needs a logged-in session user.
    #[error("PP_ERR_104: No user is logged in")]
    NotAuthenticated,

    /// The operation is reserved for admin users.
    #[error("PP_ERR_105: Admin privileges required")]
    AdminRequired,

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// Not enough balance to perform the operation.
    #[error("PP_ERR_200: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    /// Ledger totals do not reconcile with the recorded money flows.
    #[error("PP_ERR_201: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // Transaction Errors (3xx)
    // =================================================================
    /// The requested transaction does not exist.
    #[error("PP_ERR_300: Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// A request failed validation (non-positive amount, blank field, ...).
    #[error("PP_ERR_301: Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // =================================================================
    // Match Errors (4xx)
    // =================================================================
    /// The requested match does not exist.
    #[error("PP_ERR_400: Match not found: {0}")]
    MatchNotFound(MatchId),

    /// The game id is not in the configured catalog.
    #[error("PP_ERR_401: Unknown game: {0}")]
    UnknownGame(String),

    // =================================================================
    // External Collaborator Errors (5xx)
    // =================================================================
    /// The commentary generator failed. Always recovered by the fallback text.
    #[error("PP_ERR_500: Commentary unavailable: {reason}")]
    CommentaryUnavailable { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("PP_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("PP_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, out-of-range values, etc.).
    #[error("PP_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (snapshot file, config file).
    #[error("PP_ERR_903: I/O error: {0}")]
    Io(String),

    /// Persisted snapshot has a schema version this build cannot read.
    #[error("PP_ERR_904: Unsupported snapshot schema version {found} (expected {expected})")]
    UnsupportedSnapshot { found: u32, expected: u32 },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ProplayError>;

impl From<std::io::Error> for ProplayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ProplayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
