//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Keep this focused on deterministic failures of the append/project/reserve
/// paths. Anything the caller can correct and resubmit is `Validation`;
/// storage faults surface as `Persistence` and mean the operation was not
/// applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A movement or request failed validation (e.g. sign/kind mismatch).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure, malformed location).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced resource does not exist (e.g. unknown product).
    #[error("not found: {0}")]
    NotFound(String),

    /// A reservation request exceeded the available quantity.
    ///
    /// Recoverable by the caller: retry with a smaller quantity or surface to
    /// the user. State is unchanged when this is returned.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// The operation is inconsistent with current state (e.g. releasing more
    /// than is reserved). Indicates a caller bug.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Storage failure during the atomic append-and-project step.
    ///
    /// The caller must treat the operation as not applied; retry is safe when
    /// an idempotency key is supplied.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
