//! # Core Error Types
//!
//! Every ledger operation returns one of these to its immediate caller.
//! A failed operation leaves the ledger unchanged.

use thiserror::Error;

/// Errors raised by ledger transactions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum SuretyError {
    // ========================================================================
    // Gate and Authorization Errors
    // ========================================================================

    #[error("Ledger is not operational")]
    NotOperational,

    #[error("Unauthorized")]
    Unauthorized,

    // ========================================================================
    // Payment Errors
    // ========================================================================

    #[error("Insufficient fee")]
    InsufficientFee,

    #[error("Registration fee already paid")]
    FeeAlreadyPaid,

    #[error("Amount exceeds insurance cap")]
    CapExceeded,

    #[error("Zero amount")]
    ZeroAmount,

    #[error("Insufficient pool balance")]
    InsufficientPoolBalance,

    #[error("Nothing owed")]
    NothingOwed,

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    // ========================================================================
    // Registry Errors
    // ========================================================================

    #[error("Duplicate vote")]
    DuplicateVote,

    #[error("Already registered")]
    AlreadyRegistered,

    #[error("Not found")]
    NotFound,

    #[error("Flight status already resolved")]
    FlightAlreadyResolved,

    // ========================================================================
    // Oracle Errors
    // ========================================================================

    #[error("Index does not match oracle assignment")]
    IndexMismatch,

    #[error("Oracle already responded to this request")]
    AlreadyResponded,

    #[error("Unknown status code: {0}")]
    UnknownStatusCode(u8),

    // ========================================================================
    // General Errors
    // ========================================================================

    #[error("Math overflow")]
    MathOverflow,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type using core errors
pub type SuretyResult<T> = Result<T, SuretyError>;

impl SuretyError {
    /// Create an invalid configuration error with reason
    pub fn invalid_config(reason: &str) -> Self {
        Self::InvalidConfig(reason.to_string())
    }

    /// Errors a watcher expects when it broadcasts speculative responses
    pub fn is_expected_oracle_rejection(&self) -> bool {
        matches!(self, Self::IndexMismatch | Self::AlreadyResponded)
    }
}
