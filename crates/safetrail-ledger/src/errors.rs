use safetrail_canonical::ValidationError;
use thiserror::Error;

/// Errors raised by ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No connection to the ledger was ever established, or the endpoint
    /// became unreachable. Terminal for the call but recoverable for the
    /// process; callers must not crash on it.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// A submission or its confirmation failed. The only error class the
    /// client retries.
    #[error("ledger transaction failed: {0}")]
    Transaction(String),
    /// The write-capable signer could not be materialized.
    #[error("signer initialization failed: {0}")]
    Signer(String),
    /// Caller-supplied shape was rejected before any I/O. Never retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
