use thiserror::Error;

/// Faults that escape the ledger core. Every user-facing outcome (denials,
/// malformed admin input, token redemption results) is a typed result
/// variant on the operation that produced it, never an error; only backing
/// store trouble lands here, and callers are expected to surface it as a
/// generic retry-later failure without guessing at ledger state.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("backing store unavailable: {0}")]
    Store(#[from] sled::Error),
    #[error("stored record could not be encoded: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
