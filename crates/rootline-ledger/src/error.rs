use std::io;
use std::path::PathBuf;

/// Errors produced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The ledger file length is not a multiple of the digest width. The file
    /// is left untouched for the operator to inspect.
    #[error("ledger {path} is inconsistent: {size} bytes is not a multiple of 32")]
    Inconsistent { path: PathBuf, size: u64 },

    #[error("no ledger at {path}")]
    Missing { path: PathBuf },

    #[error("range {from}..{to} is outside the ledger (length {len})")]
    OutOfRange { from: u64, to: u64, len: u64 },

    #[error("ledger lock poisoned")]
    Poisoned,
}

pub type LedgerResult<T> = Result<T, LedgerError>;
