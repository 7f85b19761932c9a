/// Errors from Merkle root construction.
#[derive(Debug, thiserror::Error)]
pub enum MerkleError {
    /// `reduce` was called with no hashes. Bundle content must never be empty.
    #[error("cannot reduce an empty list of hashes")]
    EmptyInput,

    /// A keyed-scheme record does not have the expected shape.
    #[error("malformed record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// Canonical encoding of a value failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The runtime name does not map to a known leaf scheme.
    #[error("runtime not supported: {0}")]
    UnsupportedRuntime(String),
}

pub type MerkleResult<T> = Result<T, MerkleError>;
