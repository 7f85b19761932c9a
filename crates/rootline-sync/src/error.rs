use rootline_types::{BundleId, PoolId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetched bytes do not hash to the bundle's `data_hash`.
    #[error("content integrity check failed for bundle {bundle_id}: expected {expected}, computed {computed}")]
    ContentIntegrity {
        bundle_id: BundleId,
        expected: String,
        computed: String,
    },

    #[error("bundle {bundle_id} carries an invalid data hash: {source}")]
    InvalidDigest {
        bundle_id: BundleId,
        #[source]
        source: TypeError,
    },

    #[error("failed to decompress bundle {bundle_id}: {source}")]
    Decompress {
        bundle_id: BundleId,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse bundle {bundle_id}: {source}")]
    Parse {
        bundle_id: BundleId,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to compute merkle root of bundle {bundle_id}: {source}")]
    Merkle {
        bundle_id: BundleId,
        #[source]
        source: rootline_crypto::MerkleError,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("bundle sequence broken: expected bundle {expected}, found {found}")]
    OutOfSequence { expected: BundleId, found: BundleId },

    #[error("bundle {bundle_id} not found in pool {pool}")]
    BundleNotFound { pool: PoolId, bundle_id: BundleId },

    #[error("ledger error: {0}")]
    Ledger(#[from] rootline_ledger::LedgerError),
}

pub type SyncResult<T> = Result<T, SyncError>;
