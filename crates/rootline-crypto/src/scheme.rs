use std::fmt;

use rootline_types::{Digest, PoolId};
use serde_json::Value;

use crate::error::{MerkleError, MerkleResult};
use crate::hasher::{sha256, sha256_json};
use crate::merkle::reduce;

/// Runtime name of the list-of-records store.
pub const RUNTIME_BSYNC: &str = "@kyvejs/tendermint-bsync";
/// Runtime name of the block/result-paired consensus store.
pub const RUNTIME_TENDERMINT: &str = "@kyvejs/tendermint";

/// How leaf digests are derived from bundle content.
///
/// Chosen from pool identity alone, never from payload shape: both schemes
/// operate on structurally similar JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafScheme {
    /// One leaf per item: `sha256(canonical(item))`.
    Flat,
    /// One leaf per `{key, value: {block, block_results}}` record.
    Keyed,
}

impl LeafScheme {
    /// Fixed pool-to-scheme mapping. Pool 0 is the only flat pool.
    pub fn for_pool(pool: PoolId) -> Self {
        match pool.get() {
            0 => Self::Flat,
            _ => Self::Keyed,
        }
    }

    /// Map an upstream runtime name to its scheme.
    pub fn from_runtime(runtime: &str) -> MerkleResult<Self> {
        match runtime {
            RUNTIME_BSYNC => Ok(Self::Flat),
            RUNTIME_TENDERMINT => Ok(Self::Keyed),
            other => Err(MerkleError::UnsupportedRuntime(other.to_string())),
        }
    }

    /// Compute the Merkle root of parsed bundle content under this scheme.
    pub fn root(self, items: &[Value]) -> MerkleResult<Digest> {
        match self {
            Self::Flat => flat_merkle_root(items),
            Self::Keyed => keyed_merkle_root(items),
        }
    }
}

impl fmt::Display for LeafScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => f.write_str("flat"),
            Self::Keyed => f.write_str("keyed"),
        }
    }
}

/// Root over a flat item list.
pub fn flat_merkle_root(items: &[Value]) -> MerkleResult<Digest> {
    let leaves = items
        .iter()
        .map(sha256_json)
        .collect::<MerkleResult<Vec<_>>>()?;
    reduce(&leaves)
}

/// Root over key/value records whose value pairs a block with its results.
pub fn keyed_merkle_root(records: &[Value]) -> MerkleResult<Digest> {
    let leaves = records
        .iter()
        .enumerate()
        .map(|(index, record)| keyed_leaf(index, record))
        .collect::<MerkleResult<Vec<_>>>()?;
    reduce(&leaves)
}

fn keyed_leaf(index: usize, record: &Value) -> MerkleResult<Digest> {
    let malformed = |reason: &str| MerkleError::MalformedRecord {
        index,
        reason: reason.to_string(),
    };

    let key = record
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing string `key`"))?;
    let value = record.get("value").ok_or_else(|| malformed("missing `value`"))?;
    let block = value
        .get("block")
        .ok_or_else(|| malformed("missing `value.block`"))?;
    let block_results = value
        .get("block_results")
        .ok_or_else(|| malformed("missing `value.block_results`"))?;

    let key_digest = sha256(key.as_bytes());
    let value_digest = reduce(&[sha256_json(block)?, sha256_json(block_results)?])?;
    reduce(&[key_digest, value_digest])
}
