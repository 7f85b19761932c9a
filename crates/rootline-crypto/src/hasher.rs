use rootline_types::Digest;
use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::canonical;
use crate::error::MerkleResult;

/// SHA-256 of raw bytes.
pub fn sha256(data: &[u8]) -> Digest {
    Digest::from_hash(Sha256::digest(data).into())
}

/// SHA-256 of a value's canonical JSON encoding.
pub fn sha256_json<T: Serialize + ?Sized>(value: &T) -> MerkleResult<Digest> {
    let bytes = canonical::encode(value)?;
    Ok(sha256(&bytes))
}

/// Parent node digest: SHA-256 over `left || right`.
///
/// Equivalent to hashing the decoded concatenation of the two hex strings.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Digest::from_hash(hasher.finalize().into())
}
