use rootline_types::Digest;

use crate::error::{MerkleError, MerkleResult};
use crate::hasher::hash_pair;

/// Reduce an ordered list of digests to a single Merkle root.
///
/// Levels are folded pairwise left to right. A level of odd length has its
/// last digest duplicated before pairing; historical roots depend on this
/// padding rule. A single digest is returned unchanged.
pub fn reduce(hashes: &[Digest]) -> MerkleResult<Digest> {
    let mut level: Vec<Digest> = match hashes {
        [] => return Err(MerkleError::EmptyInput),
        [only] => return Ok(*only),
        _ => hashes.to_vec(),
    };

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            let last = level[level.len() - 1];
            level.push(last);
        }
        level = level
            .chunks_exact(2)
            .map(|pair| hash_pair(&pair[0], &pair[1]))
            .collect();
    }

    Ok(level[0])
}
