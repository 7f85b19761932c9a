//! Hashing primitives for rootline.
//!
//! Provides the canonical JSON encoder whose bytes feed leaf hashes, SHA-256
//! helpers, the pairwise Merkle reducer, and the two leaf-construction
//! schemes used by bundle pools.
//!
//! SHA-256 comes from the `sha2` crate; nothing here implements a primitive.

pub mod canonical;
pub mod error;
pub mod hasher;
pub mod merkle;
pub mod scheme;

pub use canonical::encode;
pub use error::{MerkleError, MerkleResult};
pub use hasher::{hash_pair, sha256, sha256_json};
pub use merkle::reduce;
pub use scheme::{
    flat_merkle_root, keyed_merkle_root, LeafScheme, RUNTIME_BSYNC, RUNTIME_TENDERMINT,
};
