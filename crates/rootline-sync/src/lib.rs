//! Bundle ingestion for rootline.
//!
//! Drives the resumable loop: page through finalized bundle metadata,
//! verify each bundle's content against its published hash, compute its
//! Merkle root, and append the roots to the pool's ledger in batches.
//! Unlike a plain downloader, nothing is written for a bundle whose content
//! fails verification.

pub mod error;
pub mod http;
pub mod iterator;
pub mod memory;
pub mod transport;
pub mod types;
pub mod verifier;

#[cfg(test)]
mod fixtures;

pub use error::{SyncError, SyncResult};
pub use http::{HttpBundleSource, HttpConfig, HttpContentStore};
pub use iterator::PoolIterator;
pub use memory::{InMemoryBundleSource, InMemoryContentStore};
pub use transport::{BundleSource, ContentStore};
pub use types::{FinishReason, IteratorConfig, PageOutcome, PoolState, RunSummary};
pub use verifier::BundleVerifier;
