use std::io::Read;

use flate2::read::MultiGzDecoder;
use rootline_crypto::sha256;
use rootline_types::{BundleId, Digest, FinalizedBundle};
use serde_json::Value;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::transport::ContentStore;

/// Checks fetched bundle content against its published hash and decodes it.
///
/// Every failure here is fatal for the run: a mismatch means corrupted or
/// tampered content, and nothing may be written for that bundle.
pub struct BundleVerifier;

impl BundleVerifier {
    /// Compare `sha256(raw)` with the bundle's `data_hash`.
    pub fn check_integrity(bundle: &FinalizedBundle, raw: &[u8]) -> SyncResult<Digest> {
        let expected =
            Digest::from_hex(&bundle.data_hash).map_err(|source| SyncError::InvalidDigest {
                bundle_id: bundle.id,
                source,
            })?;
        let computed = sha256(raw);
        if computed != expected {
            return Err(SyncError::ContentIntegrity {
                bundle_id: bundle.id,
                expected: bundle.data_hash.clone(),
                computed: computed.to_hex(),
            });
        }
        Ok(computed)
    }

    /// Gunzip and parse raw content into its ordered item list.
    pub fn decode(bundle_id: BundleId, raw: &[u8]) -> SyncResult<Vec<Value>> {
        let mut json = Vec::new();
        MultiGzDecoder::new(raw)
            .read_to_end(&mut json)
            .map_err(|source| SyncError::Decompress { bundle_id, source })?;
        serde_json::from_slice(&json).map_err(|source| SyncError::Parse { bundle_id, source })
    }

    /// Integrity check followed by decoding.
    pub fn verify(bundle: &FinalizedBundle, raw: &[u8]) -> SyncResult<Vec<Value>> {
        Self::check_integrity(bundle, raw)?;
        let items = Self::decode(bundle.id, raw)?;
        debug!(bundle_id = bundle.id, bytes = raw.len(), items = items.len(), "bundle verified");
        Ok(items)
    }

    /// Fetch a bundle's content from `store` and verify it.
    pub async fn fetch_verified<C: ContentStore + ?Sized>(
        store: &C,
        bundle: &FinalizedBundle,
    ) -> SyncResult<Vec<Value>> {
        let raw = store.fetch(&bundle.storage_id).await?;
        Self::verify(bundle, &raw)
    }
}
