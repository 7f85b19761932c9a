use async_trait::async_trait;
use bytes::Bytes;
use rootline_types::{BundleId, FinalizedBundle, PoolId};

use crate::error::SyncResult;

/// Paginated query endpoint for finalized bundle metadata.
#[async_trait]
pub trait BundleSource: Send + Sync {
    /// Up to `limit` bundles of `pool`, starting at bundle `offset`, in order.
    async fn fetch_page(
        &self,
        pool: PoolId,
        offset: BundleId,
        limit: u64,
    ) -> SyncResult<Vec<FinalizedBundle>>;
}

/// Content-addressed blob store holding raw bundle bytes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, storage_id: &str) -> SyncResult<Bytes>;
}

#[async_trait]
impl<T: BundleSource + ?Sized> BundleSource for &T {
    async fn fetch_page(
        &self,
        pool: PoolId,
        offset: BundleId,
        limit: u64,
    ) -> SyncResult<Vec<FinalizedBundle>> {
        (**self).fetch_page(pool, offset, limit).await
    }
}

#[async_trait]
impl<T: ContentStore + ?Sized> ContentStore for &T {
    async fn fetch(&self, storage_id: &str) -> SyncResult<Bytes> {
        (**self).fetch(storage_id).await
    }
}
