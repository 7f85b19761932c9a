use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use rootline_types::{BundleId, FinalizedBundle, PoolId};

use crate::error::{SyncError, SyncResult};
use crate::transport::{BundleSource, ContentStore};

/// In-memory bundle metadata service for tests and offline replays.
#[derive(Default)]
pub struct InMemoryBundleSource {
    pools: RwLock<HashMap<PoolId, Vec<FinalizedBundle>>>,
    requests: Mutex<Vec<(PoolId, BundleId, u64)>>,
}

impl InMemoryBundleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bundles to a pool's sequence.
    pub fn push(&self, pool: PoolId, bundles: impl IntoIterator<Item = FinalizedBundle>) {
        if let Ok(mut pools) = self.pools.write() {
            pools.entry(pool).or_default().extend(bundles);
        }
    }

    /// Every `(pool, offset, limit)` page request served so far.
    pub fn requests(&self) -> Vec<(PoolId, BundleId, u64)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BundleSource for InMemoryBundleSource {
    async fn fetch_page(
        &self,
        pool: PoolId,
        offset: BundleId,
        limit: u64,
    ) -> SyncResult<Vec<FinalizedBundle>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((pool, offset, limit));
        }
        let pools = self
            .pools
            .read()
            .map_err(|_| SyncError::Transport("bundle source lock poisoned".into()))?;
        let page = pools
            .get(&pool)
            .map(|bundles| {
                bundles
                    .iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(page)
    }
}

/// In-memory blob store keyed by storage id.
#[derive(Default)]
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, storage_id: impl Into<String>, data: impl Into<Bytes>) {
        if let Ok(mut blobs) = self.blobs.write() {
            blobs.insert(storage_id.into(), data.into());
        }
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn fetch(&self, storage_id: &str) -> SyncResult<Bytes> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| SyncError::Transport("content store lock poisoned".into()))?;
        blobs
            .get(storage_id)
            .cloned()
            .ok_or_else(|| SyncError::Transport(format!("no content stored under {storage_id}")))
    }
}
