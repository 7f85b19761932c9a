use rootline_crypto::LeafScheme;
use rootline_ledger::RootLedger;
use rootline_types::{BundleId, Digest, FinalizedBundle, PoolId};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::transport::{BundleSource, ContentStore};
use crate::types::{FinishReason, IteratorConfig, PageOutcome, PoolState, RunSummary};
use crate::verifier::BundleVerifier;

/// Resumable driver computing one Merkle root per bundle of a pool.
///
/// The resume offset is always read back from the ledger length; there is no
/// other cursor. Roots of a page are appended as one batch after the whole
/// page succeeded, so a failure mid-page leaves the ledger at the start of
/// that page and the next run repeats exactly those bundles.
pub struct PoolIterator<S, C, L> {
    pool: PoolId,
    scheme: LeafScheme,
    source: S,
    content: C,
    ledger: L,
    config: IteratorConfig,
    state: PoolState,
}

impl<S, C, L> PoolIterator<S, C, L>
where
    S: BundleSource,
    C: ContentStore,
    L: RootLedger,
{
    /// Create an iterator using the pool's fixed leaf scheme.
    pub fn new(pool: PoolId, source: S, content: C, ledger: L, config: IteratorConfig) -> Self {
        Self {
            pool,
            scheme: LeafScheme::for_pool(pool),
            source,
            content,
            ledger,
            config,
            state: PoolState::Running,
        }
    }

    /// Override the leaf scheme derived from the pool id.
    pub fn with_scheme(mut self, scheme: LeafScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn pool(&self) -> PoolId {
        self.pool
    }

    pub fn scheme(&self) -> LeafScheme {
        self.scheme
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// Process pages until the pool reaches its terminal state.
    pub async fn run(&mut self) -> SyncResult<RunSummary> {
        let start_offset = self.ledger.resume_offset()?;
        info!(pool = %self.pool, offset = start_offset, scheme = %self.scheme, "starting pool run");

        let mut pages = 0u64;
        let finish = loop {
            let outcome = self.step().await?;
            pages += 1;
            match outcome.state {
                PoolState::Finished(reason) => break reason,
                PoolState::Running => {
                    if !self.config.page_delay.is_zero() {
                        tokio::time::sleep(self.config.page_delay).await;
                    }
                }
            }
        };

        let end_offset = self.ledger.resume_offset()?;
        info!(pool = %self.pool, offset = end_offset, ?finish, "finished pool run");
        Ok(RunSummary {
            pool: self.pool,
            start_offset,
            end_offset,
            pages,
            bundles_written: end_offset - start_offset,
            finish,
        })
    }

    /// Fetch and process one metadata page.
    pub async fn step(&mut self) -> SyncResult<PageOutcome> {
        let offset = self.ledger.resume_offset()?;
        if let PoolState::Finished(_) = self.state {
            return Ok(self.outcome(offset, 0));
        }

        let mut limit = self.config.page_size.max(1);
        if let Some(stop_before) = self.config.stop_before {
            if offset >= stop_before {
                info!(pool = %self.pool, offset, stop_before, "reached target bundle");
                self.state = PoolState::Finished(FinishReason::TargetReached { stop_before });
                return Ok(self.outcome(offset, 0));
            }
            limit = limit.min(stop_before - offset);
        }

        let page = self.source.fetch_page(self.pool, offset, limit).await?;
        if page.is_empty() {
            warn!(pool = %self.pool, offset, "no further bundles available upstream");
            self.state = PoolState::Finished(FinishReason::Exhausted { offset });
            return Ok(self.outcome(offset, 0));
        }

        let mut batch: Vec<Digest> = Vec::with_capacity(page.len());
        let mut finished = None;
        for (expected, bundle) in (offset..).zip(page.iter().take(limit as usize)) {
            if bundle.id != expected {
                return Err(SyncError::OutOfSequence {
                    expected,
                    found: bundle.id,
                });
            }
            if bundle.has_merkle_root() {
                info!(pool = %self.pool, bundle_id = bundle.id, "bundle already carries a merkle root");
                finished = Some(FinishReason::FinalizedRoot { bundle_id: bundle.id });
                break;
            }

            let root = self.compute_bundle_root(bundle).await?;
            debug!(pool = %self.pool, bundle_id = bundle.id, root = %root, "computed merkle root");
            batch.push(root);
        }

        self.ledger.append_batch(&batch)?;
        if let Some(last) = batch.len().checked_sub(1) {
            info!(pool = %self.pool, to_bundle_id = offset + last as u64, "written");
        }
        if let Some(reason) = finished {
            self.state = PoolState::Finished(reason);
        }
        Ok(self.outcome(offset, batch.len() as u64))
    }

    /// Verify one bundle's content and compute its root under this pool's scheme.
    pub async fn compute_bundle_root(&self, bundle: &FinalizedBundle) -> SyncResult<Digest> {
        let items = BundleVerifier::fetch_verified(&self.content, bundle).await?;
        self.scheme
            .root(&items)
            .map_err(|source| SyncError::Merkle {
                bundle_id: bundle.id,
                source,
            })
    }

    /// Fetch a single bundle by id and compute its root without touching the ledger.
    pub async fn inspect(&self, bundle_id: BundleId) -> SyncResult<(FinalizedBundle, Digest)> {
        let bundle = self
            .source
            .fetch_page(self.pool, bundle_id, 1)
            .await?
            .into_iter()
            .next()
            .filter(|b| b.id == bundle_id)
            .ok_or(SyncError::BundleNotFound {
                pool: self.pool,
                bundle_id,
            })?;
        let root = self.compute_bundle_root(&bundle).await?;
        Ok((bundle, root))
    }

    fn outcome(&self, offset: BundleId, written: u64) -> PageOutcome {
        PageOutcome {
            offset,
            written,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{keyed_content, populate, stored_bundle};
    use crate::memory::{InMemoryBundleSource, InMemoryContentStore};
    use rootline_crypto::keyed_merkle_root;
    use rootline_ledger::{FileLedger, InMemoryLedger};
    use serde_json::json;

    const POOL: PoolId = PoolId::new(1);

    fn fixture(count: u64, finalized_from: Option<u64>) -> (InMemoryBundleSource, InMemoryContentStore) {
        let source = InMemoryBundleSource::new();
        let store = InMemoryContentStore::new();
        populate(POOL, &source, &store, count, finalized_from);
        (source, store)
    }

    fn expected_roots(range: std::ops::Range<u64>) -> Vec<Digest> {
        range.map(|id| keyed_merkle_root(&keyed_content(id)).unwrap()).collect()
    }

    #[tokio::test]
    async fn runs_until_finalized_root() {
        let (source, store) = fixture(25, Some(23));
        let ledger = InMemoryLedger::new();
        let mut it = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default());

        let summary = it.run().await.unwrap();

        assert_eq!(summary.finish, FinishReason::FinalizedRoot { bundle_id: 23 });
        assert_eq!(summary.start_offset, 0);
        assert_eq!(summary.end_offset, 23);
        assert_eq!(summary.bundles_written, 23);
        assert_eq!(summary.pages, 3);
        assert_eq!(ledger.digests().unwrap(), expected_roots(0..23));
        assert!(it.state().is_finished());
    }

    #[tokio::test]
    async fn finalized_bundle_stops_rest_of_page() {
        // Bundle 4 is finalized; 5 and later must not be processed even
        // though they are in the same page and carry no root.
        let (source, store) = fixture(10, None);
        let ledger = InMemoryLedger::new();
        let bundles = source.fetch_page(POOL, 0, 10).await.unwrap();
        let patched = InMemoryBundleSource::new();
        patched.push(
            POOL,
            bundles.into_iter().map(|mut b| {
                if b.id == 4 {
                    b.bundle_summary = json!({"merkle_root": "00"});
                }
                b
            }),
        );

        let mut it = PoolIterator::new(POOL, &patched, &store, &ledger, IteratorConfig::default());
        let outcome = it.step().await.unwrap();

        assert_eq!(outcome.written, 4);
        assert_eq!(outcome.state, PoolState::Finished(FinishReason::FinalizedRoot { bundle_id: 4 }));
        assert_eq!(ledger.digests().unwrap(), expected_roots(0..4));
    }

    #[tokio::test]
    async fn resumes_from_ledger_length() {
        let (source, store) = fixture(12, Some(12));
        let prefix = expected_roots(0..7);
        let ledger = InMemoryLedger::with_digests(prefix);
        let mut it = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default());

        let summary = it.run().await.unwrap();

        assert_eq!(source.requests()[0], (POOL, 7, 10));
        assert_eq!(summary.start_offset, 7);
        assert_eq!(summary.bundles_written, 5);
        assert_eq!(ledger.digests().unwrap(), expected_roots(0..12));
    }

    #[tokio::test]
    async fn integrity_failure_writes_nothing_for_the_page() {
        let (source, store) = fixture(15, None);
        // Corrupt bundle 12: content no longer matches data_hash.
        let (_, other_raw) = stored_bundle(99, &keyed_content(99));
        store.insert("ar-12", other_raw);
        let ledger = InMemoryLedger::new();
        let mut it = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default());

        let err = it.run().await.unwrap_err();

        assert!(matches!(err, SyncError::ContentIntegrity { bundle_id: 12, .. }));
        assert_eq!(ledger.len().unwrap(), 10);
        assert_eq!(ledger.digests().unwrap(), expected_roots(0..10));
    }

    #[tokio::test]
    async fn resume_after_crash_matches_uninterrupted_run() {
        let dir = tempfile::tempdir().unwrap();

        // Uninterrupted reference run.
        let (source, store) = fixture(27, Some(27));
        let reference = InMemoryLedger::new();
        PoolIterator::new(POOL, &source, &store, &reference, IteratorConfig::default())
            .run()
            .await
            .unwrap();

        // First run dies on bundle 16 (content unavailable).
        let (source, broken) = fixture(27, Some(27));
        broken.insert("ar-16", Vec::<u8>::new());
        {
            let ledger = FileLedger::open_for_pool(dir.path(), POOL).unwrap();
            let mut it = PoolIterator::new(POOL, &source, &broken, &ledger, IteratorConfig::default());
            assert!(it.run().await.is_err());
            assert_eq!(ledger.len().unwrap(), 10);
        }

        // Second process resumes from the file length alone.
        let (_, store) = fixture(27, Some(27));
        let ledger = FileLedger::open_for_pool(dir.path(), POOL).unwrap();
        let summary = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.start_offset, 10);
        assert_eq!(ledger.read_range(0, 27).unwrap(), reference.digests().unwrap());
        assert_eq!(
            std::fs::metadata(ledger.path()).unwrap().len(),
            27 * 32
        );
    }

    #[tokio::test]
    async fn stop_before_clips_page_requests() {
        let (source, store) = fixture(30, None);
        let ledger = InMemoryLedger::new();
        let config = IteratorConfig {
            stop_before: Some(13),
            ..IteratorConfig::default()
        };
        let mut it = PoolIterator::new(POOL, &source, &store, &ledger, config);

        let summary = it.run().await.unwrap();

        assert_eq!(summary.finish, FinishReason::TargetReached { stop_before: 13 });
        assert_eq!(ledger.len().unwrap(), 13);
        assert_eq!(source.requests()[1], (POOL, 10, 3));
    }

    #[tokio::test]
    async fn already_at_target_does_not_fetch() {
        let (source, store) = fixture(5, None);
        let ledger = InMemoryLedger::with_digests(expected_roots(0..5));
        let config = IteratorConfig {
            stop_before: Some(5),
            ..IteratorConfig::default()
        };
        let summary = PoolIterator::new(POOL, &source, &store, &ledger, config)
            .run()
            .await
            .unwrap();

        assert_eq!(summary.bundles_written, 0);
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_page_finishes_as_exhausted() {
        let (source, store) = fixture(4, None);
        let ledger = InMemoryLedger::new();
        let summary = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.finish, FinishReason::Exhausted { offset: 4 });
        assert_eq!(summary.pages, 2);
        assert_eq!(ledger.len().unwrap(), 4);
    }

    #[tokio::test]
    async fn sequence_gap_is_rejected_before_writing() {
        let (source, store) = fixture(6, None);
        let mut bundles = source.fetch_page(POOL, 0, 10).await.unwrap();
        bundles.remove(2);
        let gapped = InMemoryBundleSource::new();
        gapped.push(POOL, bundles);
        let ledger = InMemoryLedger::new();

        let err = PoolIterator::new(POOL, &gapped, &store, &ledger, IteratorConfig::default())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::OutOfSequence { expected: 2, found: 3 }));
        assert!(ledger.is_empty().unwrap());
    }

    #[tokio::test]
    async fn empty_bundle_content_is_fatal() {
        let source = InMemoryBundleSource::new();
        let store = InMemoryContentStore::new();
        let (meta, raw) = stored_bundle(0, &[]);
        store.insert(meta.storage_id.clone(), raw);
        source.push(POOL, [meta]);
        let ledger = InMemoryLedger::new();

        let err = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default())
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SyncError::Merkle { bundle_id: 0, source: rootline_crypto::MerkleError::EmptyInput }
        ));
        assert!(ledger.is_empty().unwrap());
    }

    #[tokio::test]
    async fn flat_pool_uses_flat_scheme() {
        let pool = PoolId::new(0);
        let source = InMemoryBundleSource::new();
        let store = InMemoryContentStore::new();
        let items = vec![json!({"key": "1", "value": {"tx": "a"}}), json!({"key": "2", "value": {"tx": "b"}})];
        let (mut meta, raw) = stored_bundle(0, &items);
        meta.pool_id = 0;
        store.insert(meta.storage_id.clone(), raw);
        source.push(pool, [meta]);
        let ledger = InMemoryLedger::new();

        let mut it = PoolIterator::new(pool, &source, &store, &ledger, IteratorConfig::default());
        assert_eq!(it.scheme(), LeafScheme::Flat);
        it.run().await.unwrap();

        assert_eq!(
            ledger.digests().unwrap(),
            vec![rootline_crypto::flat_merkle_root(&items).unwrap()]
        );
    }

    #[tokio::test]
    async fn inspect_computes_single_root_without_writing() {
        let (source, store) = fixture(8, None);
        let ledger = InMemoryLedger::new();
        let it = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default());

        let (bundle, root) = it.inspect(5).await.unwrap();
        assert_eq!(bundle.id, 5);
        assert_eq!(root, expected_roots(5..6)[0]);
        assert!(ledger.is_empty().unwrap());

        assert!(matches!(
            it.inspect(8).await,
            Err(SyncError::BundleNotFound { bundle_id: 8, .. })
        ));
    }

    #[tokio::test]
    async fn step_after_finish_is_noop() {
        let (source, store) = fixture(3, Some(0));
        let ledger = InMemoryLedger::new();
        let mut it = PoolIterator::new(POOL, &source, &store, &ledger, IteratorConfig::default());

        it.run().await.unwrap();
        let outcome = it.step().await.unwrap();
        assert_eq!(outcome.written, 0);
        assert_eq!(source.requests().len(), 1);
    }
}
