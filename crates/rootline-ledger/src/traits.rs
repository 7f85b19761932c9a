use rootline_types::{BundleId, Digest};

use crate::error::LedgerResult;

/// Append-only store of per-bundle Merkle roots.
///
/// Implementations must satisfy:
/// - `len()` equals the number of bundles already processed.
/// - `append_batch` is all-or-nothing: on error no digest of the batch is
///   visible, on success all of them are, in order.
/// - Digests are never rewritten or removed.
pub trait RootLedger: Send + Sync {
    /// Number of digests stored.
    fn len(&self) -> LedgerResult<u64>;

    /// Append digests in order as one unit.
    fn append_batch(&self, digests: &[Digest]) -> LedgerResult<()>;

    /// Read digests `from..to`.
    fn read_range(&self, from: u64, to: u64) -> LedgerResult<Vec<Digest>>;

    fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Offset of the next bundle to process.
    fn resume_offset(&self) -> LedgerResult<BundleId> {
        self.len()
    }

    /// Digest recorded for one bundle, if any.
    fn get(&self, bundle_id: BundleId) -> LedgerResult<Option<Digest>> {
        if bundle_id >= self.len()? {
            return Ok(None);
        }
        Ok(self.read_range(bundle_id, bundle_id + 1)?.into_iter().next())
    }
}

impl<T: RootLedger + ?Sized> RootLedger for &T {
    fn len(&self) -> LedgerResult<u64> {
        (**self).len()
    }

    fn append_batch(&self, digests: &[Digest]) -> LedgerResult<()> {
        (**self).append_batch(digests)
    }

    fn read_range(&self, from: u64, to: u64) -> LedgerResult<Vec<Digest>> {
        (**self).read_range(from, to)
    }
}
