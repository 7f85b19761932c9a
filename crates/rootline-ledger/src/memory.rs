use std::sync::RwLock;

use rootline_types::Digest;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::RootLedger;

/// In-memory ledger for tests, dry runs, and embedding.
#[derive(Default)]
pub struct InMemoryLedger {
    inner: RwLock<Vec<Digest>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing prefix, as if earlier runs had written it.
    pub fn with_digests(digests: Vec<Digest>) -> Self {
        Self {
            inner: RwLock::new(digests),
        }
    }

    /// Snapshot of every stored digest.
    pub fn digests(&self) -> LedgerResult<Vec<Digest>> {
        Ok(self.inner.read().map_err(|_| LedgerError::Poisoned)?.clone())
    }
}

impl RootLedger for InMemoryLedger {
    fn len(&self) -> LedgerResult<u64> {
        Ok(self.inner.read().map_err(|_| LedgerError::Poisoned)?.len() as u64)
    }

    fn append_batch(&self, digests: &[Digest]) -> LedgerResult<()> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Poisoned)?
            .extend_from_slice(digests);
        Ok(())
    }

    fn read_range(&self, from: u64, to: u64) -> LedgerResult<Vec<Digest>> {
        let stored = self.inner.read().map_err(|_| LedgerError::Poisoned)?;
        let len = stored.len() as u64;
        if from > to || to > len {
            return Err(LedgerError::OutOfRange { from, to, len });
        }
        Ok(stored[from as usize..to as usize].to_vec())
    }
}
