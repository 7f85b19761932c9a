use std::time::Duration;

use rootline_types::{BundleId, PoolId};

/// Tuning for one pool run.
#[derive(Clone, Debug)]
pub struct IteratorConfig {
    /// Bundles requested per metadata page.
    pub page_size: u64,
    /// Pause between page requests.
    pub page_delay: Duration,
    /// Exclusive upper bound; bundles at or beyond it are never processed.
    pub stop_before: Option<BundleId>,
}

impl Default for IteratorConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            page_delay: Duration::ZERO,
            stop_before: None,
        }
    }
}

/// Why a pool run reached its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishReason {
    /// Upstream already committed a root for this bundle.
    FinalizedRoot { bundle_id: BundleId },
    /// The ledger reached the configured `stop_before` bound.
    TargetReached { stop_before: BundleId },
    /// Upstream returned an empty page at this offset.
    Exhausted { offset: BundleId },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PoolState {
    #[default]
    Running,
    Finished(FinishReason),
}

impl PoolState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// Result of processing one metadata page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageOutcome {
    /// Resume offset the page was requested at.
    pub offset: BundleId,
    /// Digests appended to the ledger for this page.
    pub written: u64,
    pub state: PoolState,
}

/// Result of a complete run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub pool: PoolId,
    pub start_offset: BundleId,
    pub end_offset: BundleId,
    pub pages: u64,
    pub bundles_written: u64,
    pub finish: FinishReason,
}
