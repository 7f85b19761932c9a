//! Append-only Merkle root ledger for rootline.
//!
//! A ledger is the concatenation of 32-byte digests, one per processed
//! bundle, in bundle order. There is no header and no cursor: the number of
//! digests stored is the offset of the next bundle to process.
//!
//! - `RootLedger` trait boundary
//! - `FileLedger`: one binary file per pool
//! - `InMemoryLedger`: for tests and embedding

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use file::{ledger_file_name, FileLedger};
pub use memory::InMemoryLedger;
pub use traits::RootLedger;
