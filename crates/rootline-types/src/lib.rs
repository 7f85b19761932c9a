//! Foundation types for rootline.
//!
//! Every other rootline crate depends on `rootline-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — 32-byte SHA-256 output, canonically rendered as lowercase hex
//! - [`PoolId`] — identifies one chain/runtime stream of bundles
//! - [`BundleId`] — position of a bundle within its pool
//! - [`FinalizedBundle`] — upstream metadata for one bundle

pub mod bundle;
pub mod digest;
pub mod error;

pub use bundle::{BundleId, FinalizedBundle, PoolId};
pub use digest::{Digest, DIGEST_LEN};
pub use error::TypeError;
