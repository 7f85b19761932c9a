//! Canonical JSON encoding for leaf hashing.
//!
//! The byte output must match historical roots exactly:
//! - compact separators (`,` and `:` with no surrounding whitespace)
//! - non-ASCII text written literally as UTF-8, never `\u` escaped
//! - object keys in the order they were constructed or parsed
//!
//! Key order is never sorted. `serde_json` is built with `preserve_order`
//! so maps parsed from upstream payloads keep their original order, and with
//! `arbitrary_precision` so numbers keep their exact source text instead of
//! being narrowed to `i64`/`u64`/`f64`.

use serde::Serialize;

/// Encode a value into canonical JSON bytes.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}
