use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position of a bundle within its pool, starting at 0.
pub type BundleId = u64;

/// Identifies one chain/runtime stream of bundles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub u64);

impl PoolId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PoolId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<u64> for PoolId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Upstream metadata for one finalized bundle.
///
/// The bundle service renders integers as decimal strings; the numeric fields
/// here accept either strings or plain JSON numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalizedBundle {
    #[serde(with = "string_or_number")]
    pub pool_id: u64,
    /// Offset of the bundle within its pool.
    #[serde(with = "string_or_number")]
    pub id: BundleId,
    /// Opaque locator of the raw bundle content.
    pub storage_id: String,
    /// Expected SHA-256 of the raw (still compressed) content, hex.
    pub data_hash: String,
    #[serde(default)]
    pub bundle_summary: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_provider_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_id: Option<String>,
}

impl FinalizedBundle {
    /// Whether upstream has already committed a Merkle root for this bundle.
    ///
    /// An object summary must carry a `merkle_root` key. A string summary,
    /// JSON-encoded or not, only has to mention `merkle_root` anywhere.
    pub fn has_merkle_root(&self) -> bool {
        summary_has_merkle_root(&self.bundle_summary)
    }
}

fn summary_has_merkle_root(summary: &Value) -> bool {
    match summary {
        Value::Object(map) => map.contains_key("merkle_root"),
        Value::String(s) => s.contains("merkle_root"),
        _ => false,
    }
}

mod string_or_number {
    use serde::de::{self, Deserialize};
    use serde::{Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    // Goes through `Value` so numbers decode the same way with or without
    // serde_json's `arbitrary_precision`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| de::Error::custom(format!("expected an unsigned 64-bit integer, got {n}"))),
            Value::String(s) => s
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid integer string {s:?}"))),
            other => Err(de::Error::custom(format!(
                "expected an unsigned integer or a decimal string, got {other}"
            ))),
        }
    }
}
