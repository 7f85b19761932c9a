//! Test helpers shared by the unit tests of this crate.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use rootline_crypto::sha256;
use rootline_types::{BundleId, FinalizedBundle, PoolId};
use serde_json::{json, Value};

use crate::memory::{InMemoryBundleSource, InMemoryContentStore};

pub fn bundle_meta(id: BundleId, storage_id: &str, data_hash: &str) -> FinalizedBundle {
    FinalizedBundle {
        pool_id: 1,
        id,
        storage_id: storage_id.to_string(),
        data_hash: data_hash.to_string(),
        bundle_summary: json!("{\"to_height\":1}"),
        from_key: None,
        to_key: None,
        storage_provider_id: Some("1".into()),
        compression_id: Some("1".into()),
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Three tendermint-style records per bundle, heights derived from the id.
pub fn keyed_content(id: BundleId) -> Vec<Value> {
    (0..3)
        .map(|i| {
            let height = id * 3 + i + 1;
            json!({
                "key": height.to_string(),
                "value": {
                    "block": {"header": {"height": height.to_string(), "chain_id": "test-1"}},
                    "block_results": {"height": height.to_string(), "txs_results": null}
                }
            })
        })
        .collect()
}

/// Gzip the content and build metadata whose `data_hash` matches it.
pub fn stored_bundle(id: BundleId, content: &[Value]) -> (FinalizedBundle, Vec<u8>) {
    let raw = gzip(&serde_json::to_vec(content).unwrap());
    let meta = bundle_meta(id, &format!("ar-{id}"), &sha256(&raw).to_hex());
    (meta, raw)
}

/// Fill `source` and `store` with `count` keyed bundles for `pool`.
/// Bundles at or after `finalized_from` already carry an upstream root.
pub fn populate(
    pool: PoolId,
    source: &InMemoryBundleSource,
    store: &InMemoryContentStore,
    count: BundleId,
    finalized_from: Option<BundleId>,
) {
    let mut bundles = Vec::new();
    for id in 0..count {
        let (mut meta, raw) = stored_bundle(id, &keyed_content(id));
        meta.pool_id = pool.get();
        if finalized_from.is_some_and(|from| id >= from) {
            meta.bundle_summary = json!(format!("{{\"merkle_root\":\"{}\"}}", "ab".repeat(32)));
        }
        store.insert(meta.storage_id.clone(), raw);
        bundles.push(meta);
    }
    source.push(pool, bundles);
}
