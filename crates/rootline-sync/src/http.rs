use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rootline_types::{BundleId, FinalizedBundle, PoolId};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};
use crate::transport::{BundleSource, ContentStore};

/// Network settings shared by the HTTP transports.
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Extra attempts after a failed request.
    pub max_retries: u32,
    /// Delay before retry `n` is `retry_backoff * n`.
    pub retry_backoff: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

impl HttpConfig {
    /// Build a client honouring the configured timeout.
    pub fn client(&self) -> SyncResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {e}")))
    }
}

/// Response body of the finalized bundles query.
#[derive(Debug, Deserialize)]
struct BundlesPage {
    #[serde(default)]
    finalized_bundles: Vec<FinalizedBundle>,
}

/// Bundle metadata over the chain REST API.
pub struct HttpBundleSource {
    client: reqwest::Client,
    base_url: String,
    config: HttpConfig,
}

impl HttpBundleSource {
    pub fn new(client: reqwest::Client, base_url: &str, config: HttpConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    /// Endpoint listing the finalized bundles of `pool`.
    pub fn page_url(&self, pool: PoolId) -> String {
        format!("{}/kyve/v1/bundles/{pool}", self.base_url)
    }
}

#[async_trait]
impl BundleSource for HttpBundleSource {
    async fn fetch_page(
        &self,
        pool: PoolId,
        offset: BundleId,
        limit: u64,
    ) -> SyncResult<Vec<FinalizedBundle>> {
        let url = self.page_url(pool);
        let query = [
            ("pagination.limit", limit.to_string()),
            ("pagination.offset", offset.to_string()),
        ];
        let (client, target, query) = (&self.client, url.as_str(), &query);
        let page: BundlesPage = with_retries(&self.config, &url, move || async move {
            client
                .get(target)
                .query(query)
                .send()
                .await?
                .error_for_status()?
                .json::<BundlesPage>()
                .await
        })
        .await?;
        debug!(%pool, offset, limit, received = page.finalized_bundles.len(), "bundle page fetched");
        Ok(page.finalized_bundles)
    }
}

/// Raw bundle bytes from a content-addressed gateway.
pub struct HttpContentStore {
    client: reqwest::Client,
    base_url: String,
    config: HttpConfig,
}

impl HttpContentStore {
    pub fn new(client: reqwest::Client, base_url: &str, config: HttpConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        }
    }

    pub fn content_url(&self, storage_id: &str) -> String {
        format!("{}/{storage_id}", self.base_url)
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, storage_id: &str) -> SyncResult<Bytes> {
        let url = self.content_url(storage_id);
        let (client, target) = (&self.client, url.as_str());
        let bytes = with_retries(&self.config, &url, move || async move {
            client
                .get(target)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await
        })
        .await?;
        debug!(storage_id, bytes = bytes.len(), "bundle content fetched");
        Ok(bytes)
    }
}

/// Run `op`, retrying transport failures with a linear backoff.
async fn with_retries<T, F, Fut>(config: &HttpConfig, url: &str, mut op: F) -> SyncResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries => {
                attempt += 1;
                warn!(url, attempt, error = %e, "request failed; retrying");
                tokio::time::sleep(config.retry_backoff * attempt).await;
            }
            Err(e) => return Err(SyncError::Transport(format!("GET {url}: {e}"))),
        }
    }
}
