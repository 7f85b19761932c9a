use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use rootline_sync::{HttpConfig, IteratorConfig};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RootlineConfig {
    pub chain_rest: String,
    pub storage_rest: String,
    pub ledger_dir: PathBuf,
    pub page_size: u64,
    pub page_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for RootlineConfig {
    fn default() -> Self {
        Self {
            chain_rest: "https://api.kyve.network".into(),
            storage_rest: "https://arweave.net".into(),
            ledger_dir: PathBuf::from("."),
            page_size: 10,
            page_delay_ms: 500,
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl RootlineConfig {
    /// Read the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.normalize();
        Ok(config)
    }

    /// Load from the path given on the command line and apply flag overrides.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::load(&cli.config)?;
        if let Some(dir) = &cli.ledger_dir {
            config.ledger_dir = dir.clone();
        }
        if let Some(url) = &cli.chain_rest {
            config.chain_rest = url.clone();
        }
        if let Some(url) = &cli.storage_rest {
            config.storage_rest = url.clone();
        }
        config.normalize();
        Ok(config)
    }

    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_retries: self.max_retries,
            ..HttpConfig::default()
        }
    }

    pub fn iterator(&self) -> IteratorConfig {
        IteratorConfig {
            page_size: self.page_size,
            page_delay: Duration::from_millis(self.page_delay_ms),
            stop_before: None,
        }
    }

    fn normalize(&mut self) {
        self.chain_rest = self.chain_rest.trim_end_matches('/').to_string();
        self.storage_rest = self.storage_rest.trim_end_matches('/').to_string();
    }
}
