//! Watcher Configuration - from the environment or built by hand

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::core::paths::{defaults, endpoints, env, files};
use crate::error::ConfigError;

/// Everything the watcher needs. `from_env` for the binary, builders for tests.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub api_key: String,
    pub webhook_url: String,
    /// Watched wallet, lowercase
    pub address: String,
    pub data_dir: PathBuf,
    pub chain: String,
    pub page_size: u32,
    pub tx_cache_cap: usize,
    pub tx_interval: Duration,
    pub quest_interval: Duration,
    pub quest_gate: Duration,
    pub transfers_url: String,
    pub quests_url: String,
    pub explorer_tx_url: String,
    pub port: Option<u16>,
}

impl WatcherConfig {
    pub fn new(api_key: impl Into<String>, webhook_url: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            webhook_url: webhook_url.into(),
            address: address.into().trim().to_lowercase(),
            data_dir: default_data_dir(),
            chain: defaults::CHAIN.into(),
            page_size: defaults::PAGE_SIZE,
            tx_cache_cap: defaults::TX_CACHE_CAP,
            tx_interval: Duration::from_secs(defaults::TX_INTERVAL_SECS),
            quest_interval: Duration::from_secs(defaults::QUEST_INTERVAL_SECS),
            quest_gate: Duration::from_secs(defaults::QUEST_GATE_SECS),
            transfers_url: endpoints::TRANSFERS_BASE.into(),
            quests_url: endpoints::QUESTS.into(),
            explorer_tx_url: endpoints::EXPLORER_TX.into(),
            port: None,
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self { self.data_dir = dir.into(); self }
    pub fn with_tx_interval(mut self, interval: Duration) -> Self { self.tx_interval = interval; self }
    pub fn with_quest_interval(mut self, interval: Duration) -> Self { self.quest_interval = interval; self }
    pub fn with_quest_gate(mut self, gate: Duration) -> Self { self.quest_gate = gate; self }
    pub fn with_tx_cache_cap(mut self, cap: usize) -> Self { self.tx_cache_cap = cap; self }
    pub fn with_transfers_url(mut self, url: impl Into<String>) -> Self { self.transfers_url = url.into(); self }
    pub fn with_quests_url(mut self, url: impl Into<String>) -> Self { self.quests_url = url.into(); self }
    pub fn with_port(mut self, port: u16) -> Self { self.port = Some(port); self }

    /// Read `MORALIS`, `WEBHOOK`, `ADDRESS` and the optional `FEEDWATCH_*` knobs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let mut config = Self::new(required(env::API_KEY)?, required(env::WEBHOOK)?, required(env::ADDRESS)?);

        if let Some(dir) = get(env::DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(chain) = get(env::CHAIN) {
            config.chain = chain;
        }
        if let Some(url) = get(env::QUEST_URL) {
            config.quests_url = url;
        }
        if let Some(url) = get(env::EXPLORER_URL) {
            config.explorer_tx_url = url;
        }
        config.page_size = parsed(&get, env::PAGE_SIZE)?.unwrap_or(config.page_size);
        config.tx_cache_cap = parsed(&get, env::TX_CACHE_CAP)?.unwrap_or(config.tx_cache_cap);
        config.port = parsed(&get, env::PORT)?;

        if let Some(secs) = parsed::<u64, _>(&get, env::TX_INTERVAL)? {
            config.tx_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed::<u64, _>(&get, env::QUEST_INTERVAL)? {
            config.quest_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed::<u64, _>(&get, env::QUEST_GATE)? {
            config.quest_gate = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// The transaction cache must hold at least one full page, otherwise
    /// `save` evicts hashes still on the page and they are announced again
    /// on the next cycle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tx_cache_cap == 0 || self.tx_cache_cap < self.page_size as usize {
            return Err(ConfigError::Invalid {
                key: env::TX_CACHE_CAP,
                value: format!("{} (page size is {})", self.tx_cache_cap, self.page_size),
            });
        }
        Ok(())
    }
}

fn parsed<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(files::APP_DIR))
        .unwrap_or_else(|| PathBuf::from(files::FALLBACK_DIR))
}
