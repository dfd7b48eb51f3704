//! Path, endpoint and cadence constants
//!
//! Centralized registry for every fixed name the watcher touches:
//! cursor files on disk, upstream endpoints, and the reference cadences.

/// Cursor files under the data directory
pub mod files {
    pub const TX_CACHE: &str = "tx_cache.json";
    pub const QUEST_CACHE: &str = "quest_cache.json";
    pub const TMP_SUFFIX: &str = "tmp";
    pub const APP_DIR: &str = "feedwatch";
    pub const FALLBACK_DIR: &str = "./data";
}

/// Upstream endpoints
pub mod endpoints {
    pub const TRANSFERS_BASE: &str = "https://deep-index.moralis.io/api/v2.2";
    pub const QUESTS: &str = "https://quest-api.roninchain.com/v1/quests?page=1&size=20";
    pub const EXPLORER_TX: &str = "https://app.roninchain.com/tx";
    pub const API_KEY_HEADER: &str = "X-API-Key";
}

/// Reference cadences and limits
pub mod defaults {
    pub const CHAIN: &str = "ronin";
    pub const PAGE_SIZE: u32 = 20;
    pub const TX_CACHE_CAP: usize = 100;
    pub const TX_INTERVAL_SECS: u64 = 108;
    pub const QUEST_INTERVAL_SECS: u64 = 86_400;
    pub const QUEST_GATE_SECS: u64 = 86_400;
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// Environment variable names
pub mod env {
    pub const API_KEY: &str = "MORALIS";
    pub const WEBHOOK: &str = "WEBHOOK";
    pub const ADDRESS: &str = "ADDRESS";

    pub const DATA_DIR: &str = "FEEDWATCH_DATA_DIR";
    pub const TX_INTERVAL: &str = "FEEDWATCH_TX_INTERVAL_SECS";
    pub const QUEST_INTERVAL: &str = "FEEDWATCH_QUEST_INTERVAL_SECS";
    pub const QUEST_GATE: &str = "FEEDWATCH_QUEST_GATE_SECS";
    pub const TX_CACHE_CAP: &str = "FEEDWATCH_TX_CACHE_CAP";
    pub const CHAIN: &str = "FEEDWATCH_CHAIN";
    pub const PAGE_SIZE: &str = "FEEDWATCH_PAGE_SIZE";
    pub const QUEST_URL: &str = "FEEDWATCH_QUEST_URL";
    pub const EXPLORER_URL: &str = "FEEDWATCH_EXPLORER_URL";
    pub const PORT: &str = "FEEDWATCH_PORT";
    pub const LOG_JSON: &str = "FEEDWATCH_LOG_JSON";
}

/// Loop names used in logs and reports
pub mod loops {
    pub const TRANSFERS: &str = "transfers";
    pub const QUESTS: &str = "quests";
}
