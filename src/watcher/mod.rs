//! Watcher - wires feeds, sink and cursors into the two reconcilers
//!
//! ```text
//! WatcherConfig
//!   │
//!   ├── TransferReconciler ← MoralisTransferFeed + tx_cache.json
//!   ├── QuestReconciler    ← QuestApiFeed + quest_cache.json + QuestGate
//!   └── WebhookSink (shared, stateless)
//! ```

mod config;

pub use config::WatcherConfig;

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::cursor::{QuestCursorStore, TxCursorStore};
use crate::feeds::{FeedSource, MoralisTransferFeed, QuestApiFeed};
use crate::model::{QuestEvent, TransferEvent};
use crate::notify::{NotificationSink, Renderer, WebhookSink};
use crate::poll::{Scheduler, SchedulerHandle};
use crate::reconcile::{CycleReport, QuestGate, QuestReconciler, TransferReconciler};
use crate::runtime::Shutdown;

/// Result of a single manual pass over both feeds.
#[derive(Debug, Serialize)]
pub struct OnceReport {
    pub transfers: Result<CycleReport, String>,
    pub quests: Result<CycleReport, String>,
}

pub struct Watcher {
    config: WatcherConfig,
    transfers: Arc<TransferReconciler>,
    quests: Arc<QuestReconciler>,
}

impl Watcher {
    /// Build with the HTTP feeds and webhook sink named in `config`.
    pub fn from_config(config: WatcherConfig) -> Self {
        let sink: Arc<dyn NotificationSink> = Arc::new(WebhookSink::new(&config.webhook_url));
        let transfer_feed = MoralisTransferFeed::new(&config.address, &config.api_key)
            .with_base_url(&config.transfers_url)
            .with_chain(&config.chain)
            .with_limit(config.page_size);
        let quest_feed = QuestApiFeed::new(&config.quests_url);
        Self::with_parts(config, Arc::new(transfer_feed), Arc::new(quest_feed), sink)
    }

    /// Build around caller-supplied feeds and sink.
    pub fn with_parts(
        config: WatcherConfig,
        transfer_feed: Arc<dyn FeedSource<Item = TransferEvent>>,
        quest_feed: Arc<dyn FeedSource<Item = QuestEvent>>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let renderer = Renderer::new(&config.explorer_tx_url);
        let transfers = TransferReconciler::new(
            transfer_feed,
            sink.clone(),
            TxCursorStore::new(&config.data_dir, config.tx_cache_cap),
            &config.address,
        )
        .with_renderer(renderer.clone());
        let quests = QuestReconciler::new(quest_feed, sink, QuestCursorStore::new(&config.data_dir))
            .with_gate(QuestGate::new(config.quest_gate))
            .with_renderer(renderer);

        Self { config, transfers: Arc::new(transfers), quests: Arc::new(quests) }
    }

    pub fn config(&self) -> &WatcherConfig { &self.config }
    pub fn transfers(&self) -> &TransferReconciler { &self.transfers }
    pub fn quests(&self) -> &QuestReconciler { &self.quests }

    /// One cycle of each feed, concurrently, outside the scheduler.
    pub async fn run_once(&self) -> OnceReport {
        let (transfers, quests) = tokio::join!(self.transfers.run_cycle(), self.quests.run_cycle());
        OnceReport {
            transfers: transfers.map_err(|e| format!("{}: {e}", e.kind())),
            quests: quests.map_err(|e| format!("{}: {e}", e.kind())),
        }
    }

    /// Start both poll loops; they stop when `shutdown` fires.
    pub fn spawn(&self, shutdown: &Shutdown) -> SchedulerHandle {
        Scheduler::new(
            self.transfers.clone(),
            self.config.tx_interval,
            self.quests.clone(),
            self.config.quest_interval,
        )
        .spawn(shutdown)
    }

    /// Persisted cursor state, read without creating files.
    pub fn status(&self) -> Value {
        let tx = self.transfers.store().peek();
        let quest = self.quests.store().peek();
        json!({
            "address": self.config.address,
            "data_dir": self.config.data_dir.display().to_string(),
            "transfers": {
                "path": self.transfers.store().path().display().to_string(),
                "cap": self.transfers.store().cap(),
                "seen": tx.as_ref().map(|c| c.len()),
                "latest": tx.as_ref().and_then(|c| c.hashes().last().map(str::to_string)),
            },
            "quests": {
                "path": self.quests.store().path().display().to_string(),
                "last_checked": quest.as_ref().and_then(|c| c.last_checked),
                "known": quest.as_ref().map(|c| c.known_quests().len()),
            },
        })
    }
}
