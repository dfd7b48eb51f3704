//! Feedwatch: restart-safe watcher for a wallet's token transfers and a quest listing.
//!
//! # Architecture
//!
//! ```text
//! Watcher (entry point)
//!   │
//!   ├── Scheduler
//!   │     ├── PollLoop "transfers" (every ~108s)
//!   │     │     └── TransferReconciler
//!   │     │           ├── MoralisTransferFeed (newest-first page)
//!   │     │           └── TxCursorStore → tx_cache.json (bounded hash set)
//!   │     │
//!   │     └── PollLoop "quests" (daily)
//!   │           └── QuestReconciler
//!   │                 ├── QuestApiFeed (envelope + item list)
//!   │                 ├── QuestGate (24h since last_checked)
//!   │                 └── QuestCursorStore → quest_cache.json
//!   │
//!   └── WebhookSink (rendered embeds, fire-and-forget)
//! ```
//!
//! # Cycle
//!
//! | Step | Transfers | Quests |
//! |------|-----------|--------|
//! | load | fail-soft, corrupt → empty | fail-soft, corrupt → never checked |
//! | fetch | error → empty page | error → cycle fails |
//! | reconcile | unseen, oldest first | unknown, feed order |
//! | notify | record after each delivery | record after each delivery |
//! | persist | once per batch, capped | once per cycle, stamps `last_checked` |
//!
//! # Features
//!
//! - `server` - `/health` endpoint (axum)
//!
//! # Usage
//!
//! ```ignore
//! use feedwatch::{Watcher, WatcherConfig, install_signal_handlers};
//!
//! let watcher = Watcher::from_config(WatcherConfig::from_env()?);
//! let shutdown = install_signal_handlers();
//! let (transfers, quests) = watcher.spawn(&shutdown).join().await;
//! ```

pub mod core;
pub mod cursor;
pub mod error;
pub mod feeds;
pub mod logging;
pub mod model;
pub mod notify;
pub mod poll;
pub mod reconcile;
pub mod runtime;
pub mod watcher;

#[cfg(feature = "server")]
pub mod server;

pub use cursor::{QuestCursor, QuestCursorStore, TxCursor, TxCursorStore};
pub use error::{ConfigError, CursorError, CycleError, FeedError, SinkError};
pub use feeds::{FeedSource, MoralisTransferFeed, QuestApiFeed};
pub use model::{Direction, QuestEvent, QuestId, TransferEvent};
pub use notify::{Message, NotificationSink, Notice, Renderer, WebhookSink};
pub use poll::{Cycle, LoopStats, PollLoop, Scheduler, SchedulerHandle};
pub use reconcile::{CycleReport, QuestGate, QuestReconciler, TransferReconciler};
pub use runtime::{install_signal_handlers, Shutdown, ShutdownSignal};
pub use watcher::{OnceReport, Watcher, WatcherConfig};

#[cfg(feature = "server")]
pub use server::{create_router, create_router_with_name};
