use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::CycleReport;
use crate::core::paths::defaults;
use crate::cursor::QuestCursorStore;
use crate::error::CycleError;
use crate::feeds::FeedSource;
use crate::model::QuestEvent;
use crate::notify::{NotificationSink, Notice, Renderer};

/// Coarse time gate on top of the quest loop's tick.
#[derive(Debug, Clone, Copy)]
pub struct QuestGate {
    interval: chrono::Duration,
}

impl Default for QuestGate {
    fn default() -> Self { Self::new(Duration::from_secs(defaults::QUEST_GATE_SECS)) }
}

impl QuestGate {
    pub fn new(interval: Duration) -> Self {
        let interval = chrono::Duration::from_std(interval).unwrap_or_else(|_| chrono::Duration::days(36_500));
        Self { interval }
    }

    /// Due when never checked or at least `interval` has passed.
    pub fn is_due(&self, last_checked: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_checked {
            None => true,
            Some(prev) => now.signed_duration_since(prev) >= self.interval,
        }
    }

    pub fn next_due(&self, last_checked: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
        last_checked.and_then(|prev| prev.checked_add_signed(self.interval))
    }
}

/// Reconciles the quest listing against the quest cursor.
pub struct QuestReconciler {
    feed: Arc<dyn FeedSource<Item = QuestEvent>>,
    sink: Arc<dyn NotificationSink>,
    store: QuestCursorStore,
    renderer: Renderer,
    gate: QuestGate,
}

impl QuestReconciler {
    pub fn new(
        feed: Arc<dyn FeedSource<Item = QuestEvent>>,
        sink: Arc<dyn NotificationSink>,
        store: QuestCursorStore,
    ) -> Self {
        Self { feed, sink, store, renderer: Renderer::default(), gate: QuestGate::default() }
    }

    pub fn with_gate(mut self, gate: QuestGate) -> Self { self.gate = gate; self }
    pub fn with_renderer(mut self, renderer: Renderer) -> Self { self.renderer = renderer; self }

    pub fn store(&self) -> &QuestCursorStore { &self.store }

    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// One cycle as of `now`. Gated cycles touch neither the feed nor the
    /// cursor file. Fetch failures propagate and leave `last_checked` alone,
    /// so the next tick tries again.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleReport, CycleError> {
        let mut cursor = self.store.load();
        if !self.gate.is_due(cursor.last_checked, now) {
            debug!(next_due = ?self.gate.next_due(cursor.last_checked), "quest check not due");
            return Ok(CycleReport::gated());
        }

        let quests = self.feed.fetch().await?;
        let fetched = quests.len();

        let mut in_page = HashSet::new();
        let fresh: Vec<&QuestEvent> = quests
            .iter()
            .filter(|q| !cursor.is_known(&q.id) && in_page.insert(&q.id))
            .collect();

        let mut emitted = 0;
        for quest in fresh {
            let message = self.renderer.render(Notice::Quest(quest));
            if let Err(e) = self.sink.deliver(&message).await {
                if let Err(save) = self.store.save(&cursor) {
                    warn!(error = %save, "cursor save failed after a delivery failure");
                }
                return Err(e.into());
            }
            cursor.record(quest.id.clone());
            emitted += 1;
            info!(quest = %quest.id, name = %quest.name, "quest notified");
        }

        cursor.mark_checked(now);
        self.store.save(&cursor)?;
        Ok(CycleReport { fetched, emitted, gated: false })
    }
}
