use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::CycleReport;
use crate::cursor::{TxCursor, TxCursorStore};
use crate::error::{CycleError, SinkError};
use crate::feeds::FeedSource;
use crate::model::{Direction, TransferEvent};
use crate::notify::{NotificationSink, Notice, Renderer};

/// Unseen transfers of a newest-first page, oldest first.
///
/// Duplicates inside the page collapse to their first occurrence. Transfers
/// sharing a timestamp keep reverse page order, i.e. oldest first as well.
pub fn fresh_transfers(snapshot: Vec<TransferEvent>, cursor: &TxCursor) -> Vec<TransferEvent> {
    let mut in_page = HashSet::new();
    let mut fresh: Vec<TransferEvent> = snapshot
        .into_iter()
        .rev()
        .filter(|event| !cursor.contains(&event.hash) && in_page.insert(event.hash.clone()))
        .collect();
    fresh.sort_by_key(|event| event.timestamp);
    fresh
}

/// Reconciles the wallet's transfer feed against the transaction cursor.
pub struct TransferReconciler {
    feed: Arc<dyn FeedSource<Item = TransferEvent>>,
    sink: Arc<dyn NotificationSink>,
    store: TxCursorStore,
    renderer: Renderer,
    watched: String,
}

impl TransferReconciler {
    pub fn new(
        feed: Arc<dyn FeedSource<Item = TransferEvent>>,
        sink: Arc<dyn NotificationSink>,
        store: TxCursorStore,
        watched: impl Into<String>,
    ) -> Self {
        Self { feed, sink, store, renderer: Renderer::default(), watched: watched.into() }
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self { self.renderer = renderer; self }

    pub fn store(&self) -> &TxCursorStore { &self.store }

    /// Notify `fresh` in order, recording each hash right after its delivery.
    /// On a delivery failure the cursor holds exactly the delivered hashes.
    pub async fn emit(&self, fresh: &[TransferEvent], cursor: &mut TxCursor) -> Result<usize, SinkError> {
        let mut emitted = 0;
        for event in fresh {
            let direction = Direction::classify(event, &self.watched);
            let message = self.renderer.render(Notice::Transfer { event, direction });
            self.sink.deliver(&message).await?;
            cursor.record(event.hash.clone());
            emitted += 1;
            info!(
                hash = %event.hash,
                symbol = %event.token_symbol,
                direction = ?direction,
                amount = event.amount,
                "transfer notified"
            );
        }
        Ok(emitted)
    }

    /// One full cycle. A failed fetch counts as an empty page.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let mut cursor = self.store.load();

        let snapshot = match self.feed.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(feed = self.feed.name(), error = %e, "transfer fetch failed, treating page as empty");
                Vec::new()
            }
        };
        let fetched = snapshot.len();

        let fresh = fresh_transfers(snapshot, &cursor);
        if fresh.is_empty() {
            debug!(fetched, known = cursor.len(), "no new transfers");
            return Ok(CycleReport { fetched, ..CycleReport::default() });
        }

        let delivered = self.emit(&fresh, &mut cursor).await;
        let saved = self.store.save(&mut cursor);
        if let (Err(_), Err(e)) = (&delivered, &saved) {
            warn!(error = %e, "cursor save failed after a delivery failure");
        }
        let emitted = delivered?;
        saved?;

        Ok(CycleReport { fetched, emitted, gated: false })
    }
}
