//! Reconcilers: snapshot + cursor → ordered new items → notices → cursor
//!
//! # Cycle
//!
//! ```text
//! load cursor ─► fetch page ─► drop seen ids ─► notify one by one ─► save cursor
//!                                               (record id after each delivery)
//! ```
//!
//! Ids are recorded in memory right after their own delivery and the cursor
//! is saved once per batch. A crash between the two repeats the notices of
//! that batch on the next start: delivery is at-least-once across restarts.

mod quests;
mod transfers;

pub use quests::{QuestGate, QuestReconciler};
pub use transfers::{fresh_transfers, TransferReconciler};

use serde::Serialize;

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Items in the fetched page
    pub fetched: usize,
    /// Notifications delivered
    pub emitted: usize,
    /// True when the quest gate skipped the cycle
    pub gated: bool,
}

impl CycleReport {
    pub fn gated() -> Self {
        Self { gated: true, ..Self::default() }
    }
}
