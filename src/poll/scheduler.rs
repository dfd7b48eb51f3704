use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::{Cycle, LoopStats, PollLoop};
use crate::runtime::Shutdown;

/// Runs the transfer loop and the quest loop side by side.
///
/// The loops are separate tokio tasks with their own cursor files; they
/// share nothing but the shutdown signal.
pub struct Scheduler<T, Q> {
    transfers: PollLoop<T>,
    quests: PollLoop<Q>,
}

/// Handles of the spawned loops
pub struct SchedulerHandle {
    transfers: JoinHandle<LoopStats>,
    quests: JoinHandle<LoopStats>,
}

impl<T, Q> Scheduler<T, Q>
where
    T: Cycle + 'static,
    Q: Cycle + 'static,
{
    pub fn new(transfers: T, transfer_interval: Duration, quests: Q, quest_interval: Duration) -> Self {
        Self {
            transfers: PollLoop::new(transfers, transfer_interval),
            quests: PollLoop::new(quests, quest_interval),
        }
    }

    pub fn spawn(self, shutdown: &Shutdown) -> SchedulerHandle {
        info!(
            transfer_interval_secs = self.transfers.interval().as_secs(),
            quest_interval_secs = self.quests.interval().as_secs(),
            "scheduler starting"
        );
        SchedulerHandle {
            transfers: tokio::spawn(self.transfers.run(shutdown.subscribe())),
            quests: tokio::spawn(self.quests.run(shutdown.subscribe())),
        }
    }
}

impl SchedulerHandle {
    /// Wait for both loops to stop. A loop that panicked reports as `None`.
    pub async fn join(self) -> (Option<LoopStats>, Option<LoopStats>) {
        let (transfers, quests) = tokio::join!(self.transfers, self.quests);
        (settle("transfers", transfers), settle("quests", quests))
    }
}

fn settle(name: &str, joined: Result<LoopStats, tokio::task::JoinError>) -> Option<LoopStats> {
    match joined {
        Ok(stats) => Some(stats),
        Err(e) => {
            error!(feed = name, error = %e, "poll loop task ended abnormally");
            None
        }
    }
}
