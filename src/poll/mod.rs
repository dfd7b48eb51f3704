//! Poll loops and the scheduler that runs them
//!
//! # State machine (per loop)
//!
//! ```text
//! IDLE ─► FETCHING ─► RECONCILING ─► NOTIFYING ─► PERSISTING ─► SLEEPING ─┐
//!  ▲                                                                       │
//!  └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first four working phases live inside [`Cycle::run_cycle`]; the loop
//! owns IDLE and SLEEPING. The sleep starts when a cycle ends, so cycles of
//! one loop never overlap. A failed cycle is logged with its class and the
//! loop carries on at the next tick. A cycle that panics is counted as a
//! failure the same way.
//!
//! Shutdown is only observed while SLEEPING.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerHandle};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace};

use crate::error::CycleError;
use crate::reconcile::{CycleReport, QuestReconciler, TransferReconciler};
use crate::runtime::ShutdownSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    Cycling,
    Sleeping,
}

/// One reconciliation pass over a feed.
#[async_trait]
pub trait Cycle: Send + Sync {
    fn name(&self) -> &str;
    async fn run_cycle(&self) -> Result<CycleReport, CycleError>;
}

#[async_trait]
impl Cycle for TransferReconciler {
    fn name(&self) -> &str { crate::core::paths::loops::TRANSFERS }

    async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        TransferReconciler::run_cycle(self).await
    }
}

#[async_trait]
impl Cycle for QuestReconciler {
    fn name(&self) -> &str { crate::core::paths::loops::QUESTS }

    async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        QuestReconciler::run_cycle(self).await
    }
}

#[async_trait]
impl<C: Cycle + ?Sized> Cycle for Arc<C> {
    fn name(&self) -> &str { (**self).name() }

    async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        (**self).run_cycle().await
    }
}

/// Running totals of a loop, returned when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub failures: u64,
    pub emitted: u64,
}

/// Drives one [`Cycle`] forever, `interval` apart.
pub struct PollLoop<C> {
    cycle: Arc<C>,
    interval: Duration,
}

impl<C: Cycle + 'static> PollLoop<C> {
    pub fn new(cycle: C, interval: Duration) -> Self {
        Self { cycle: Arc::new(cycle), interval }
    }

    pub fn interval(&self) -> Duration { self.interval }

    /// Run one cycle behind the failure boundary. The cycle runs in its own
    /// task, so a panic counts as a failed cycle rather than ending the loop.
    pub async fn tick(&self, stats: &mut LoopStats) {
        let name = self.cycle.name();
        trace!(feed = name, phase = ?LoopPhase::Cycling, "cycle start");
        stats.cycles += 1;

        let cycle = Arc::clone(&self.cycle);
        match tokio::spawn(async move { cycle.run_cycle().await }).await {
            Ok(Ok(report)) if report.gated => debug!(feed = name, "cycle gated"),
            Ok(Ok(report)) if report.emitted > 0 => {
                stats.emitted += report.emitted as u64;
                info!(feed = name, fetched = report.fetched, emitted = report.emitted, "cycle complete");
            }
            Ok(Ok(report)) => debug!(feed = name, fetched = report.fetched, "cycle complete, nothing new"),
            Ok(Err(e)) => {
                stats.failures += 1;
                error!(feed = name, kind = e.kind(), error = %e, "cycle failed, continuing at next tick");
            }
            Err(e) => {
                stats.failures += 1;
                error!(feed = name, kind = "panic", error = %e, "cycle aborted, continuing at next tick");
            }
        }
    }

    /// Loop until `shutdown` fires. Returns the loop's totals.
    pub async fn run(self, mut shutdown: ShutdownSignal) -> LoopStats {
        let name = self.cycle.name().to_string();
        let mut stats = LoopStats::default();
        info!(feed = %name, interval_secs = self.interval.as_secs(), "poll loop started");

        while !shutdown.is_triggered() {
            trace!(feed = %name, phase = ?LoopPhase::Idle, "tick");
            self.tick(&mut stats).await;

            trace!(feed = %name, phase = ?LoopPhase::Sleeping, "sleeping");
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(feed = %name, cycles = stats.cycles, failures = stats.failures, "poll loop stopped");
        stats
    }
}
