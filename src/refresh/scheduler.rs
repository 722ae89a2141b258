//! Expiry-driven client refresh scheduler - background task keeping a path alive.
//!
//! Unlike a fixed-interval refresher, the scheduler derives every sleep from
//! the clients themselves: each cycle updates both clients of the path,
//! learns how long each remains valid, and wakes up again `threshold` before
//! the soonest known expiry.
//!
//! # Lifecycle
//!
//! ```text
//!   Running --(fatal cycle error)----------------------> Terminated
//!   Running --(shutdown signal)--> Draining --(cleanup)--> Terminated
//! ```
//!
//! A fatal error is terminal for the whole loop; the only retrying happens
//! inside each client update. Shutdown is driven from outside through
//! [`RefreshScheduler::drain`] and never interrupts an in-flight cycle; a
//! draining scheduler simply does not start another one.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::invoker::RetryPolicy;
use super::service::{CycleReport, RefreshService};
use crate::error::SchedulerError;
use crate::provider::ClientProvider;
use log::{error, info, warn};

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Safety margin kept between a refresh and the expiry it guards against
    pub threshold: Duration,
    /// Retry policy for every client update
    pub retry: RetryPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            threshold: Duration::from_secs(6 * 60 * 60),
            retry: RetryPolicy::default(),
        }
    }
}

/// Lifecycle of the scheduling loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Draining,
    Terminated,
}

/// Scheduler for periodic refresh of both clients on a path.
pub struct RefreshScheduler<P> {
    service: RefreshService<P>,
    config: SchedulerConfig,
    state: RwLock<LoopState>,
    /// Report of the last completed cycle
    last_cycle: RwLock<Option<CycleReport>>,
    cycles: AtomicU64,
}

impl<P: ClientProvider> RefreshScheduler<P> {
    /// Creates a new scheduler in the `Running` state.
    ///
    /// The service's retry policy is replaced by the one in `config`.
    pub fn new(service: RefreshService<P>, config: SchedulerConfig) -> Self {
        Self {
            service: service.with_retry(config.retry),
            config,
            state: RwLock::new(LoopState::Running),
            last_cycle: RwLock::new(None),
            cycles: AtomicU64::new(0),
        }
    }

    /// Returns the current lifecycle state of the loop.
    pub fn state(&self) -> LoopState {
        *self.state.read()
    }

    /// Returns the report of the last completed cycle, or `None` before the first one.
    pub fn last_cycle(&self) -> Option<CycleReport> {
        self.last_cycle.read().clone()
    }

    /// Returns the number of cycles that completed and scheduled a next one.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    /// Moves to `Draining`, runs `cleanup`, then moves to `Terminated`.
    ///
    /// Only the first call runs its cleanup; later calls, or calls after the
    /// loop already terminated on an error, return `false` without running it.
    pub fn drain(&self, cleanup: impl FnOnce()) -> bool {
        {
            let mut state = self.state.write();
            if *state != LoopState::Running {
                return false;
            }
            *state = LoopState::Draining;
        }

        info!("Draining client refresh for {} <-> {}", self.service.src(), self.service.dst());
        cleanup();

        *self.state.write() = LoopState::Terminated;
        true
    }

    fn terminate(&self) {
        let mut state = self.state.write();
        if *state == LoopState::Running {
            *state = LoopState::Terminated;
        }
    }

    /// Runs the scheduling loop.
    ///
    /// Each iteration updates both clients, computes the next interval, and
    /// sleeps for it; an overdue interval proceeds straight to the next cycle.
    ///
    /// # Returns
    /// - `Err(SchedulerError)` as soon as a cycle fails; no further cycles run
    /// - `Ok(())` if the scheduler was drained between cycles
    ///
    /// # Example
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use updater::{Chain, CommandProvider, RefreshScheduler, RefreshService, SchedulerConfig};
    /// # async fn example(provider: CommandProvider, src: Chain, dst: Chain) {
    /// let service = RefreshService::new(provider, src, dst);
    /// let scheduler = Arc::new(RefreshScheduler::new(service, SchedulerConfig::default()));
    /// let _handle = tokio::spawn(scheduler.clone().run());
    /// # }
    /// ```
    pub async fn run(self: Arc<Self>) -> Result<(), SchedulerError> {
        info!(
            "Starting client refresh for {} <-> {} with {} threshold",
            self.service.src(),
            self.service.dst(),
            humantime::format_duration(self.config.threshold)
        );

        loop {
            if self.state() != LoopState::Running {
                info!("Client refresh stopped");
                return Ok(());
            }

            let report = match self.service.refresh_once(self.config.threshold).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Client refresh failed: {}", e);
                    self.terminate();
                    return Err(e);
                }
            };

            if report.sleep.is_overdue() {
                warn!(
                    "Clients updated (src: {}, dst: {}), next refresh is {}; refreshing again now",
                    report.src_expiry, report.dst_expiry, report.sleep
                );
            } else {
                info!(
                    "Clients updated (src: {}, dst: {}), next refresh in {}",
                    report.src_expiry, report.dst_expiry, report.sleep
                );
            }

            let pause = report.sleep.as_sleep();
            *self.last_cycle.write() = Some(report);
            self.cycles.fetch_add(1, Ordering::AcqRel);

            tokio::time::sleep(pause).await;
        }
    }
}
