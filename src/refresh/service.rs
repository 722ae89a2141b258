//! On-demand refresh of both clients on a path.
//!
//! Runs a single cycle: update both clients concurrently, then derive how
//! long the path can be left alone. The scheduler is built on top of this.

use super::coordinator::update_clients;
use super::interval::compute_sleep;
use super::invoker::RetryPolicy;
use crate::chain::Chain;
use crate::error::SchedulerError;
use crate::provider::ClientProvider;
use crate::types::{now_ms, Expiry, SleepInterval};
use std::time::{Duration, Instant};

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Remaining validity of the client hosted on the source chain
    pub src_expiry: Expiry,
    /// Remaining validity of the client hosted on the destination chain
    pub dst_expiry: Expiry,
    /// Time to wait before the next cycle
    pub sleep: SleepInterval,
    /// Wall time spent updating both clients, in milliseconds
    pub duration_ms: u64,
    /// Timestamp the cycle completed at
    pub timestamp: u64,
}

/// Refreshes the two clients of one path.
pub struct RefreshService<P> {
    provider: P,
    src: Chain,
    dst: Chain,
    retry: RetryPolicy,
}

impl<P: ClientProvider> RefreshService<P> {
    pub fn new(provider: P, src: Chain, dst: Chain) -> Self {
        Self {
            provider,
            src,
            dst,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn src(&self) -> &Chain {
        &self.src
    }

    pub fn dst(&self) -> &Chain {
        &self.dst
    }

    /// Runs one cycle without sleeping.
    ///
    /// # Returns
    /// The expiries seen and the interval until the next cycle, or the first
    /// fatal error (exhausted retries or no actionable expiry).
    pub async fn refresh_once(&self, threshold: Duration) -> Result<CycleReport, SchedulerError> {
        let start = Instant::now();

        let (src_expiry, dst_expiry) =
            update_clients(&self.provider, &self.src, &self.dst, threshold, self.retry).await?;

        let sleep = compute_sleep(&self.src, src_expiry, &self.dst, dst_expiry, threshold)?;

        Ok(CycleReport {
            src_expiry,
            dst_expiry,
            sleep,
            duration_ms: start.elapsed().as_millis() as u64,
            timestamp: now_ms(),
        })
    }
}
