//! Supervised run of the scheduler next to the shutdown trap.
//!
//! Whichever finishes first decides the outcome: a fatal loop error ends the
//! run with that error, a shutdown signal drains the scheduler and ends it
//! cleanly. The relay strategy is stopped exactly once either way.

use crate::error::{RunError, SchedulerError};
use crate::provider::ClientProvider;
use crate::refresh::RefreshScheduler;
use crate::shutdown::{trap, Signal};
use crate::strategy::StopHandle;
use log::info;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

async fn loop_outcome(
    refresh: &mut JoinHandle<Result<(), SchedulerError>>,
) -> Result<(), RunError> {
    Ok(refresh.await??)
}

/// Runs `scheduler` on its own task until it fails or `signal` fires.
///
/// # Arguments
/// - `scheduler`: scheduler to run, still in the `Running` state
/// - `stop`: stop handle of the relay strategy started for the same path
/// - `signal`: source of the shutdown signal, normally [`crate::shutdown::wait_for_signal`]
///
/// # Returns
/// - `Ok(())` after a signal drained the scheduler and stopped the relay
/// - `Err(RunError::Scheduler)` if the loop hit a fatal error, including when
///   the signal arrives while that error is still being reported
/// - `Err(RunError::Signal)` if the signal source itself failed
///
/// A drained loop task is not aborted; it stops at its next cycle boundary or
/// when the runtime shuts down.
pub async fn run_until_signal<P, S, E>(
    scheduler: Arc<RefreshScheduler<P>>,
    stop: StopHandle,
    signal: S,
) -> Result<(), RunError>
where
    P: ClientProvider + 'static,
    S: Future<Output = Result<Signal, E>>,
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let mut refresh = tokio::spawn(scheduler.clone().run());

    let drained = AtomicBool::new(false);
    let cleanup = || {
        let ran = scheduler.drain(|| {
            stop.stop();
        });
        drained.store(ran, Ordering::Release);
        // the loop may already have terminated on its own
        stop.stop();
    };

    tokio::select! {
        biased;

        res = loop_outcome(&mut refresh) => {
            stop.stop();
            res
        }
        res = trap(signal, cleanup) => {
            if let Err(e) = res {
                stop.stop();
                return Err(RunError::Signal(e.into()));
            }
            if drained.load(Ordering::Acquire) {
                info!("Client refresh drained after shutdown signal");
                Ok(())
            } else {
                loop_outcome(&mut refresh).await
            }
        }
    }
}
