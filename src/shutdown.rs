//! Shutdown trap - turns the first SIGINT/SIGTERM into a single cleanup call.
//!
//! One task owns the signal subscription for the life of the process. Nothing
//! else polls for shutdown: the trap waits, runs its cleanup once and returns,
//! after which the owner lets the process exit.

use log::info;
use std::fmt;
use std::future::Future;

/// Termination-class signals the trap reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => write!(f, "SIGINT"),
            Signal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Waits for the next SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<Signal> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| Signal::Interrupt),
        _ = sigterm.recv() => Ok(Signal::Terminate),
    }
}

#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<Signal> {
    tokio::signal::ctrl_c().await.map(|_| Signal::Interrupt)
}

/// Blocks until the process receives SIGINT or SIGTERM, then runs `cleanup`.
pub async fn trap_signal<C>(cleanup: C) -> std::io::Result<Signal>
where
    C: FnOnce(),
{
    trap(wait_for_signal(), cleanup).await
}

/// Waits on an arbitrary signal source, then runs `cleanup` exactly once.
///
/// If the source fails, `cleanup` is not run and the error is returned.
pub async fn trap<S, C, E>(signal: S, cleanup: C) -> Result<Signal, E>
where
    S: Future<Output = Result<Signal, E>>,
    C: FnOnce(),
{
    let sig = signal.await?;

    println!("Signal Received {}", sig);
    info!("Received {}, running cleanup", sig);

    cleanup();
    Ok(sig)
}
