//! # Client Updater
//!
//! Keeps the two light clients of a relayer path from expiring.
//!
//! Every cycle both clients are updated concurrently, each reporting how long
//! it remains valid; the scheduler then sleeps until `threshold` before the
//! soonest known expiry and starts over. A shutdown trap turns SIGINT/SIGTERM
//! into a single cleanup call that stops the relay strategy.

pub mod chain;
pub mod config;
pub mod error;
pub mod provider;
pub mod refresh;
pub mod runner;
pub mod shutdown;
pub mod strategy;
pub mod types;

pub use chain::Chain;
pub use config::Config;
pub use error::{
    ConfigError, ProviderError, RefreshError, RunError, SchedulerError, StrategyError,
};
pub use provider::{ClientProvider, CommandProvider};
pub use refresh::{
    compute_sleep, update_clients, update_with_retry, CycleReport, LoopState, RefreshScheduler,
    RefreshService, RetryPolicy, SchedulerConfig,
};
pub use runner::run_until_signal;
pub use shutdown::{trap, trap_signal, Signal};
pub use strategy::{NaiveStrategy, RelayStrategy, StopHandle, StrategyConfig};
pub use types::{Expiry, SleepInterval};
