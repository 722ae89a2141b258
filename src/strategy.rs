//! Relay strategies.
//!
//! The relayer only needs two things from a strategy: start it once for a
//! path, and get back a function that stops it. That stop function becomes
//! the shutdown cleanup.

use crate::chain::Chain;
use crate::error::StrategyError;
use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::process::Command;

pub const DEFAULT_MAX_MSGS: u64 = 5;
pub const DEFAULT_MAX_TX_SIZE: u64 = 2;

type StopFn = Box<dyn FnOnce() + Send + 'static>;

/// Idempotent handle on a running strategy's stop function.
///
/// Clones share the same function; whichever clone calls `stop` first runs it.
#[derive(Clone)]
pub struct StopHandle {
    stop: Arc<Mutex<Option<StopFn>>>,
}

impl StopHandle {
    pub fn new(stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            stop: Arc::new(Mutex::new(Some(Box::new(stop)))),
        }
    }

    /// Runs the stop function if it has not run yet. Returns whether it ran.
    pub fn stop(&self) -> bool {
        // take first so the function runs outside the lock
        let stop = self.stop.lock().take();
        match stop {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.lock().is_none()
    }
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Starts relaying between two chains.
pub trait RelayStrategy {
    fn start(&self, src: &Chain, dst: &Chain) -> Result<StopHandle, StrategyError>;
}

/// Strategy section of a path in the config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_msgs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tx_size: Option<u64>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            kind: NaiveStrategy::KIND.to_string(),
            max_msgs: None,
            max_tx_size: None,
        }
    }
}

/// Resolved limits for the naive strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NaiveOptions {
    /// Maximum messages per relay transaction
    pub max_msgs: u64,
    /// Maximum transaction size, in kilobytes
    pub max_tx_size: u64,
}

impl StrategyConfig {
    /// Resolves the options, letting command line values win over the file.
    pub fn with_overrides(
        &self,
        max_msgs: Option<u64>,
        max_tx_size: Option<u64>,
    ) -> Result<NaiveOptions, StrategyError> {
        if self.kind != NaiveStrategy::KIND {
            return Err(StrategyError::UnsupportedType(self.kind.clone()));
        }

        let options = NaiveOptions {
            max_msgs: max_msgs.or(self.max_msgs).unwrap_or(DEFAULT_MAX_MSGS),
            max_tx_size: max_tx_size.or(self.max_tx_size).unwrap_or(DEFAULT_MAX_TX_SIZE),
        };

        if options.max_msgs == 0 {
            return Err(StrategyError::InvalidOption { option: "max-msgs" });
        }
        if options.max_tx_size == 0 {
            return Err(StrategyError::InvalidOption {
                option: "max-tx-size",
            });
        }
        Ok(options)
    }
}

/// Relays by running the configured relay hook as a child process.
#[derive(Clone, Debug)]
pub struct NaiveStrategy {
    hook: Vec<String>,
    options: NaiveOptions,
}

impl NaiveStrategy {
    pub const KIND: &'static str = "naive";

    pub fn new(hook: Vec<String>, options: NaiveOptions) -> Result<Self, StrategyError> {
        if hook.is_empty() {
            return Err(StrategyError::EmptyCommand);
        }
        Ok(Self { hook, options })
    }

    fn command(&self, src: &Chain, dst: &Chain) -> Command {
        let mut cmd = Command::new(&self.hook[0]);
        cmd.args(&self.hook[1..])
            .arg("--max-msgs")
            .arg(self.options.max_msgs.to_string())
            .arg("--max-tx-size")
            .arg(self.options.max_tx_size.to_string())
            .arg(&src.chain_id)
            .arg(&dst.chain_id)
            .kill_on_drop(true);
        cmd
    }
}

impl RelayStrategy for NaiveStrategy {
    fn start(&self, src: &Chain, dst: &Chain) -> Result<StopHandle, StrategyError> {
        let mut child = self
            .command(src, dst)
            .spawn()
            .map_err(|source| StrategyError::Spawn {
                program: self.hook[0].clone(),
                source,
            })?;

        info!(
            "Started naive relay strategy between {} and {} (max-msgs {}, max-tx-size {}KB)",
            src.chain_id, dst.chain_id, self.options.max_msgs, self.options.max_tx_size
        );

        let path = format!("{} <-> {}", src.chain_id, dst.chain_id);
        Ok(StopHandle::new(move || {
            if let Err(e) = child.start_kill() {
                warn!("Failed to stop relay process for {}: {}", path, e);
            } else {
                info!("Stopped relay process for {}", path);
            }
        }))
    }
}
