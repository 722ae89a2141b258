//! Error types for the refresh pipeline and its setup.

use std::path::PathBuf;
use thiserror::Error;

/// Error raised by a client provider for a single update attempt.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A client could not be refreshed within the retry budget.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to update client on {chain_id} after {attempts} attempts: {source}")]
    RefreshFailed {
        chain_id: String,
        attempts: u32,
        #[source]
        source: ProviderError,
    },
}

impl RefreshError {
    pub fn chain_id(&self) -> &str {
        match self {
            RefreshError::RefreshFailed { chain_id, .. } => chain_id,
        }
    }
}

/// Fatal errors that terminate the scheduling loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("seems clients of both src:{src} and dst:{dst} are expired")]
    BothExpired { src: String, dst: String },
}

/// Errors raised while loading configuration or resolving a path.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("path {0} not found in config")]
    UnknownPath(String),

    #[error("chain {chain_id} referenced by path {path} not found in config")]
    UnknownChain { path: String, chain_id: String },

    #[error("key {key} not found for chain {chain_id}, expected at {expected}")]
    MissingKey {
        chain_id: String,
        key: String,
        expected: PathBuf,
    },

    #[error("no {0} hook configured")]
    MissingHook(&'static str),
}

/// Errors raised while constructing or starting a relay strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("unsupported strategy type {0}")]
    UnsupportedType(String),

    #[error("invalid strategy option {option}: must be greater than zero")]
    InvalidOption { option: &'static str },

    #[error("failed to start relay process {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("empty relay hook command")]
    EmptyCommand,
}

/// Errors that end a supervised run of the scheduler.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("client refresh task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
