//! Provider backed by an external hook command.
//!
//! The hook is invoked as
//! `<hook...> <chain-id> <client-id> <counterparty-chain-id> <counterparty-client-id> <threshold-ms>`
//! and must print the client's remaining validity in signed milliseconds on
//! stdout. Zero or negative means the expiry is unknown.

use super::ClientProvider;
use crate::chain::Chain;
use crate::error::ProviderError;
use crate::types::Expiry;
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to run update hook {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("update hook exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("update hook printed {output:?}, expected signed milliseconds")]
    BadOutput { output: String },
}

/// Runs a configured command for every update attempt.
#[derive(Clone, Debug)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    /// Returns `None` for an empty command line.
    pub fn new(hook: &[String]) -> Option<Self> {
        let (program, args) = hook.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn command(&self, chain: &Chain, counterparty: &Chain, threshold: Duration) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(&chain.chain_id)
            .arg(&chain.client_id)
            .arg(&counterparty.chain_id)
            .arg(&counterparty.client_id)
            .arg(threshold.as_millis().to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

/// Parses hook stdout into an expiry.
pub fn parse_hook_output(stdout: &str) -> Result<Expiry, HookError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<i64>()
        .map(Expiry::from_signed_millis)
        .map_err(|_| HookError::BadOutput {
            output: trimmed.to_string(),
        })
}

#[async_trait]
impl ClientProvider for CommandProvider {
    async fn update_client(
        &self,
        chain: &Chain,
        counterparty: &Chain,
        threshold: Duration,
    ) -> Result<Expiry, ProviderError> {
        debug!("Running update hook for client {} (counterparty {})", chain, counterparty);

        let output = self
            .command(chain, counterparty, threshold)
            .output()
            .await
            .map_err(|source| HookError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(HookError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(parse_hook_output(&String::from_utf8_lossy(&output.stdout))?)
    }
}
