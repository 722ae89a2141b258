//! Client providers - the only thing that knows how to refresh a light client.
//!
//! The scheduler treats a provider as an opaque `update_client` call that
//! refreshes the client hosted on `chain` (tracking `counterparty`) when it is
//! within `threshold` of lapsing, and reports how long it remains valid.

pub mod command;

pub use command::{CommandProvider, HookError};

use crate::chain::Chain;
use crate::error::ProviderError;
use crate::types::Expiry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Refreshes the client on `chain` if needed and reports its remaining validity.
    ///
    /// Each call may submit an update transaction. Retrying a failed call is
    /// assumed to be safe.
    async fn update_client(
        &self,
        chain: &Chain,
        counterparty: &Chain,
        threshold: Duration,
    ) -> Result<Expiry, ProviderError>;
}

#[async_trait]
impl<P: ClientProvider + ?Sized> ClientProvider for Arc<P> {
    async fn update_client(
        &self,
        chain: &Chain,
        counterparty: &Chain,
        threshold: Duration,
    ) -> Result<Expiry, ProviderError> {
        (**self).update_client(chain, counterparty, threshold).await
    }
}
