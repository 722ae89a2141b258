//! Chain handles for the two ends of a relay path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One end of a path as seen by the scheduler.
///
/// Handles are immutable once the loop starts; refreshing the client they
/// name is entirely the provider's business.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Chain identifier, used in diagnostics
    pub chain_id: String,
    /// Light client hosted on this chain that tracks the counterparty
    pub client_id: String,
    /// Name of the signing key used to submit updates
    pub key: String,
}

impl Chain {
    pub fn new(
        chain_id: impl Into<String>,
        client_id: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            client_id: client_id.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chain_id, self.client_id)
    }
}
