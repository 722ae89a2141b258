//! Single-client update with bounded, fixed-delay retry.

use crate::chain::Chain;
use crate::error::{ProviderError, RefreshError};
use crate::provider::ClientProvider;
use crate::types::Expiry;
use log::{debug, warn};
use std::time::Duration;

/// Retry policy applied to every provider call.
///
/// The delay between attempts is fixed; it does not grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// Updates the client on `chain` against `counterparty`, retrying per `policy`.
///
/// Intermediate failures are logged and dropped; only the last one is
/// returned once the attempts run out.
pub async fn update_with_retry<P>(
    provider: &P,
    chain: &Chain,
    counterparty: &Chain,
    threshold: Duration,
    policy: RetryPolicy,
) -> Result<Expiry, RefreshError>
where
    P: ClientProvider + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut last_err: Option<ProviderError> = None;

    for attempt in 1..=attempts {
        match provider.update_client(chain, counterparty, threshold).await {
            Ok(expiry) => {
                debug!(
                    "Client {} reports remaining validity {} (attempt {})",
                    chain, expiry, attempt
                );
                return Ok(expiry);
            }
            Err(e) => {
                warn!(
                    "Update of client {} failed (attempt {}/{}): {}",
                    chain, attempt, attempts, e
                );
                last_err = Some(e);
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Err(RefreshError::RefreshFailed {
        chain_id: chain.chain_id.clone(),
        attempts,
        source: last_err.unwrap_or_else(|| "no attempt was made".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    /// Fails the first `failures` calls, then reports `expiry`.
    struct FlakyProvider {
        failures: usize,
        expiry: Expiry,
        calls: Mutex<Vec<Instant>>,
    }

    impl FlakyProvider {
        fn new(failures: usize, expiry: Expiry) -> Self {
            Self {
                failures,
                expiry,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ClientProvider for FlakyProvider {
        async fn update_client(
            &self,
            _chain: &Chain,
            _counterparty: &Chain,
            _threshold: Duration,
        ) -> Result<Expiry, ProviderError> {
            let mut calls = self.calls.lock();
            calls.push(Instant::now());
            if calls.len() <= self.failures {
                Err(format!("transient failure #{}", calls.len()).into())
            } else {
                Ok(self.expiry)
            }
        }
    }

    fn chains() -> (Chain, Chain) {
        (
            Chain::new("ibc-0", "07-tendermint-0", "alice"),
            Chain::new("ibc-1", "07-tendermint-0", "bob"),
        )
    }

    fn gaps(calls: &[Instant]) -> Vec<Duration> {
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_fifth_attempt() {
        let (src, dst) = chains();
        let expiry = Expiry::Known(Duration::from_secs(60));
        let provider = FlakyProvider::new(4, expiry);

        let result = update_with_retry(
            &provider,
            &src,
            &dst,
            Duration::from_secs(1),
            RetryPolicy::default(),
        )
        .await;

        assert_eq!(result.unwrap(), expiry);
        let calls = provider.calls.lock();
        assert_eq!(calls.len(), 5);
        assert!(gaps(&calls)
            .iter()
            .all(|gap| *gap == Duration::from_millis(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_after_five_attempts_with_last_error() {
        let (src, dst) = chains();
        let provider = FlakyProvider::new(usize::MAX, Expiry::Unknown);

        let err = update_with_retry(
            &provider,
            &src,
            &dst,
            Duration::from_secs(1),
            RetryPolicy::default(),
        )
        .await
        .unwrap_err();

        assert_eq!(provider.calls.lock().len(), 5);
        assert_eq!(err.chain_id(), "ibc-0");
        let RefreshError::RefreshFailed {
            attempts, source, ..
        } = err;
        assert_eq!(attempts, 5);
        assert_eq!(source.to_string(), "transient failure #5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_success() {
        let (src, dst) = chains();
        let provider = FlakyProvider::new(0, Expiry::Unknown);
        let start = Instant::now();

        update_with_retry(&provider, &src, &dst, Duration::ZERO, RetryPolicy::default())
            .await
            .unwrap();

        assert_eq!(provider.calls.lock().len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
