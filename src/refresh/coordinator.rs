//! Concurrent update of both clients on a path.

use super::invoker::{update_with_retry, RetryPolicy};
use crate::chain::Chain;
use crate::error::RefreshError;
use crate::provider::ClientProvider;
use crate::types::Expiry;
use std::time::Duration;

/// Updates the client on `src` (against `dst`) and the client on `dst`
/// (against `src`) concurrently.
///
/// Both updates always run to completion. If either fails the whole call
/// fails, with the `src` error taking precedence when both do; no partial
/// result is returned.
pub async fn update_clients<P>(
    provider: &P,
    src: &Chain,
    dst: &Chain,
    threshold: Duration,
    policy: RetryPolicy,
) -> Result<(Expiry, Expiry), RefreshError>
where
    P: ClientProvider + ?Sized,
{
    let (src_expiry, dst_expiry) = tokio::join!(
        update_with_retry(provider, src, dst, threshold, policy),
        update_with_retry(provider, dst, src, threshold, policy),
    );

    Ok((src_expiry?, dst_expiry?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Per-chain scripted responses; `None` means always fail.
    struct ScriptedProvider {
        expiries: HashMap<String, Option<Expiry>>,
        seen: Mutex<Vec<(String, String, Duration)>>,
    }

    impl ScriptedProvider {
        fn new(entries: &[(&str, Option<Expiry>)]) -> Self {
            Self {
                expiries: entries
                    .iter()
                    .map(|(id, e)| (id.to_string(), *e))
                    .collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ClientProvider for ScriptedProvider {
        async fn update_client(
            &self,
            chain: &Chain,
            counterparty: &Chain,
            threshold: Duration,
        ) -> Result<Expiry, ProviderError> {
            self.seen.lock().push((
                chain.chain_id.clone(),
                counterparty.chain_id.clone(),
                threshold,
            ));
            match self.expiries.get(&chain.chain_id).copied().flatten() {
                Some(expiry) => Ok(expiry),
                None => Err(format!("{} unreachable", chain.chain_id).into()),
            }
        }
    }

    fn path() -> (Chain, Chain) {
        (
            Chain::new("ibc-0", "07-tendermint-0", "alice"),
            Chain::new("ibc-1", "07-tendermint-1", "bob"),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_client_uses_other_as_counterparty() {
        let (src, dst) = path();
        let a = Expiry::Known(Duration::from_secs(30));
        let provider = ScriptedProvider::new(&[("ibc-0", Some(a)), ("ibc-1", Some(Expiry::Unknown))]);
        let threshold = Duration::from_secs(5);

        let result = update_clients(&provider, &src, &dst, threshold, RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(result, (a, Expiry::Unknown));

        let mut seen = provider.seen.lock().clone();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("ibc-0".to_string(), "ibc-1".to_string(), threshold),
                ("ibc-1".to_string(), "ibc-0".to_string(), threshold),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_fails_whole_update() {
        let (src, dst) = path();
        let provider = ScriptedProvider::new(&[
            ("ibc-0", Some(Expiry::Known(Duration::from_secs(30)))),
            ("ibc-1", None),
        ]);

        let err = update_clients(&provider, &src, &dst, Duration::ZERO, RetryPolicy::default())
            .await
            .unwrap_err();
        assert_eq!(err.chain_id(), "ibc-1");

        // the healthy side is still only called once, the failing side exhausts its retries
        let seen = provider.seen.lock();
        assert_eq!(seen.iter().filter(|(c, _, _)| c == "ibc-0").count(), 1);
        assert_eq!(seen.iter().filter(|(c, _, _)| c == "ibc-1").count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_failing_reports_an_error() {
        let (src, dst) = path();
        let provider = ScriptedProvider::new(&[("ibc-0", None), ("ibc-1", None)]);

        let err = update_clients(&provider, &src, &dst, Duration::ZERO, RetryPolicy::default())
            .await
            .unwrap_err();
        assert_eq!(err.chain_id(), "ibc-0");
    }
}
