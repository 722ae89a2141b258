//! Derivation of the next sleep interval from two client expiries.

use crate::chain::Chain;
use crate::error::SchedulerError;
use crate::types::{Expiry, SleepInterval};
use std::time::Duration;

/// Picks the moment `threshold` before the soonest known expiry.
///
/// With only one known expiry that one governs. With none the path cannot
/// be kept alive and `BothExpired` is returned. The result may be overdue;
/// it is never clamped here.
pub fn compute_sleep(
    src: &Chain,
    src_expiry: Expiry,
    dst: &Chain,
    dst_expiry: Expiry,
    threshold: Duration,
) -> Result<SleepInterval, SchedulerError> {
    let horizon = match (src_expiry.known(), dst_expiry.known()) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => {
            return Err(SchedulerError::BothExpired {
                src: src.chain_id.clone(),
                dst: dst.chain_id.clone(),
            })
        }
    };

    Ok(SleepInterval::until(horizon, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn known(v: u64) -> Expiry {
        Expiry::Known(ms(v))
    }

    fn sleep(a: Expiry, b: Expiry, t: u64) -> Result<SleepInterval, SchedulerError> {
        let src = Chain::new("ibc-0", "07-tendermint-0", "alice");
        let dst = Chain::new("ibc-1", "07-tendermint-1", "bob");
        compute_sleep(&src, a, &dst, b, ms(t))
    }

    #[test]
    fn test_both_known_uses_minimum() {
        let cases = [(3000, 5000, 500, 2500), (5000, 3000, 500, 2500), (7000, 7000, 1000, 6000)];
        for (a, b, t, expected) in cases {
            assert_eq!(
                sleep(known(a), known(b), t).unwrap(),
                SleepInterval::Wait(ms(expected)),
                "a={a} b={b} t={t}"
            );
        }
    }

    #[test]
    fn test_single_known_side_governs() {
        assert_eq!(
            sleep(known(4000), Expiry::Unknown, 1000).unwrap(),
            SleepInterval::Wait(ms(3000))
        );
        assert_eq!(
            sleep(Expiry::Unknown, known(10_000), 1000).unwrap(),
            SleepInterval::Wait(ms(9000))
        );
    }

    #[test]
    fn test_neither_known_names_both_chains() {
        let err = sleep(Expiry::Unknown, Expiry::Unknown, 1000).unwrap_err();
        match &err {
            SchedulerError::BothExpired { src, dst } => {
                assert_eq!(src, "ibc-0");
                assert_eq!(dst, "ibc-1");
            }
            other => panic!("unexpected error: {other}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("ibc-0") && msg.contains("ibc-1"));
    }

    #[test]
    fn test_within_threshold_is_overdue_not_error() {
        assert_eq!(
            sleep(known(800), known(9000), 1000).unwrap(),
            SleepInterval::Overdue(ms(200))
        );
        assert_eq!(
            sleep(known(1000), Expiry::Unknown, 1000).unwrap(),
            SleepInterval::Overdue(Duration::ZERO)
        );
    }

    #[test]
    fn test_is_pure() {
        let first = sleep(known(12_345), known(67_890), 345).unwrap();
        let second = sleep(known(12_345), known(67_890), 345).unwrap();
        assert_eq!(first, second);
    }
}
