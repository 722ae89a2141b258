//! Core value types shared by the refresh pipeline.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Remaining validity of a light client as reported by a provider.
///
/// A client that does not expire and a client whose status could not be
/// determined are both `Unknown`: neither gives the scheduler a horizon to
/// plan against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// The client lapses after this much time.
    Known(Duration),
    /// No actionable expiry horizon.
    Unknown,
}

impl Expiry {
    /// Converts the signed-milliseconds convention used by provider hooks,
    /// where any non-positive value means "no actionable expiry".
    pub fn from_signed_millis(ms: i64) -> Self {
        if ms > 0 {
            Expiry::Known(Duration::from_millis(ms as u64))
        } else {
            Expiry::Unknown
        }
    }

    #[inline]
    pub fn known(&self) -> Option<Duration> {
        match self {
            Expiry::Known(d) => Some(*d),
            Expiry::Unknown => None,
        }
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Known(d) => write!(f, "{}", humantime::format_duration(*d)),
            Expiry::Unknown => write!(f, "unknown"),
        }
    }
}

/// Time to wait before the next refresh cycle.
///
/// The target moment may already lie in the past when an expiry is within
/// the threshold; that case is kept as `Overdue` instead of being clamped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepInterval {
    /// Sleep this long (always non-zero).
    Wait(Duration),
    /// Target moment passed this long ago (zero when exactly now).
    Overdue(Duration),
}

impl SleepInterval {
    /// `horizon - threshold`, preserving the sign.
    pub fn until(horizon: Duration, threshold: Duration) -> Self {
        match horizon.checked_sub(threshold) {
            Some(d) if !d.is_zero() => SleepInterval::Wait(d),
            Some(_) => SleepInterval::Overdue(Duration::ZERO),
            None => SleepInterval::Overdue(threshold - horizon),
        }
    }

    /// Duration to actually block for; overdue intervals never block.
    pub fn as_sleep(&self) -> Duration {
        match self {
            SleepInterval::Wait(d) => *d,
            SleepInterval::Overdue(_) => Duration::ZERO,
        }
    }

    pub fn is_overdue(&self) -> bool {
        matches!(self, SleepInterval::Overdue(_))
    }
}

impl fmt::Display for SleepInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SleepInterval::Wait(d) => write!(f, "{}", humantime::format_duration(*d)),
            SleepInterval::Overdue(d) => {
                write!(f, "overdue by {}", humantime::format_duration(*d))
            }
        }
    }
}
