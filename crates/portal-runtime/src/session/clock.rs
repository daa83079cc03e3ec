//! Wall-clock source.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of the current time.
///
/// Injected into the session manager so idle deadlines can be tested
/// without real time passing.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Adds a std duration to a timestamp, saturating at the maximum.
pub(crate) fn add(at: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Returns `later - earlier`, or zero when `later` is not after `earlier`.
pub(crate) fn until(earlier: DateTime<Utc>, later: DateTime<Utc>) -> Duration {
    (later - earlier).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }

    #[test]
    fn add_saturates() {
        let max = DateTime::<Utc>::MAX_UTC;
        assert_eq!(add(max, Duration::from_secs(1)), max);
    }

    #[test]
    fn until_never_negative() {
        let now = Utc::now();
        let later = add(now, Duration::from_millis(1500));
        assert_eq!(until(now, later), Duration::from_millis(1500));
        assert_eq!(until(later, now), Duration::ZERO);
    }
}
