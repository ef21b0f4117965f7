//! Wall-clock abstraction for lifecycle derivations.
//!
//! # Responsibility
//! - Provide `now` in epoch milliseconds to transitions and derivations.
//! - Allow tests to drive a simulated clock.
//!
//! # Invariants
//! - All timestamps handled by core are epoch milliseconds (`i64`).

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Source of the current time.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Clock backed by the operating system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        epoch_ms_now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_ms(days * DAY_MS);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Returns current system time in epoch milliseconds.
///
/// Times before the unix epoch clamp to `0`.
pub fn epoch_ms_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, DAY_MS};

    #[test]
    fn manual_clock_advances_by_days() {
        let clock = ManualClock::new(1_000);
        clock.advance_days(2);
        assert_eq!(clock.now_ms(), 1_000 + 2 * DAY_MS);

        clock.set(5);
        assert_eq!(clock.now_ms(), 5);
    }
}
