//! Timestamp sources for message lifecycle stamping.
//!
//! # Responsibility
//! - Provide nanosecond timestamps for `created_at` / `updated_at`.
//! - Allow deterministic clocks for tests and replay callers.
//!
//! # Invariants
//! - `SystemClock` never hands out the same value twice and never goes
//!   backwards within one instance.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of nanosecond timestamps since the Unix epoch.
pub trait Clock {
    fn now_nanos(&self) -> u64;
}

/// Wall clock made strictly increasing per instance.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_issued: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_nanos(&self) -> u64 {
        let wall = wall_clock_nanos();
        let mut previous = self.last_issued.load(Ordering::Relaxed);
        loop {
            let next = wall.max(previous.saturating_add(1));
            match self.last_issued.compare_exchange_weak(
                previous,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => previous = actual,
            }
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_nanos(&self) -> u64 {
        (**self).now_nanos()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_nanos: u64) -> Self {
        Self {
            now: Cell::new(start_nanos),
        }
    }

    pub fn set(&self, nanos: u64) {
        self.now.set(nanos);
    }

    pub fn advance(&self, delta_nanos: u64) {
        self.now.set(self.now.get().saturating_add(delta_nanos));
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        self.now.get()
    }
}

fn wall_clock_nanos() -> u64 {
    // Pre-epoch system time collapses to 0; monotonic bump still applies.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, SystemClock};

    #[test]
    fn system_clock_is_strictly_increasing() {
        let clock = SystemClock::new();
        let mut previous = clock.now_nanos();
        for _ in 0..1_000 {
            let next = clock.now_nanos();
            assert!(next > previous, "{next} should be after {previous}");
            previous = next;
        }
    }

    #[test]
    fn system_clock_tracks_wall_time() {
        // 2020-01-01T00:00:00Z in nanoseconds.
        assert!(SystemClock::new().now_nanos() > 1_577_836_800_000_000_000);
    }

    #[test]
    fn manual_clock_moves_only_on_request() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.now_nanos(), 10);
        assert_eq!(clock.now_nanos(), 10);
        clock.advance(5);
        assert_eq!(clock.now_nanos(), 15);
        clock.set(3);
        assert_eq!(clock.now_nanos(), 3);
    }
}
