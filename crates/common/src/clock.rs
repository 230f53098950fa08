//! Time sources for the engine
//!
//! Every action reads "now" from a [`Clock`] so that voting windows and
//! period boundaries can be driven deterministically in tests.

use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Duration, Utc};

use crate::types::TimePoint;

/// Source of the current time
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> TimePoint;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimePoint {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: TimePoint,
    offset_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start: TimePoint) -> Self {
        Self {
            base: start,
            offset_ms: AtomicI64::new(0),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, at: TimePoint) {
        self.offset_ms
            .store((at - self.base).num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimePoint {
        self.base + Duration::milliseconds(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Clock anchored to the tokio runtime's notion of time
///
/// Under a paused runtime (`#[tokio::test(start_paused = true)]`) time only
/// advances through `tokio::time::sleep`/`advance`, which lets retry backoff
/// move the engine's clock without real waiting.
#[derive(Debug)]
pub struct TokioClock {
    base: TimePoint,
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new(start: TimePoint) -> Self {
        Self {
            base: start,
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> TimePoint {
        let elapsed = Duration::from_std(self.origin.elapsed()).unwrap_or_else(|_| Duration::zero());
        self.base + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> TimePoint {
        Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(start());
        assert_eq!(clock.now(), start());

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start() + Duration::seconds(90));

        clock.set(start() + Duration::hours(1));
        assert_eq!(clock.now(), start() + Duration::hours(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::new(start());
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert_eq!(clock.now(), start() + Duration::seconds(30));
    }
}
