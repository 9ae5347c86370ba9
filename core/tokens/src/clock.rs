//! Source of the current time for token expiry.
use time::OffsetDateTime;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current time, in UTC.
    fn now(&self) -> OffsetDateTime;
}

/// Read the time from the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::ManualClock;

#[cfg(any(test, feature = "test-fixture"))]
mod fixture {
    use std::sync::Arc;
    use std::sync::Mutex;

    use time::Duration;
    use time::OffsetDateTime;

    /// A [`Clock`](super::Clock) that only moves when told to.
    #[derive(Clone, Debug)]
    pub struct ManualClock {
        now: Arc<Mutex<OffsetDateTime>>,
    }

    impl ManualClock {
        pub fn new(now: OffsetDateTime) -> Self {
            let now = Arc::new(Mutex::new(now));
            ManualClock { now }
        }

        /// Move the clock forward by the given amount.
        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().expect("ManualClock::now lock poisoned");
            *now += by;
        }
    }

    impl super::Clock for ManualClock {
        fn now(&self) -> OffsetDateTime {
            *self.now.lock().expect("ManualClock::now lock poisoned")
        }
    }
}
