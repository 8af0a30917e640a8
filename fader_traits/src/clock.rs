use std::time::{Duration, Instant};

/// Time source for control steps, settle delays and gesture timing.
///
/// Everything that waits or timestamps goes through this trait so a seek or a
/// click sequence can be replayed against a simulated clock.
pub trait Clock {
    fn now(&self) -> Instant;
    /// Block the caller for `d` (a simulated clock just moves forward).
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock implementation backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Manually advanced clock. Clones share one timeline, so a test can hold
    /// a handle while the controller owns another.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        elapsed_us: Arc<AtomicU64>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                elapsed_us: Arc::new(AtomicU64::new(0)),
            }
        }

        pub fn advance(&self, d: Duration) {
            let us = u64::try_from(d.as_micros()).unwrap_or(u64::MAX);
            let _ = self
                .elapsed_us
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                    Some(v.saturating_add(us))
                });
        }

        pub fn advance_ms(&self, ms: u64) {
            self.advance(Duration::from_millis(ms));
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + Duration::from_micros(self.elapsed_us.load(Ordering::Acquire))
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sleep_advances_without_blocking() {
            let clock = TestClock::new();
            let t0 = clock.now();
            clock.sleep(Duration::from_millis(20));
            assert_eq!(clock.ms_since(t0), 20);
        }

        #[test]
        fn clones_share_time() {
            let a = TestClock::new();
            let b = a.clone();
            let t0 = a.now();
            b.advance_ms(750);
            assert_eq!(a.ms_since(t0), 750);
        }
    }
}
