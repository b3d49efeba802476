//! Clock implementations.

use std::sync::Mutex;

use gatekeeper_core::ports::Clock;

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// A clock that only moves when told to.
///
/// Lets tests exercise refill and window arithmetic without sleeping.
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Advance the clock by `secs`.
    pub fn advance(&self, secs: f64) {
        let mut now = self.now.lock().unwrap();
        *now += secs;
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, secs: f64) {
        let mut now = self.now.lock().unwrap();
        *now = secs;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(100.0);
        assert_eq!(clock.now(), 100.0);
        clock.advance(2.5);
        assert_eq!(clock.now(), 102.5);
        clock.set(50.0);
        assert_eq!(clock.now(), 50.0);
    }

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a > 1_600_000_000.0);
    }
}
