#![forbid(unsafe_code)]

//! Wall-clock sources used to mint field and response identifiers.

use core::time::Duration;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;
}

/// System clock backed by `web-time`, which maps to `Date.now()` on wasm32.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|d| d.as_millis().min(u128::from(u64::MAX)) as u64)
            .unwrap_or(0)
    }
}

/// Clock controlled by the host or a test.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    /// Create a clock starting at the given epoch offset in milliseconds.
    #[must_use]
    pub const fn at_millis(ms: u64) -> Self {
        Self {
            now: Duration::from_millis(ms),
        }
    }

    /// Set the current time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance the current time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.as_millis().min(u128::from(u64::MAX)) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let mut clock = ManualClock::at_millis(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now_millis(), 1_250);
        clock.set(Duration::from_secs(2));
        assert_eq!(clock.now_millis(), 2_000);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
