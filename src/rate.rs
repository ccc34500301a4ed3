//! Frames-per-second counter over a fixed window

use std::time::{Duration, Instant};

use crate::constants::RATE_WINDOW;

/// Counts events and yields the count once per window
#[derive(Debug, Clone)]
pub struct RateCounter {
    window: Duration,
    started: Instant,
    count: u32,
}

impl RateCounter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now(), RATE_WINDOW)
    }

    pub fn starting_at(started: Instant, window: Duration) -> Self {
        Self {
            window,
            started,
            count: 0,
        }
    }

    /// Count one event
    pub fn record(&mut self) {
        self.count += 1;
    }

    /// If the window has elapsed at `now`, return its count and start a new one
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        if now.saturating_duration_since(self.started) < self.window {
            return None;
        }
        let count = self.count;
        self.count = 0;
        self.started = now;
        Some(count)
    }
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_before_window_ends() {
        let start = Instant::now();
        let mut counter = RateCounter::starting_at(start, Duration::from_secs(1));
        counter.record();
        assert_eq!(counter.poll(start + Duration::from_millis(999)), None);
    }

    #[test]
    fn reports_and_resets_each_window() {
        let start = Instant::now();
        let mut counter = RateCounter::starting_at(start, Duration::from_secs(1));
        for _ in 0..30 {
            counter.record();
        }
        let first = start + Duration::from_secs(1);
        assert_eq!(counter.poll(first), Some(30));

        counter.record();
        assert_eq!(counter.poll(first + Duration::from_millis(500)), None);
        assert_eq!(counter.poll(first + Duration::from_secs(1)), Some(1));
    }

    #[test]
    fn idle_window_reports_zero() {
        let start = Instant::now();
        let mut counter = RateCounter::starting_at(start, Duration::from_secs(1));
        assert_eq!(counter.poll(start + Duration::from_secs(2)), Some(0));
    }
}
