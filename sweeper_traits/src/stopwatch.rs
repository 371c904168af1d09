//! Pausable elapsed-time measurement on top of any [`Clock`].

use std::time::{Duration, Instant};

use crate::clock::Clock;

/// Stopwatch whose elapsed time excludes paused intervals.
#[derive(Debug, Clone)]
pub struct Stopwatch<C: Clock> {
    clock: C,
    // Start of the current running segment; None while paused.
    running_since: Option<Instant>,
    banked: Duration,
}

impl<C: Clock> Stopwatch<C> {
    /// Create a running stopwatch at zero.
    pub fn new(clock: C) -> Self {
        let now = clock.now();
        Self {
            clock,
            running_since: Some(now),
            banked: Duration::ZERO,
        }
    }

    /// Zero the elapsed time and start running.
    pub fn reset(&mut self) {
        self.banked = Duration::ZERO;
        self.running_since = Some(self.clock.now());
    }

    /// Stop accumulating time. No-op when already paused.
    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked = self
                .banked
                .saturating_add(self.clock.now().saturating_duration_since(since));
        }
    }

    /// Continue accumulating time. No-op when already running.
    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(self.clock.now());
        }
    }

    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self
                .banked
                .saturating_add(self.clock.now().saturating_duration_since(since)),
            None => self.banked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn paused_time_is_not_counted() {
        let clock = ManualClock::new();
        let mut sw = Stopwatch::new(clock.clone());
        clock.advance(ms(100));
        sw.pause();
        clock.advance(ms(1_000));
        assert_eq!(sw.elapsed(), ms(100));
        sw.resume();
        clock.advance(ms(50));
        assert_eq!(sw.elapsed(), ms(150));
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let clock = ManualClock::new();
        let mut sw = Stopwatch::new(clock.clone());
        clock.advance(ms(10));
        sw.pause();
        sw.pause();
        clock.advance(ms(10));
        sw.resume();
        sw.resume();
        clock.advance(ms(10));
        assert_eq!(sw.elapsed(), ms(20));
        assert!(!sw.is_paused());
    }

    #[test]
    fn reset_zeroes_and_runs() {
        let clock = ManualClock::new();
        let mut sw = Stopwatch::new(clock.clone());
        clock.advance(ms(300));
        sw.pause();
        sw.reset();
        assert!(!sw.is_paused());
        assert_eq!(sw.elapsed(), Duration::ZERO);
        clock.advance(ms(7));
        assert_eq!(sw.elapsed(), ms(7));
    }
}
