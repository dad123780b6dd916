//! # Clock Source and Poll Cadence
//!
//! The core never reads a global clock. A [`Clock`] is injected at
//! construction so tests and the simulator can control elapsed time.
//!
//! - milliseconds drive debouncing
//! - microseconds drive the fixed polling cadence

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Full processing period in milliseconds.
pub const GAMEPAD_POLL_MS: u32 = 1;

/// Granularity, in microseconds, at which the caller is expected to check the cadence.
pub const GAMEPAD_POLL_MICRO: u64 = 100;

/// Monotonic time since boot.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Milliseconds since boot. Wraps after about 49 days.
    fn millis(&self) -> u32;

    /// Microseconds since boot.
    fn micros(&self) -> u64;
}

/// Host clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Starts counting from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn millis(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// Manually advanced clock. Clones share the same time.
///
/// # Examples
///
/// ```
/// use gamepad_core::gamepad::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance_ms(3);
/// assert_eq!(clock.millis(), 3);
/// assert_eq!(clock.micros(), 3_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1_000);
    }

    pub fn advance_us(&self, us: u64) {
        self.micros.fetch_add(us, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn millis(&self) -> u32 {
        (self.micros() / 1_000) as u32
    }

    fn micros(&self) -> u64 {
        self.micros.load(Ordering::SeqCst)
    }
}

/// Decides when the next full polling cycle is due.
#[derive(Debug, Clone)]
pub struct PollTimer {
    period_us: u64,
    next_run_us: u64,
}

impl Default for PollTimer {
    fn default() -> Self {
        Self::new(u64::from(GAMEPAD_POLL_MS) * 1_000)
    }
}

impl PollTimer {
    /// Creates a timer that is due immediately.
    #[must_use]
    pub fn new(period_us: u64) -> Self {
        Self {
            period_us,
            next_run_us: 0,
        }
    }

    /// Returns true and schedules the next run when a cycle is due.
    pub fn ready(&mut self, now_us: u64) -> bool {
        if now_us < self.next_run_us {
            return false;
        }
        self.next_run_us = now_us + self.period_us;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_constants() {
        assert_eq!(GAMEPAD_POLL_MS, 1);
        assert_eq!(GAMEPAD_POLL_MICRO, 100);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        assert_eq!(clock.millis(), 0);
        clock.advance_us(1_500);
        assert_eq!(clock.millis(), 1);
        assert_eq!(clock.micros(), 1_500);
        clock.advance_ms(9);
        assert_eq!(clock.millis(), 10);
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock::new();
        let a = clock.micros();
        let b = clock.micros();
        assert!(b >= a);
    }

    #[test]
    fn test_poll_timer_cadence() {
        let mut timer = PollTimer::default();
        assert!(timer.ready(0));

        // Checked every 100us, runs once per millisecond
        let runs = (1..=10)
            .map(|step| step * GAMEPAD_POLL_MICRO)
            .filter(|&now| timer.ready(now))
            .count();
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_poll_timer_late_check_runs_once() {
        let mut timer = PollTimer::new(1_000);
        assert!(timer.ready(0));
        assert!(timer.ready(5_000));
        assert!(!timer.ready(5_500));
        assert!(timer.ready(6_000));
    }
}
