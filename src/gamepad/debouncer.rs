//! # Pin Debouncer
//!
//! Suppresses contact bounce on every monitored pin.
//!
//! A level change is accepted only after the new level has been observed
//! continuously for at least the debounce interval. Until then the previously
//! accepted level is reported. Each pin has its own timer.
//!
//! ```text
//! raw      ‾‾|_|‾|___________________
//! stable   ‾‾‾‾‾‾‾‾‾‾‾‾|_____________
//!                 ^    ^
//!                 |    accepted after `interval_ms` of stable low
//!                 last change seen
//! ```
//!
//! ## Usage
//!
//! ```
//! use gamepad_core::gamepad::debouncer::Debouncer;
//!
//! let mut debouncer = Debouncer::new(5);
//!
//! // Pin 0 pressed at t=100ms: not yet accepted
//! assert_eq!(debouncer.debounce(0b1, 100), 0);
//! // Still held at t=105ms: accepted
//! assert_eq!(debouncer.debounce(0b1, 105), 0b1);
//! ```

/// Default debounce interval in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u32 = 5;

/// Number of independently debounced slots (one per GPIO bit).
pub const DEBOUNCE_SLOTS: usize = 32;

#[derive(Debug, Clone, Copy, Default)]
struct DebounceState {
    /// Last accepted level.
    stable: bool,
    /// Last observed raw level.
    observed: bool,
    /// Time the observed level last changed.
    last_change_ms: u32,
}

/// Per-pin time-window debouncer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval_ms: u32,
    inputs: [DebounceState; DEBOUNCE_SLOTS],
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    /// Creates a debouncer with every input released.
    ///
    /// An interval of 0 passes levels straight through.
    #[must_use]
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            inputs: [DebounceState::default(); DEBOUNCE_SLOTS],
        }
    }

    #[must_use]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Feeds one raw level and returns the stable level.
    ///
    /// Indices outside the slot range always report released.
    pub fn update(&mut self, index: usize, pressed: bool, now_ms: u32) -> bool {
        let Some(state) = self.inputs.get_mut(index) else {
            return false;
        };

        if pressed != state.observed {
            state.observed = pressed;
            state.last_change_ms = now_ms;
        }

        if state.stable != state.observed
            && now_ms.wrapping_sub(state.last_change_ms) >= self.interval_ms
        {
            state.stable = state.observed;
        }

        state.stable
    }

    /// Debounces a whole pressed-pin mask and returns the stable mask.
    pub fn debounce(&mut self, pressed_mask: u32, now_ms: u32) -> u32 {
        let mut stable = 0u32;
        for index in 0..DEBOUNCE_SLOTS {
            if self.update(index, pressed_mask & (1 << index) != 0, now_ms) {
                stable |= 1 << index;
            }
        }
        stable
    }

    /// Releases every input and clears all timers.
    pub fn reset(&mut self) {
        self.inputs = [DebounceState::default(); DEBOUNCE_SLOTS];
    }
}
