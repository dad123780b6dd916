//! # SOCD Resolution
//!
//! Resolves Simultaneous Opposing Cardinal Directions: Up+Down or Left+Right
//! held at the same time.
//!
//! ## Policies
//!
//! | Mode | Up+Down | Left+Right |
//! |------|---------|------------|
//! | `Neutral` | neither | neither |
//! | `UpPriority` | Up | neither |
//! | `SecondInputPriority` | most recent press | most recent press |
//! | `Bypass` | both | both |
//!
//! Second-input priority needs press history, which lives in
//! [`SocdResolver`]. Each direction records the cycle number at which its
//! current press started; on conflict the higher number wins. Presses that
//! started in the same cycle tie and resolve to neutral.
//!
//! Bypass is never used for hat-switch protocols: [`resolve_socd_mode`]
//! coerces it to `Neutral` when the input mode is HID, Switch or PS4.
//!
//! ## Usage
//!
//! ```
//! use gamepad_core::gamepad::socd::{resolve_socd, SocdMode};
//! use gamepad_core::gamepad::state::{GAMEPAD_MASK_UP, GAMEPAD_MASK_DOWN};
//!
//! let both = GAMEPAD_MASK_UP | GAMEPAD_MASK_DOWN;
//! assert_eq!(resolve_socd(both, SocdMode::Neutral), 0);
//! assert_eq!(resolve_socd(both, SocdMode::UpPriority), GAMEPAD_MASK_UP);
//! assert_eq!(resolve_socd(both, SocdMode::Bypass), both);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

use super::options::GamepadOptions;
use super::state::*;

/// SOCD cleaning policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocdMode {
    UpPriority,
    #[default]
    Neutral,
    SecondInputPriority,
    Bypass,
}

/// One pair of opposing inputs.
///
/// `T` is the mask width: `u8` for d-pad pairs, `u16` for button pairs.
/// `priority` names the side that wins under [`SocdMode::UpPriority`]; an
/// axis without a priority side resolves to neutral under that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocdAxis<T = u8> {
    pub negative: T,
    pub positive: T,
    pub priority: Option<T>,
}

impl<T: Copy + BitOr<Output = T>> SocdAxis<T> {
    /// Both bits of the pair.
    #[must_use]
    pub fn mask(&self) -> T {
        self.negative | self.positive
    }
}

/// The vertical d-pad pair. Up is the priority side.
pub const VERTICAL_AXIS: SocdAxis = SocdAxis {
    negative: GAMEPAD_MASK_UP,
    positive: GAMEPAD_MASK_DOWN,
    priority: Some(GAMEPAD_MASK_UP),
};

/// The horizontal d-pad pair.
pub const HORIZONTAL_AXIS: SocdAxis = SocdAxis {
    negative: GAMEPAD_MASK_LEFT,
    positive: GAMEPAD_MASK_RIGHT,
    priority: None,
};

/// Returns the SOCD mode to apply for the given options.
///
/// Bypass is coerced to Neutral for protocols that need clean input.
///
/// # Examples
///
/// ```
/// use gamepad_core::gamepad::options::{GamepadOptions, InputMode};
/// use gamepad_core::gamepad::socd::{resolve_socd_mode, SocdMode};
///
/// let mut options = GamepadOptions::default();
/// options.socd_mode = SocdMode::Bypass;
///
/// options.input_mode = InputMode::Switch;
/// assert_eq!(resolve_socd_mode(&options), SocdMode::Neutral);
///
/// options.input_mode = InputMode::Xinput;
/// assert_eq!(resolve_socd_mode(&options), SocdMode::Bypass);
/// ```
#[must_use]
pub fn resolve_socd_mode(options: &GamepadOptions) -> SocdMode {
    if options.socd_mode == SocdMode::Bypass && options.input_mode.requires_clean_socd() {
        SocdMode::Neutral
    } else {
        options.socd_mode
    }
}

/// Resolves one opposing pair without press history.
///
/// `winner` decides second-input conflicts; `None` means neutral.
/// Bits outside the pair are dropped.
#[must_use]
pub fn resolve_axis<T>(bits: T, axis: &SocdAxis<T>, mode: SocdMode, winner: Option<T>) -> T
where
    T: Copy + Default + PartialEq + BitAnd<Output = T> + BitOr<Output = T>,
{
    let pair = bits & axis.mask();
    if pair != axis.mask() {
        return pair;
    }

    match mode {
        SocdMode::Bypass => pair,
        SocdMode::Neutral => T::default(),
        SocdMode::UpPriority => axis.priority.unwrap_or_default(),
        SocdMode::SecondInputPriority => winner.unwrap_or_default(),
    }
}

/// Resolves a d-pad mask without press history.
///
/// Second-input priority has nothing to compare here and resolves
/// conflicts to neutral; use [`SocdResolver`] for the stateful policy.
#[must_use]
pub fn resolve_socd(dpad: u8, mode: SocdMode) -> u8 {
    resolve_axis(dpad, &VERTICAL_AXIS, mode, None) | resolve_axis(dpad, &HORIZONTAL_AXIS, mode, None)
}

const DIRECTIONS: [u8; 4] = [
    GAMEPAD_MASK_UP,
    GAMEPAD_MASK_DOWN,
    GAMEPAD_MASK_LEFT,
    GAMEPAD_MASK_RIGHT,
];

/// Stateful SOCD resolver tracking press order per direction.
#[derive(Debug, Clone, Default)]
pub struct SocdResolver {
    /// Cycle number at which each direction's current press began, 0 if released.
    press_seq: [u64; 4],
    previous: u8,
    cycle: u64,
}

impl SocdResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records this cycle's d-pad bits and resolves them under `mode`.
    ///
    /// History is recorded in every mode, so switching to second-input
    /// priority while a direction is held keeps its press order.
    pub fn resolve(&mut self, dpad: u8, mode: SocdMode) -> u8 {
        self.record(dpad);

        resolve_axis(dpad, &VERTICAL_AXIS, mode, self.winner(&VERTICAL_AXIS))
            | resolve_axis(dpad, &HORIZONTAL_AXIS, mode, self.winner(&HORIZONTAL_AXIS))
    }

    /// Forgets all press history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn record(&mut self, dpad: u8) {
        self.cycle += 1;
        for (i, &bit) in DIRECTIONS.iter().enumerate() {
            let held = dpad & bit != 0;
            if !held {
                self.press_seq[i] = 0;
            } else if self.previous & bit == 0 {
                self.press_seq[i] = self.cycle;
            }
        }
        self.previous = dpad;
    }

    fn seq(&self, bit: u8) -> u64 {
        DIRECTIONS
            .iter()
            .position(|&d| d == bit)
            .map_or(0, |i| self.press_seq[i])
    }

    fn winner(&self, axis: &SocdAxis) -> Option<u8> {
        let negative = self.seq(axis.negative);
        let positive = self.seq(axis.positive);
        match negative.cmp(&positive) {
            std::cmp::Ordering::Greater => Some(axis.negative),
            std::cmp::Ordering::Less => Some(axis.positive),
            std::cmp::Ordering::Equal => None,
        }
    }
}
