//! # Logical Inputs and Pin Source
//!
//! Defines the closed set of logical inputs a gamepad exposes and the
//! [`PinReader`] seam through which sampled GPIO levels enter the core.
//!
//! ## Inputs
//!
//! | Input | Namespace | Mask |
//! |-------|-----------|------|
//! | up / down / left / right | dpad | `GAMEPAD_MASK_UP` .. `GAMEPAD_MASK_RIGHT` |
//! | b1 .. b4 | buttons | face buttons |
//! | l1 r1 l2 r2 | buttons | shoulders and triggers |
//! | s1 s2 | buttons | select / start |
//! | l3 r3 | buttons | stick clicks |
//! | a1 a2 | buttons | home / capture |
//! | function | aux | `AUX_MASK_FUNCTION` |
//!
//! Pins are active-low: a level of `0` means the switch is closed.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use super::state::*;

/// Number of GPIOs in bank 0. Pins at or above this index are unassigned.
pub const NUM_BANK0_GPIOS: u8 = 30;

/// Number of logical inputs, including the d-pad and the aux function button.
pub const INPUT_COUNT: usize = 19;

/// Number of digital gamepad inputs (d-pad plus buttons, no aux).
pub const GAMEPAD_DIGITAL_INPUT_COUNT: usize = 18;

/// Which state namespace an input drives, with its bit inside that namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Dpad(u8),
    Button(u16),
    Aux(u16),
}

/// A logical gamepad input.
///
/// # Examples
///
/// ```
/// use gamepad_core::gamepad::input::{GamepadInput, InputTarget};
/// use gamepad_core::gamepad::state::GAMEPAD_MASK_B1;
///
/// assert_eq!(GamepadInput::B1.target(), InputTarget::Button(GAMEPAD_MASK_B1));
/// assert_eq!(GamepadInput::Function.name(), "function");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamepadInput {
    Up,
    Down,
    Left,
    Right,
    B1,
    B2,
    B3,
    B4,
    L1,
    R1,
    L2,
    R2,
    S1,
    S2,
    L3,
    R3,
    A1,
    A2,
    Function,
}

impl GamepadInput {
    /// All inputs in table order.
    pub const ALL: [GamepadInput; INPUT_COUNT] = [
        GamepadInput::Up,
        GamepadInput::Down,
        GamepadInput::Left,
        GamepadInput::Right,
        GamepadInput::B1,
        GamepadInput::B2,
        GamepadInput::B3,
        GamepadInput::B4,
        GamepadInput::L1,
        GamepadInput::R1,
        GamepadInput::L2,
        GamepadInput::R2,
        GamepadInput::S1,
        GamepadInput::S2,
        GamepadInput::L3,
        GamepadInput::R3,
        GamepadInput::A1,
        GamepadInput::A2,
        GamepadInput::Function,
    ];

    /// Position of this input in a mapping table.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The namespace and bit this input drives.
    #[must_use]
    pub fn target(self) -> InputTarget {
        match self {
            GamepadInput::Up => InputTarget::Dpad(GAMEPAD_MASK_UP),
            GamepadInput::Down => InputTarget::Dpad(GAMEPAD_MASK_DOWN),
            GamepadInput::Left => InputTarget::Dpad(GAMEPAD_MASK_LEFT),
            GamepadInput::Right => InputTarget::Dpad(GAMEPAD_MASK_RIGHT),
            GamepadInput::B1 => InputTarget::Button(GAMEPAD_MASK_B1),
            GamepadInput::B2 => InputTarget::Button(GAMEPAD_MASK_B2),
            GamepadInput::B3 => InputTarget::Button(GAMEPAD_MASK_B3),
            GamepadInput::B4 => InputTarget::Button(GAMEPAD_MASK_B4),
            GamepadInput::L1 => InputTarget::Button(GAMEPAD_MASK_L1),
            GamepadInput::R1 => InputTarget::Button(GAMEPAD_MASK_R1),
            GamepadInput::L2 => InputTarget::Button(GAMEPAD_MASK_L2),
            GamepadInput::R2 => InputTarget::Button(GAMEPAD_MASK_R2),
            GamepadInput::S1 => InputTarget::Button(GAMEPAD_MASK_S1),
            GamepadInput::S2 => InputTarget::Button(GAMEPAD_MASK_S2),
            GamepadInput::L3 => InputTarget::Button(GAMEPAD_MASK_L3),
            GamepadInput::R3 => InputTarget::Button(GAMEPAD_MASK_R3),
            GamepadInput::A1 => InputTarget::Button(GAMEPAD_MASK_A1),
            GamepadInput::A2 => InputTarget::Button(GAMEPAD_MASK_A2),
            GamepadInput::Function => InputTarget::Aux(AUX_MASK_FUNCTION),
        }
    }

    /// Raw bit of this input inside its namespace, widened to `u32`.
    #[must_use]
    pub fn mask(self) -> u32 {
        match self.target() {
            InputTarget::Dpad(mask) => u32::from(mask),
            InputTarget::Button(mask) | InputTarget::Aux(mask) => u32::from(mask),
        }
    }

    /// Config-file name of this input.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            GamepadInput::Up => "up",
            GamepadInput::Down => "down",
            GamepadInput::Left => "left",
            GamepadInput::Right => "right",
            GamepadInput::B1 => "b1",
            GamepadInput::B2 => "b2",
            GamepadInput::B3 => "b3",
            GamepadInput::B4 => "b4",
            GamepadInput::L1 => "l1",
            GamepadInput::R1 => "r1",
            GamepadInput::L2 => "l2",
            GamepadInput::R2 => "r2",
            GamepadInput::S1 => "s1",
            GamepadInput::S2 => "s2",
            GamepadInput::L3 => "l3",
            GamepadInput::R3 => "r3",
            GamepadInput::A1 => "a1",
            GamepadInput::A2 => "a2",
            GamepadInput::Function => "function",
        }
    }
}

/// Source of instantaneous GPIO levels, sampled by the board layer.
///
/// One bit per pin, `1` = high (released), `0` = low (pressed).
#[cfg_attr(test, mockall::automock)]
pub trait PinReader {
    /// Returns the current level of every bank-0 pin.
    fn read_levels(&mut self) -> u32;
}

/// In-memory pin bank for simulation and tests.
///
/// Clones share the same levels, so a test or script can hold one clone
/// while the gamepad owns another. All pins start released (high).
#[derive(Debug, Clone)]
pub struct SimulatedPins {
    levels: Arc<AtomicU32>,
}

impl Default for SimulatedPins {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPins {
    /// Creates a pin bank with every pin pulled high.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: Arc::new(AtomicU32::new(u32::MAX)),
        }
    }

    /// Drives a pin low (pressed). Pins outside the bank are ignored.
    pub fn press(&self, pin: u8) {
        if pin < NUM_BANK0_GPIOS {
            self.levels.fetch_and(!(1u32 << pin), Ordering::SeqCst);
        }
    }

    /// Lets a pin float back high (released). Pins outside the bank are ignored.
    pub fn release(&self, pin: u8) {
        if pin < NUM_BANK0_GPIOS {
            self.levels.fetch_or(1u32 << pin, Ordering::SeqCst);
        }
    }

    /// Releases every pin.
    pub fn release_all(&self) {
        self.levels.store(u32::MAX, Ordering::SeqCst);
    }

    /// Returns the current level bitmask.
    #[must_use]
    pub fn levels(&self) -> u32 {
        self.levels.load(Ordering::SeqCst)
    }
}

impl PinReader for SimulatedPins {
    fn read_levels(&mut self) -> u32 {
        self.levels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_inputs_in_index_order() {
        for (i, input) in GamepadInput::ALL.iter().enumerate() {
            assert_eq!(input.index(), i);
        }
    }

    #[test]
    fn test_digital_inputs_precede_aux() {
        for input in &GamepadInput::ALL[..GAMEPAD_DIGITAL_INPUT_COUNT] {
            assert!(!matches!(input.target(), InputTarget::Aux(_)), "{:?}", input);
        }
        assert_eq!(
            GamepadInput::ALL[GAMEPAD_DIGITAL_INPUT_COUNT].target(),
            InputTarget::Aux(AUX_MASK_FUNCTION)
        );
    }

    #[test]
    fn test_masks_unique_per_namespace() {
        let mut dpad = 0u32;
        let mut buttons = 0u32;
        for input in GamepadInput::ALL {
            match input.target() {
                InputTarget::Dpad(m) => {
                    assert_eq!(dpad & u32::from(m), 0);
                    dpad |= u32::from(m);
                }
                InputTarget::Button(m) => {
                    assert_eq!(buttons & u32::from(m), 0);
                    buttons |= u32::from(m);
                }
                InputTarget::Aux(_) => {}
            }
        }
        assert_eq!(dpad, 0x0F);
        assert_eq!(buttons, 0x3FFF);
    }

    #[test]
    fn test_name_matches_config_name() {
        for input in GamepadInput::ALL {
            let parsed: GamepadInput = serde_json::from_str(&format!("\"{}\"", input.name())).unwrap();
            assert_eq!(parsed, input);
        }
        assert!(serde_json::from_str::<GamepadInput>("\"turbo\"").is_err());
    }

    #[test]
    fn test_deserialize_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            input: GamepadInput,
        }
        let w: Wrapper = toml::from_str("input = \"function\"").unwrap();
        assert_eq!(w.input, GamepadInput::Function);
    }

    #[test]
    fn test_simulated_pins_start_released() {
        let pins = SimulatedPins::new();
        assert_eq!(pins.levels(), u32::MAX);
    }

    #[test]
    fn test_simulated_pins_press_release() {
        let pins = SimulatedPins::new();
        pins.press(2);
        assert_eq!(pins.levels() & (1 << 2), 0);

        pins.release(2);
        assert_ne!(pins.levels() & (1 << 2), 0);
    }

    #[test]
    fn test_simulated_pins_out_of_range_ignored() {
        let pins = SimulatedPins::new();
        pins.press(30);
        pins.press(255);
        assert_eq!(pins.levels(), u32::MAX);
    }

    #[test]
    fn test_simulated_pins_clones_share_levels() {
        let pins = SimulatedPins::new();
        let mut reader = pins.clone();
        pins.press(7);
        assert_eq!(reader.read_levels() & (1 << 7), 0);

        pins.release_all();
        assert_eq!(reader.read_levels(), u32::MAX);
    }
}
