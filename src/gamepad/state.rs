//! # Gamepad State
//!
//! Bit-level snapshots produced by each polling cycle.
//!
//! - [`RawState`]: debounced pins and the as-wired masks.
//! - [`GamepadState`]: the resolved state handed to report adapters. It keeps
//!   the as-wired masks (`dwires`, `bwires`) next to the profile masks so
//!   hotkeys and diagnostics can still ask what a physical position is doing.

use serde::Serialize;

use super::input::{GamepadInput, InputTarget};

pub const GAMEPAD_MASK_UP: u8 = 1 << 0;
pub const GAMEPAD_MASK_DOWN: u8 = 1 << 1;
pub const GAMEPAD_MASK_LEFT: u8 = 1 << 2;
pub const GAMEPAD_MASK_RIGHT: u8 = 1 << 3;
pub const GAMEPAD_MASK_DPAD: u8 =
    GAMEPAD_MASK_UP | GAMEPAD_MASK_DOWN | GAMEPAD_MASK_LEFT | GAMEPAD_MASK_RIGHT;

pub const GAMEPAD_MASK_B1: u16 = 1 << 0;
pub const GAMEPAD_MASK_B2: u16 = 1 << 1;
pub const GAMEPAD_MASK_B3: u16 = 1 << 2;
pub const GAMEPAD_MASK_B4: u16 = 1 << 3;
pub const GAMEPAD_MASK_L1: u16 = 1 << 4;
pub const GAMEPAD_MASK_R1: u16 = 1 << 5;
pub const GAMEPAD_MASK_L2: u16 = 1 << 6;
pub const GAMEPAD_MASK_R2: u16 = 1 << 7;
pub const GAMEPAD_MASK_S1: u16 = 1 << 8;
pub const GAMEPAD_MASK_S2: u16 = 1 << 9;
pub const GAMEPAD_MASK_L3: u16 = 1 << 10;
pub const GAMEPAD_MASK_R3: u16 = 1 << 11;
pub const GAMEPAD_MASK_A1: u16 = 1 << 12;
pub const GAMEPAD_MASK_A2: u16 = 1 << 13;

pub const AUX_MASK_FUNCTION: u16 = 1 << 15;

/// Analog axis minimum.
pub const GAMEPAD_JOYSTICK_MIN: u16 = 0;
/// Analog axis center.
pub const GAMEPAD_JOYSTICK_MID: u16 = 0x7FFF;
/// Analog axis maximum.
pub const GAMEPAD_JOYSTICK_MAX: u16 = 0xFFFF;

/// Per-namespace masks produced by translating pins through a mapping table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputMasks {
    pub dpad: u8,
    pub buttons: u16,
    pub aux: u16,
}

impl InputMasks {
    /// Sets the bit driven by `target`.
    pub fn set(&mut self, target: InputTarget) {
        match target {
            InputTarget::Dpad(mask) => self.dpad |= mask,
            InputTarget::Button(mask) => self.buttons |= mask,
            InputTarget::Aux(mask) => self.aux |= mask,
        }
    }
}

/// Debounced input snapshot as physically wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RawState {
    /// Debounced pressed pins, one bit per GPIO.
    pub pins: u32,
    /// D-pad bits through the wired table.
    pub dpad: u8,
    /// Button bits through the wired table.
    pub buttons: u16,
    /// Aux bits through the wired table.
    pub aux: u16,
}

/// Resolved controller state for one polling cycle.
///
/// # Examples
///
/// ```
/// use gamepad_core::gamepad::state::{GamepadState, GAMEPAD_MASK_UP, GAMEPAD_JOYSTICK_MID};
///
/// let mut state = GamepadState::default();
/// assert_eq!(state.lx, GAMEPAD_JOYSTICK_MID);
///
/// state.dpad = GAMEPAD_MASK_UP;
/// assert!(state.pressed_dpad(GAMEPAD_MASK_UP));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GamepadState {
    /// D-pad bits (current profile).
    pub dpad: u8,
    /// Button bits (current profile).
    pub buttons: u16,
    /// Aux bits (current profile).
    pub aux: u16,
    pub lx: u16,
    pub ly: u16,
    pub rx: u16,
    pub ry: u16,
    /// D-pad bits as wired.
    pub dwires: u8,
    /// Button bits as wired.
    pub bwires: u16,
}

impl Default for GamepadState {
    fn default() -> Self {
        Self {
            dpad: 0,
            buttons: 0,
            aux: 0,
            lx: GAMEPAD_JOYSTICK_MID,
            ly: GAMEPAD_JOYSTICK_MID,
            rx: GAMEPAD_JOYSTICK_MID,
            ry: GAMEPAD_JOYSTICK_MID,
            dwires: 0,
            bwires: 0,
        }
    }
}

impl GamepadState {
    /// True when every bit of `mask` is pressed in the profile buttons.
    #[must_use]
    pub fn pressed_button(&self, mask: u16) -> bool {
        (self.buttons & mask) == mask
    }

    /// True when every bit of `mask` is pressed in the profile d-pad.
    #[must_use]
    pub fn pressed_dpad(&self, mask: u8) -> bool {
        (self.dpad & mask) == mask
    }

    /// True when every bit of `mask` is pressed in the aux buttons.
    #[must_use]
    pub fn pressed_aux(&self, mask: u16) -> bool {
        (self.aux & mask) == mask
    }

    /// True when every bit of `mask` is active in the wired buttons.
    #[must_use]
    pub fn active_wire_b(&self, mask: u16) -> bool {
        (self.bwires & mask) == mask
    }

    /// True when every bit of `mask` is active in the wired d-pad.
    #[must_use]
    pub fn active_wire_d(&self, mask: u8) -> bool {
        (self.dwires & mask) == mask
    }

    /// Whether a logical input is pressed in the current profile.
    #[must_use]
    pub fn pressed(&self, input: GamepadInput) -> bool {
        match input.target() {
            InputTarget::Dpad(mask) => self.pressed_dpad(mask),
            InputTarget::Button(mask) => self.pressed_button(mask),
            InputTarget::Aux(mask) => self.pressed_aux(mask),
        }
    }

    /// Whether the pin wired to a logical input is active, ignoring the profile.
    ///
    /// Aux inputs have no separate wired view and report the profile bit.
    #[must_use]
    pub fn active_wire(&self, input: GamepadInput) -> bool {
        match input.target() {
            InputTarget::Dpad(mask) => self.active_wire_d(mask),
            InputTarget::Button(mask) => self.active_wire_b(mask),
            InputTarget::Aux(mask) => self.pressed_aux(mask),
        }
    }

    /// True when no digital input is pressed in the current profile.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.dpad == 0 && self.buttons == 0 && self.aux == 0
    }
}

/// Converts the horizontal d-pad bits to an analog X value.
#[must_use]
pub fn dpad_to_analog_x(dpad: u8) -> u16 {
    match dpad & (GAMEPAD_MASK_LEFT | GAMEPAD_MASK_RIGHT) {
        GAMEPAD_MASK_LEFT => GAMEPAD_JOYSTICK_MIN,
        GAMEPAD_MASK_RIGHT => GAMEPAD_JOYSTICK_MAX,
        _ => GAMEPAD_JOYSTICK_MID,
    }
}

/// Converts the vertical d-pad bits to an analog Y value (up is minimum).
#[must_use]
pub fn dpad_to_analog_y(dpad: u8) -> u16 {
    match dpad & (GAMEPAD_MASK_UP | GAMEPAD_MASK_DOWN) {
        GAMEPAD_MASK_UP => GAMEPAD_JOYSTICK_MIN,
        GAMEPAD_MASK_DOWN => GAMEPAD_JOYSTICK_MAX,
        _ => GAMEPAD_JOYSTICK_MID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_centered_and_idle() {
        let state = GamepadState::default();
        assert!(state.is_idle());
        assert_eq!(state.lx, GAMEPAD_JOYSTICK_MID);
        assert_eq!(state.ly, GAMEPAD_JOYSTICK_MID);
        assert_eq!(state.rx, GAMEPAD_JOYSTICK_MID);
        assert_eq!(state.ry, GAMEPAD_JOYSTICK_MID);
        assert_eq!(state.dwires, 0);
        assert_eq!(state.bwires, 0);
    }

    #[test]
    fn test_pressed_button_requires_all_bits() {
        let mut state = GamepadState::default();
        state.buttons = GAMEPAD_MASK_S1;
        assert!(state.pressed_button(GAMEPAD_MASK_S1));
        assert!(!state.pressed_button(GAMEPAD_MASK_S1 | GAMEPAD_MASK_S2));

        state.buttons |= GAMEPAD_MASK_S2;
        assert!(state.pressed_button(GAMEPAD_MASK_S1 | GAMEPAD_MASK_S2));
    }

    #[test]
    fn test_empty_mask_always_pressed() {
        let state = GamepadState::default();
        assert!(state.pressed_button(0));
        assert!(state.pressed_dpad(0));
        assert!(state.pressed_aux(0));
    }

    #[test]
    fn test_wired_and_profile_views_independent() {
        let mut state = GamepadState::default();
        state.bwires = GAMEPAD_MASK_B1;
        state.buttons = GAMEPAD_MASK_B2;

        assert!(state.active_wire(GamepadInput::B1));
        assert!(!state.pressed(GamepadInput::B1));
        assert!(state.pressed(GamepadInput::B2));
        assert!(!state.active_wire(GamepadInput::B2));
    }

    #[test]
    fn test_pressed_by_input() {
        let mut state = GamepadState::default();
        state.dpad = GAMEPAD_MASK_LEFT;
        state.aux = AUX_MASK_FUNCTION;
        assert!(state.pressed(GamepadInput::Left));
        assert!(!state.pressed(GamepadInput::Right));
        assert!(state.pressed(GamepadInput::Function));
        assert!(!state.is_idle());
    }

    #[test]
    fn test_input_masks_set() {
        let mut masks = InputMasks::default();
        masks.set(GamepadInput::Down.target());
        masks.set(GamepadInput::R3.target());
        masks.set(GamepadInput::Function.target());
        assert_eq!(masks.dpad, GAMEPAD_MASK_DOWN);
        assert_eq!(masks.buttons, GAMEPAD_MASK_R3);
        assert_eq!(masks.aux, AUX_MASK_FUNCTION);
    }

    #[test]
    fn test_dpad_to_analog() {
        assert_eq!(dpad_to_analog_x(GAMEPAD_MASK_LEFT), GAMEPAD_JOYSTICK_MIN);
        assert_eq!(dpad_to_analog_x(GAMEPAD_MASK_RIGHT), GAMEPAD_JOYSTICK_MAX);
        assert_eq!(dpad_to_analog_x(0), GAMEPAD_JOYSTICK_MID);
        assert_eq!(
            dpad_to_analog_x(GAMEPAD_MASK_LEFT | GAMEPAD_MASK_RIGHT),
            GAMEPAD_JOYSTICK_MID
        );

        assert_eq!(dpad_to_analog_y(GAMEPAD_MASK_UP), GAMEPAD_JOYSTICK_MIN);
        assert_eq!(dpad_to_analog_y(GAMEPAD_MASK_DOWN), GAMEPAD_JOYSTICK_MAX);
        assert_eq!(
            dpad_to_analog_y(GAMEPAD_MASK_UP | GAMEPAD_MASK_LEFT),
            GAMEPAD_JOYSTICK_MIN
        );
    }
}
