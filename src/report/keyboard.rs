//! # Keyboard Report
//!
//! 8-byte boot keyboard report: modifier bits, reserved byte, up to six
//! keycodes. Each gamepad input sends one configurable HID keycode.
//! Keycodes `0xE0..=0xE7` are modifiers and set bits in byte 0 instead of
//! taking a key slot.

use std::collections::BTreeMap;

use tracing::warn;

use super::ReportAdapter;
use crate::gamepad::input::{GamepadInput, INPUT_COUNT};
use crate::gamepad::state::GamepadState;

pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Simultaneous non-modifier keys in a boot report.
pub const KEYBOARD_ROLLOVER: usize = 6;

pub const HID_KEY_NONE: u8 = 0x00;
pub const HID_KEY_MODIFIER_FIRST: u8 = 0xE0;
pub const HID_KEY_MODIFIER_LAST: u8 = 0xE7;

/// Stock keycodes in [`GamepadInput::ALL`] order.
const DEFAULT_KEYCODES: [u8; INPUT_COUNT] = [
    0x52, // up arrow
    0x51, // down arrow
    0x50, // left arrow
    0x4F, // right arrow
    0x1D, // z
    0x1B, // x
    0x04, // a
    0x16, // s
    0x14, // q
    0x1A, // w
    0x08, // e
    0x15, // r
    0x2B, // tab
    0x28, // enter
    0x06, // c
    0x19, // v
    0x29, // escape
    0x3A, // f1
    HID_KEY_NONE,
];

/// Keycode assigned to each gamepad input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardMapping {
    keycodes: [u8; INPUT_COUNT],
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self {
            keycodes: DEFAULT_KEYCODES,
        }
    }
}

impl KeyboardMapping {
    /// Stock mapping with `overrides` applied on top.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<GamepadInput, u8>) -> Self {
        let mut mapping = Self::default();
        for (&input, &code) in overrides {
            mapping.keycodes[input.index()] = code;
        }
        mapping
    }

    #[must_use]
    pub fn keycode(&self, input: GamepadInput) -> u8 {
        self.keycodes[input.index()]
    }
}

/// Returns the modifier bit for a modifier keycode.
#[must_use]
pub fn modifier_bit(keycode: u8) -> Option<u8> {
    if (HID_KEY_MODIFIER_FIRST..=HID_KEY_MODIFIER_LAST).contains(&keycode) {
        Some(1 << (keycode - HID_KEY_MODIFIER_FIRST))
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardReport {
    mapping: KeyboardMapping,
    buffer: [u8; KEYBOARD_REPORT_SIZE],
    overflow_logged: bool,
}

impl KeyboardReport {
    #[must_use]
    pub fn new(mapping: KeyboardMapping) -> Self {
        Self {
            mapping,
            buffer: [0; KEYBOARD_REPORT_SIZE],
            overflow_logged: false,
        }
    }

    #[must_use]
    pub fn mapping(&self) -> &KeyboardMapping {
        &self.mapping
    }
}

impl ReportAdapter for KeyboardReport {
    fn encode(&mut self, state: &GamepadState) -> &[u8] {
        let mut modifiers = 0u8;
        let mut keys = [HID_KEY_NONE; KEYBOARD_ROLLOVER];
        let mut used = 0;
        let mut dropped = false;

        for input in GamepadInput::ALL {
            if !state.pressed(input) {
                continue;
            }
            let code = self.mapping.keycode(input);
            if code == HID_KEY_NONE {
                continue;
            }
            if let Some(bit) = modifier_bit(code) {
                modifiers |= bit;
            } else if keys[..used].contains(&code) {
                continue;
            } else if used < KEYBOARD_ROLLOVER {
                keys[used] = code;
                used += 1;
            } else {
                dropped = true;
            }
        }

        if dropped && !self.overflow_logged {
            warn!("More than {} keys pressed, extra keys dropped", KEYBOARD_ROLLOVER);
        }
        self.overflow_logged = dropped;

        self.buffer[0] = modifiers;
        self.buffer[1] = 0;
        self.buffer[2..].copy_from_slice(&keys);
        &self.buffer
    }

    fn report(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::state::*;

    #[test]
    fn test_idle_report_empty() {
        let mut report = KeyboardReport::new(KeyboardMapping::default());
        assert_eq!(report.encode(&GamepadState::default()), &[0u8; 8]);
    }

    #[test]
    fn test_pressed_keys_fill_slots() {
        let mut report = KeyboardReport::new(KeyboardMapping::default());
        let state = GamepadState {
            dpad: GAMEPAD_MASK_UP,
            buttons: GAMEPAD_MASK_B1,
            ..Default::default()
        };
        let b = report.encode(&state);
        assert_eq!(b[0], 0);
        assert_eq!(&b[2..4], &[0x52, 0x1D]);
        assert_eq!(&b[4..], &[0; 4]);
    }

    #[test]
    fn test_modifier_keycodes() {
        let overrides = BTreeMap::from([
            (GamepadInput::B1, 0xE1), // left shift
            (GamepadInput::B2, 0xE4), // right ctrl
        ]);
        let mut report = KeyboardReport::new(KeyboardMapping::with_overrides(&overrides));
        let state = GamepadState {
            buttons: GAMEPAD_MASK_B1 | GAMEPAD_MASK_B2,
            ..Default::default()
        };
        let b = report.encode(&state);
        assert_eq!(b[0], 0b0001_0010);
        assert_eq!(&b[2..], &[0; 6]);
    }

    #[test]
    fn test_rollover_limit() {
        let mut report = KeyboardReport::new(KeyboardMapping::default());
        let state = GamepadState {
            dpad: GAMEPAD_MASK_DPAD,
            buttons: GAMEPAD_MASK_B1 | GAMEPAD_MASK_B2 | GAMEPAD_MASK_B3 | GAMEPAD_MASK_B4,
            ..Default::default()
        };
        let b = report.encode(&state);
        assert!(b[2..].iter().all(|&k| k != HID_KEY_NONE));
        assert_eq!(&b[2..6], &[0x52, 0x51, 0x50, 0x4F]);
    }

    #[test]
    fn test_unmapped_input_ignored() {
        let mut report = KeyboardReport::new(KeyboardMapping::default());
        let state = GamepadState {
            aux: AUX_MASK_FUNCTION,
            ..Default::default()
        };
        assert_eq!(report.encode(&state), &[0u8; 8]);
    }

    #[test]
    fn test_modifier_bit_range() {
        assert_eq!(modifier_bit(0xE0), Some(0x01));
        assert_eq!(modifier_bit(0xE7), Some(0x80));
        assert_eq!(modifier_bit(0x04), None);
    }
}
