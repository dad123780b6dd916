//! # Generic HID Report
//!
//! PS3-style 27-byte input report.
//!
//! ```text
//! [0..2)   buttons (u16 LE)
//! [2]      hat
//! [3..7)   lx, ly, rx, ry
//! [7..19)  pressure: right, left, up, down, square, cross, circle, triangle, l1, r1, l2, r2
//! [19..27) accel x, y, z, gyro (u16 LE)
//! ```

use super::{axis_to_u8, dpad_to_hat, trigger_value, ReportAdapter};
use crate::gamepad::state::*;

pub const HID_REPORT_SIZE: usize = 27;

pub const HID_MASK_SQUARE: u16 = 1 << 0;
pub const HID_MASK_CROSS: u16 = 1 << 1;
pub const HID_MASK_CIRCLE: u16 = 1 << 2;
pub const HID_MASK_TRIANGLE: u16 = 1 << 3;
pub const HID_MASK_L1: u16 = 1 << 4;
pub const HID_MASK_R1: u16 = 1 << 5;
pub const HID_MASK_L2: u16 = 1 << 6;
pub const HID_MASK_R2: u16 = 1 << 7;
pub const HID_MASK_SELECT: u16 = 1 << 8;
pub const HID_MASK_START: u16 = 1 << 9;
pub const HID_MASK_L3: u16 = 1 << 10;
pub const HID_MASK_R3: u16 = 1 << 11;
pub const HID_MASK_PS: u16 = 1 << 12;
pub const HID_MASK_TP: u16 = 1 << 13;

/// Resting value of the motion fields.
pub const HID_MOTION_CENTER: u16 = 0x0200;

const BUTTON_MAP: [(u16, u16); 14] = [
    (GAMEPAD_MASK_B1, HID_MASK_CROSS),
    (GAMEPAD_MASK_B2, HID_MASK_CIRCLE),
    (GAMEPAD_MASK_B3, HID_MASK_SQUARE),
    (GAMEPAD_MASK_B4, HID_MASK_TRIANGLE),
    (GAMEPAD_MASK_L1, HID_MASK_L1),
    (GAMEPAD_MASK_R1, HID_MASK_R1),
    (GAMEPAD_MASK_L2, HID_MASK_L2),
    (GAMEPAD_MASK_R2, HID_MASK_R2),
    (GAMEPAD_MASK_S1, HID_MASK_SELECT),
    (GAMEPAD_MASK_S2, HID_MASK_START),
    (GAMEPAD_MASK_L3, HID_MASK_L3),
    (GAMEPAD_MASK_R3, HID_MASK_R3),
    (GAMEPAD_MASK_A1, HID_MASK_PS),
    (GAMEPAD_MASK_A2, HID_MASK_TP),
];

/// Maps gamepad button bits onto a protocol's button bits.
pub(crate) fn remap_buttons<T>(buttons: u16, map: &[(u16, T)]) -> T
where
    T: Copy + Default + std::ops::BitOr<Output = T>,
{
    map.iter()
        .filter(|(from, _)| buttons & from != 0)
        .fold(T::default(), |acc, &(_, to)| acc | to)
}

#[derive(Debug, Clone)]
pub struct HidReport {
    buffer: [u8; HID_REPORT_SIZE],
}

impl Default for HidReport {
    fn default() -> Self {
        Self::new()
    }
}

impl HidReport {
    /// Creates a report in the neutral position.
    #[must_use]
    pub fn new() -> Self {
        let mut report = Self {
            buffer: [0; HID_REPORT_SIZE],
        };
        report.encode(&GamepadState::default());
        report
    }
}

impl ReportAdapter for HidReport {
    fn encode(&mut self, state: &GamepadState) -> &[u8] {
        let buttons = remap_buttons(state.buttons, &BUTTON_MAP);
        let b = &mut self.buffer;

        b[0..2].copy_from_slice(&buttons.to_le_bytes());
        b[2] = dpad_to_hat(state.dpad);
        b[3] = axis_to_u8(state.lx);
        b[4] = axis_to_u8(state.ly);
        b[5] = axis_to_u8(state.rx);
        b[6] = axis_to_u8(state.ry);

        let pressure = [
            state.pressed_dpad(GAMEPAD_MASK_RIGHT),
            state.pressed_dpad(GAMEPAD_MASK_LEFT),
            state.pressed_dpad(GAMEPAD_MASK_UP),
            state.pressed_dpad(GAMEPAD_MASK_DOWN),
            state.pressed_button(GAMEPAD_MASK_B3),
            state.pressed_button(GAMEPAD_MASK_B1),
            state.pressed_button(GAMEPAD_MASK_B2),
            state.pressed_button(GAMEPAD_MASK_B4),
            state.pressed_button(GAMEPAD_MASK_L1),
            state.pressed_button(GAMEPAD_MASK_R1),
            state.pressed_button(GAMEPAD_MASK_L2),
            state.pressed_button(GAMEPAD_MASK_R2),
        ];
        for (slot, pressed) in b[7..19].iter_mut().zip(pressure) {
            *slot = trigger_value(pressed);
        }

        for field in b[19..27].chunks_exact_mut(2) {
            field.copy_from_slice(&HID_MOTION_CENTER.to_le_bytes());
        }

        &self.buffer
    }

    fn report(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::HAT_CENTERED;

    #[test]
    fn test_neutral_report() {
        let report = HidReport::new();
        let b = report.report();

        assert_eq!(b.len(), HID_REPORT_SIZE);
        assert_eq!(&b[0..2], &[0, 0]);
        assert_eq!(b[2], HAT_CENTERED);
        assert_eq!(&b[3..7], &[0x7F; 4]);
        assert!(b[7..19].iter().all(|&p| p == 0));
        assert_eq!(&b[19..21], &HID_MOTION_CENTER.to_le_bytes());
    }

    #[test]
    fn test_face_buttons_remapped() {
        let mut report = HidReport::new();
        let state = GamepadState {
            buttons: GAMEPAD_MASK_B1 | GAMEPAD_MASK_B3 | GAMEPAD_MASK_A1,
            ..Default::default()
        };
        let b = report.encode(&state);

        let buttons = u16::from_le_bytes([b[0], b[1]]);
        assert_eq!(buttons, HID_MASK_CROSS | HID_MASK_SQUARE | HID_MASK_PS);
        // square and cross pressure
        assert_eq!(b[11], 0xFF);
        assert_eq!(b[12], 0xFF);
        assert_eq!(b[13], 0x00);
    }

    #[test]
    fn test_dpad_hat_and_pressure() {
        let mut report = HidReport::new();
        let state = GamepadState {
            dpad: GAMEPAD_MASK_DOWN | GAMEPAD_MASK_LEFT,
            ..Default::default()
        };
        let b = report.encode(&state);

        assert_eq!(b[2], 5);
        assert_eq!(b[7], 0x00); // right
        assert_eq!(b[8], 0xFF); // left
        assert_eq!(b[10], 0xFF); // down
    }

    #[test]
    fn test_axes_scaled() {
        let mut report = HidReport::new();
        let state = GamepadState {
            lx: GAMEPAD_JOYSTICK_MIN,
            ly: GAMEPAD_JOYSTICK_MAX,
            ..Default::default()
        };
        let b = report.encode(&state);

        assert_eq!(b[3], 0x00);
        assert_eq!(b[4], 0xFF);
        assert_eq!(b[5], 0x7F);
    }
}
