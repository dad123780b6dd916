//! # XInput Report
//!
//! ```text
//! [0]      report id (0x00)
//! [1]      report size (20)
//! [2]      up, down, left, right, start, back, ls, rs
//! [3]      lb, rb, guide, -, a, b, x, y
//! [4..6)   left trigger, right trigger
//! [6..14)  lx, ly, rx, ry (i16 LE, y axes point up)
//! [14..20) reserved
//! ```

use super::hid::remap_buttons;
use super::{trigger_value, ReportAdapter};
use crate::gamepad::state::*;

pub const XINPUT_REPORT_SIZE: usize = 20;

pub const XBOX_MASK_UP: u8 = 1 << 0;
pub const XBOX_MASK_DOWN: u8 = 1 << 1;
pub const XBOX_MASK_LEFT: u8 = 1 << 2;
pub const XBOX_MASK_RIGHT: u8 = 1 << 3;
pub const XBOX_MASK_START: u8 = 1 << 4;
pub const XBOX_MASK_BACK: u8 = 1 << 5;
pub const XBOX_MASK_LS: u8 = 1 << 6;
pub const XBOX_MASK_RS: u8 = 1 << 7;

pub const XBOX_MASK_LB: u8 = 1 << 0;
pub const XBOX_MASK_RB: u8 = 1 << 1;
pub const XBOX_MASK_HOME: u8 = 1 << 2;
pub const XBOX_MASK_A: u8 = 1 << 4;
pub const XBOX_MASK_B: u8 = 1 << 5;
pub const XBOX_MASK_X: u8 = 1 << 6;
pub const XBOX_MASK_Y: u8 = 1 << 7;

const BUTTONS1_MAP: [(u16, u8); 4] = [
    (GAMEPAD_MASK_S2, XBOX_MASK_START),
    (GAMEPAD_MASK_S1, XBOX_MASK_BACK),
    (GAMEPAD_MASK_L3, XBOX_MASK_LS),
    (GAMEPAD_MASK_R3, XBOX_MASK_RS),
];

const BUTTONS2_MAP: [(u16, u8); 7] = [
    (GAMEPAD_MASK_L1, XBOX_MASK_LB),
    (GAMEPAD_MASK_R1, XBOX_MASK_RB),
    (GAMEPAD_MASK_A1, XBOX_MASK_HOME),
    (GAMEPAD_MASK_B1, XBOX_MASK_A),
    (GAMEPAD_MASK_B2, XBOX_MASK_B),
    (GAMEPAD_MASK_B3, XBOX_MASK_X),
    (GAMEPAD_MASK_B4, XBOX_MASK_Y),
];

/// Converts an unsigned axis to XInput's signed range.
fn axis_to_i16(value: u16) -> i16 {
    (value ^ 0x8000) as i16
}

/// XInput's y axes increase upward.
fn axis_to_i16_inverted(value: u16) -> i16 {
    !axis_to_i16(value)
}

#[derive(Debug, Clone)]
pub struct XInputReport {
    buffer: [u8; XINPUT_REPORT_SIZE],
}

impl Default for XInputReport {
    fn default() -> Self {
        Self::new()
    }
}

impl XInputReport {
    #[must_use]
    pub fn new() -> Self {
        let mut report = Self {
            buffer: [0; XINPUT_REPORT_SIZE],
        };
        report.encode(&GamepadState::default());
        report
    }
}

impl ReportAdapter for XInputReport {
    fn encode(&mut self, state: &GamepadState) -> &[u8] {
        // D-pad bits share the gamepad layout
        let buttons1 = (state.dpad & GAMEPAD_MASK_DPAD) | remap_buttons(state.buttons, &BUTTONS1_MAP);
        let buttons2 = remap_buttons(state.buttons, &BUTTONS2_MAP);

        let b = &mut self.buffer;
        b[0] = 0x00;
        b[1] = XINPUT_REPORT_SIZE as u8;
        b[2] = buttons1;
        b[3] = buttons2;
        b[4] = trigger_value(state.pressed_button(GAMEPAD_MASK_L2));
        b[5] = trigger_value(state.pressed_button(GAMEPAD_MASK_R2));
        b[6..8].copy_from_slice(&axis_to_i16(state.lx).to_le_bytes());
        b[8..10].copy_from_slice(&axis_to_i16_inverted(state.ly).to_le_bytes());
        b[10..12].copy_from_slice(&axis_to_i16(state.rx).to_le_bytes());
        b[12..14].copy_from_slice(&axis_to_i16_inverted(state.ry).to_le_bytes());
        b[14..].fill(0);

        &self.buffer
    }

    fn report(&self) -> &[u8] {
        &self.buffer
    }
}
