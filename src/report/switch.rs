//! # Switch Report
//!
//! 8-byte report: buttons (u16 LE), hat, lx, ly, rx, ry, vendor byte.

use super::hid::remap_buttons;
use super::{axis_to_u8, dpad_to_hat, ReportAdapter};
use crate::gamepad::state::*;

pub const SWITCH_REPORT_SIZE: usize = 8;

pub const SWITCH_MASK_Y: u16 = 1 << 0;
pub const SWITCH_MASK_B: u16 = 1 << 1;
pub const SWITCH_MASK_A: u16 = 1 << 2;
pub const SWITCH_MASK_X: u16 = 1 << 3;
pub const SWITCH_MASK_L: u16 = 1 << 4;
pub const SWITCH_MASK_R: u16 = 1 << 5;
pub const SWITCH_MASK_ZL: u16 = 1 << 6;
pub const SWITCH_MASK_ZR: u16 = 1 << 7;
pub const SWITCH_MASK_MINUS: u16 = 1 << 8;
pub const SWITCH_MASK_PLUS: u16 = 1 << 9;
pub const SWITCH_MASK_L3: u16 = 1 << 10;
pub const SWITCH_MASK_R3: u16 = 1 << 11;
pub const SWITCH_MASK_HOME: u16 = 1 << 12;
pub const SWITCH_MASK_CAPTURE: u16 = 1 << 13;

const BUTTON_MAP: [(u16, u16); 14] = [
    (GAMEPAD_MASK_B1, SWITCH_MASK_B),
    (GAMEPAD_MASK_B2, SWITCH_MASK_A),
    (GAMEPAD_MASK_B3, SWITCH_MASK_Y),
    (GAMEPAD_MASK_B4, SWITCH_MASK_X),
    (GAMEPAD_MASK_L1, SWITCH_MASK_L),
    (GAMEPAD_MASK_R1, SWITCH_MASK_R),
    (GAMEPAD_MASK_L2, SWITCH_MASK_ZL),
    (GAMEPAD_MASK_R2, SWITCH_MASK_ZR),
    (GAMEPAD_MASK_S1, SWITCH_MASK_MINUS),
    (GAMEPAD_MASK_S2, SWITCH_MASK_PLUS),
    (GAMEPAD_MASK_L3, SWITCH_MASK_L3),
    (GAMEPAD_MASK_R3, SWITCH_MASK_R3),
    (GAMEPAD_MASK_A1, SWITCH_MASK_HOME),
    (GAMEPAD_MASK_A2, SWITCH_MASK_CAPTURE),
];

#[derive(Debug, Clone)]
pub struct SwitchReport {
    buffer: [u8; SWITCH_REPORT_SIZE],
}

impl Default for SwitchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchReport {
    #[must_use]
    pub fn new() -> Self {
        let mut report = Self {
            buffer: [0; SWITCH_REPORT_SIZE],
        };
        report.encode(&GamepadState::default());
        report
    }
}

impl ReportAdapter for SwitchReport {
    fn encode(&mut self, state: &GamepadState) -> &[u8] {
        let buttons = remap_buttons(state.buttons, &BUTTON_MAP);
        self.buffer = [
            buttons.to_le_bytes()[0],
            buttons.to_le_bytes()[1],
            dpad_to_hat(state.dpad),
            axis_to_u8(state.lx),
            axis_to_u8(state.ly),
            axis_to_u8(state.rx),
            axis_to_u8(state.ry),
            0,
        ];
        &self.buffer
    }

    fn report(&self) -> &[u8] {
        &self.buffer
    }
}
