//! # PS4 Report
//!
//! 64-byte report. Only the input section is populated; sensor and touchpad
//! fields stay at rest.
//!
//! ```text
//! [0]     report id (0x01)
//! [1..5)  lx, ly, rx, ry
//! [5]     hat (low nibble), square, cross, circle, triangle
//! [6]     l1, r1, l2, r2, share, options, l3, r3
//! [7]     ps, touchpad, 6-bit report counter
//! [8..10) left trigger, right trigger
//! ```

use super::hid::remap_buttons;
use super::{axis_to_u8, dpad_to_hat, trigger_value, ReportAdapter};
use crate::gamepad::state::*;

pub const PS4_REPORT_SIZE: usize = 64;
pub const PS4_REPORT_ID: u8 = 0x01;

pub const PS4_MASK_SQUARE: u8 = 1 << 4;
pub const PS4_MASK_CROSS: u8 = 1 << 5;
pub const PS4_MASK_CIRCLE: u8 = 1 << 6;
pub const PS4_MASK_TRIANGLE: u8 = 1 << 7;

pub const PS4_MASK_L1: u8 = 1 << 0;
pub const PS4_MASK_R1: u8 = 1 << 1;
pub const PS4_MASK_L2: u8 = 1 << 2;
pub const PS4_MASK_R2: u8 = 1 << 3;
pub const PS4_MASK_SHARE: u8 = 1 << 4;
pub const PS4_MASK_OPTIONS: u8 = 1 << 5;
pub const PS4_MASK_L3: u8 = 1 << 6;
pub const PS4_MASK_R3: u8 = 1 << 7;

pub const PS4_MASK_PS: u8 = 1 << 0;
pub const PS4_MASK_TOUCHPAD: u8 = 1 << 1;

const PS4_COUNTER_MASK: u8 = 0x3F;

const FACE_MAP: [(u16, u8); 4] = [
    (GAMEPAD_MASK_B3, PS4_MASK_SQUARE),
    (GAMEPAD_MASK_B1, PS4_MASK_CROSS),
    (GAMEPAD_MASK_B2, PS4_MASK_CIRCLE),
    (GAMEPAD_MASK_B4, PS4_MASK_TRIANGLE),
];

const SHOULDER_MAP: [(u16, u8); 8] = [
    (GAMEPAD_MASK_L1, PS4_MASK_L1),
    (GAMEPAD_MASK_R1, PS4_MASK_R1),
    (GAMEPAD_MASK_L2, PS4_MASK_L2),
    (GAMEPAD_MASK_R2, PS4_MASK_R2),
    (GAMEPAD_MASK_S1, PS4_MASK_SHARE),
    (GAMEPAD_MASK_S2, PS4_MASK_OPTIONS),
    (GAMEPAD_MASK_L3, PS4_MASK_L3),
    (GAMEPAD_MASK_R3, PS4_MASK_R3),
];

const SYSTEM_MAP: [(u16, u8); 2] = [
    (GAMEPAD_MASK_A1, PS4_MASK_PS),
    (GAMEPAD_MASK_A2, PS4_MASK_TOUCHPAD),
];

#[derive(Debug, Clone)]
pub struct Ps4Report {
    buffer: [u8; PS4_REPORT_SIZE],
    counter: u8,
}

impl Default for Ps4Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Ps4Report {
    #[must_use]
    pub fn new() -> Self {
        let mut buffer = [0; PS4_REPORT_SIZE];
        buffer[0] = PS4_REPORT_ID;
        buffer[1..5].fill(axis_to_u8(GAMEPAD_JOYSTICK_MID));
        buffer[5] = dpad_to_hat(0);
        Self { buffer, counter: 0 }
    }

    /// Counter value that the next encode will write.
    #[must_use]
    pub fn counter(&self) -> u8 {
        self.counter
    }
}

impl ReportAdapter for Ps4Report {
    fn encode(&mut self, state: &GamepadState) -> &[u8] {
        let b = &mut self.buffer;
        b[0] = PS4_REPORT_ID;
        b[1] = axis_to_u8(state.lx);
        b[2] = axis_to_u8(state.ly);
        b[3] = axis_to_u8(state.rx);
        b[4] = axis_to_u8(state.ry);
        b[5] = dpad_to_hat(state.dpad) | remap_buttons(state.buttons, &FACE_MAP);
        b[6] = remap_buttons(state.buttons, &SHOULDER_MAP);
        b[7] = remap_buttons(state.buttons, &SYSTEM_MAP) | (self.counter << 2);
        b[8] = trigger_value(state.pressed_button(GAMEPAD_MASK_L2));
        b[9] = trigger_value(state.pressed_button(GAMEPAD_MASK_R2));

        self.counter = (self.counter + 1) & PS4_COUNTER_MASK;
        &self.buffer
    }

    fn report(&self) -> &[u8] {
        &self.buffer
    }
}
