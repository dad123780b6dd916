//! # Report Adapters
//!
//! Serializes a resolved [`GamepadState`] into the fixed-size input report of
//! each supported output protocol.
//!
//! | Protocol | Adapter | Size |
//! |----------|---------|------|
//! | Generic HID (PS3-style) | [`hid::HidReport`] | 27 bytes |
//! | Switch | [`switch::SwitchReport`] | 8 bytes |
//! | XInput | [`xinput::XInputReport`] | 20 bytes |
//! | Keyboard | [`keyboard::KeyboardReport`] | 8 bytes |
//! | PS4 | [`ps4::Ps4Report`] | 64 bytes |
//!
//! Adapters only ever see fully resolved state (debounced, SOCD-cleaned,
//! hotkey chords consumed).

pub mod hid;
pub mod keyboard;
pub mod ps4;
pub mod switch;
pub mod xinput;

use crate::gamepad::options::InputMode;
use crate::gamepad::state::*;

use self::hid::HidReport;
use self::keyboard::{KeyboardMapping, KeyboardReport};
use self::ps4::Ps4Report;
use self::switch::SwitchReport;
use self::xinput::XInputReport;

/// Hat switch value for "no direction".
pub const HAT_CENTERED: u8 = 0x08;

/// Encodes resolved state into one protocol's report buffer.
pub trait ReportAdapter {
    /// Re-encodes the report from `state` and returns the buffer.
    fn encode(&mut self, state: &GamepadState) -> &[u8];

    /// The most recently encoded report.
    fn report(&self) -> &[u8];

    /// Report length in bytes.
    fn report_size(&self) -> usize {
        self.report().len()
    }
}

/// Converts d-pad bits to an 8-way hat value (0 = up, clockwise, 8 = centered).
///
/// Opposing bits have no hat value and report centered.
///
/// # Examples
///
/// ```
/// use gamepad_core::report::{dpad_to_hat, HAT_CENTERED};
/// use gamepad_core::gamepad::state::{GAMEPAD_MASK_UP, GAMEPAD_MASK_RIGHT, GAMEPAD_MASK_LEFT};
///
/// assert_eq!(dpad_to_hat(GAMEPAD_MASK_UP), 0);
/// assert_eq!(dpad_to_hat(GAMEPAD_MASK_UP | GAMEPAD_MASK_RIGHT), 1);
/// assert_eq!(dpad_to_hat(GAMEPAD_MASK_LEFT | GAMEPAD_MASK_RIGHT), HAT_CENTERED);
/// ```
#[must_use]
pub fn dpad_to_hat(dpad: u8) -> u8 {
    const UP: u8 = GAMEPAD_MASK_UP;
    const DOWN: u8 = GAMEPAD_MASK_DOWN;
    const LEFT: u8 = GAMEPAD_MASK_LEFT;
    const RIGHT: u8 = GAMEPAD_MASK_RIGHT;

    match dpad & GAMEPAD_MASK_DPAD {
        UP => 0,
        x if x == UP | RIGHT => 1,
        RIGHT => 2,
        x if x == DOWN | RIGHT => 3,
        DOWN => 4,
        x if x == DOWN | LEFT => 5,
        LEFT => 6,
        x if x == UP | LEFT => 7,
        _ => HAT_CENTERED,
    }
}

/// Scales a 16-bit axis to 8 bits.
#[must_use]
pub fn axis_to_u8(value: u16) -> u8 {
    (value >> 8) as u8
}

/// Digital trigger value for an 8-bit analog trigger byte.
#[must_use]
pub fn trigger_value(pressed: bool) -> u8 {
    if pressed {
        0xFF
    } else {
        0x00
    }
}

/// One adapter per protocol; only the active one is encoded each cycle.
#[derive(Debug, Clone)]
pub struct ReportSet {
    hid: HidReport,
    switch: SwitchReport,
    xinput: XInputReport,
    keyboard: KeyboardReport,
    ps4: Ps4Report,
}

impl ReportSet {
    #[must_use]
    pub fn new(keyboard: KeyboardMapping) -> Self {
        Self {
            hid: HidReport::new(),
            switch: SwitchReport::new(),
            xinput: XInputReport::new(),
            keyboard: KeyboardReport::new(keyboard),
            ps4: Ps4Report::new(),
        }
    }

    fn adapter_mut(&mut self, mode: InputMode) -> &mut dyn ReportAdapter {
        match mode {
            InputMode::Hid => &mut self.hid,
            InputMode::Switch => &mut self.switch,
            InputMode::Xinput => &mut self.xinput,
            InputMode::Keyboard => &mut self.keyboard,
            InputMode::Ps4 => &mut self.ps4,
        }
    }

    fn adapter(&self, mode: InputMode) -> &dyn ReportAdapter {
        match mode {
            InputMode::Hid => &self.hid,
            InputMode::Switch => &self.switch,
            InputMode::Xinput => &self.xinput,
            InputMode::Keyboard => &self.keyboard,
            InputMode::Ps4 => &self.ps4,
        }
    }

    /// Encodes `state` for `mode` and returns the report.
    pub fn encode(&mut self, mode: InputMode, state: &GamepadState) -> &[u8] {
        self.adapter_mut(mode).encode(state)
    }

    /// The last report encoded for `mode`.
    #[must_use]
    pub fn report(&self, mode: InputMode) -> &[u8] {
        self.adapter(mode).report()
    }

    #[must_use]
    pub fn report_size(&self, mode: InputMode) -> usize {
        self.adapter(mode).report_size()
    }
}
