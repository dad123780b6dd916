//! # Hotkey Engine
//!
//! Detects chorded hotkeys in the resolved state.
//!
//! Entries are checked in list order and the first one whose button, d-pad
//! and aux masks are all held wins; list order is priority order. The matched
//! chord's button and d-pad bits are cleared from the state so the same press
//! is never reported both as a hotkey and as normal input.
//!
//! Dispatch is edge-triggered: the engine latches the last matched action and
//! only reports a dispatch when the matched action differs from the latch.
//! Releasing the chord resets the latch, so pressing it again dispatches
//! again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::input::{GamepadInput, InputTarget};
use super::state::*;

/// Maximum number of hotkey slots.
pub const MAX_HOTKEYS: usize = 12;

/// Action bound to a hotkey. `None` (id 0) marks an unused slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum GamepadHotkey {
    #[default]
    None = 0,
    DpadDigital = 1,
    DpadLeftAnalog = 2,
    DpadRightAnalog = 3,
    HomeButton = 4,
    CaptureButton = 5,
    SocdUpPriority = 6,
    SocdNeutral = 7,
    SocdSecondInput = 8,
    SocdBypass = 9,
    InvertXAxis = 10,
    InvertYAxis = 11,
    L3Button = 12,
    R3Button = 13,
    LoadProfile1 = 14,
    LoadProfile2 = 15,
    LoadProfile3 = 16,
    LoadProfile4 = 17,
    NextProfile = 18,
    PreviousProfile = 19,
}

impl GamepadHotkey {
    /// Numeric action identifier.
    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Whether this slot has an action configured.
    #[must_use]
    pub fn is_assigned(self) -> bool {
        self != GamepadHotkey::None
    }

    /// Button pressed on every cycle the chord is held, for button-injecting actions.
    #[must_use]
    pub fn held_button(self) -> Option<u16> {
        match self {
            GamepadHotkey::HomeButton => Some(GAMEPAD_MASK_A1),
            GamepadHotkey::CaptureButton => Some(GAMEPAD_MASK_A2),
            GamepadHotkey::L3Button => Some(GAMEPAD_MASK_L3),
            GamepadHotkey::R3Button => Some(GAMEPAD_MASK_R3),
            _ => None,
        }
    }
}

/// One hotkey slot.
///
/// # Examples
///
/// ```
/// use gamepad_core::gamepad::hotkey::{GamepadHotkey, HotkeyEntry};
/// use gamepad_core::gamepad::input::GamepadInput;
/// use gamepad_core::gamepad::state::GamepadState;
///
/// let entry = HotkeyEntry::from_inputs(
///     &[GamepadInput::S1, GamepadInput::S2, GamepadInput::Up],
///     GamepadHotkey::HomeButton,
/// );
///
/// let mut state = GamepadState::default();
/// assert!(!entry.pressed(&state));
///
/// state.buttons = entry.buttons_mask;
/// state.dpad = entry.dpad_mask;
/// assert!(entry.pressed(&state));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HotkeyEntry {
    pub buttons_mask: u16,
    pub dpad_mask: u8,
    pub aux_mask: u16,
    pub action: GamepadHotkey,
}

impl HotkeyEntry {
    /// Builds an entry whose chord is the given inputs.
    #[must_use]
    pub fn from_inputs(inputs: &[GamepadInput], action: GamepadHotkey) -> Self {
        let mut entry = Self {
            action,
            ..Default::default()
        };
        for input in inputs {
            match input.target() {
                InputTarget::Dpad(mask) => entry.dpad_mask |= mask,
                InputTarget::Button(mask) => entry.buttons_mask |= mask,
                InputTarget::Aux(mask) => entry.aux_mask |= mask,
            }
        }
        entry
    }

    /// True when the slot is assigned and its whole chord is held.
    #[must_use]
    pub fn pressed(&self, state: &GamepadState) -> bool {
        self.action.is_assigned()
            && state.pressed_button(self.buttons_mask)
            && state.pressed_dpad(self.dpad_mask)
            && state.pressed_aux(self.aux_mask)
    }

    /// Clears this chord's button and d-pad bits from `state`.
    ///
    /// Aux bits are left in place.
    pub fn consume(&self, state: &mut GamepadState) {
        state.buttons &= !self.buttons_mask;
        state.dpad &= !self.dpad_mask;
    }
}

/// Returns the first entry whose chord is held, in list order.
#[must_use]
pub fn select_hotkey<'a>(entries: &'a [HotkeyEntry], state: &GamepadState) -> Option<&'a HotkeyEntry> {
    entries.iter().find(|entry| entry.pressed(state))
}

fn truncate_slots(entries: Vec<HotkeyEntry>) -> Arc<[HotkeyEntry]> {
    entries.into_iter().take(MAX_HOTKEYS).collect()
}

/// A hotkey matched during one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyMatch {
    pub action: GamepadHotkey,
    /// True only on the cycle the action first matched.
    pub dispatched: bool,
}

/// Edge-triggered hotkey evaluation over an ordered slot list.
#[derive(Debug, Clone)]
pub struct HotkeyEngine {
    entries: Arc<[HotkeyEntry]>,
    last_action: GamepadHotkey,
}

impl HotkeyEngine {
    /// Creates an engine over `entries`; slots past [`MAX_HOTKEYS`] are ignored.
    #[must_use]
    pub fn new(entries: Vec<HotkeyEntry>) -> Self {
        Self {
            entries: truncate_slots(entries),
            last_action: GamepadHotkey::None,
        }
    }

    /// Replaces the whole slot list and clears the dispatch latch.
    pub fn replace_entries(&mut self, entries: Vec<HotkeyEntry>) {
        self.entries = truncate_slots(entries);
        self.last_action = GamepadHotkey::None;
    }

    #[must_use]
    pub fn entries(&self) -> &[HotkeyEntry] {
        &self.entries
    }

    /// The action matched on the previous evaluation.
    #[must_use]
    pub fn last_action(&self) -> GamepadHotkey {
        self.last_action
    }

    /// Evaluates the slots against `state`, consuming the matched chord.
    pub fn evaluate(&mut self, state: &mut GamepadState) -> Option<HotkeyMatch> {
        let Some(entry) = select_hotkey(&self.entries, state).copied() else {
            self.last_action = GamepadHotkey::None;
            return None;
        };

        entry.consume(state);
        let dispatched = entry.action != self.last_action;
        self.last_action = entry.action;

        Some(HotkeyMatch {
            action: entry.action,
            dispatched,
        })
    }

    /// Clears the dispatch latch.
    pub fn reset(&mut self) {
        self.last_action = GamepadHotkey::None;
    }
}
