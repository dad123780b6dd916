//! # Button Mapping Tables
//!
//! Associates physical pins with logical inputs.
//!
//! Two tables are live at the same time:
//!
//! - the **wired** table, describing how the board is physically wired, and
//! - the **profile** table, describing which pin currently drives which
//!   logical input.
//!
//! A user can remap a pin in the active profile without touching the wired
//! table, so diagnostics and hotkeys can still ask what is physically
//! happening at a position.
//!
//! Tables are immutable once built and shared as `Arc<MappingTable>`.
//! Switching profiles swaps the `Arc`, so a polling cycle sees either the old
//! table or the new one, never a mix.

use std::sync::Arc;
use tracing::{debug, warn};

use super::input::{GamepadInput, INPUT_COUNT, NUM_BANK0_GPIOS};
use super::state::InputMasks;

/// Sentinel pin value for an unassigned mapping.
pub const PIN_UNASSIGNED: u8 = 0xFF;

/// Maximum number of alternative pin profiles (profiles 2..=4).
pub const MAX_ALTERNATIVE_PROFILES: usize = 3;

/// One pin-to-input assignment.
///
/// Either fully valid (`pin < 30`, `pin_mask == 1 << pin`) or fully
/// unassigned (`pin == PIN_UNASSIGNED`, `pin_mask == 0`).
///
/// # Examples
///
/// ```
/// use gamepad_core::gamepad::input::GamepadInput;
/// use gamepad_core::gamepad::mapping::{ButtonMapping, PIN_UNASSIGNED};
///
/// let mapping = ButtonMapping::new(2, GamepadInput::Up);
/// assert!(mapping.is_assigned());
/// assert_eq!(mapping.pin_mask(), 1 << 2);
///
/// let mapping = ButtonMapping::new(255, GamepadInput::Up);
/// assert!(!mapping.is_assigned());
/// assert_eq!(mapping.pin(), PIN_UNASSIGNED);
/// assert_eq!(mapping.pin_mask(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMapping {
    pin: u8,
    pin_mask: u32,
    input: GamepadInput,
}

impl ButtonMapping {
    /// Creates a mapping, normalizing out-of-range pins to unassigned.
    #[must_use]
    pub fn new(pin: u8, input: GamepadInput) -> Self {
        let mut mapping = Self {
            pin: PIN_UNASSIGNED,
            pin_mask: 0,
            input,
        };
        mapping.set_pin(pin);
        mapping
    }

    /// Creates an unassigned mapping for `input`.
    #[must_use]
    pub fn unassigned(input: GamepadInput) -> Self {
        Self::new(PIN_UNASSIGNED, input)
    }

    /// Reassigns the pin, normalizing out-of-range pins to unassigned.
    pub fn set_pin(&mut self, pin: u8) {
        if pin < NUM_BANK0_GPIOS {
            self.pin = pin;
            self.pin_mask = 1 << pin;
        } else {
            self.pin = PIN_UNASSIGNED;
            self.pin_mask = 0;
        }
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.pin != PIN_UNASSIGNED
    }

    #[must_use]
    pub fn pin(&self) -> u8 {
        self.pin
    }

    #[must_use]
    pub fn pin_mask(&self) -> u32 {
        self.pin_mask
    }

    /// The logical input this mapping drives.
    #[must_use]
    pub fn input(&self) -> GamepadInput {
        self.input
    }

    /// The logical bit this mapping drives inside its namespace.
    #[must_use]
    pub fn mask(&self) -> u32 {
        self.input.mask()
    }
}

/// Fixed-size pin table indexed by logical input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    entries: [ButtonMapping; INPUT_COUNT],
}

impl Default for MappingTable {
    fn default() -> Self {
        Self::from_pins(&[PIN_UNASSIGNED; INPUT_COUNT])
    }
}

impl MappingTable {
    /// Builds a table from one pin per input, in [`GamepadInput::ALL`] order.
    #[must_use]
    pub fn from_pins(pins: &[u8; INPUT_COUNT]) -> Self {
        let entries = GamepadInput::ALL.map(|input| {
            let pin = pins[input.index()];
            if pin != PIN_UNASSIGNED && pin >= NUM_BANK0_GPIOS {
                warn!(
                    "Pin {} for input '{}' is outside the GPIO bank, treating as unassigned",
                    pin,
                    input.name()
                );
            }
            ButtonMapping::new(pin, input)
        });
        Self { entries }
    }

    /// Returns the mapping for a logical input.
    #[must_use]
    pub fn get(&self, input: GamepadInput) -> &ButtonMapping {
        &self.entries[input.index()]
    }

    /// Returns the pin assigned to `input`, if any.
    #[must_use]
    pub fn pin_for(&self, input: GamepadInput) -> Option<u8> {
        let mapping = self.get(input);
        mapping.is_assigned().then_some(mapping.pin())
    }

    /// Returns the first logical input driven by `pin`, if any.
    #[must_use]
    pub fn input_for_pin(&self, pin: u8) -> Option<GamepadInput> {
        self.entries
            .iter()
            .find(|m| m.is_assigned() && m.pin() == pin)
            .map(ButtonMapping::input)
    }

    /// Bitmask of every pin this table reads.
    #[must_use]
    pub fn assigned_pins_mask(&self) -> u32 {
        self.entries.iter().fold(0, |acc, m| acc | m.pin_mask())
    }

    /// Iterates over all mappings in input order.
    pub fn iter(&self) -> impl Iterator<Item = &ButtonMapping> {
        self.entries.iter()
    }

    /// Translates a pressed-pin mask into logical masks.
    ///
    /// Unassigned mappings have a zero pin mask and never contribute.
    #[must_use]
    pub fn translate(&self, pressed_pins: u32) -> InputMasks {
        let mut masks = InputMasks::default();
        for mapping in &self.entries {
            if mapping.is_assigned() && (pressed_pins & mapping.pin_mask()) != 0 {
                masks.set(mapping.input().target());
            }
        }
        masks
    }
}

/// The base wiring plus any alternative pin layouts.
///
/// Profile numbers are 1-based: profile 1 is the base layout, profiles
/// 2..=4 are the alternatives in configuration order.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    base: Arc<MappingTable>,
    alternatives: Vec<Arc<MappingTable>>,
}

impl ProfileSet {
    /// Creates a profile set. Alternatives beyond the third are dropped.
    #[must_use]
    pub fn new(base: MappingTable, mut alternatives: Vec<MappingTable>) -> Self {
        if alternatives.len() > MAX_ALTERNATIVE_PROFILES {
            warn!(
                "{} alternative profiles configured, keeping the first {}",
                alternatives.len(),
                MAX_ALTERNATIVE_PROFILES
            );
            alternatives.truncate(MAX_ALTERNATIVE_PROFILES);
        }
        Self {
            base: Arc::new(base),
            alternatives: alternatives.into_iter().map(Arc::new).collect(),
        }
    }

    /// Number of selectable profiles, including the base layout.
    #[must_use]
    pub fn len(&self) -> u32 {
        1 + self.alternatives.len() as u32
    }

    /// A profile set always contains the base layout.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The base layout.
    #[must_use]
    pub fn base(&self) -> &Arc<MappingTable> {
        &self.base
    }

    /// Resolves a profile number to a table.
    ///
    /// Returns the profile number actually selected with its table. Unknown
    /// numbers select the base layout.
    #[must_use]
    pub fn get(&self, profile_num: u32) -> (u32, Arc<MappingTable>) {
        match profile_num
            .checked_sub(2)
            .and_then(|i| self.alternatives.get(i as usize))
        {
            Some(table) => (profile_num, Arc::clone(table)),
            None => {
                if profile_num != 1 {
                    debug!("Profile {} not configured, using base layout", profile_num);
                }
                (1, Arc::clone(&self.base))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::state::*;

    fn pins_with(assignments: &[(GamepadInput, u8)]) -> [u8; INPUT_COUNT] {
        let mut pins = [PIN_UNASSIGNED; INPUT_COUNT];
        for &(input, pin) in assignments {
            pins[input.index()] = pin;
        }
        pins
    }

    #[test]
    fn test_valid_pin_assignment() {
        let mapping = ButtonMapping::new(29, GamepadInput::A2);
        assert!(mapping.is_assigned());
        assert_eq!(mapping.pin(), 29);
        assert_eq!(mapping.pin_mask(), 1 << 29);
        assert_eq!(mapping.mask(), u32::from(GAMEPAD_MASK_A2));
    }

    #[test]
    fn test_out_of_range_pins_unassigned() {
        for pin in [30u8, 31, 100, 254, 255] {
            let mapping = ButtonMapping::new(pin, GamepadInput::B1);
            assert!(!mapping.is_assigned(), "pin {} should be unassigned", pin);
            assert_eq!(mapping.pin(), PIN_UNASSIGNED);
            assert_eq!(mapping.pin_mask(), 0);
        }
    }

    #[test]
    fn test_set_pin_normalizes_both_fields() {
        let mut mapping = ButtonMapping::new(4, GamepadInput::Right);
        mapping.set_pin(200);
        assert!(!mapping.is_assigned());
        assert_eq!(mapping.pin_mask(), 0);

        mapping.set_pin(6);
        assert!(mapping.is_assigned());
        assert_eq!(mapping.pin_mask(), 1 << 6);
        assert_eq!(mapping.input(), GamepadInput::Right);
    }

    #[test]
    fn test_unassigned_never_contributes() {
        let table = MappingTable::from_pins(&pins_with(&[(GamepadInput::Up, 255)]));
        // Every pin pressed
        let masks = table.translate(u32::MAX);
        assert_eq!(masks, InputMasks::default());
    }

    #[test]
    fn test_translate_maps_namespaces() {
        let table = MappingTable::from_pins(&pins_with(&[
            (GamepadInput::Up, 2),
            (GamepadInput::B1, 6),
            (GamepadInput::Function, 22),
        ]));

        let masks = table.translate((1 << 2) | (1 << 6) | (1 << 22));
        assert_eq!(masks.dpad, GAMEPAD_MASK_UP);
        assert_eq!(masks.buttons, GAMEPAD_MASK_B1);
        assert_eq!(masks.aux, AUX_MASK_FUNCTION);

        let masks = table.translate(1 << 6);
        assert_eq!(masks.dpad, 0);
        assert_eq!(masks.buttons, GAMEPAD_MASK_B1);
    }

    #[test]
    fn test_shared_pin_drives_both_inputs() {
        let table = MappingTable::from_pins(&pins_with(&[
            (GamepadInput::B1, 6),
            (GamepadInput::B2, 6),
        ]));
        let masks = table.translate(1 << 6);
        assert_eq!(masks.buttons, GAMEPAD_MASK_B1 | GAMEPAD_MASK_B2);
    }

    #[test]
    fn test_pin_lookups() {
        let table = MappingTable::from_pins(&pins_with(&[(GamepadInput::L1, 13)]));
        assert_eq!(table.pin_for(GamepadInput::L1), Some(13));
        assert_eq!(table.pin_for(GamepadInput::R1), None);
        assert_eq!(table.input_for_pin(13), Some(GamepadInput::L1));
        assert_eq!(table.input_for_pin(14), None);
        assert_eq!(table.assigned_pins_mask(), 1 << 13);
    }

    #[test]
    fn test_default_table_is_unassigned() {
        let table = MappingTable::default();
        assert!(table.iter().all(|m| !m.is_assigned()));
        assert_eq!(table.assigned_pins_mask(), 0);
    }

    #[test]
    fn test_profile_set_selection() {
        let base = MappingTable::from_pins(&pins_with(&[(GamepadInput::Up, 2)]));
        let alt = MappingTable::from_pins(&pins_with(&[(GamepadInput::Up, 5)]));
        let set = ProfileSet::new(base, vec![alt]);

        assert_eq!(set.len(), 2);

        let (num, table) = set.get(1);
        assert_eq!(num, 1);
        assert_eq!(table.pin_for(GamepadInput::Up), Some(2));

        let (num, table) = set.get(2);
        assert_eq!(num, 2);
        assert_eq!(table.pin_for(GamepadInput::Up), Some(5));
    }

    #[test]
    fn test_profile_set_unknown_falls_back_to_base() {
        let set = ProfileSet::new(MappingTable::default(), vec![]);
        for num in [0, 2, 3, 4, 99] {
            let (selected, table) = set.get(num);
            assert_eq!(selected, 1);
            assert!(Arc::ptr_eq(&table, set.base()));
        }
    }

    #[test]
    fn test_profile_set_caps_alternatives() {
        let alts = vec![MappingTable::default(); 5];
        let set = ProfileSet::new(MappingTable::default(), alts);
        assert_eq!(set.len(), 4);
    }
}
