//! # Configuration Module
//!
//! Loads and validates the gamepad configuration from TOML.
//!
//! Every section is optional. A missing `[pins]` table uses the stock Pico
//! wiring and a missing `[[hotkeys]]` list uses the stock hotkey set, so an
//! empty file yields a working gamepad.

use serde::de::Error;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{GamepadError, Result};
use crate::gamepad::debouncer::DEFAULT_DEBOUNCE_MS;
use crate::gamepad::hotkey::{GamepadHotkey, HotkeyEntry, MAX_HOTKEYS};
use crate::gamepad::input::{GamepadInput, INPUT_COUNT};
use crate::gamepad::mapping::{MappingTable, MAX_ALTERNATIVE_PROFILES, PIN_UNASSIGNED};
use crate::gamepad::options::GamepadOptions;
use crate::report::keyboard::KeyboardMapping;

/// Longest accepted debounce interval.
pub const MAX_DEBOUNCE_MS: u32 = 1000;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub gamepad: GamepadConfig,

    /// Wired layout, also the layout of profile 1
    #[serde(default)]
    pub pins: PinConfig,

    /// Alternative profiles 2..=4
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,

    #[serde(default = "default_hotkeys")]
    pub hotkeys: Vec<HotkeyConfig>,

    /// HID keycode overrides for keyboard mode
    #[serde(default)]
    pub keyboard: BTreeMap<GamepadInput, u8>,

    #[serde(default)]
    pub trace: TraceConfig,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gamepad: GamepadConfig::default(),
            pins: PinConfig::default(),
            profiles: Vec::new(),
            hotkeys: default_hotkeys(),
            keyboard: BTreeMap::new(),
            trace: TraceConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

/// Runtime options and input conditioning
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GamepadConfig {
    #[serde(flatten)]
    pub options: GamepadOptions,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            options: GamepadOptions::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// GPIO assigned to each input. Inputs left out are unassigned.
///
/// Pins are kept as TOML integers so any out-of-range value, negative or
/// past `u8`, is unassigned with a warning instead of failing the load.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct PinConfig(pub BTreeMap<GamepadInput, i64>);

impl Default for PinConfig {
    /// Stock Raspberry Pi Pico wiring.
    fn default() -> Self {
        use GamepadInput::*;
        Self(BTreeMap::from([
            (Up, 2),
            (Down, 3),
            (Right, 4),
            (Left, 5),
            (B1, 6),
            (B2, 7),
            (R2, 8),
            (L2, 9),
            (B3, 10),
            (B4, 11),
            (R1, 12),
            (L1, 13),
            (S1, 16),
            (S2, 17),
            (L3, 18),
            (R3, 19),
            (A1, 20),
            (A2, 21),
        ]))
    }
}

impl PinConfig {
    /// Flattens the map into table order.
    #[must_use]
    pub fn to_array(&self) -> [u8; INPUT_COUNT] {
        let mut pins = [PIN_UNASSIGNED; INPUT_COUNT];
        for (&input, &pin) in &self.0 {
            pins[input.index()] = pin_number(input, pin);
        }
        pins
    }
}

/// Narrows a configured pin; values outside `u8` become unassigned.
fn pin_number(input: GamepadInput, pin: i64) -> u8 {
    u8::try_from(pin).unwrap_or_else(|_| {
        warn!(
            "Pin {} for input '{}' is outside the GPIO bank, treating as unassigned",
            pin,
            input.name()
        );
        PIN_UNASSIGNED
    })
}

/// Alternative profile: pin overrides applied on top of `[pins]`
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub pins: BTreeMap<GamepadInput, i64>,
}

/// One hotkey slot
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HotkeyConfig {
    #[serde(default)]
    pub inputs: Vec<GamepadInput>,

    #[serde(default)]
    pub action: GamepadHotkey,
}

impl HotkeyConfig {
    fn new(inputs: &[GamepadInput], action: GamepadHotkey) -> Self {
        Self {
            inputs: inputs.to_vec(),
            action,
        }
    }

    #[must_use]
    pub fn to_entry(&self) -> HotkeyEntry {
        HotkeyEntry::from_inputs(&self.inputs, self.action)
    }
}

/// State trace configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

/// Scripted input for the host simulator
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    #[serde(default)]
    pub steps: Vec<SimulatorStep>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            steps: Vec::new(),
        }
    }
}

/// Inputs pressed and released once `at_ms` has elapsed
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SimulatorStep {
    pub at_ms: u64,

    #[serde(default)]
    pub press: Vec<GamepadInput>,

    #[serde(default)]
    pub release: Vec<GamepadInput>,
}

// Default value functions
fn default_debounce_ms() -> u32 { DEFAULT_DEBOUNCE_MS }

fn default_hotkeys() -> Vec<HotkeyConfig> {
    use GamepadInput::{Down, Left, Right, Up, S1, S2};
    vec![
        HotkeyConfig::new(&[S1, S2, Down], GamepadHotkey::DpadDigital),
        HotkeyConfig::new(&[S1, S2, Left], GamepadHotkey::DpadLeftAnalog),
        HotkeyConfig::new(&[S1, S2, Right], GamepadHotkey::DpadRightAnalog),
        HotkeyConfig::new(&[S1, S2, Up], GamepadHotkey::HomeButton),
    ]
}

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

fn default_duration_ms() -> u64 { 200 }

fn invalid(message: impl std::fmt::Display) -> GamepadError {
    GamepadError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_core::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_core::config::Config;
    /// use gamepad_core::gamepad::socd::SocdMode;
    ///
    /// let config = Config::parse("[gamepad]\nsocd_mode = \"up-priority\"\n").unwrap();
    /// assert_eq!(config.gamepad.options.socd_mode, SocdMode::UpPriority);
    /// assert_eq!(config.gamepad.debounce_ms, 5);
    /// ```
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Out-of-range pins are not rejected here; the mapping table logs and
    /// unassigns them.
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.gamepad.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(invalid(format!(
                "debounce_ms must be at most {}",
                MAX_DEBOUNCE_MS
            )));
        }

        if self.profiles.len() > MAX_ALTERNATIVE_PROFILES {
            return Err(invalid(format!(
                "at most {} alternative profiles are supported, found {}",
                MAX_ALTERNATIVE_PROFILES,
                self.profiles.len()
            )));
        }

        if self.hotkeys.len() > MAX_HOTKEYS {
            return Err(invalid(format!(
                "at most {} hotkeys are supported, found {}",
                MAX_HOTKEYS,
                self.hotkeys.len()
            )));
        }

        for (index, hotkey) in self.hotkeys.iter().enumerate() {
            if hotkey.action.is_assigned() && hotkey.inputs.is_empty() {
                return Err(invalid(format!(
                    "hotkey {} ({:?}) has no inputs",
                    index + 1,
                    hotkey.action
                )));
            }
        }

        if self.trace.enabled {
            if self.trace.log_dir.is_empty() {
                return Err(invalid("trace log_dir cannot be empty when enabled"));
            }
            if self.trace.max_records_per_file == 0 {
                return Err(invalid("max_records_per_file must be greater than 0"));
            }
            if self.trace.max_files_to_keep == 0 {
                return Err(invalid("max_files_to_keep must be greater than 0"));
            }
        }

        if self.simulator.duration_ms == 0 {
            return Err(invalid("simulator duration_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Runtime options at startup.
    #[must_use]
    pub fn options(&self) -> GamepadOptions {
        self.gamepad.options
    }

    /// Mapping table for the wired layout.
    #[must_use]
    pub fn wired_mapping(&self) -> MappingTable {
        MappingTable::from_pins(&self.pins.to_array())
    }

    /// Mapping tables for profiles 2..=4, in order.
    #[must_use]
    pub fn profile_mappings(&self) -> Vec<MappingTable> {
        let wired = self.pins.to_array();
        self.profiles
            .iter()
            .map(|profile| {
                let mut pins = wired;
                for (&input, &pin) in &profile.pins {
                    pins[input.index()] = pin_number(input, pin);
                }
                MappingTable::from_pins(&pins)
            })
            .collect()
    }

    #[must_use]
    pub fn hotkey_entries(&self) -> Vec<HotkeyEntry> {
        self.hotkeys.iter().map(HotkeyConfig::to_entry).collect()
    }

    #[must_use]
    pub fn keyboard_mapping(&self) -> KeyboardMapping {
        KeyboardMapping::with_overrides(&self.keyboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::options::{DpadMode, InputMode};
    use crate::gamepad::socd::SocdMode;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn assert_config_error(result: Result<Config>, needle: &str) {
        match result {
            Err(GamepadError::Config(e)) => {
                assert!(e.to_string().contains(needle), "unexpected message: {}", e);
            }
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    // ===== Default Tests =====

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gamepad.debounce_ms, 5);
        assert_eq!(config.options(), GamepadOptions::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.pins, PinConfig::default());
        assert_eq!(config.hotkeys, default_hotkeys());
        assert!(config.profiles.is_empty());
        assert!(!config.trace.enabled);
        assert_eq!(config.simulator.duration_ms, 200);
    }

    #[test]
    fn test_pico_wiring() {
        let table = Config::default().wired_mapping();

        assert_eq!(table.pin_for(GamepadInput::Up), Some(2));
        assert_eq!(table.pin_for(GamepadInput::Left), Some(5));
        assert_eq!(table.pin_for(GamepadInput::R2), Some(8));
        assert_eq!(table.pin_for(GamepadInput::A2), Some(21));
        assert_eq!(table.pin_for(GamepadInput::Function), None);
    }

    #[test]
    fn test_default_hotkeys() {
        let entries = Config::default().hotkey_entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].action, GamepadHotkey::DpadDigital);
        assert_eq!(entries[3].action, GamepadHotkey::HomeButton);
        assert_eq!(
            entries[3].buttons_mask,
            crate::gamepad::state::GAMEPAD_MASK_S1 | crate::gamepad::state::GAMEPAD_MASK_S2
        );
        assert_eq!(entries[3].dpad_mask, crate::gamepad::state::GAMEPAD_MASK_UP);
    }

    // ===== Parse Tests =====

    #[test]
    fn test_load_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[gamepad]
input_mode = "switch"
socd_mode = "second-input-priority"
dpad_mode = "left-analog"
debounce_ms = 8
invert_y_axis = true
lock_hotkeys = true

[pins]
up = 14
down = 15
b1 = 0

[[profiles]]
name = "swapped"
pins = {{ up = 15, down = 14 }}

[[hotkeys]]
inputs = ["s1", "function"]
action = "next-profile"

[keyboard]
b1 = 0xE1

[trace]
enabled = true
log_dir = "/tmp/trace"
max_records_per_file = 50
max_files_to_keep = 2

[simulator]
duration_ms = 40

[[simulator.steps]]
at_ms = 5
press = ["up"]

[[simulator.steps]]
at_ms = 20
release = ["up"]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        let options = config.options();
        assert_eq!(options.input_mode, InputMode::Switch);
        assert_eq!(options.socd_mode, SocdMode::SecondInputPriority);
        assert_eq!(options.dpad_mode, DpadMode::LeftAnalog);
        assert!(!options.invert_x_axis);
        assert!(options.invert_y_axis);
        assert!(options.lock_hotkeys);
        assert_eq!(config.gamepad.debounce_ms, 8);

        let wired = config.wired_mapping();
        assert_eq!(wired.pin_for(GamepadInput::Up), Some(14));
        assert_eq!(wired.pin_for(GamepadInput::B1), Some(0));
        assert_eq!(wired.pin_for(GamepadInput::B2), None);

        let profiles = config.profile_mappings();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].pin_for(GamepadInput::Up), Some(15));
        assert_eq!(profiles[0].pin_for(GamepadInput::Down), Some(14));
        assert_eq!(profiles[0].pin_for(GamepadInput::B1), Some(0));

        assert_eq!(config.hotkeys.len(), 1);
        assert_eq!(config.hotkeys[0].action, GamepadHotkey::NextProfile);

        assert_eq!(config.keyboard_mapping().keycode(GamepadInput::B1), 0xE1);

        assert!(config.trace.enabled);
        assert_eq!(config.trace.max_files_to_keep, 2);

        assert_eq!(config.simulator.duration_ms, 40);
        assert_eq!(config.simulator.steps.len(), 2);
        assert_eq!(config.simulator.steps[1].release, vec![GamepadInput::Up]);
    }

    #[test]
    fn test_out_of_range_pin_is_not_an_error() {
        let config = Config::parse("[pins]\nup = 45\ndown = 3\n").unwrap();
        let table = config.wired_mapping();

        assert_eq!(table.pin_for(GamepadInput::Up), None);
        assert_eq!(table.pin_for(GamepadInput::Down), Some(3));
    }

    #[test]
    fn test_pin_past_u8_range_is_unassigned() {
        let config = Config::parse(
            r#"
[pins]
up = 300
down = -1
left = 5

[[profiles]]
pins = { left = 70000 }
"#,
        )
        .unwrap();

        let wired = config.wired_mapping();
        assert_eq!(wired.pin_for(GamepadInput::Up), None);
        assert_eq!(wired.pin_for(GamepadInput::Down), None);
        assert_eq!(wired.pin_for(GamepadInput::Left), Some(5));

        let profiles = config.profile_mappings();
        assert_eq!(profiles[0].pin_for(GamepadInput::Left), None);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = Config::parse("[[hotkeys]]\ninputs = [\"s1\"]\naction = \"self-destruct\"\n");
        assert!(matches!(result, Err(GamepadError::Config(_))));
    }

    #[test]
    fn test_unknown_input_rejected() {
        let result = Config::parse("[pins]\nturbo = 4\n");
        assert!(matches!(result, Err(GamepadError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load("/nonexistent/gamepad.toml");
        assert!(matches!(result, Err(GamepadError::Io(_))));
    }

    // ===== Validation Tests =====

    #[test]
    fn test_debounce_too_long() {
        assert_config_error(
            Config::parse("[gamepad]\ndebounce_ms = 1001\n"),
            "debounce_ms",
        );
        assert!(Config::parse("[gamepad]\ndebounce_ms = 0\n").is_ok());
    }

    #[test]
    fn test_too_many_profiles() {
        let toml = "[[profiles]]\n".repeat(4);
        assert_config_error(Config::parse(&toml), "alternative profiles");
    }

    #[test]
    fn test_too_many_hotkeys() {
        let toml = "[[hotkeys]]\ninputs = [\"s1\"]\naction = \"home-button\"\n".repeat(13);
        assert_config_error(Config::parse(&toml), "hotkeys");
    }

    #[test]
    fn test_hotkey_without_inputs() {
        assert_config_error(
            Config::parse("[[hotkeys]]\naction = \"socd-bypass\"\n"),
            "no inputs",
        );
    }

    #[test]
    fn test_unused_hotkey_slot_allowed() {
        let config = Config::parse("[[hotkeys]]\naction = \"none\"\n").unwrap();
        assert!(!config.hotkey_entries()[0].action.is_assigned());
    }

    #[test]
    fn test_trace_limits() {
        assert_config_error(
            Config::parse("[trace]\nenabled = true\nlog_dir = \"\"\n"),
            "log_dir",
        );
        assert_config_error(
            Config::parse("[trace]\nenabled = true\nmax_records_per_file = 0\n"),
            "max_records_per_file",
        );
        assert_config_error(
            Config::parse("[trace]\nenabled = true\nmax_files_to_keep = 0\n"),
            "max_files_to_keep",
        );
        // Limits are only checked when tracing is on
        assert!(Config::parse("[trace]\nmax_files_to_keep = 0\n").is_ok());
    }

    #[test]
    fn test_simulator_duration() {
        assert_config_error(
            Config::parse("[simulator]\nduration_ms = 0\n"),
            "duration_ms",
        );
    }
}
