//! # Gamepad Options
//!
//! Runtime modes read by every polling cycle.

use serde::{Deserialize, Serialize};

use super::socd::SocdMode;

/// Output protocol the gamepad reports as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputMode {
    #[default]
    Xinput,
    Switch,
    Hid,
    Keyboard,
    Ps4,
}

impl InputMode {
    /// Whether this protocol requires SOCD-clean d-pad input.
    ///
    /// Hat-switch protocols cannot express two opposing directions at once.
    #[must_use]
    pub fn requires_clean_socd(self) -> bool {
        matches!(self, InputMode::Hid | InputMode::Switch | InputMode::Ps4)
    }
}

/// How the d-pad is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DpadMode {
    /// D-pad bits reported as a d-pad/hat.
    #[default]
    Digital,
    /// D-pad drives the left analog stick.
    LeftAnalog,
    /// D-pad drives the right analog stick.
    RightAnalog,
}

/// Options owned by the configuration layer and read every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GamepadOptions {
    #[serde(default)]
    pub input_mode: InputMode,

    #[serde(default)]
    pub socd_mode: SocdMode,

    #[serde(default)]
    pub dpad_mode: DpadMode,

    /// Swap left and right before SOCD resolution.
    #[serde(default)]
    pub invert_x_axis: bool,

    /// Swap up and down before SOCD resolution.
    #[serde(default)]
    pub invert_y_axis: bool,

    /// Disable hotkey evaluation entirely.
    #[serde(default)]
    pub lock_hotkeys: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GamepadOptions::default();
        assert_eq!(options.input_mode, InputMode::Xinput);
        assert_eq!(options.socd_mode, SocdMode::Neutral);
        assert_eq!(options.dpad_mode, DpadMode::Digital);
        assert!(!options.invert_x_axis);
        assert!(!options.invert_y_axis);
        assert!(!options.lock_hotkeys);
    }

    #[test]
    fn test_clean_socd_protocol_set() {
        assert!(InputMode::Hid.requires_clean_socd());
        assert!(InputMode::Switch.requires_clean_socd());
        assert!(InputMode::Ps4.requires_clean_socd());
        assert!(!InputMode::Xinput.requires_clean_socd());
        assert!(!InputMode::Keyboard.requires_clean_socd());
    }

    #[test]
    fn test_deserialize_kebab_case() {
        let options: GamepadOptions = toml::from_str(
            r#"
input_mode = "ps4"
socd_mode = "second-input-priority"
dpad_mode = "right-analog"
invert_y_axis = true
"#,
        )
        .unwrap();

        assert_eq!(options.input_mode, InputMode::Ps4);
        assert_eq!(options.socd_mode, SocdMode::SecondInputPriority);
        assert_eq!(options.dpad_mode, DpadMode::RightAnalog);
        assert!(options.invert_y_axis);
        assert!(!options.invert_x_axis);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: std::result::Result<GamepadOptions, _> = toml::from_str("input_mode = \"n64\"");
        assert!(result.is_err());
    }
}
