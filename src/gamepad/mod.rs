//! # Gamepad Module
//!
//! Per-cycle input processing for a GPIO game controller.
//!
//! This module handles:
//! - Pin-to-input mapping tables (wired layout and switchable profiles)
//! - Time-window debouncing of every pin
//! - SOCD cleaning of opposing d-pad directions
//! - Chorded hotkeys with edge-triggered dispatch
//! - The controller that runs all of the above once per millisecond

pub mod input;
pub mod state;
pub mod options;
pub mod mapping;
pub mod debouncer;
pub mod socd;
pub mod hotkey;
pub mod clock;
pub mod handle;
pub mod controller;

pub use controller::{CycleOutcome, Gamepad};
pub use handle::{GamepadHandle, GamepadRequest};
pub use options::{DpadMode, GamepadOptions, InputMode};
pub use socd::SocdMode;
