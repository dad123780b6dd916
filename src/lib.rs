//! # Gamepad Core Library
//!
//! Input-processing core for GPIO game controllers.
//!
//! This library turns raw, bouncy pin levels into a stable controller state:
//! it debounces every pin, maps physical pins to logical buttons through a
//! wired layout and a switchable profile layout, resolves simultaneous
//! opposing directions (SOCD), detects hotkey chords and encodes the result
//! into the report format of the active output protocol.

pub mod config;
pub mod error;
pub mod gamepad;
pub mod report;
pub mod simulator;
pub mod telemetry;
