//! # Gamepad Request Handle
//!
//! Lets other tasks change modes, switch profiles or load a new hotkey list
//! without touching the polling loop. Requests are queued and applied by the gamepad at the start
//! of its next cycle, so a cycle never observes a half-applied change.

use tokio::sync::mpsc;

use super::hotkey::HotkeyEntry;
use super::options::{DpadMode, InputMode};
use super::socd::SocdMode;
use crate::error::{GamepadError, Result};

/// A configuration change applied between polling cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GamepadRequest {
    SetInputMode(InputMode),
    SetSocdMode(SocdMode),
    SetDpadMode(DpadMode),
    ReassignProfile(u32),
    /// Replaces the whole hotkey list.
    SetHotkeys(Vec<HotkeyEntry>),
}

/// Cloneable sender side of a gamepad's request queue.
#[derive(Debug, Clone)]
pub struct GamepadHandle {
    sender: mpsc::UnboundedSender<GamepadRequest>,
}

impl GamepadHandle {
    pub(crate) fn new(sender: mpsc::UnboundedSender<GamepadRequest>) -> Self {
        Self { sender }
    }

    /// Queues a request.
    ///
    /// # Errors
    ///
    /// Returns [`GamepadError::Disconnected`] if the gamepad has been dropped.
    pub fn send(&self, request: GamepadRequest) -> Result<()> {
        self.sender
            .send(request)
            .map_err(|_| GamepadError::Disconnected)
    }

    pub fn set_input_mode(&self, mode: InputMode) -> Result<()> {
        self.send(GamepadRequest::SetInputMode(mode))
    }

    pub fn set_socd_mode(&self, mode: SocdMode) -> Result<()> {
        self.send(GamepadRequest::SetSocdMode(mode))
    }

    pub fn set_dpad_mode(&self, mode: DpadMode) -> Result<()> {
        self.send(GamepadRequest::SetDpadMode(mode))
    }

    /// Requests an atomic swap of the active pin profile.
    pub fn reassign_pins_for_profile(&self, profile_num: u32) -> Result<()> {
        self.send(GamepadRequest::ReassignProfile(profile_num))
    }

    /// Requests a wholesale swap of the hotkey list, e.g. after a config reload.
    pub fn set_hotkeys(&self, entries: Vec<HotkeyEntry>) -> Result<()> {
        self.send(GamepadRequest::SetHotkeys(entries))
    }
}
