//! # Gamepad State Controller
//!
//! Runs the per-cycle input pipeline:
//!
//! 1. Apply queued requests and any profile load a hotkey asked for
//! 2. Sample pins, debounce, translate through the wired and active tables
//! 3. Axis inversion, SOCD cleaning, hotkeys, d-pad mode conversion
//! 4. Encode the report for the active protocol
//!
//! Mapping tables are swapped whole between cycles, so a cycle sees either
//! the old profile or the new one and never a mix.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

use super::clock::{Clock, PollTimer};
use super::debouncer::Debouncer;
use super::handle::{GamepadHandle, GamepadRequest};
use super::hotkey::{GamepadHotkey, HotkeyEngine, HotkeyEntry};
use super::input::{PinReader, NUM_BANK0_GPIOS};
use super::mapping::{MappingTable, ProfileSet};
use super::options::{DpadMode, GamepadOptions, InputMode};
use super::socd::{resolve_socd_mode, SocdMode, SocdResolver};
use super::state::*;
use crate::config::Config;
use crate::report::ReportSet;

const GPIO_BANK_MASK: u32 = (1u32 << NUM_BANK0_GPIOS) - 1;

/// What happened during one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Hotkey dispatched this cycle, if any.
    pub hotkey: Option<GamepadHotkey>,
    /// A hotkey changed the persisted options.
    pub options_changed: bool,
    /// The active profile changed at the start of this cycle.
    pub profile_changed: bool,
}

/// One gamepad instance. Instances share no state.
pub struct Gamepad<C: Clock, P: PinReader> {
    clock: C,
    pins: P,
    options: GamepadOptions,
    socd_mode: SocdMode,
    debouncer: Debouncer,
    wired: Arc<MappingTable>,
    profiles: ProfileSet,
    active: Arc<MappingTable>,
    active_profile: u32,
    pending_profile: Option<u32>,
    hotkeys: HotkeyEngine,
    socd: SocdResolver,
    raw_state: RawState,
    state: GamepadState,
    reports: ReportSet,
    timer: PollTimer,
    sender: mpsc::UnboundedSender<GamepadRequest>,
    requests: mpsc::UnboundedReceiver<GamepadRequest>,
}

impl<C: Clock, P: PinReader> Gamepad<C, P> {
    /// Builds a gamepad from configuration, starting on profile 1.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `clock` - Time source for debouncing and poll cadence
    /// * `pins` - GPIO bank reader
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_core::config::Config;
    /// use gamepad_core::gamepad::clock::{Clock, ManualClock};
    /// use gamepad_core::gamepad::controller::Gamepad;
    /// use gamepad_core::gamepad::input::SimulatedPins;
    /// use gamepad_core::gamepad::state::GAMEPAD_MASK_B1;
    ///
    /// let clock = ManualClock::new();
    /// let pins = SimulatedPins::new();
    /// let mut gamepad = Gamepad::new(&Config::default(), clock.clone(), pins.clone());
    ///
    /// pins.press(6); // B1 on the stock wiring
    /// for _ in 0..=5 {
    ///     gamepad.run_cycle();
    ///     clock.advance_ms(1);
    /// }
    /// assert!(gamepad.state().pressed_button(GAMEPAD_MASK_B1));
    /// ```
    pub fn new(config: &Config, clock: C, pins: P) -> Self {
        let options = config.options();
        let profiles = ProfileSet::new(config.wired_mapping(), config.profile_mappings());
        let wired = Arc::clone(profiles.base());
        let (sender, requests) = mpsc::unbounded_channel();

        debug!(
            "Gamepad created: {} wired pin(s), {} profile(s), {} hotkey(s), {}ms debounce",
            wired.assigned_pins_mask().count_ones(),
            profiles.len(),
            config.hotkeys.len(),
            config.gamepad.debounce_ms
        );

        Self {
            clock,
            pins,
            options,
            socd_mode: resolve_socd_mode(&options),
            debouncer: Debouncer::new(config.gamepad.debounce_ms),
            active: Arc::clone(&wired),
            wired,
            profiles,
            active_profile: 1,
            pending_profile: None,
            hotkeys: HotkeyEngine::new(config.hotkey_entries()),
            socd: SocdResolver::new(),
            raw_state: RawState::default(),
            state: GamepadState::default(),
            reports: ReportSet::new(config.keyboard_mapping()),
            timer: PollTimer::default(),
            sender,
            requests,
        }
    }

    /// Returns a handle for changing modes from another task.
    #[must_use]
    pub fn handle(&self) -> GamepadHandle {
        GamepadHandle::new(self.sender.clone())
    }

    /// Runs a cycle if the poll period has elapsed.
    ///
    /// Meant to be called every [`GAMEPAD_POLL_MICRO`](super::clock::GAMEPAD_POLL_MICRO)
    /// microseconds or more often.
    pub fn tick(&mut self) -> Option<CycleOutcome> {
        if self.timer.ready(self.clock.micros()) {
            Some(self.run_cycle())
        } else {
            None
        }
    }

    /// Runs one full cycle regardless of cadence.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();

        while let Ok(request) = self.requests.try_recv() {
            self.apply_request(request, &mut outcome);
        }

        if let Some(profile_num) = self.pending_profile.take() {
            outcome.profile_changed |= self.switch_profile(profile_num, false);
        }

        self.read();
        let processed = self.process();

        CycleOutcome {
            hotkey: processed.hotkey,
            options_changed: processed.options_changed,
            profile_changed: outcome.profile_changed,
        }
    }

    /// Samples the pins and builds the wired and profile views.
    pub fn read(&mut self) {
        let pressed = !self.pins.read_levels() & GPIO_BANK_MASK;
        let debounced = self.debouncer.debounce(pressed, self.clock.millis());
        self.log_pin_edges(debounced);

        let wired = self.wired.translate(debounced);
        let profile = self.active.translate(debounced);

        self.raw_state = RawState {
            pins: debounced,
            dpad: wired.dpad,
            buttons: wired.buttons,
            aux: wired.aux,
        };
        self.state = GamepadState {
            dpad: profile.dpad,
            buttons: profile.buttons,
            aux: profile.aux,
            dwires: wired.dpad,
            bwires: wired.buttons,
            ..GamepadState::default()
        };
    }

    /// Resolves the state built by [`read`](Self::read) and encodes the report.
    pub fn process(&mut self) -> CycleOutcome {
        let mut outcome = CycleOutcome::default();
        let mut state = self.state;

        if self.options.invert_x_axis {
            state.dpad = swap_bits(state.dpad, GAMEPAD_MASK_LEFT, GAMEPAD_MASK_RIGHT);
        }
        if self.options.invert_y_axis {
            state.dpad = swap_bits(state.dpad, GAMEPAD_MASK_UP, GAMEPAD_MASK_DOWN);
        }

        state.dpad = self.socd.resolve(state.dpad, self.socd_mode);

        if !self.options.lock_hotkeys {
            if let Some(matched) = self.hotkeys.evaluate(&mut state) {
                if let Some(button) = matched.action.held_button() {
                    state.buttons |= button;
                }
                if matched.dispatched {
                    debug!("Hotkey dispatched: {:?}", matched.action);
                    outcome.hotkey = Some(matched.action);
                    outcome.options_changed = self.dispatch(matched.action);
                }
            }
        }

        match self.options.dpad_mode {
            DpadMode::Digital => {}
            DpadMode::LeftAnalog => {
                state.lx = dpad_to_analog_x(state.dpad);
                state.ly = dpad_to_analog_y(state.dpad);
                state.dpad = 0;
            }
            DpadMode::RightAnalog => {
                state.rx = dpad_to_analog_x(state.dpad);
                state.ry = dpad_to_analog_y(state.dpad);
                state.dpad = 0;
            }
        }

        trace!(
            "dpad={:#06b} buttons={:#06x} aux={:#06x}",
            state.dpad,
            state.buttons,
            state.aux
        );

        self.state = state;
        self.reports.encode(self.options.input_mode, &self.state);
        outcome
    }

    /// Applies a latched hotkey action. Returns true if options changed.
    fn dispatch(&mut self, action: GamepadHotkey) -> bool {
        let mut options = self.options;
        match action {
            GamepadHotkey::DpadDigital => options.dpad_mode = DpadMode::Digital,
            GamepadHotkey::DpadLeftAnalog => options.dpad_mode = DpadMode::LeftAnalog,
            GamepadHotkey::DpadRightAnalog => options.dpad_mode = DpadMode::RightAnalog,
            GamepadHotkey::SocdUpPriority => options.socd_mode = SocdMode::UpPriority,
            GamepadHotkey::SocdNeutral => options.socd_mode = SocdMode::Neutral,
            GamepadHotkey::SocdSecondInput => options.socd_mode = SocdMode::SecondInputPriority,
            GamepadHotkey::SocdBypass => options.socd_mode = SocdMode::Bypass,
            GamepadHotkey::InvertXAxis => options.invert_x_axis = !options.invert_x_axis,
            GamepadHotkey::InvertYAxis => options.invert_y_axis = !options.invert_y_axis,
            GamepadHotkey::LoadProfile1 => self.pending_profile = Some(1),
            GamepadHotkey::LoadProfile2 => self.pending_profile = Some(2),
            GamepadHotkey::LoadProfile3 => self.pending_profile = Some(3),
            GamepadHotkey::LoadProfile4 => self.pending_profile = Some(4),
            GamepadHotkey::NextProfile => {
                self.pending_profile = Some(self.active_profile % self.profiles.len() + 1);
            }
            GamepadHotkey::PreviousProfile => {
                self.pending_profile = Some(match self.active_profile {
                    1 => self.profiles.len(),
                    n => n - 1,
                });
            }
            // Button injection happens every held cycle, not on dispatch
            GamepadHotkey::HomeButton
            | GamepadHotkey::CaptureButton
            | GamepadHotkey::L3Button
            | GamepadHotkey::R3Button
            | GamepadHotkey::None => {}
        }

        if options == self.options {
            return false;
        }
        info!("Options changed by hotkey {:?}: {:?}", action, options);
        self.options = options;
        self.refresh_socd_mode();
        true
    }

    fn apply_request(&mut self, request: GamepadRequest, outcome: &mut CycleOutcome) {
        debug!("Applying request: {:?}", request);
        match request {
            GamepadRequest::SetInputMode(mode) => self.set_input_mode(mode),
            GamepadRequest::SetSocdMode(mode) => self.set_socd_mode(mode),
            GamepadRequest::SetDpadMode(mode) => self.set_dpad_mode(mode),
            GamepadRequest::ReassignProfile(num) => {
                // A later external request beats a hotkey load queued earlier
                self.pending_profile = None;
                outcome.profile_changed |= self.switch_profile(num, true);
            }
            GamepadRequest::SetHotkeys(entries) => self.set_hotkeys(entries),
        }
    }

    /// Swaps the active table. Returns true if the profile number changed.
    fn switch_profile(&mut self, profile_num: u32, reset_latch: bool) -> bool {
        let (selected, table) = self.profiles.get(profile_num);
        let changed = selected != self.active_profile;

        self.active = table;
        self.active_profile = selected;
        self.socd.reset();
        if reset_latch {
            self.hotkeys.reset();
        }

        if changed {
            info!("Switched to profile {}", selected);
        }
        changed
    }

    fn log_pin_edges(&self, debounced: u32) {
        let mut changed = debounced ^ self.raw_state.pins;
        while changed != 0 {
            let pin = changed.trailing_zeros() as u8;
            changed &= changed - 1;
            let level = if debounced & (1 << pin) != 0 { "pressed" } else { "released" };
            match self.wired.input_for_pin(pin) {
                Some(input) => debug!("Pin {} ({}) {}", pin, input.name(), level),
                None => trace!("Unwired pin {} {}", pin, level),
            }
        }
    }

    fn refresh_socd_mode(&mut self) {
        let effective = resolve_socd_mode(&self.options);
        if effective != self.options.socd_mode {
            debug!(
                "SOCD mode {:?} not allowed for {:?}, using {:?}",
                self.options.socd_mode, self.options.input_mode, effective
            );
        }
        self.socd_mode = effective;
    }

    /// Atomically swaps the active pin profile.
    ///
    /// Unknown profile numbers select profile 1. Returns the profile now
    /// active.
    pub fn reassign_pins_for_profile(&mut self, profile_num: u32) -> u32 {
        self.pending_profile = None;
        self.switch_profile(profile_num, true);
        self.active_profile
    }

    /// Replaces the hotkey list and clears the dispatch latch.
    ///
    /// A chord held across the swap dispatches its new action on the next
    /// cycle.
    pub fn set_hotkeys(&mut self, entries: Vec<HotkeyEntry>) {
        debug!("Hotkey list replaced: {} slot(s)", entries.len());
        self.hotkeys.replace_entries(entries);
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        if self.options.input_mode != mode {
            info!("Input mode: {:?}", mode);
        }
        self.options.input_mode = mode;
        self.refresh_socd_mode();
    }

    pub fn set_socd_mode(&mut self, mode: SocdMode) {
        if self.options.socd_mode != mode {
            info!("SOCD mode: {:?}", mode);
        }
        self.options.socd_mode = mode;
        self.refresh_socd_mode();
    }

    pub fn set_dpad_mode(&mut self, mode: DpadMode) {
        if self.options.dpad_mode != mode {
            info!("D-pad mode: {:?}", mode);
        }
        self.options.dpad_mode = mode;
    }

    #[must_use]
    pub fn options(&self) -> &GamepadOptions {
        &self.options
    }

    /// SOCD mode in effect after protocol coercion.
    #[must_use]
    pub fn socd_mode(&self) -> SocdMode {
        self.socd_mode
    }

    /// The last published state.
    #[must_use]
    pub fn state(&self) -> &GamepadState {
        &self.state
    }

    #[must_use]
    pub fn raw_state(&self) -> &RawState {
        &self.raw_state
    }

    #[must_use]
    pub fn active_profile(&self) -> u32 {
        self.active_profile
    }

    #[must_use]
    pub fn active_mapping(&self) -> &MappingTable {
        &self.active
    }

    #[must_use]
    pub fn wired_mapping(&self) -> &MappingTable {
        &self.wired
    }

    /// Report for the active protocol, as of the last cycle.
    #[must_use]
    pub fn report(&self) -> &[u8] {
        self.reports.report(self.options.input_mode)
    }

    #[must_use]
    pub fn report_size(&self) -> usize {
        self.reports.report_size(self.options.input_mode)
    }
}

/// Exchanges two d-pad bits.
fn swap_bits(dpad: u8, a: u8, b: u8) -> u8 {
    let mut out = dpad & !(a | b);
    if dpad & a != 0 {
        out |= b;
    }
    if dpad & b != 0 {
        out |= a;
    }
    out
}
