//! # Input Script
//!
//! Replays timed press/release steps against [`SimulatedPins`] so the
//! gamepad can be exercised on a host without hardware.
//!
//! Steps name logical inputs; they are resolved to pins through the wired
//! mapping table, so a script keeps working when the wiring changes.
//! Inputs with no wired pin are skipped with a warning.

use tracing::{debug, warn};

use crate::config::{SimulatorConfig, SimulatorStep};
use crate::gamepad::input::{GamepadInput, SimulatedPins};
use crate::gamepad::mapping::MappingTable;

/// Ordered list of steps with a cursor.
#[derive(Debug, Clone)]
pub struct Script {
    steps: Vec<SimulatorStep>,
    next: usize,
}

impl Script {
    /// Builds a script; steps are sorted by time, keeping file order for ties.
    #[must_use]
    pub fn new(mut steps: Vec<SimulatorStep>) -> Self {
        steps.sort_by_key(|step| step.at_ms);
        Self { steps, next: 0 }
    }

    #[must_use]
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(config.steps.clone())
    }

    /// Applies every step whose time has come. Returns the number applied.
    pub fn apply(&mut self, elapsed_ms: u64, pins: &SimulatedPins, wired: &MappingTable) -> usize {
        let mut applied = 0;
        while let Some(step) = self.steps.get(self.next) {
            if step.at_ms > elapsed_ms {
                break;
            }
            debug!(
                "Script step at {}ms: press {:?}, release {:?}",
                step.at_ms, step.press, step.release
            );
            for &input in &step.release {
                if let Some(pin) = wired_pin(wired, input) {
                    pins.release(pin);
                }
            }
            for &input in &step.press {
                if let Some(pin) = wired_pin(wired, input) {
                    pins.press(pin);
                }
            }
            self.next += 1;
            applied += 1;
        }
        applied
    }

    /// True once every step has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next >= self.steps.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

fn wired_pin(wired: &MappingTable, input: GamepadInput) -> Option<u8> {
    let pin = wired.pin_for(input);
    if pin.is_none() {
        warn!("Script input '{}' has no wired pin, skipping", input.name());
    }
    pin
}
