//! # Gamepad Simulator
//!
//! Runs the gamepad input core on a host with simulated pins.
//!
//! A scripted sequence of presses from the configuration drives the pins
//! while the gamepad polls at its normal cadence. Dispatched hotkeys and
//! every change of the output report are logged.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use gamepad_core::config::Config;
use gamepad_core::gamepad::clock::{SystemClock, GAMEPAD_POLL_MICRO};
use gamepad_core::gamepad::input::SimulatedPins;
use gamepad_core::gamepad::Gamepad;
use gamepad_core::simulator::Script;
use gamepad_core::telemetry::StateTracer;

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the gamepad simulator
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, `config/default.toml`, or built-in defaults)
///    - Build the gamepad on simulated pins and the system clock
///
/// 2. **Main Loop**
///    - Apply due script steps to the pins
///    - Let the gamepad run a cycle whenever its poll period has elapsed
///    - Log dispatched hotkeys, profile switches and report changes
///    - Append changed states to the trace when enabled
///
/// 3. **Shutdown**
///    - Stop after `simulator.duration_ms` or on Ctrl+C
///    - Flush the trace and log the cycle count
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be read or is invalid
/// - The trace directory or files cannot be written
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Gamepad simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_config(std::env::args().nth(1))?;
    info!(
        "Input mode {:?}, SOCD {:?}, d-pad {:?}",
        config.gamepad.options.input_mode,
        config.gamepad.options.socd_mode,
        config.gamepad.options.dpad_mode
    );

    let pins = SimulatedPins::new();
    let mut gamepad = Gamepad::new(&config, SystemClock::new(), pins.clone());
    let mut script = Script::from_config(&config.simulator);
    let mut tracer = if config.trace.enabled {
        let tracer = StateTracer::new(&config.trace).context("Failed to start state trace")?;
        info!("Tracing state changes to {}", tracer.log_dir().display());
        Some(tracer)
    } else {
        None
    };

    let mut poll = interval(Duration::from_micros(GAMEPAD_POLL_MICRO));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let duration_ms = config.simulator.duration_ms;
    let started = Instant::now();
    let mut last_report = gamepad.report().to_vec();
    let mut cycles: u64 = 0;

    info!("Running {} script step(s) for {}ms", script.len(), duration_ms);
    info!("Press Ctrl+C to exit");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                if elapsed_ms >= duration_ms {
                    info!("Simulation finished after {}ms", elapsed_ms);
                    break;
                }

                script.apply(elapsed_ms, &pins, gamepad.wired_mapping());

                let Some(outcome) = gamepad.tick() else {
                    continue;
                };
                cycles += 1;

                if let Some(hotkey) = outcome.hotkey {
                    info!("Hotkey {:?} at {}ms", hotkey, elapsed_ms);
                }
                if outcome.profile_changed {
                    info!("Profile {} active", gamepad.active_profile());
                }
                if outcome.options_changed {
                    debug!("Options now {:?}", gamepad.options());
                }

                if gamepad.report() != last_report.as_slice() {
                    info!("Report at {}ms: {:02x?}", elapsed_ms, gamepad.report());
                    last_report = gamepad.report().to_vec();
                }

                if let Some(tracer) = tracer.as_mut() {
                    tracer.record(
                        elapsed_ms as u32,
                        gamepad.active_profile(),
                        gamepad.state(),
                        outcome.hotkey,
                    )?;
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = &mut ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    if let Some(tracer) = tracer.as_mut() {
        tracer.flush()?;
    }
    info!("Ran {} cycles", cycles);

    Ok(())
}

/// Loads the configuration from `path`, the default file, or built-in defaults.
fn load_config(path: Option<String>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path).with_context(|| format!("Failed to load {}", path))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG_PATH);
            Config::load(DEFAULT_CONFIG_PATH)
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_PATH))
        }
        None => {
            info!("No configuration file, using defaults");
            Ok(Config::default())
        }
    }
}
