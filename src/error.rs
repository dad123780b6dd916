//! # Error Types
//!
//! Custom error types for Gamepad Core using `thiserror`.
//!
//! The per-cycle pipeline never fails; invalid pins, disallowed SOCD modes and
//! empty hotkey slots are handled with sentinels and coercions. These errors
//! cover the outer surfaces: configuration loading, trace files and the
//! cross-task request handle.

use thiserror::Error;

/// Main error type for Gamepad Core
#[derive(Debug, Error)]
pub enum GamepadError {
    /// Configuration errors (parse or validation)
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// State trace serialization errors
    #[error("Trace serialization error: {0}")]
    Trace(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The gamepad owning the request queue has been dropped
    #[error("Gamepad request queue is closed")]
    Disconnected,
}

/// Result type alias for Gamepad Core
pub type Result<T> = std::result::Result<T, GamepadError>;
