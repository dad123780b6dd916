//! # Telemetry Module
//!
//! Records published gamepad states to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting state changes as JSONL (JSON Lines)
//! - Writing to rotating trace files (max N records per file)
//! - Retaining only the last M files

pub mod trace;

pub use trace::{StateTracer, TraceRecord};
