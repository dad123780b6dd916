//! # State Trace
//!
//! Appends one JSON line per state change. A record is written when the
//! published state differs from the last recorded one or a hotkey was
//! dispatched; identical consecutive states are skipped.
//!
//! Files are named `gamepad_trace_<start time>_<seq>.jsonl` and sort in
//! creation order.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::TraceConfig;
use crate::error::Result;
use crate::gamepad::hotkey::GamepadHotkey;
use crate::gamepad::state::GamepadState;

const TRACE_FILE_PREFIX: &str = "gamepad_trace_";
const TRACE_FILE_EXTENSION: &str = "jsonl";

/// One line of a trace file.
#[derive(Debug, Clone, Serialize)]
pub struct TraceRecord {
    pub timestamp: DateTime<Utc>,
    /// Gamepad clock at the cycle that produced the state.
    pub millis: u32,
    pub profile: u32,
    pub dpad: u8,
    pub buttons: u16,
    pub aux: u16,
    pub dwires: u8,
    pub bwires: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotkey: Option<GamepadHotkey>,
}

/// Rotating JSONL writer for published states.
pub struct StateTracer {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    run_stamp: String,
    file_seq: u32,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    last_state: Option<GamepadState>,
}

impl StateTracer {
    /// Creates the trace directory if needed. No file is opened until the
    /// first record.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn new(config: &TraceConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir)?;
        Ok(Self {
            log_dir: PathBuf::from(&config.log_dir),
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            run_stamp: Utc::now().format("%Y%m%d_%H%M%S").to_string(),
            file_seq: 0,
            writer: None,
            records_in_file: 0,
            last_state: None,
        })
    }

    /// Records `state` if it changed or a hotkey fired. Returns whether a
    /// line was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub fn record(
        &mut self,
        millis: u32,
        profile: u32,
        state: &GamepadState,
        hotkey: Option<GamepadHotkey>,
    ) -> Result<bool> {
        if hotkey.is_none() && self.last_state.as_ref() == Some(state) {
            return Ok(false);
        }

        let record = TraceRecord {
            timestamp: Utc::now(),
            millis,
            profile,
            dpad: state.dpad,
            buttons: state.buttons,
            aux: state.aux,
            dwires: state.dwires,
            bwires: state.bwires,
            hotkey,
        };

        let writer = self.writer_for_next_record()?;
        serde_json::to_writer(&mut *writer, &record)?;
        writer.write_all(b"\n")?;

        self.records_in_file += 1;
        self.last_state = Some(*state);
        Ok(true)
    }

    /// Flushes buffered lines to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn writer_for_next_record(&mut self) -> Result<&mut BufWriter<File>> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }
        match self.writer.as_mut() {
            Some(writer) => Ok(writer),
            None => Err(std::io::Error::other("trace file not open").into()),
        }
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        self.file_seq += 1;
        let path = self.log_dir.join(format!(
            "{}{}_{:04}.{}",
            TRACE_FILE_PREFIX, self.run_stamp, self.file_seq, TRACE_FILE_EXTENSION
        ));
        debug!("Opening trace file {}", path.display());

        self.writer = Some(BufWriter::new(File::create(&path)?));
        self.records_in_file = 0;
        self.prune()
    }

    /// Deletes the oldest trace files beyond the retention limit.
    fn prune(&self) -> Result<()> {
        let mut files = trace_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for old in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&old) {
                warn!("Failed to remove old trace file {}: {}", old.display(), e);
            }
        }
        Ok(())
    }
}

impl Drop for StateTracer {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush trace file: {}", e);
        }
    }
}

/// Lists trace files in `dir`.
pub fn trace_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_trace = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(TRACE_FILE_PREFIX))
            && path.extension().is_some_and(|ext| ext == TRACE_FILE_EXTENSION);
        if is_trace {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::state::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, per_file: usize, keep: usize) -> TraceConfig {
        TraceConfig {
            enabled: true,
            log_dir: dir.path().to_string_lossy().into_owned(),
            max_records_per_file: per_file,
            max_files_to_keep: keep,
        }
    }

    fn state_with_buttons(buttons: u16) -> GamepadState {
        GamepadState {
            buttons,
            bwires: buttons,
            ..Default::default()
        }
    }

    fn read_lines(dir: &Path) -> Vec<serde_json::Value> {
        let mut files = trace_files(dir).unwrap();
        files.sort();
        files
            .iter()
            .flat_map(|path| {
                fs::read_to_string(path)
                    .unwrap()
                    .lines()
                    .map(|line| serde_json::from_str(line).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_records_written_as_jsonl() {
        let dir = TempDir::new().unwrap();
        let mut tracer = StateTracer::new(&config(&dir, 100, 10)).unwrap();

        let state = GamepadState {
            dpad: GAMEPAD_MASK_UP,
            dwires: GAMEPAD_MASK_UP,
            ..Default::default()
        };
        assert!(tracer.record(7, 1, &state, None).unwrap());
        assert!(tracer.record(8, 1, &state, Some(GamepadHotkey::HomeButton)).unwrap());
        tracer.flush().unwrap();

        let lines = read_lines(dir.path());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["millis"], 7);
        assert_eq!(lines[0]["dpad"], 1);
        assert_eq!(lines[0]["profile"], 1);
        assert!(lines[0].get("hotkey").is_none());
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["hotkey"], "home-button");
    }

    #[test]
    fn test_unchanged_state_skipped() {
        let dir = TempDir::new().unwrap();
        let mut tracer = StateTracer::new(&config(&dir, 100, 10)).unwrap();
        let state = state_with_buttons(GAMEPAD_MASK_B1);

        assert!(tracer.record(0, 1, &state, None).unwrap());
        assert!(!tracer.record(1, 1, &state, None).unwrap());
        assert!(!tracer.record(2, 1, &state, None).unwrap());
        assert!(tracer.record(3, 1, &GamepadState::default(), None).unwrap());
        tracer.flush().unwrap();

        assert_eq!(read_lines(dir.path()).len(), 2);
    }

    #[test]
    fn test_rotation_and_retention() {
        let dir = TempDir::new().unwrap();
        let mut tracer = StateTracer::new(&config(&dir, 2, 2)).unwrap();

        for i in 0..5u16 {
            tracer.record(u32::from(i), 1, &state_with_buttons(1 << i), None).unwrap();
        }
        tracer.flush().unwrap();

        // 5 records at 2 per file make 3 files, the oldest is pruned
        assert_eq!(trace_files(dir.path()).unwrap().len(), 2);

        let lines = read_lines(dir.path());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["millis"], 2);
        assert_eq!(lines[2]["millis"], 4);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = TraceConfig {
            enabled: true,
            log_dir: nested.to_string_lossy().into_owned(),
            max_records_per_file: 10,
            max_files_to_keep: 1,
        };

        let tracer = StateTracer::new(&config).unwrap();
        assert!(tracer.log_dir().is_dir());
    }

    #[test]
    fn test_other_files_left_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        let mut tracer = StateTracer::new(&config(&dir, 1, 1)).unwrap();
        for i in 0..3u16 {
            tracer.record(0, 1, &state_with_buttons(1 << i), None).unwrap();
        }
        tracer.flush().unwrap();

        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(trace_files(dir.path()).unwrap().len(), 1);
    }
}
