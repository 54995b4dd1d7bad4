//! Append-only NDJSON event logging.
//!
//! The [`EventLogger`] owns the active log file's write position within this
//! process. Each record is serialized to one JSON line and appended with a
//! single write on an append-mode handle, so a record from this process is
//! never split by a concurrent writer. Interleaved lines from other processes
//! appending to the same path are tolerated; consumers parse line by line and
//! skip anything malformed.
//!
//! Failure policy: appending must never fail the calling hook. Every I/O or
//! serialization failure is swallowed and traced.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::types::{DeviceId, EventRecord, Level};

/// Appends structured event records to the active log file.
#[derive(Debug, Clone)]
pub struct EventLogger {
    log_dir: PathBuf,
    log_file: PathBuf,
}

impl EventLogger {
    /// Creates a logger writing to the configured active log path.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            log_dir: config.log_dir(),
            log_file: config.log_file(),
        }
    }

    /// Appends one event record.
    ///
    /// No-op when `device_id` is `None` (telemetry disabled). Creates the log
    /// directory and file on first use. Failures are swallowed.
    pub fn append(
        &self,
        level: Level,
        event: &str,
        session_id: &str,
        device_id: Option<&DeviceId>,
        data: serde_json::Value,
    ) {
        let Some(device_id) = device_id else {
            return;
        };

        let record = EventRecord::new(level, event, session_id, device_id.clone(), data);
        if let Err(e) = self.try_append(&record) {
            debug!(error = %e, event, "failed to append event record");
        }
    }

    /// Appends at info level.
    pub fn info(
        &self,
        event: &str,
        session_id: &str,
        device_id: Option<&DeviceId>,
        data: serde_json::Value,
    ) {
        self.append(Level::Info, event, session_id, device_id, data);
    }

    /// Appends at warn level.
    pub fn warn(
        &self,
        event: &str,
        session_id: &str,
        device_id: Option<&DeviceId>,
        data: serde_json::Value,
    ) {
        self.append(Level::Warn, event, session_id, device_id, data);
    }

    /// Appends at error level.
    pub fn error(
        &self,
        event: &str,
        session_id: &str,
        device_id: Option<&DeviceId>,
        data: serde_json::Value,
    ) {
        self.append(Level::Error, event, session_id, device_id, data);
    }

    fn try_append(&self, record: &EventRecord) -> Result<()> {
        fs::create_dir_all(&self.log_dir)?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        // One write per record keeps lines whole under O_APPEND.
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}
