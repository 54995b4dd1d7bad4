//! Compressed upload of telemetry to the remote collector.
//!
//! Two delivery modes exist:
//!
//! - **File mode**: a detached log file is read, gzip-compressed, and POSTed
//!   as NDJSON. The source file is deleted only on a confirmed 2xx response;
//!   any failure leaves it on disk for manual or future recovery. No retry,
//!   no delete-on-failure.
//! - **Inline mode**: a single in-memory [`EventRecord`] is gzipped and
//!   POSTed without ever touching the local log file. There is no file to
//!   retry from, so delivery is strictly best-effort and callers discard
//!   errors.
//!
//! Both modes are bounded by the configured request timeout. File-mode
//! uploads are triggered through [`spawn_detached_transfer`], which re-execs
//! this binary as an independent process with no inherited stdio and no
//! parent-exit dependency, so the triggering hook can exit immediately.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::types::EventRecord;

/// Subcommand name used when re-execing for a detached file-mode upload.
pub const TRANSFER_SUBCOMMAND: &str = "transfer";

/// Errors that can occur during upload.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The detached log file does not exist.
    #[error("log file not found: {0}")]
    Missing(PathBuf),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request exceeded the configured timeout and was aborted.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The collector answered with a non-2xx status.
    #[error("collector rejected upload: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Uploads telemetry to the configured collector endpoint.
pub struct Uploader {
    backend_url: String,
    api_key: Option<String>,
    timeout: Duration,
    client: Client,
}

impl Uploader {
    /// Creates an uploader from the process configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            backend_url: config.backend_url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            client,
        }
    }

    /// File mode: uploads a detached log file, deleting it on success.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` on any failure; the source file is left intact
    /// in every failure case.
    pub async fn upload_file(&self, path: &Path) -> Result<(), UploadError> {
        if !path.is_file() {
            return Err(UploadError::Missing(path.to_path_buf()));
        }

        let contents = fs::read(path)?;
        let body = gzip(&contents)?;
        self.post(body, "application/x-ndjson").await?;

        // The only deletion point for rotated files.
        fs::remove_file(path)?;
        Ok(())
    }

    /// Inline mode: uploads a single in-memory record.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` on any failure. Nothing is persisted either way.
    pub async fn upload_inline(&self, record: &EventRecord) -> Result<(), UploadError> {
        let json = serde_json::to_vec(record)?;
        let body = gzip(&json)?;
        self.post(body, "application/json").await
    }

    async fn post(&self, body: Vec<u8>, content_type: &'static str) -> Result<(), UploadError> {
        let mut request = self
            .client
            .post(&self.backend_url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_ENCODING, "gzip")
            .header(CONTENT_LENGTH, body.len());

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.body(body).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(UploadError::Timeout(self.timeout)),
            Err(e) => return Err(UploadError::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Error bodies are captured for diagnostics only, never parsed.
        let body = response.text().await.unwrap_or_default();
        Err(UploadError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Launches a detached file-mode upload for a rotated log file.
///
/// Re-execs the current binary with the `transfer` subcommand, all stdio
/// null, in its own process group on Unix. The child is never awaited and
/// its outcome is never observed by the caller; spawn failures are swallowed.
pub fn spawn_detached_transfer(detached_path: &Path) {
    let exe = match env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            debug!(error = %e, "cannot locate own executable, skipping transfer");
            return;
        }
    };

    let mut command = Command::new(exe);
    command
        .arg(TRANSFER_SUBCOMMAND)
        .arg(detached_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    match command.spawn() {
        Ok(child) => {
            debug!(pid = child.id(), detached = %detached_path.display(), "spawned transfer process");
        }
        Err(e) => {
            debug!(error = %e, "failed to spawn transfer process");
        }
    }
}

/// Gzip-compresses a byte slice.
fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
