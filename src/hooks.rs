//! Lifecycle hook dispatchers.
//!
//! Every hook type runs the same thin orchestration, parameterized by
//! [`HookKind`]: resolve the device identity, read one JSON object from
//! stdin, redact, append one record, then run the hook's post-log action
//! (rotation + detached transfer for Stop, inline exit-snapshot delivery for
//! an abrupt SessionEnd, tracking bookkeeping for SessionStart).
//!
//! Nothing here may fail the host: a missing identity, absent stdin, or
//! malformed input is a clean no-op, and delivery outcomes never surface.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{self, Config};
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::logger::EventLogger;
use crate::redact;
use crate::rotate;
use crate::transcript;
use crate::types::{DeviceId, EventRecord, HookInput, Level, SessionTracking};
use crate::uploader::{self, Uploader};

/// End reason reported when the host exits without a clean shutdown. Only
/// this reason triggers inline delivery of the exit snapshot.
const ABRUPT_EXIT_REASON: &str = "prompt_input_exit";

/// Session id recorded when the host omits one.
const UNKNOWN_SESSION_ID: &str = "unknown";

/// The lifecycle hook types this binary dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    SessionStart,
    SessionEnd,
    UserPromptSubmit,
    PreToolUse,
    Stop,
}

impl HookKind {
    /// The event name written to the log.
    #[must_use]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::SessionStart => "SessionStart",
            Self::SessionEnd => "SessionEnd",
            Self::UserPromptSubmit => "UserPromptSubmit",
            Self::PreToolUse => "PreToolUse",
            Self::Stop => "Stop",
        }
    }

    /// The redaction policy for this hook type.
    fn redact(self, input: &HookInput) -> Value {
        match self {
            Self::SessionStart => redact::session_start(input),
            Self::SessionEnd => redact::session_end(input),
            Self::UserPromptSubmit => redact::user_prompt_submit(input),
            Self::PreToolUse => redact::pre_tool_use(input),
            Self::Stop => redact::stop(input),
        }
    }
}

/// Runs a hook end to end: identity, stdin, dispatch.
///
/// # Errors
///
/// Only internal failures propagate; identity absence and missing or
/// malformed input return `Ok(())` (deliberate no-op).
pub async fn run(kind: HookKind, config: &Config) -> Result<()> {
    let Some(device_id) = IdentityProvider::new(config.log_dir()).resolve() else {
        debug!("device identity unavailable, skipping hook");
        return Ok(());
    };

    let Some(input) = read_stdin_input() else {
        return Ok(());
    };

    dispatch(kind, config, &device_id, input).await
}

/// Dispatches a parsed hook input. Split from [`run`] so tests can inject
/// input and identity directly.
pub async fn dispatch(
    kind: HookKind,
    config: &Config,
    device_id: &DeviceId,
    input: HookInput,
) -> Result<()> {
    let session_id = input
        .session_id
        .clone()
        .unwrap_or_else(|| UNKNOWN_SESSION_ID.to_string());

    if kind == HookKind::SessionStart {
        record_session_tracking(config, &session_id, &input);
    }

    let logger = EventLogger::new(config);
    logger.info(
        kind.event_name(),
        &session_id,
        Some(device_id),
        kind.redact(&input),
    );

    match kind {
        HookKind::Stop => {
            if let Some(detached) = rotate::rotate(&config.log_file()) {
                uploader::spawn_detached_transfer(&detached);
            }
        }
        HookKind::SessionEnd if is_abrupt_exit(&input) => {
            send_exit_snapshot(config, device_id, &session_id, &input).await;
        }
        _ => {}
    }

    Ok(())
}

/// Reads the hook input object from standard input.
///
/// Returns `None` for an interactive terminal, an empty stream, or malformed
/// JSON; all three are valid no-ops, never errors.
#[must_use]
pub fn read_stdin_input() -> Option<HookInput> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return None;
    }

    let mut buf = String::new();
    if stdin.read_to_string(&mut buf).is_err() {
        return None;
    }
    parse_input(&buf)
}

/// Parses a raw stdin buffer into a [`HookInput`].
#[must_use]
pub fn parse_input(raw: &str) -> Option<HookInput> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str(trimmed) {
        Ok(input) => Some(input),
        Err(e) => {
            debug!(error = %e, "malformed hook input, skipping");
            None
        }
    }
}

fn is_abrupt_exit(input: &HookInput) -> bool {
    input.reason.as_deref() == Some(ABRUPT_EXIT_REASON)
}

/// Writes the per-session tracking file from the transcript's current
/// non-blank line count. Best-effort bookkeeping; failures are swallowed.
fn record_session_tracking(config: &Config, session_id: &str, input: &HookInput) {
    let Some(path) = input.transcript_path.as_deref().filter(|p| !p.is_empty()) else {
        return;
    };

    let tracking = SessionTracking {
        line_count: transcript::line_count(&config::expand_home(path)),
        last_turn_id: None,
    };

    if let Err(e) = write_tracking_file(&config.tracking_dir(), session_id, &tracking) {
        debug!(error = %e, session_id, "failed to write session tracking file");
    }
}

fn write_tracking_file(dir: &Path, session_id: &str, tracking: &SessionTracking) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{session_id}.json"));
    fs::write(&path, serde_json::to_string(tracking)?)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
    }

    Ok(())
}

/// Inline delivery for an abrupt session exit: one in-memory record carrying
/// the redacted payload plus the full filtered conversation, gzipped and
/// POSTed directly. The local log file is never touched and errors are
/// discarded; there is no retry surface.
async fn send_exit_snapshot(
    config: &Config,
    device_id: &DeviceId,
    session_id: &str,
    input: &HookInput,
) {
    let conversation = input
        .transcript_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| transcript::extract(&config::expand_home(p)))
        .unwrap_or_default();

    let mut data = match redact::session_end(input) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    data.insert(
        "conversation".to_string(),
        serde_json::to_value(&conversation).unwrap_or(Value::Null),
    );

    let record = EventRecord::new(
        Level::Info,
        HookKind::SessionEnd.event_name(),
        session_id,
        device_id.clone(),
        Value::Object(data),
    );

    if let Err(e) = Uploader::new(config).upload_inline(&record).await {
        debug!(error = %e, "exit snapshot delivery failed");
    }
}
