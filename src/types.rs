//! Core data types for the hookmeter pipeline.
//!
//! This module defines the wire-level record written to the local event log,
//! the per-device identity value, the conversation model extracted from
//! transcripts, and the stdin contract shared by every hook dispatcher.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a logged event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

/// A stable, opaque per-device identifier.
///
/// The value is an uppercase canonical UUID, provisioned once per local user
/// account and persisted outside process memory. It correlates telemetry
/// without pinning to a human-identifying credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wraps an already-provisioned identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One structured telemetry entry.
///
/// Serialized as a single NDJSON line in the active log file. Field order
/// matches the collector's expected wire format. Records are immutable once
/// written; append order within a file is write order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// RFC 3339 timestamp with millisecond precision (UTC, `Z` suffix).
    pub timestamp: String,

    /// Severity of the record.
    pub level: Level,

    /// Name of the lifecycle hook that produced the record.
    pub hook_event_name: String,

    /// Host session identifier (`"unknown"` when the host omits it).
    pub session_id: String,

    /// Stable per-device identifier.
    pub device_id: DeviceId,

    /// Redacted, event-specific payload.
    pub data: serde_json::Value,
}

impl EventRecord {
    /// Creates a record with a fresh timestamp.
    #[must_use]
    pub fn new(
        level: Level,
        hook_event_name: &str,
        session_id: &str,
        device_id: DeviceId,
        data: serde_json::Value,
    ) -> Self {
        Self {
            timestamp: now_rfc3339_millis(),
            level,
            hook_event_name: hook_event_name.to_string(),
            session_id: session_id.to_string(),
            device_id,
            data,
        }
    }
}

/// Returns the current UTC time as RFC 3339 with millisecond precision.
#[must_use]
pub fn now_rfc3339_millis() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A content block that survived redaction.
///
/// Only `thinking` and `text` blocks exist in the output model; every other
/// transcript block type (tool calls, tool results, attachments) fails the
/// tagged decode and is dropped before it can reach disk or the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Thinking { thinking: String },
    Text { text: String },
}

/// One dialogue turn extracted from a transcript file.
///
/// Derived data only; never independently persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,

    /// Filtered content blocks; never empty (emptied turns are dropped).
    pub content: Vec<ContentBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Per-session bookkeeping written at session start.
///
/// Best-effort metadata for a future consumer; nothing in this pipeline
/// reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTracking {
    /// Non-blank line count of the transcript at session start.
    pub line_count: usize,

    /// Identifier of the last observed turn, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_turn_id: Option<String>,
}

/// The JSON object each dispatcher reads from standard input.
///
/// Every field is optional; unknown fields are ignored at decode time and can
/// never reach a logged payload, since payloads are built by allow-list
/// projection in [`crate::redact`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub transcript_path: Option<String>,

    #[serde(default)]
    pub cwd: Option<String>,

    #[serde(default)]
    pub permission_mode: Option<String>,

    #[serde(default)]
    pub hook_event_name: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,

    #[serde(default)]
    pub tool_input: Option<serde_json::Value>,

    #[serde(default)]
    pub tool_use_id: Option<String>,

    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub stop_hook_active: Option<bool>,

    #[serde(default)]
    pub source: Option<String>,
}
