//! hookmeter - privacy-filtered lifecycle-hook telemetry.
//!
//! This crate implements the telemetry pipeline invoked from a host
//! application's lifecycle hooks: each hook invocation is a short-lived
//! process that resolves a stable per-device identity, redacts the event
//! payload, and appends one NDJSON record to a local log. On designated
//! events the active log is atomically rotated away and handed to a
//! detached uploader process for compressed delivery to the collector.
//!
//! # Privacy
//!
//! Payloads are built by allow-list projection in the [`redact`] module:
//! identifier fields (file paths, transcript paths) are replaced by
//! truncated SHA-256 digests before they ever reach disk, and fields no
//! policy names are dropped. Transcript extraction keeps only `text` and
//! `thinking` content blocks.
//!
//! # Failure policy
//!
//! Telemetry must never fail the host. An unavailable identity, absent or
//! malformed stdin, rotation contention, and delivery failures all degrade
//! to "telemetry did not happen this time".
//!
//! # Modules
//!
//! - [`types`]: wire records, identity, conversation model, stdin contract
//! - [`config`]: configuration from environment variables
//! - [`error`]: error types
//! - [`identity`]: per-device identity provisioning
//! - [`redact`]: payload redaction policies and content-block filtering
//! - [`logger`]: append-only NDJSON event logging
//! - [`transcript`]: conversation extraction from transcript files
//! - [`rotate`]: atomic log-file rotation
//! - [`uploader`]: compressed upload, file and inline modes
//! - [`hooks`]: parameterized hook dispatchers

pub mod config;
pub mod error;
pub mod hooks;
pub mod identity;
pub mod logger;
pub mod redact;
pub mod rotate;
pub mod transcript;
pub mod types;
pub mod uploader;

pub use config::{Config, ConfigError};
pub use error::{HookError, Result};
pub use hooks::HookKind;
pub use identity::IdentityProvider;
pub use logger::EventLogger;
pub use types::{
    ContentBlock, ConversationTurn, DeviceId, EventRecord, HookInput, Level, Role,
    SessionTracking,
};
pub use uploader::{UploadError, Uploader};
