//! Configuration for hookmeter.
//!
//! Configuration is resolved once at process start from environment variables
//! and passed explicitly to every component; component logic never reads
//! ambient state.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `HOOKMETER_BACKEND_URL` | No | collector default | Collector endpoint |
//! | `HOOKMETER_API_KEY` | No | - | Bearer token for uploads |
//! | `HOOKMETER_TIMEOUT_SECONDS` | No | 10 | Upload request timeout |
//! | `HOOKMETER_PLUGIN_ROOT` | No | install-relative | Plugin root directory |
//! | `CLAUDE_PLUGIN_ROOT` | No | - | Honored when the override above is unset |

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use thiserror::Error;

/// Default collector endpoint.
pub const DEFAULT_BACKEND_URL: &str = "https://collector.hookmeter.dev/v1/logs";

/// Default upload timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Log directory name relative to the plugin root.
const LOG_DIR_NAME: &str = "logs";

/// Active log file name.
const LOG_FILE_NAME: &str = "events.jsonl";

/// Tracking directory name relative to the plugin root.
const TRACKING_DIR_NAME: &str = "tracking";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// The plugin root could not be determined.
    #[error("failed to determine plugin root directory")]
    NoPluginRoot,
}

/// Configuration for the hookmeter pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Collector endpoint for uploads.
    pub backend_url: String,

    /// Optional bearer token sent with uploads.
    pub api_key: Option<String>,

    /// Upload request timeout.
    pub timeout: Duration,

    /// Root directory under which logs and tracking files live.
    pub plugin_root: PathBuf,
}

impl Config {
    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - `HOOKMETER_TIMEOUT_SECONDS` is set but is not a positive integer
    /// - No plugin root can be determined
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = env::var("HOOKMETER_BACKEND_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let api_key = env::var("HOOKMETER_API_KEY").ok().filter(|v| !v.is_empty());

        let timeout = match env::var("HOOKMETER_TIMEOUT_SECONDS") {
            Ok(val) => {
                let secs = val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "HOOKMETER_TIMEOUT_SECONDS".to_string(),
                    message: format!("expected positive integer, got '{val}'"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "HOOKMETER_TIMEOUT_SECONDS".to_string(),
                        message: "timeout must be at least 1 second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let plugin_root = resolve_plugin_root()?;

        Ok(Self {
            backend_url,
            api_key,
            timeout,
            plugin_root,
        })
    }

    /// Directory holding the active log file and the device-identity fallback.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.plugin_root.join(LOG_DIR_NAME)
    }

    /// Logical path of the active log file.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE_NAME)
    }

    /// Directory holding per-session tracking files.
    #[must_use]
    pub fn tracking_dir(&self) -> PathBuf {
        self.plugin_root.join(TRACKING_DIR_NAME)
    }
}

/// Resolves the plugin root: explicit override, host-provided root, then the
/// parent of the directory containing the running executable.
fn resolve_plugin_root() -> Result<PathBuf, ConfigError> {
    if let Ok(root) = env::var("HOOKMETER_PLUGIN_ROOT") {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }
    if let Ok(root) = env::var("CLAUDE_PLUGIN_ROOT") {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }

    env::current_exe()
        .ok()
        .and_then(|exe| {
            exe.parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
        .ok_or(ConfigError::NoPluginRoot)
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a `~` prefix pass through unchanged, as do paths when no
/// home directory can be determined.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let rest = rest.strip_prefix(['/', '\\']).unwrap_or(rest);
            return base_dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
