//! Stable per-device identity provisioning.
//!
//! Resolves an opaque uppercase UUID unique to the local user account,
//! creating and persisting one on first use. Two interchangeable backends
//! implement the same get-or-create contract:
//!
//! 1. The OS credential store, driven through the platform `security` CLI
//!    (present on macOS). Selected by probing at runtime, not by
//!    compile-time branching, so one binary behaves correctly everywhere.
//! 2. A plain file under the log directory, owner-readable only.
//!
//! Absence is not an error: when neither backend can produce an identifier,
//! callers must treat telemetry as disabled for this process and skip logging
//! silently. A first-use race between concurrent processes can mint two
//! identifiers for the same account; that is accepted rather than adding
//! cross-process locking for a one-time provisioning event.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;
use uuid::Uuid;

use crate::types::DeviceId;

/// Credential-store service name keying the device identifier.
const SERVICE_NAME: &str = "com.hookmeter.device-id";

/// File name of the fallback identity store.
const FALLBACK_FILE_NAME: &str = ".device-id";

/// A backend capable of storing one identifier per account.
trait IdentityStore {
    /// Returns a previously stored identifier, if any.
    fn get(&self, account: &str) -> Option<String>;

    /// Stores an identifier; returns false on failure.
    fn put(&self, account: &str, id: &str) -> bool;
}

/// Credential-store backend backed by the platform `security` CLI.
struct KeychainStore;

impl KeychainStore {
    /// Probes whether the `security` binary can be spawned at all.
    fn available() -> bool {
        Command::new("security")
            .arg("help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

impl IdentityStore for KeychainStore {
    fn get(&self, account: &str) -> Option<String> {
        let output = Command::new("security")
            .args(["find-generic-password", "-a", account, "-s", SERVICE_NAME, "-w"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    fn put(&self, account: &str, id: &str) -> bool {
        Command::new("security")
            .args([
                "add-generic-password",
                "-a",
                account,
                "-s",
                SERVICE_NAME,
                "-w",
                id,
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// File-based fallback backend, owner-readable only.
struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn id_file(&self) -> PathBuf {
        self.dir.join(FALLBACK_FILE_NAME)
    }
}

impl IdentityStore for FileStore {
    fn get(&self, _account: &str) -> Option<String> {
        let contents = fs::read_to_string(self.id_file()).ok()?;
        let id = contents.trim().to_string();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    fn put(&self, _account: &str, id: &str) -> bool {
        if fs::create_dir_all(&self.dir).is_err() {
            return false;
        }
        let path = self.id_file();
        if fs::write(&path, id).is_err() {
            return false;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&path, fs::Permissions::from_mode(0o600));
        }

        true
    }
}

/// Resolves the per-device identifier for the current user account.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    fallback_dir: PathBuf,
}

impl IdentityProvider {
    /// Creates a provider whose file fallback lives under `fallback_dir`.
    #[must_use]
    pub fn new(fallback_dir: PathBuf) -> Self {
        Self { fallback_dir }
    }

    /// Resolves the identity for the account named by `$USER`/`$USERNAME`.
    ///
    /// Returns `None` when no account is resolvable or both backends fail;
    /// callers treat that as "telemetry disabled for this process".
    #[must_use]
    pub fn resolve(&self) -> Option<DeviceId> {
        let account = env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .ok()
            .filter(|a| !a.is_empty())?;
        self.resolve_for(&account)
    }

    /// Resolves (get-or-create) the identity for an explicit account.
    #[must_use]
    pub fn resolve_for(&self, account: &str) -> Option<DeviceId> {
        if account.is_empty() {
            return None;
        }

        if KeychainStore::available() {
            if let Some(id) = get_or_create(&KeychainStore, account) {
                return Some(DeviceId::new(id));
            }
            debug!("credential store present but unusable, trying file fallback");
        }

        let file_store = FileStore::new(self.fallback_dir.clone());
        match get_or_create(&file_store, account) {
            Some(id) => Some(DeviceId::new(id)),
            None => {
                debug!("device identity unavailable, telemetry disabled");
                None
            }
        }
    }
}

/// Get-or-create against one backend. The fresh value is only returned when
/// the store accepted it, so every later resolution observes the same id.
fn get_or_create(store: &dyn IdentityStore, account: &str) -> Option<String> {
    if let Some(existing) = store.get(account) {
        return Some(existing);
    }

    let fresh = Uuid::new_v4().to_string().to_uppercase();
    if store.put(account, &fresh) {
        Some(fresh)
    } else {
        None
    }
}
