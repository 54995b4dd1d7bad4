//! Atomic log-file rotation.
//!
//! Rotation detaches the active log file by renaming it to a
//! timestamp-suffixed path, so the next append by any writer creates a brand
//! new file at the original logical path instead of racing on the same inode.
//! The rename's filesystem-level atomicity is the pipeline's only
//! mutual-exclusion mechanism: when two processes attempt rotation around the
//! same time, exactly one wins the rename and the loser observes expected
//! contention, not an error.
//!
//! A successfully rotated file is never referenced again by its original
//! logical path.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;

/// Atomically detaches the active log file.
///
/// Returns the detached path on a won rotation, or `None` when there is
/// nothing to rotate or another process rotated first.
#[must_use]
pub fn rotate(active_path: &Path) -> Option<PathBuf> {
    if !active_path.exists() {
        return None;
    }

    let detached = rotated_path(active_path, Utc::now().timestamp_micros());
    match fs::rename(active_path, &detached) {
        Ok(()) => {
            debug!(detached = %detached.display(), "rotated active log");
            Some(detached)
        }
        Err(e) => {
            // Expected contention: another process won the rename.
            debug!(error = %e, "rotation lost to a concurrent process");
            None
        }
    }
}

/// Builds the detached path: the active path suffixed with a
/// high-resolution timestamp.
fn rotated_path(active_path: &Path, timestamp_micros: i64) -> PathBuf {
    let mut name = active_path.as_os_str().to_os_string();
    name.push(format!(".{timestamp_micros}"));
    PathBuf::from(name)
}
