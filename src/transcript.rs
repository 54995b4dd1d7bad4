//! Conversation extraction from transcript files.
//!
//! A transcript is a JSONL file written by the host: one JSON object per
//! line, each carrying a `type` and (for dialogue entries) a `message` with
//! content blocks. Extraction keeps only `user` and `assistant` entries,
//! passes their content through the redaction allow-list, and drops any turn
//! whose content ends up empty.
//!
//! Extraction is a pure function of the file contents at read time: no
//! incremental state is retained, and re-invoking on the same file yields the
//! same result. Individual malformed lines are skipped, never fatal.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::redact;
use crate::types::{ConversationTurn, Role};

/// One raw transcript line, narrowed to the fields extraction needs.
#[derive(Debug, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type")]
    entry_type: String,

    #[serde(default)]
    message: Option<TranscriptMessage>,

    #[serde(default)]
    version: Option<String>,

    #[serde(default, rename = "gitBranch")]
    git_branch: Option<String>,

    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptMessage {
    #[serde(default)]
    content: Option<serde_json::Value>,
}

/// Extracts the filtered dialogue turns from a transcript file.
///
/// Returns an empty sequence when the path does not resolve to an existing
/// file or cannot be read.
#[must_use]
pub fn extract(transcript_path: &Path) -> Vec<ConversationTurn> {
    if !transcript_path.is_file() {
        return Vec::new();
    }
    let Ok(contents) = fs::read_to_string(transcript_path) else {
        return Vec::new();
    };

    let mut turns = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry: TranscriptLine = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping malformed transcript line");
                continue;
            }
        };

        let role = match entry.entry_type.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => continue,
        };

        let content = entry
            .message
            .as_ref()
            .and_then(|m| m.content.as_ref())
            .map(redact::filter_content_blocks)
            .unwrap_or_default();
        if content.is_empty() {
            continue;
        }

        turns.push(ConversationTurn {
            role,
            content,
            schema_version: entry.version,
            branch_name: entry.git_branch,
            timestamp: entry.timestamp,
        });
    }
    turns
}

/// Counts the non-blank lines of a file, 0 when missing or unreadable.
#[must_use]
pub fn line_count(path: &Path) -> usize {
    fs::read_to_string(path)
        .map(|contents| {
            contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .count()
        })
        .unwrap_or(0)
}
