//! Privacy redaction for hook payloads.
//!
//! Every payload that reaches the event log is produced here by an explicit
//! allow-list projection: fields are copied from the raw hook input only when
//! a policy names them, so a new field added upstream can never leak by
//! default. Redaction is scoped to identifiers (file paths, transcript
//! paths), which are replaced by a truncated digest; free-text fields that
//! are explicitly intended for capture (prompt text) pass through unmodified.
//!
//! The per-event policies are fixed mappings, not runtime configuration.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::types::{ContentBlock, HookInput};

/// Number of hex characters kept from a SHA-256 digest.
///
/// 64 bits is enough for human-scannable correlation; collision resistance
/// is not a goal.
pub const HASH_PREFIX_LEN: usize = 16;

/// Hashes an identifier: SHA-256 over its raw UTF-8 bytes, lowercase hex,
/// truncated to [`HASH_PREFIX_LEN`] characters. Empty input hashes to the
/// empty string. Deterministic across invocations and platforms.
#[must_use]
pub fn hash_identifier(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(HASH_PREFIX_LEN);
    hex
}

/// PreToolUse policy: tool metadata plus a `tool_input` object containing
/// only the hashed `file_path` (omitted when the path is empty or absent).
#[must_use]
pub fn pre_tool_use(input: &HookInput) -> Value {
    let mut tool_input = Map::new();
    if let Some(path) = input
        .tool_input
        .as_ref()
        .and_then(|t| t.get("file_path"))
        .and_then(Value::as_str)
    {
        if !path.is_empty() {
            tool_input.insert(
                "file_path".to_string(),
                Value::String(hash_identifier(path)),
            );
        }
    }

    let mut data = Map::new();
    insert_opt(&mut data, "permission_mode", &input.permission_mode);
    insert_opt(&mut data, "tool_name", &input.tool_name);
    data.insert("tool_input".to_string(), Value::Object(tool_input));
    insert_opt(&mut data, "tool_use_id", &input.tool_use_id);
    Value::Object(data)
}

/// UserPromptSubmit policy: hashed transcript path (omitted when absent),
/// permission mode, and the prompt text unmodified.
#[must_use]
pub fn user_prompt_submit(input: &HookInput) -> Value {
    let mut data = Map::new();
    if let Some(path) = input.transcript_path.as_deref() {
        if !path.is_empty() {
            data.insert(
                "transcript_path".to_string(),
                Value::String(hash_identifier(path)),
            );
        }
    }
    insert_opt(&mut data, "permission_mode", &input.permission_mode);
    insert_opt(&mut data, "prompt", &input.prompt);
    Value::Object(data)
}

/// SessionStart policy: permission mode and startup source only.
#[must_use]
pub fn session_start(input: &HookInput) -> Value {
    let mut data = Map::new();
    insert_opt(&mut data, "permission_mode", &input.permission_mode);
    insert_opt(&mut data, "source", &input.source);
    Value::Object(data)
}

/// SessionEnd policy: permission mode and end reason only.
#[must_use]
pub fn session_end(input: &HookInput) -> Value {
    let mut data = Map::new();
    insert_opt(&mut data, "permission_mode", &input.permission_mode);
    insert_opt(&mut data, "reason", &input.reason);
    Value::Object(data)
}

/// Stop policy: permission mode and the stop-hook-active flag only.
#[must_use]
pub fn stop(input: &HookInput) -> Value {
    let mut data = Map::new();
    insert_opt(&mut data, "permission_mode", &input.permission_mode);
    if let Some(active) = input.stop_hook_active {
        data.insert("stop_hook_active".to_string(), Value::Bool(active));
    }
    Value::Object(data)
}

/// Filters raw transcript message content down to the block allow-list.
///
/// Accepts either an array of content blocks or a bare string (older
/// transcript entries store user content as a plain string, which becomes a
/// single `text` block). Blocks of any other type fail the tagged decode in
/// [`ContentBlock`] and are dropped.
#[must_use]
pub fn filter_content_blocks(content: &Value) -> Vec<ContentBlock> {
    match content {
        Value::String(text) if !text.is_empty() => vec![ContentBlock::Text { text: text.clone() }],
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|block| serde_json::from_value::<ContentBlock>(block.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn insert_opt(data: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        data.insert(key.to_string(), Value::String(value.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(json: Value) -> HookInput {
        serde_json::from_value(json).unwrap()
    }

    // =========================================================================
    // hash_identifier
    // =========================================================================

    #[test]
    fn hash_is_deterministic_and_fixed_length() {
        let a = hash_identifier("/etc/passwd");
        let b = hash_identifier("/etc/passwd");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_PREFIX_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_of_known_value() {
        // sha256("/etc/passwd") truncated to 16 hex characters.
        assert_eq!(hash_identifier("/etc/passwd"), "74acf31844532670");
    }

    #[test]
    fn hash_of_empty_string_is_empty() {
        assert_eq!(hash_identifier(""), "");
    }

    #[test]
    fn hash_never_contains_the_original() {
        let path = "/home/user/project/secret.rs";
        let hash = hash_identifier(path);
        assert!(!hash.contains(path));
        assert!(!hash.contains("secret"));
    }

    // =========================================================================
    // PreToolUse
    // =========================================================================

    #[test]
    fn pre_tool_use_hashes_file_path() {
        let input = input_with(serde_json::json!({
            "session_id": "s1",
            "permission_mode": "default",
            "tool_name": "Read",
            "tool_use_id": "tu_1",
            "tool_input": {"file_path": "/etc/passwd", "limit": 100}
        }));

        let data = pre_tool_use(&input);
        assert_eq!(data["tool_name"], "Read");
        assert_eq!(data["tool_use_id"], "tu_1");
        assert_eq!(
            data["tool_input"]["file_path"],
            hash_identifier("/etc/passwd")
        );
        // Only file_path survives inside tool_input.
        assert_eq!(data["tool_input"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn pre_tool_use_omits_empty_file_path() {
        let input = input_with(serde_json::json!({
            "tool_name": "Bash",
            "tool_input": {"command": "rm -rf /", "file_path": ""}
        }));

        let data = pre_tool_use(&input);
        let tool_input = data["tool_input"].as_object().unwrap();
        assert!(tool_input.is_empty());
    }

    #[test]
    fn pre_tool_use_without_tool_input_keeps_empty_object() {
        let input = input_with(serde_json::json!({"tool_name": "WebSearch"}));

        let data = pre_tool_use(&input);
        assert!(data["tool_input"].as_object().unwrap().is_empty());
        assert!(data.get("permission_mode").is_none());
    }

    #[test]
    fn pre_tool_use_drops_unknown_fields() {
        let input = input_with(serde_json::json!({
            "tool_name": "Read",
            "tool_input": {"file_path": "/a/b.rs"},
            "cwd": "/home/user/project",
            "prompt": "should not appear here"
        }));

        let data = pre_tool_use(&input);
        let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["tool_input", "tool_name"]);
    }

    // =========================================================================
    // UserPromptSubmit
    // =========================================================================

    #[test]
    fn user_prompt_submit_hashes_transcript_and_keeps_prompt() {
        let input = input_with(serde_json::json!({
            "transcript_path": "~/.claude/projects/p/abc.jsonl",
            "permission_mode": "default",
            "prompt": "please refactor the parser"
        }));

        let data = user_prompt_submit(&input);
        assert_eq!(
            data["transcript_path"],
            hash_identifier("~/.claude/projects/p/abc.jsonl")
        );
        assert_eq!(data["prompt"], "please refactor the parser");
        assert!(!data.to_string().contains(".claude"));
    }

    #[test]
    fn user_prompt_submit_omits_absent_transcript() {
        let input = input_with(serde_json::json!({"prompt": "hi"}));

        let data = user_prompt_submit(&input);
        assert!(data.get("transcript_path").is_none());
        assert_eq!(data["prompt"], "hi");
    }

    // =========================================================================
    // Session / Stop policies
    // =========================================================================

    #[test]
    fn session_start_keeps_only_mode_and_source() {
        let input = input_with(serde_json::json!({
            "permission_mode": "plan",
            "source": "startup",
            "transcript_path": "/leaky/path.jsonl"
        }));

        let data = session_start(&input);
        let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["permission_mode", "source"]);
    }

    #[test]
    fn session_end_keeps_only_mode_and_reason() {
        let input = input_with(serde_json::json!({
            "permission_mode": "default",
            "reason": "exit",
            "cwd": "/secret"
        }));

        let data = session_end(&input);
        let keys: Vec<&String> = data.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["permission_mode", "reason"]);
    }

    #[test]
    fn stop_keeps_flag() {
        let input = input_with(serde_json::json!({
            "permission_mode": "default",
            "stop_hook_active": true
        }));

        let data = stop(&input);
        assert_eq!(data["stop_hook_active"], true);
    }

    #[test]
    fn stop_omits_absent_flag() {
        let input = input_with(serde_json::json!({"permission_mode": "default"}));

        let data = stop(&input);
        assert!(data.get("stop_hook_active").is_none());
    }

    // =========================================================================
    // Content-block filter
    // =========================================================================

    #[test]
    fn filter_keeps_text_and_thinking() {
        let content = serde_json::json!([
            {"type": "thinking", "thinking": "plan it", "signature": "sig"},
            {"type": "text", "text": "done"},
            {"type": "tool_use", "name": "Read", "input": {"file_path": "/x"}},
            {"type": "tool_result", "content": "big blob"}
        ]);

        let blocks = filter_content_blocks(&content);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Thinking {
                    thinking: "plan it".to_string()
                },
                ContentBlock::Text {
                    text: "done".to_string()
                },
            ]
        );
    }

    #[test]
    fn filter_tool_only_content_is_empty() {
        let content = serde_json::json!([
            {"type": "tool_use", "name": "Bash", "input": {"command": "ls"}}
        ]);
        assert!(filter_content_blocks(&content).is_empty());
    }

    #[test]
    fn filter_string_content_becomes_text_block() {
        let content = serde_json::json!("plain user message");
        assert_eq!(
            filter_content_blocks(&content),
            vec![ContentBlock::Text {
                text: "plain user message".to_string()
            }]
        );
    }

    #[test]
    fn filter_handles_missing_and_odd_content() {
        assert!(filter_content_blocks(&Value::Null).is_empty());
        assert!(filter_content_blocks(&serde_json::json!({})).is_empty());
        assert!(filter_content_blocks(&serde_json::json!("")).is_empty());
    }
}
