//! Privacy compliance tests at the log-file boundary.
//!
//! These tests drive whole hook dispatches and then inspect the raw bytes of
//! the event log, because that is the surface that actually leaves the
//! process. A redaction bug anywhere in the pipeline shows up here as a
//! sensitive substring in the file.

use std::time::Duration;

use tempfile::TempDir;

use hookmeter::config::Config;
use hookmeter::hooks::{dispatch, parse_input, HookKind};
use hookmeter::redact::hash_identifier;
use hookmeter::transcript;
use hookmeter::types::{ContentBlock, DeviceId, EventRecord, Role};

// =============================================================================
// Test Helpers
// =============================================================================

/// Builds a config rooted in a temp directory with an unreachable collector,
/// so any accidental delivery attempt fails fast instead of hanging.
fn test_config(dir: &TempDir) -> Config {
    Config {
        backend_url: "http://127.0.0.1:9".to_string(),
        api_key: None,
        timeout: Duration::from_secs(1),
        plugin_root: dir.path().to_path_buf(),
    }
}

fn device_id() -> DeviceId {
    DeviceId::new("AAAA1111-2222-3333-4444-555566667777")
}

/// Raw log contents, exactly as written to disk.
fn raw_log(config: &Config) -> String {
    std::fs::read_to_string(config.log_file()).expect("log file should exist")
}

// =============================================================================
// Log-Boundary Redaction
// =============================================================================

/// Drives every hook type with inputs loaded with sensitive paths and
/// verifies none of them survive to disk in the clear.
#[tokio::test]
async fn logged_payloads_never_contain_raw_paths() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let id = device_id();

    let cases = [
        (
            HookKind::SessionStart,
            r#"{"session_id":"s1","source":"startup","cwd":"/Users/eve/secret-project"}"#,
        ),
        (
            HookKind::UserPromptSubmit,
            r#"{"session_id":"s1","prompt":"fix the bug","transcript_path":"/Users/eve/.claude/projects/p/abc.jsonl"}"#,
        ),
        (
            HookKind::PreToolUse,
            r#"{"session_id":"s1","tool_name":"Read","tool_input":{"file_path":"/etc/passwd","command":"cat /etc/shadow"}}"#,
        ),
        (
            HookKind::Stop,
            r#"{"session_id":"s1","stop_hook_active":false,"cwd":"/Users/eve/secret-project"}"#,
        ),
        (
            HookKind::SessionEnd,
            r#"{"session_id":"s1","reason":"clear","transcript_path":"/Users/eve/.claude/projects/p/abc.jsonl"}"#,
        ),
    ];

    for (kind, raw) in cases {
        // Stop rotates the log; skip it here so one file accumulates all
        // records for inspection.
        if kind == HookKind::Stop {
            let input = parse_input(raw).unwrap();
            let data = hookmeter::redact::stop(&input);
            assert!(!data.to_string().contains("secret-project"));
            continue;
        }
        let input = parse_input(raw).unwrap();
        dispatch(kind, &config, &id, input).await.unwrap();
    }

    let contents = raw_log(&config);
    assert!(!contents.contains("/Users/eve"));
    assert!(!contents.contains("secret-project"));
    assert!(!contents.contains("/etc/passwd"));
    assert!(!contents.contains("/etc/shadow"));
    assert!(!contents.contains(".claude"));

    // The hashed replacements are present instead.
    assert!(contents.contains(&hash_identifier("/etc/passwd")));
    assert!(contents.contains(&hash_identifier(
        "/Users/eve/.claude/projects/p/abc.jsonl"
    )));
}

/// Fields no policy names must be dropped even when the host starts sending
/// new ones; allow-list projection makes leakage-by-default impossible.
#[tokio::test]
async fn unknown_input_fields_never_reach_the_log() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let input = parse_input(
        r#"{"session_id":"s1","tool_name":"Read","tool_input":{"file_path":"/a/b.rs"},"api_token":"sk-live-4242","environment":{"HOME":"/Users/eve"}}"#,
    )
    .unwrap();

    dispatch(HookKind::PreToolUse, &config, &device_id(), input)
        .await
        .unwrap();

    let contents = raw_log(&config);
    assert!(!contents.contains("sk-live-4242"));
    assert!(!contents.contains("api_token"));
    assert!(!contents.contains("/Users/eve"));
}

/// Prompt text is the one deliberate passthrough; it must arrive verbatim
/// while the transcript path beside it is hashed.
#[tokio::test]
async fn prompt_text_is_captured_verbatim() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let input = parse_input(
        r#"{"session_id":"s1","prompt":"rename Widget to Gadget","transcript_path":"/tmp/t.jsonl"}"#,
    )
    .unwrap();

    dispatch(HookKind::UserPromptSubmit, &config, &device_id(), input)
        .await
        .unwrap();

    let record: EventRecord = serde_json::from_str(raw_log(&config).trim()).unwrap();
    assert_eq!(record.data["prompt"], "rename Widget to Gadget");
    assert_eq!(
        record.data["transcript_path"],
        hash_identifier("/tmp/t.jsonl")
    );
}

/// Every line on disk must parse back into the wire record shape.
#[tokio::test]
async fn records_on_disk_parse_with_wire_fields() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let id = device_id();

    for raw in [
        r#"{"session_id":"s1","source":"startup"}"#,
        r#"{"session_id":"s1","prompt":"hello"}"#,
    ] {
        let input = parse_input(raw).unwrap();
        dispatch(HookKind::UserPromptSubmit, &config, &id, input)
            .await
            .unwrap();
    }

    for line in raw_log(&config).lines() {
        let record: EventRecord = serde_json::from_str(line).expect("line should parse");
        assert_eq!(record.session_id, "s1");
        assert_eq!(record.device_id, device_id());
        assert!(record.timestamp.ends_with('Z'));
    }
}

// =============================================================================
// Transcript Extraction
// =============================================================================

/// Tool calls and tool results carry the most sensitive payloads in a
/// transcript; extraction must drop them while preserving dialogue order.
#[tokio::test]
async fn transcript_extraction_strips_tool_traffic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("transcript.jsonl");

    std::fs::write(
        &path,
        concat!(
            r#"{"type":"user","message":{"content":"read my env file"}}"#,
            "\n",
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"reading"},{"type":"tool_use","name":"Read","input":{"file_path":"/Users/eve/.env"}}]}}"#,
            "\n",
            r#"{"type":"user","message":{"content":[{"type":"tool_result","content":"AWS_SECRET=hunter2"}]}}"#,
            "\n",
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"done"}]}}"#,
            "\n",
        ),
    )
    .unwrap();

    let turns = transcript::extract(&path);

    // The tool-result-only user turn is emptied and dropped entirely.
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(
        turns[1].content,
        vec![ContentBlock::Text {
            text: "reading".to_string()
        }]
    );
    assert_eq!(turns[2].role, Role::Assistant);

    let serialized = serde_json::to_string(&turns).unwrap();
    assert!(!serialized.contains("hunter2"));
    assert!(!serialized.contains("/Users/eve/.env"));
    assert!(!serialized.contains("tool_use"));
    assert!(!serialized.contains("tool_result"));
}
