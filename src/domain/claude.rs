use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// Per-project session index written by the Claude CLI. Older caches store
/// the records under `sessions` instead of `entries`; both parse the same.
#[derive(Clone, Debug, Deserialize)]
pub struct ClaudeSessionsIndex {
    #[serde(rename = "originalPath")]
    pub original_path: Option<String>,

    #[serde(default, alias = "sessions")]
    pub entries: Vec<ClaudeSessionsIndexEntry>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClaudeSessionsIndexEntry {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,

    #[serde(rename = "fullPath")]
    pub full_path: Option<PathBuf>,

    #[serde(default)]
    pub created: Option<String>,

    #[serde(default)]
    pub modified: Option<String>,

    #[serde(rename = "messageCount", default)]
    pub message_count: Option<usize>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(rename = "firstPrompt", default)]
    pub first_prompt: Option<String>,

    #[serde(rename = "projectPath", default)]
    pub project_path: Option<String>,

    #[serde(rename = "gitBranch", default)]
    pub git_branch: Option<String>,
}

pub fn parse_claude_sessions_index(text: &str) -> Result<ClaudeSessionsIndex, serde_json::Error> {
    serde_json::from_str(text)
}

/// Whatever session metadata a transcript line happens to carry. Claude
/// transcripts repeat `cwd`/`sessionId` on most records, so probing a few
/// leading lines is usually enough.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClaudeSessionMetaHint {
    pub cwd: Option<PathBuf>,
    pub session_id: Option<String>,
    pub timestamp: Option<String>,
    pub git_branch: Option<String>,
}

pub fn extract_claude_session_meta_hint(value: &Value) -> ClaudeSessionMetaHint {
    let cwd = value
        .get("cwd")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| {
            value
                .get("projectPath")
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
        });
    let session_id = value
        .get("sessionId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let timestamp = value
        .get("timestamp")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let git_branch = value
        .get("gitBranch")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    ClaudeSessionMetaHint {
        cwd,
        session_id,
        timestamp,
        git_branch,
    }
}

/// True for transcript records that count as conversation messages.
pub fn is_claude_message_record(value: &Value) -> bool {
    matches!(
        value.get("type").and_then(|v| v.as_str()),
        Some("user") | Some("assistant")
    )
}

pub fn parse_claude_user_message_text(value: &Value) -> Option<String> {
    if value.get("type").and_then(|v| v.as_str()) != Some("user") {
        return None;
    }

    let message = value.get("message").unwrap_or(&Value::Null);
    let content = message.get("content").unwrap_or(&Value::Null);
    let text = extract_text_blocks(content);
    if text.trim().is_empty() { None } else { Some(text) }
}

fn extract_text_blocks(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|block| {
                if block.get("type").and_then(|v| v.as_str()) == Some("text") {
                    return block.get("text").and_then(|v| v.as_str());
                }
                None
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sessions_index_entries() {
        let json = r#"{
            "originalPath": "/tmp/project",
            "entries": [
                {
                    "sessionId": "s1",
                    "fullPath": "/tmp/log.jsonl",
                    "created": "2026-02-19T00:00:00Z",
                    "modified": "2026-02-19T00:01:00Z",
                    "messageCount": 12,
                    "summary": "hello",
                    "firstPrompt": "hello world",
                    "gitBranch": "main"
                }
            ]
        }"#;
        let parsed = parse_claude_sessions_index(json).expect("parse");
        assert_eq!(parsed.original_path.as_deref(), Some("/tmp/project"));
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].session_id.as_deref(), Some("s1"));
        assert_eq!(parsed.entries[0].message_count, Some(12));
        assert_eq!(parsed.entries[0].git_branch.as_deref(), Some("main"));
    }

    #[test]
    fn parses_legacy_sessions_field_name() {
        let json = r#"{
            "originalPath": "/tmp/project",
            "sessions": [
                { "sessionId": "legacy", "fullPath": "/tmp/l.jsonl" }
            ]
        }"#;
        let parsed = parse_claude_sessions_index(json).expect("parse");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].session_id.as_deref(), Some("legacy"));
    }

    #[test]
    fn extracts_meta_hints_from_transcript_record() {
        let value = serde_json::json!({
            "type": "user",
            "cwd": "/tmp/p",
            "sessionId": "s1",
            "timestamp": "2026-02-19T00:00:00Z",
            "gitBranch": "dev",
            "message": { "content": "hello" }
        });
        let hint = extract_claude_session_meta_hint(&value);
        assert_eq!(hint.cwd, Some(PathBuf::from("/tmp/p")));
        assert_eq!(hint.session_id.as_deref(), Some("s1"));
        assert_eq!(hint.git_branch.as_deref(), Some("dev"));
        assert!(is_claude_message_record(&value));
    }

    #[test]
    fn extracts_user_text_from_string_and_block_content() {
        let plain = serde_json::json!({
            "type": "user",
            "message": { "content": "hello\nworld" }
        });
        assert_eq!(
            parse_claude_user_message_text(&plain),
            Some("hello\nworld".to_string())
        );

        let blocks = serde_json::json!({
            "type": "user",
            "message": { "content": [ { "type": "text", "text": "from blocks" } ] }
        });
        assert_eq!(
            parse_claude_user_message_text(&blocks),
            Some("from blocks".to_string())
        );
    }
}
