use crate::domain::SessionMeta;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct SessionMetaLine {
    #[serde(rename = "type")]
    line_type: String,
    payload: SessionMetaPayload,
}

#[derive(Debug, Deserialize)]
struct SessionMetaPayload {
    id: String,
    timestamp: String,
    cwd: String,

    #[serde(default)]
    originator: Option<String>,

    #[serde(default)]
    cli_version: Option<String>,

    #[serde(default)]
    source: Option<String>,
}

/// Parsed `session_meta` envelope from the first line of a Codex transcript.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodexSessionMeta {
    pub meta: SessionMeta,
    pub originator: Option<String>,
    pub cli_version: Option<String>,
    pub source: Option<String>,
}

/// Decode a transcript's first line. A line that is valid JSON but not a
/// `session_meta` envelope is a typed failure so callers can skip the file.
pub fn parse_session_meta_line(line: &str) -> Result<CodexSessionMeta, ParseError> {
    let parsed: SessionMetaLine = serde_json::from_str(line)?;
    if parsed.line_type != "session_meta" {
        return Err(ParseError::MissingField("type=session_meta"));
    }

    Ok(CodexSessionMeta {
        meta: SessionMeta {
            id: parsed.payload.id,
            cwd: PathBuf::from(parsed.payload.cwd),
            started_at_rfc3339: parsed.payload.timestamp,
        },
        originator: parsed.payload.originator,
        cli_version: parsed.payload.cli_version,
        source: parsed.payload.source,
    })
}

#[derive(Debug, Deserialize)]
struct ResponseItemLine {
    #[serde(rename = "type")]
    line_type: String,
    payload: ResponseItemPayload,
}

#[derive(Debug, Deserialize)]
struct ResponseItemPayload {
    #[serde(rename = "type")]
    payload_type: String,
    role: Option<String>,
    content: Option<Vec<ContentItem>>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Extract the text of a user message from a Codex transcript line, if the
/// line is one.
pub fn parse_user_message_text(line: &str) -> Result<Option<String>, ParseError> {
    let parsed: ResponseItemLine = serde_json::from_str(line)?;
    if parsed.line_type != "response_item" {
        return Ok(None);
    }
    if parsed.payload.payload_type != "message" {
        return Ok(None);
    }
    if parsed.payload.role.as_deref() != Some("user") {
        return Ok(None);
    }

    let Some(content) = parsed.payload.content else {
        return Ok(None);
    };

    for item in content {
        if item.content_type == "input_text" {
            if let Some(text) = item.text {
                return Ok(Some(text));
            }
        }
    }

    Ok(None)
}

/// Prompts injected by the CLIs themselves, not worth using as titles.
pub fn is_metadata_prompt(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with("# AGENTS.md instructions")
        || trimmed.starts_with("<environment_context>")
        || trimmed.starts_with("<INSTRUCTIONS>")
        || (trimmed.starts_with("<skill>") && trimmed.contains("</skill>"))
        || trimmed.starts_with("<command-name>")
}

pub fn derive_title_from_user_text(text: &str) -> Option<String> {
    let first_line = text
        .lines()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())?;
    Some(first_line.to_string())
}
