use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AgentSource {
    Claude,
    Codex,
}

impl AgentSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Codex => "Codex",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionMeta {
    pub id: String,
    pub cwd: PathBuf,
    pub started_at_rfc3339: String,
}

/// One recorded interaction transcript. Identity is the log path plus the
/// parsed id; duplicate ids across files are preserved as-is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionSummary {
    pub source: AgentSource,
    pub meta: SessionMeta,
    pub log_path: PathBuf,
    pub title: String,
    pub message_count: usize,
    pub git_branch: Option<String>,
    pub provider: Option<String>,
    pub file_size_bytes: u64,
    pub file_modified: Option<SystemTime>,
}

/// Derived grouping of sessions sharing a working directory. Recomputed on
/// every refresh, never persisted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub project_path: PathBuf,
    pub sessions: Vec<SessionSummary>,
    pub total_messages: usize,
    pub last_modified: Option<SystemTime>,
}

/// One prompt line from the history log.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistoryEntry {
    pub text: String,
    pub timestamp_ms: Option<i64>,
    pub project_path: Option<PathBuf>,
    pub session_id: Option<String>,
}
