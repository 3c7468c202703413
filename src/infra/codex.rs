use crate::domain::{
    AgentSource, SessionSummary, derive_title_from_user_text, is_metadata_prompt,
    parse_session_meta_line, parse_user_message_text, sort_sessions_newest_first,
};
use dirs::home_dir;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Count of soft failures a scan skipped over. Never fatal; surfaced so the
/// host can hint that some data is missing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanWarningCount(usize);

impl From<usize> for ScanWarningCount {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl ScanWarningCount {
    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum ResolveRootError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

pub fn resolve_codex_sessions_dir() -> Result<PathBuf, ResolveRootError> {
    if let Some(override_dir) = std::env::var_os("CODEX_SESSIONS_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveRootError::HomeDirNotFound);
    };

    Ok(home.join(".codex").join("sessions"))
}

#[derive(Clone, Debug)]
pub struct ScanOutput {
    pub sessions: Vec<SessionSummary>,
    pub warnings: ScanWarningCount,
    pub notice: Option<String>,
}

/// Scan the Codex sessions root (nested `YYYY/MM/DD` directories of
/// transcript files). A missing root is an empty result with a notice, not
/// an error; a file whose first line is not a `session_meta` envelope is
/// skipped. Duplicate session ids are preserved.
pub fn scan_codex_sessions_dir(sessions_dir: &Path) -> ScanOutput {
    if !sessions_dir.exists() {
        return ScanOutput {
            sessions: Vec::new(),
            warnings: ScanWarningCount::from(0usize),
            notice: Some(format!(
                "Codex sessions dir not found: {}",
                sessions_dir.display()
            )),
        };
    }

    let mut warnings = 0usize;
    let mut sessions: Vec<SessionSummary> = Vec::new();

    let walker = WalkDir::new(sessions_dir).follow_links(false).into_iter();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_error) => {
                warnings += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
            continue;
        }

        match scan_codex_session_file(entry.path()) {
            Ok(summary) => sessions.push(summary),
            Err(SkipFile) => warnings += 1,
        }
    }

    sort_sessions_newest_first(&mut sessions);

    ScanOutput {
        sessions,
        warnings: ScanWarningCount::from(warnings),
        notice: None,
    }
}

/// Marker for per-file soft failures; the cause is deliberately dropped.
struct SkipFile;

const MAX_TITLE_SCAN_LINES: usize = 250;

fn scan_codex_session_file(path: &Path) -> Result<SessionSummary, SkipFile> {
    let file = File::open(path).map_err(|_| SkipFile)?;
    let metadata = file.metadata().map_err(|_| SkipFile)?;
    let file_size_bytes = metadata.len();
    let file_modified = metadata.modified().ok();

    let mut reader = BufReader::new(file);
    let mut first_line = String::new();
    let bytes = reader.read_line(&mut first_line).map_err(|_| SkipFile)?;
    if bytes == 0 {
        return Err(SkipFile);
    }

    let parsed = parse_session_meta_line(first_line.trim_end()).map_err(|_| SkipFile)?;

    let mut title: Option<String> = None;
    let mut event_count = 0usize;
    let mut scanned_lines = 0usize;
    loop {
        let mut line = String::new();
        let bytes = match reader.read_line(&mut line) {
            Ok(bytes) => bytes,
            Err(_) => break,
        };
        if bytes == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        event_count += 1;

        if title.is_some() {
            continue;
        }
        scanned_lines += 1;
        if scanned_lines > MAX_TITLE_SCAN_LINES {
            continue;
        }
        let Ok(Some(text)) = parse_user_message_text(line.trim_end()) else {
            continue;
        };
        if is_metadata_prompt(&text) {
            continue;
        }
        title = derive_title_from_user_text(&text);
    }

    let display_title = title.unwrap_or_else(|| "(untitled)".to_string());

    Ok(SessionSummary {
        source: AgentSource::Codex,
        meta: parsed.meta,
        log_path: path.to_path_buf(),
        title: display_title,
        message_count: event_count,
        git_branch: None,
        provider: parsed.originator,
        file_size_bytes,
        file_modified,
    })
}
