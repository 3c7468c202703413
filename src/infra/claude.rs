use crate::domain::{
    AgentSource, ClaudeSessionMetaHint, ClaudeSessionsIndexEntry, SessionMeta, SessionSummary,
    decode_project_key, derive_title_from_user_text, extract_claude_session_meta_hint,
    is_claude_message_record, is_metadata_prompt, parse_claude_sessions_index,
    parse_claude_user_message_text, sort_sessions_newest_first,
};
use crate::infra::{ResolveRootError, ScanOutput, ScanWarningCount};
use dirs::home_dir;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn resolve_claude_projects_dir() -> Result<PathBuf, ResolveRootError> {
    if let Some(override_dir) = std::env::var_os("CLAUDE_PROJECTS_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveRootError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("projects"))
}

/// Scan the Claude projects root: one directory per escaped project key,
/// each holding transcript files and usually a `sessions-index.json`.
///
/// The index is the fast path; key directories without one (or with an
/// unreadable one) fall back to probing each transcript's leading lines.
/// Missing root is an empty result with a notice.
pub fn scan_claude_projects_dir(projects_dir: &Path) -> ScanOutput {
    if !projects_dir.exists() {
        return ScanOutput {
            sessions: Vec::new(),
            warnings: ScanWarningCount::from(0usize),
            notice: Some(format!(
                "Claude projects dir not found: {}",
                projects_dir.display()
            )),
        };
    }

    let Ok(entries) = fs::read_dir(projects_dir) else {
        return ScanOutput {
            sessions: Vec::new(),
            warnings: ScanWarningCount::from(0usize),
            notice: Some(format!(
                "Claude projects dir is not readable: {}",
                projects_dir.display()
            )),
        };
    };

    let mut warnings = 0usize;
    let mut sessions: Vec<SessionSummary> = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => {
                warnings += 1;
                continue;
            }
        };

        let Ok(file_type) = entry.file_type() else {
            warnings += 1;
            continue;
        };
        if !file_type.is_dir() {
            continue;
        }

        let output = scan_project_key_dir(&entry.path());
        warnings += output.warnings;
        sessions.extend(output.sessions);
    }

    sort_sessions_newest_first(&mut sessions);

    ScanOutput {
        sessions,
        warnings: ScanWarningCount::from(warnings),
        notice: None,
    }
}

struct KeyDirOutput {
    sessions: Vec<SessionSummary>,
    warnings: usize,
}

fn scan_project_key_dir(key_dir: &Path) -> KeyDirOutput {
    let index_path = key_dir.join("sessions-index.json");
    if index_path.is_file() {
        let parsed = fs::read_to_string(&index_path)
            .ok()
            .and_then(|text| parse_claude_sessions_index(&text).ok());
        if let Some(index) = parsed {
            return scan_from_sessions_index(key_dir, index);
        }

        let mut fallback = scan_from_transcript_files(key_dir);
        fallback.warnings = fallback.warnings.saturating_add(1);
        return fallback;
    }

    scan_from_transcript_files(key_dir)
}

fn scan_from_sessions_index(
    key_dir: &Path,
    index: crate::domain::ClaudeSessionsIndex,
) -> KeyDirOutput {
    let mut sessions: Vec<SessionSummary> = Vec::new();
    let mut warnings = 0usize;

    let index_project_path = index.original_path.map(PathBuf::from);
    for entry in index.entries {
        match summary_from_index_entry(key_dir, &index_project_path, &entry) {
            Ok(summary) => sessions.push(summary),
            Err(SkipEntry) => warnings += 1,
        }
    }

    // An index that maps to nothing on disk is as good as no index.
    if sessions.is_empty() {
        let fallback = scan_from_transcript_files(key_dir);
        warnings += fallback.warnings;
        sessions.extend(fallback.sessions);
    }

    KeyDirOutput { sessions, warnings }
}

struct SkipEntry;

fn summary_from_index_entry(
    key_dir: &Path,
    index_project_path: &Option<PathBuf>,
    entry: &ClaudeSessionsIndexEntry,
) -> Result<SessionSummary, SkipEntry> {
    let full_path = entry.full_path.as_ref().ok_or(SkipEntry)?;
    let log_path = if full_path.is_absolute() {
        full_path.clone()
    } else {
        key_dir.join(full_path)
    };

    let metadata = fs::metadata(&log_path).map_err(|_| SkipEntry)?;
    let file_size_bytes = metadata.len();
    let file_modified = metadata.modified().ok();

    let hint = probe_transcript_meta_hint(&log_path);
    let cwd = entry
        .project_path
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| index_project_path.clone())
        .or_else(|| hint.cwd.clone())
        .or_else(|| key_dir_project_path(key_dir))
        .ok_or(SkipEntry)?;

    let started_at_rfc3339 = entry
        .created
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .or_else(|| {
            entry
                .modified
                .as_ref()
                .filter(|s| !s.trim().is_empty())
                .cloned()
        })
        .or_else(|| hint.timestamp.clone())
        .or_else(|| file_modified.and_then(system_time_to_rfc3339))
        .unwrap_or_else(now_rfc3339);

    let session_id = entry
        .session_id
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .or_else(|| hint.session_id.clone())
        .or_else(|| file_stem_string(&log_path))
        .unwrap_or_else(|| "(unknown)".to_string());

    let title = entry
        .summary
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .or_else(|| {
            entry
                .first_prompt
                .as_ref()
                .and_then(|text| derive_title_from_user_text(text))
        })
        .unwrap_or_else(|| "(untitled)".to_string());

    let message_count = match entry.message_count {
        Some(count) => count,
        None => count_transcript_messages(&log_path),
    };

    Ok(SessionSummary {
        source: AgentSource::Claude,
        meta: SessionMeta {
            id: session_id,
            cwd,
            started_at_rfc3339,
        },
        log_path,
        title,
        message_count,
        git_branch: entry.git_branch.clone().or(hint.git_branch),
        provider: None,
        file_size_bytes,
        file_modified,
    })
}

fn scan_from_transcript_files(key_dir: &Path) -> KeyDirOutput {
    let mut sessions: Vec<SessionSummary> = Vec::new();
    let mut warnings = 0usize;

    let entries = match fs::read_dir(key_dir) {
        Ok(entries) => entries,
        Err(_) => {
            return KeyDirOutput {
                sessions,
                warnings: 1,
            };
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => {
                warnings += 1;
                continue;
            }
        };

        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("jsonl") {
            continue;
        }

        match scan_claude_transcript(key_dir, &path) {
            Ok(summary) => sessions.push(summary),
            Err(SkipEntry) => warnings += 1,
        }
    }

    KeyDirOutput { sessions, warnings }
}

const MAX_META_SCAN_LINES: usize = 250;
const MAX_META_SCAN_BYTES: usize = 512 * 1024;

fn probe_transcript_meta_hint(path: &Path) -> ClaudeSessionMetaHint {
    let Ok(file) = File::open(path) else {
        return ClaudeSessionMetaHint::default();
    };
    let mut reader = BufReader::new(file);

    let mut bytes_read = 0usize;
    for _ in 0..MAX_META_SCAN_LINES {
        let mut line = String::new();
        let Ok(bytes) = reader.read_line(&mut line) else {
            return ClaudeSessionMetaHint::default();
        };
        if bytes == 0 {
            break;
        }
        bytes_read = bytes_read.saturating_add(bytes);
        if bytes_read > MAX_META_SCAN_BYTES {
            break;
        }

        let value: serde_json::Value = match serde_json::from_str(line.trim_end()) {
            Ok(value) => value,
            Err(_) => continue,
        };
        let hint = extract_claude_session_meta_hint(&value);
        if hint.cwd.is_some() || hint.session_id.is_some() || hint.timestamp.is_some() {
            return hint;
        }
    }

    ClaudeSessionMetaHint::default()
}

fn scan_claude_transcript(key_dir: &Path, path: &Path) -> Result<SessionSummary, SkipEntry> {
    let metadata = fs::metadata(path).map_err(|_| SkipEntry)?;
    let file_size_bytes = metadata.len();
    let file_modified = metadata.modified().ok();

    let file = File::open(path).map_err(|_| SkipEntry)?;
    let reader = BufReader::new(file);

    let mut hint = ClaudeSessionMetaHint::default();
    let mut title: Option<String> = None;
    let mut message_count = 0usize;

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(line) => line,
            Err(_) => break,
        };

        let value: serde_json::Value = match serde_json::from_str(line.trim_end()) {
            Ok(value) => value,
            Err(_) => continue,
        };

        if is_claude_message_record(&value) {
            message_count += 1;
        }

        let next = extract_claude_session_meta_hint(&value);
        if hint.cwd.is_none() {
            hint.cwd = next.cwd;
        }
        if hint.session_id.is_none() {
            hint.session_id = next.session_id;
        }
        if hint.timestamp.is_none() {
            hint.timestamp = next.timestamp;
        }
        if hint.git_branch.is_none() {
            hint.git_branch = next.git_branch;
        }

        if title.is_none() {
            if let Some(text) = parse_claude_user_message_text(&value) {
                if !is_metadata_prompt(&text) {
                    title = derive_title_from_user_text(&text);
                }
            }
        }
    }

    let cwd = hint
        .cwd
        .or_else(|| key_dir_project_path(key_dir))
        .ok_or(SkipEntry)?;
    let session_id = hint
        .session_id
        .or_else(|| file_stem_string(path))
        .unwrap_or_else(|| "(unknown)".to_string());
    let started_at_rfc3339 = hint
        .timestamp
        .or_else(|| file_modified.and_then(system_time_to_rfc3339))
        .unwrap_or_else(now_rfc3339);
    let display_title = title.unwrap_or_else(|| "(untitled)".to_string());

    Ok(SessionSummary {
        source: AgentSource::Claude,
        meta: SessionMeta {
            id: session_id,
            cwd,
            started_at_rfc3339,
        },
        log_path: path.to_path_buf(),
        title: display_title,
        message_count,
        git_branch: hint.git_branch,
        provider: None,
        file_size_bytes,
        file_modified,
    })
}

fn count_transcript_messages(path: &Path) -> usize {
    let Ok(file) = File::open(path) else {
        return 0;
    };
    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter(|line| {
            serde_json::from_str::<serde_json::Value>(line.trim_end())
                .map(|value| is_claude_message_record(&value))
                .unwrap_or(false)
        })
        .count()
}

fn key_dir_project_path(key_dir: &Path) -> Option<PathBuf> {
    key_dir
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(decode_project_key)
}

fn file_stem_string(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

fn system_time_to_rfc3339(value: SystemTime) -> Option<String> {
    let timestamp = OffsetDateTime::from(value);
    timestamp.format(&Rfc3339).ok()
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
