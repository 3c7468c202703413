use crate::domain::HistoryEntry;
use crate::infra::ResolveRootError;
use dirs::home_dir;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub fn resolve_claude_history_path() -> Result<PathBuf, ResolveRootError> {
    if let Some(override_path) = std::env::var_os("CLAUDE_HISTORY_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveRootError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("history.jsonl"))
}

const HISTORY_TAIL_BYTES: usize = 256 * 1024;

/// Newest-first prompt entries from the history log, at most `limit`.
///
/// Reads a bounded tail of the file rather than the whole thing; malformed
/// lines (including the one possibly cut by the tail boundary) are skipped.
/// A missing file is simply no history.
pub fn load_history_tail(path: &Path, limit: usize) -> Vec<HistoryEntry> {
    if limit == 0 {
        return Vec::new();
    }

    let Ok((tail, size)) = read_tail(path, HISTORY_TAIL_BYTES) else {
        return Vec::new();
    };
    let truncated = size > HISTORY_TAIL_BYTES as u64;

    let mut lines: Vec<&str> = tail.lines().collect();
    if truncated && !lines.is_empty() {
        lines.remove(0);
    }

    lines
        .into_iter()
        .rev()
        .filter_map(parse_history_line)
        .take(limit)
        .collect()
}

fn parse_history_line(line: &str) -> Option<HistoryEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(trimmed).ok()?;
    let text = value
        .get("display")
        .or_else(|| value.get("prompt"))
        .and_then(|v| v.as_str())?
        .to_string();

    let timestamp_ms = value
        .get("timestamp")
        .and_then(|v| v.as_i64())
        .map(normalize_to_ms);
    let project_path = value
        .get("project")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let session_id = value
        .get("sessionId")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Some(HistoryEntry {
        text,
        timestamp_ms,
        project_path,
        session_id,
    })
}

// History timestamps have been written in both seconds and milliseconds
// across CLI versions.
fn normalize_to_ms(timestamp: i64) -> i64 {
    if timestamp != 0 && timestamp.abs() < 100_000_000_000 {
        timestamp.saturating_mul(1000)
    } else {
        timestamp
    }
}

pub fn read_tail(path: &Path, max_bytes: usize) -> io::Result<(String, u64)> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    let start = size.saturating_sub(max_bytes as u64);
    file.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok((String::from_utf8_lossy(&buf).to_string(), size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn returns_newest_first_up_to_limit() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("history.jsonl");
        let mut file = File::create(&path).expect("create");
        for i in 0..5 {
            writeln!(
                file,
                r#"{{"display":"prompt {i}","timestamp":1704412800{i},"project":"/tmp/p"}}"#
            )
            .expect("write");
        }

        let entries = load_history_tail(&path, 3);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "prompt 4");
        assert_eq!(entries[2].text, "prompt 2");
        assert_eq!(entries[0].project_path, Some(PathBuf::from("/tmp/p")));
    }

    #[test]
    fn skips_malformed_lines_and_missing_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("history.jsonl");
        fs::write(
            &path,
            "not json\n{\"display\":\"ok\",\"timestamp\":1704412800}\n{\"noDisplay\":true}\n",
        )
        .expect("write");

        let entries = load_history_tail(&path, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "ok");
        // Seconds-precision timestamps are normalized to milliseconds.
        assert_eq!(entries[0].timestamp_ms, Some(1_704_412_800_000));

        assert!(load_history_tail(&dir.path().join("missing.jsonl"), 10).is_empty());
    }

    #[test]
    fn reads_bounded_tail_of_large_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("big.jsonl");
        let mut file = File::create(&path).expect("create");
        for i in 0..20_000 {
            writeln!(file, r#"{{"display":"entry {i}","timestamp":1704412800000}}"#)
                .expect("write");
        }

        let entries = load_history_tail(&path, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "entry 19999");
    }
}
