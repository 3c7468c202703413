use crate::domain::{ProjectSummary, SessionSummary, parse_rfc3339_to_unix_ms, system_time_to_unix_ms};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Group sessions by working directory into projects.
///
/// Sessions inside each project and the projects themselves come out sorted
/// by modification time, newest first. Ties keep input order.
pub fn index_projects(sessions: &[SessionSummary]) -> Vec<ProjectSummary> {
    let mut grouped: BTreeMap<PathBuf, Vec<SessionSummary>> = BTreeMap::new();
    for session in sessions {
        grouped
            .entry(session.meta.cwd.clone())
            .or_default()
            .push(session.clone());
    }

    let mut projects: Vec<ProjectSummary> = grouped
        .into_iter()
        .map(|(project_path, mut project_sessions)| {
            sort_sessions_newest_first(&mut project_sessions);
            let total_messages = project_sessions
                .iter()
                .map(|session| session.message_count)
                .sum();
            let last_modified = project_sessions
                .iter()
                .filter_map(|session| session.file_modified)
                .max();
            ProjectSummary {
                name: project_path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| project_path.display().to_string()),
                project_path,
                sessions: project_sessions,
                total_messages,
                last_modified,
            }
        })
        .collect();

    projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    projects
}

/// Stable descending sort by modification time, falling back to the parsed
/// start timestamp for sessions whose file metadata is unavailable.
pub fn sort_sessions_newest_first(sessions: &mut [SessionSummary]) {
    sessions.sort_by(|a, b| session_sort_ms(b).cmp(&session_sort_ms(a)));
}

fn session_sort_ms(session: &SessionSummary) -> i64 {
    session
        .file_modified
        .and_then(system_time_to_unix_ms)
        .or_else(|| parse_rfc3339_to_unix_ms(&session.meta.started_at_rfc3339))
        .unwrap_or(0)
}

/// Recover a project path from an escaped directory key, restoring escaped
/// separators to literal ones (`-Users-a-proj` becomes `/Users/a/proj`).
///
/// Best effort: a hyphen that was literal in the original path is
/// indistinguishable from an escaped separator, so callers prefer explicit
/// path metadata and use this only as a last resort.
pub fn decode_project_key(key: &str) -> Option<PathBuf> {
    let rest = key.strip_prefix('-')?;
    if rest.is_empty() {
        return None;
    }
    Some(PathBuf::from(format!("/{}", rest.replace('-', "/"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgentSource, SessionMeta};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn session(cwd: &str, id: &str, messages: usize, modified_secs: u64) -> SessionSummary {
        SessionSummary {
            source: AgentSource::Codex,
            meta: SessionMeta {
                id: id.to_string(),
                cwd: PathBuf::from(cwd),
                started_at_rfc3339: "2024-01-01T00:00:00Z".to_string(),
            },
            log_path: PathBuf::from(format!("/logs/{id}.jsonl")),
            title: id.to_string(),
            message_count: messages,
            git_branch: None,
            provider: None,
            file_size_bytes: 1,
            file_modified: Some(UNIX_EPOCH + Duration::from_secs(modified_secs)),
        }
    }

    #[test]
    fn groups_by_cwd_and_sums_messages() {
        let sessions = vec![
            session("/tmp/a", "s1", 3, 100),
            session("/tmp/b", "s2", 5, 200),
            session("/tmp/a", "s3", 4, 300),
        ];
        let projects = index_projects(&sessions);
        assert_eq!(projects.len(), 2);

        let a = projects.iter().find(|p| p.name == "a").expect("project a");
        assert_eq!(a.sessions.len(), 2);
        assert_eq!(a.total_messages, 7);
        assert_eq!(a.sessions[0].meta.id, "s3");
    }

    #[test]
    fn projects_sorted_by_last_modified_descending() {
        let sessions = vec![
            session("/tmp/old", "s1", 1, 100),
            session("/tmp/new", "s2", 1, 900),
            session("/tmp/mid", "s3", 1, 500),
        ];
        let projects = index_projects(&sessions);
        let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);

        let times: Vec<SystemTime> = projects.iter().filter_map(|p| p.last_modified).collect();
        assert!(times.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn session_without_file_metadata_falls_back_to_start_timestamp() {
        let mut with_meta = session("/tmp/a", "s1", 1, 1_704_067_200); // 2024-01-01
        with_meta.file_modified = None;
        with_meta.meta.started_at_rfc3339 = "2024-06-01T00:00:00Z".to_string();
        let older = session("/tmp/a", "s2", 1, 1_704_067_200);

        let projects = index_projects(&[older, with_meta]);
        assert_eq!(projects[0].sessions[0].meta.id, "s1");
    }

    #[test]
    fn decodes_escaped_project_keys() {
        assert_eq!(
            decode_project_key("-Users-a-proj"),
            Some(PathBuf::from("/Users/a/proj"))
        );
        assert_eq!(decode_project_key("plain"), None);
        assert_eq!(decode_project_key("-"), None);
    }
}
