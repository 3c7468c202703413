use crate::domain::{
    ActivitySnapshot, ModelUsageSummary, ProjectSummary, StatsCache, combine_model_usage,
    index_projects, recent_activity, today_iso_date,
};
use crate::infra::{
    ResolveRootError, ScanWarningCount, load_stats_cache, resolve_claude_projects_dir,
    resolve_claude_stats_path, resolve_codex_sessions_dir, scan_claude_projects_dir,
    scan_codex_sessions_dir,
};
use std::path::Path;

/// Everything the presentation layer needs for one render, computed fresh.
#[derive(Clone, Debug)]
pub struct DashboardData {
    pub projects: Vec<ProjectSummary>,
    pub snapshot: ActivitySnapshot,
    pub model_usage: Vec<ModelUsageSummary>,
    pub warnings: ScanWarningCount,
    pub notice: Option<String>,
}

/// Full refresh against the default roots (honoring env overrides).
pub fn refresh_dashboard() -> DashboardData {
    let (claude_projects_dir, claude_notice) = resolved_or_notice(
        resolve_claude_projects_dir(),
        "Claude projects dir disabled: home directory not found",
    );
    let (codex_sessions_dir, codex_notice) = resolved_or_notice(
        resolve_codex_sessions_dir(),
        "Codex sessions dir disabled: home directory not found",
    );
    let stats_path = resolve_claude_stats_path().ok();

    refresh_dashboard_with_paths(RefreshPaths {
        claude_projects_dir: claude_projects_dir.as_deref(),
        codex_sessions_dir: codex_sessions_dir.as_deref(),
        stats_path: stats_path.as_deref(),
        resolve_notices: [claude_notice, codex_notice].into_iter().flatten().collect(),
    })
}

pub struct RefreshPaths<'a> {
    pub claude_projects_dir: Option<&'a Path>,
    pub codex_sessions_dir: Option<&'a Path>,
    pub stats_path: Option<&'a Path>,
    pub resolve_notices: Vec<String>,
}

/// Refresh against explicit roots. Both scanners run even when one root is
/// missing; all soft failures fold into the warning count and notice.
pub fn refresh_dashboard_with_paths(paths: RefreshPaths<'_>) -> DashboardData {
    let mut sessions = Vec::new();
    let mut warnings = 0usize;
    let mut notices = paths.resolve_notices;

    if let Some(dir) = paths.claude_projects_dir {
        let output = scan_claude_projects_dir(dir);
        warnings += output.warnings.get();
        sessions.extend(output.sessions);
        if let Some(notice) = output.notice {
            notices.push(notice);
        }
    }

    if let Some(dir) = paths.codex_sessions_dir {
        let output = scan_codex_sessions_dir(dir);
        warnings += output.warnings.get();
        sessions.extend(output.sessions);
        if let Some(notice) = output.notice {
            notices.push(notice);
        }
    }

    let cache: Option<StatsCache> = paths.stats_path.and_then(load_stats_cache);
    let snapshot = recent_activity(cache.as_ref(), &today_iso_date());
    let model_usage = cache
        .as_ref()
        .map(|cache| {
            combine_model_usage(
                cache
                    .model_usage
                    .iter()
                    .map(|(model_id, tokens)| (model_id.as_str(), *tokens)),
            )
        })
        .unwrap_or_default();

    DashboardData {
        projects: index_projects(&sessions),
        snapshot,
        model_usage,
        warnings: ScanWarningCount::from(warnings),
        notice: join_notices(notices),
    }
}

fn resolved_or_notice(
    resolved: Result<std::path::PathBuf, ResolveRootError>,
    notice: &str,
) -> (Option<std::path::PathBuf>, Option<String>) {
    match resolved {
        Ok(dir) => (Some(dir), None),
        Err(ResolveRootError::HomeDirNotFound) => (None, Some(notice.to_string())),
    }
}

fn join_notices(notices: Vec<String>) -> Option<String> {
    let text = notices
        .into_iter()
        .map(|notice| notice.trim().to_string())
        .filter(|notice| !notice.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    if text.is_empty() { None } else { Some(text) }
}
