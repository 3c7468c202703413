use crate::domain::StatsCache;
use crate::infra::ResolveRootError;
use dirs::home_dir;
use std::fs;
use std::path::{Path, PathBuf};

pub fn resolve_claude_stats_path() -> Result<PathBuf, ResolveRootError> {
    if let Some(override_path) = std::env::var_os("CLAUDE_STATS_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveRootError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("stats-cache.json"))
}

/// Best-effort read of the usage statistics cache. Absent or malformed
/// caches are `None`; the aggregators treat that as an empty snapshot.
pub fn load_stats_cache(path: &Path) -> Option<StatsCache> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_a_valid_cache() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("stats-cache.json");
        fs::write(
            &path,
            r#"{"version": 2, "totalSessions": 3, "dailyActivity": [{"date": "2024-01-05", "messageCount": 9}]}"#,
        )
        .expect("write");

        let cache = load_stats_cache(&path).expect("cache");
        assert_eq!(cache.total_sessions, Some(3));
        assert_eq!(cache.daily_activity[0].message_count, 9);
    }

    #[test]
    fn missing_or_malformed_cache_is_none() {
        let dir = tempdir().expect("tempdir");
        assert!(load_stats_cache(&dir.path().join("nope.json")).is_none());

        let path = dir.path().join("bad.json");
        fs::write(&path, "not json at all").expect("write");
        assert!(load_stats_cache(&path).is_none());
    }
}
