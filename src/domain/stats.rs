use serde::Deserialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::format_description;

/// Usage statistics cache maintained by the Claude CLI. Foreign-owned and
/// read-only; every field tolerates absence.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct StatsCache {
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(rename = "totalSessions", default)]
    pub total_sessions: Option<u64>,

    #[serde(rename = "totalMessages", default)]
    pub total_messages: Option<u64>,

    #[serde(rename = "dailyActivity", default)]
    pub daily_activity: Vec<DailyActivity>,

    #[serde(rename = "dailyModelTokens", default)]
    pub daily_model_tokens: Vec<DailyModelTokens>,

    #[serde(rename = "modelUsage", default)]
    pub model_usage: BTreeMap<String, ModelTokens>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DailyActivity {
    pub date: String,

    #[serde(rename = "messageCount", default)]
    pub message_count: u64,

    #[serde(rename = "sessionCount", default)]
    pub session_count: u64,

    #[serde(rename = "toolCallCount", default)]
    pub tool_call_count: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DailyModelTokens {
    pub date: String,

    #[serde(rename = "tokensByModel", default)]
    pub tokens_by_model: BTreeMap<String, u64>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ModelTokens {
    #[serde(rename = "inputTokens", default)]
    pub input_tokens: u64,

    #[serde(rename = "outputTokens", default)]
    pub output_tokens: u64,
}

/// Aggregated activity for one resolved calendar day.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActivitySnapshot {
    pub date: String,
    pub messages: u64,
    pub sessions: u64,
    pub tool_calls: u64,
    pub total_tokens: u64,
}

impl ActivitySnapshot {
    fn zero(date: &str) -> Self {
        Self {
            date: date.to_string(),
            messages: 0,
            sessions: 0,
            tool_calls: 0,
            total_tokens: 0,
        }
    }
}

/// Resolve a recent-activity snapshot out of the stats cache.
///
/// Prefers the entry for `today` (ISO calendar date). When today has no
/// entry the chronologically last one stands in and labels the snapshot
/// with its own date. An absent or empty cache yields an all-zero snapshot
/// labeled `today`.
pub fn recent_activity(cache: Option<&StatsCache>, today: &str) -> ActivitySnapshot {
    let Some(cache) = cache else {
        return ActivitySnapshot::zero(today);
    };

    let resolved = cache
        .daily_activity
        .iter()
        .find(|day| day.date == today)
        .or_else(|| cache.daily_activity.last());
    let Some(day) = resolved else {
        return ActivitySnapshot::zero(today);
    };

    ActivitySnapshot {
        date: day.date.clone(),
        messages: day.message_count,
        sessions: day.session_count,
        tool_calls: day.tool_call_count,
        total_tokens: tokens_for_date(cache, &day.date),
    }
}

/// Sum of all per-model tokens recorded for one date. A day with partial
/// model data sums whatever is present.
fn tokens_for_date(cache: &StatsCache, date: &str) -> u64 {
    cache
        .daily_model_tokens
        .iter()
        .filter(|day| day.date == date)
        .flat_map(|day| day.tokens_by_model.values())
        .sum()
}

/// Today's ISO calendar date at the local midnight boundary, falling back
/// to UTC when the local offset cannot be determined.
pub fn today_iso_date() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[year]-[month]-[day]");
    now.date()
        .format(&format)
        .unwrap_or_else(|_| "1970-01-01".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_days(dates: &[&str]) -> StatsCache {
        StatsCache {
            daily_activity: dates
                .iter()
                .enumerate()
                .map(|(i, date)| DailyActivity {
                    date: date.to_string(),
                    message_count: (i as u64 + 1) * 10,
                    session_count: i as u64 + 1,
                    tool_call_count: i as u64,
                })
                .collect(),
            ..StatsCache::default()
        }
    }

    #[test]
    fn uses_todays_entry_when_present() {
        let cache = cache_with_days(&["2024-01-04", "2024-01-05"]);
        let snapshot = recent_activity(Some(&cache), "2024-01-04");
        assert_eq!(snapshot.date, "2024-01-04");
        assert_eq!(snapshot.messages, 10);
    }

    #[test]
    fn falls_back_to_last_recorded_day_not_zeros() {
        let cache = cache_with_days(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-03",
            "2024-01-04",
            "2024-01-05",
        ]);
        let snapshot = recent_activity(Some(&cache), "2024-03-01");
        assert_eq!(snapshot.date, "2024-01-05");
        assert_eq!(snapshot.messages, 50);
        assert_eq!(snapshot.sessions, 5);
    }

    #[test]
    fn absent_or_empty_cache_yields_zero_snapshot_for_today() {
        let snapshot = recent_activity(None, "2024-02-02");
        assert_eq!(snapshot, ActivitySnapshot::zero("2024-02-02"));

        let empty = StatsCache::default();
        let snapshot = recent_activity(Some(&empty), "2024-02-02");
        assert_eq!(snapshot.date, "2024-02-02");
        assert_eq!(snapshot.total_tokens, 0);
    }

    #[test]
    fn sums_partial_model_tokens_for_resolved_day() {
        let mut cache = cache_with_days(&["2024-01-05"]);
        cache.daily_model_tokens = vec![DailyModelTokens {
            date: "2024-01-05".to_string(),
            tokens_by_model: [
                ("claude-opus-4".to_string(), 1_200u64),
                ("claude-haiku-3".to_string(), 300u64),
            ]
            .into_iter()
            .collect(),
        }];

        let snapshot = recent_activity(Some(&cache), "2024-01-05");
        assert_eq!(snapshot.total_tokens, 1_500);
    }

    #[test]
    fn parses_camel_case_cache_json() {
        let json = r#"{
            "version": 2,
            "totalSessions": 5,
            "totalMessages": 100,
            "dailyActivity": [
                {"date": "2024-01-05", "messageCount": 12, "sessionCount": 2, "toolCallCount": 7}
            ],
            "dailyModelTokens": [
                {"date": "2024-01-05", "tokensByModel": {"claude-opus-4": 900}}
            ],
            "modelUsage": {"claude-opus-4": {"inputTokens": 600, "outputTokens": 400}}
        }"#;
        let cache: StatsCache = serde_json::from_str(json).expect("parse");
        assert_eq!(cache.total_sessions, Some(5));
        assert_eq!(cache.daily_activity[0].tool_call_count, 7);
        assert_eq!(
            cache.model_usage["claude-opus-4"],
            ModelTokens {
                input_tokens: 600,
                output_tokens: 400
            }
        );
    }
}
