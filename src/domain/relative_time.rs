use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Short human label for a past instant, evaluated against `now_ms`.
///
/// Thresholds use truncating division: 59s is still "just now", 60s is
/// "1m ago". Anything a week or more in the past renders as a calendar
/// date. Instants in the future clamp to "just now".
pub fn format_relative_time(then_ms: i64, now_ms: i64) -> String {
    let elapsed_ms = now_ms.saturating_sub(then_ms).max(0);

    if elapsed_ms < MINUTE_MS {
        return "just now".to_string();
    }
    if elapsed_ms < HOUR_MS {
        return format!("{}m ago", elapsed_ms / MINUTE_MS);
    }
    if elapsed_ms < DAY_MS {
        return format!("{}h ago", elapsed_ms / HOUR_MS);
    }
    if elapsed_ms < 7 * DAY_MS {
        return format!("{}d ago", elapsed_ms / DAY_MS);
    }

    format_calendar_date(then_ms)
}

fn format_calendar_date(unix_ms: i64) -> String {
    let format = format_description!("[month repr:short] [day padding:none], [year]");
    i128::from(unix_ms)
        .checked_mul(1_000_000)
        .and_then(|nanos| OffsetDateTime::from_unix_timestamp_nanos(nanos).ok())
        .and_then(|timestamp| timestamp.format(&format).ok())
        .unwrap_or_else(|| "(unknown date)".to_string())
}

pub fn parse_rfc3339_to_unix_ms(value: &str) -> Option<i64> {
    let timestamp = OffsetDateTime::parse(value, &Rfc3339).ok()?;
    let ms: i128 = timestamp.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).ok()
}

pub fn system_time_to_unix_ms(value: SystemTime) -> Option<i64> {
    let delta = value.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(delta.as_millis()).ok()
}

pub fn now_unix_ms() -> i64 {
    system_time_to_unix_ms(SystemTime::now()).unwrap_or(0)
}
