use chrono::{DateTime, NaiveDateTime, Utc};

/// 解析服务端返回的时间字符串
///
/// 支持带时区的 RFC 3339，以及不带时区的 ISO 8601（按 UTC 处理）。
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// 相对时间显示，如 "5分钟前"
pub fn format_relative_time(value: &str) -> String {
    format_relative_time_at(value, Utc::now())
}

/// 以 `now` 为基准的相对时间显示
///
/// 无法解析的输入原样返回；晚于 `now` 的时间显示为 "0分钟前"。
pub fn format_relative_time_at(value: &str, now: DateTime<Utc>) -> String {
    let Some(timestamp) = parse_timestamp(value) else {
        tracing::debug!("Unparseable timestamp: {}", value);
        return value.to_string();
    };

    let elapsed = now.signed_duration_since(timestamp);
    let hours = elapsed.num_hours();

    if hours < 1 {
        format!("{}分钟前", elapsed.num_minutes().max(0))
    } else if hours < 24 {
        format!("{}小时前", hours)
    } else {
        format!("{}天前", hours / 24)
    }
}
