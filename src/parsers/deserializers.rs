use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Numeric timestamps at or above this value are milliseconds, below it seconds
const MILLIS_THRESHOLD: f64 = 1e10;

/// Resolve a raw timestamp value (RFC3339 string or Unix seconds/milliseconds)
pub fn resolve_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let raw = n.as_f64()?;
            if raw == 0.0 || !raw.is_finite() {
                return None;
            }
            let millis = if raw >= MILLIS_THRESHOLD { raw } else { raw * 1000.0 };
            DateTime::from_timestamp_millis(millis as i64)
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = s.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Timestamp field that never fails: unparseable values become `None`
pub fn deserialize_lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(resolve_timestamp(&value))
}

/// Field that never fails: values of the wrong shape become `None`
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_timestamp_seconds() {
        let ts = resolve_timestamp(&json!(1719225600)).unwrap();
        assert_eq!(ts, Utc.timestamp_opt(1719225600, 0).unwrap());
    }

    #[test]
    fn test_timestamp_milliseconds() {
        let ts = resolve_timestamp(&json!(1762076480016_i64)).unwrap();
        assert_eq!(ts, DateTime::from_timestamp_millis(1762076480016).unwrap());
    }

    #[test]
    fn test_timestamp_threshold_is_milliseconds() {
        let ts = resolve_timestamp(&json!(10_000_000_000_i64)).unwrap();
        assert_eq!(ts.timestamp_millis(), 10_000_000_000);
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = resolve_timestamp(&json!("2025-06-24T10:00:05Z")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 6, 24, 10, 0, 5).unwrap());
    }

    #[test]
    fn test_timestamp_without_zone() {
        let ts = resolve_timestamp(&json!("2024-01-01T10:00:30")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 30).unwrap());
    }

    #[test]
    fn test_timestamp_date_only() {
        let ts = resolve_timestamp(&json!("2024-01-02")).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_timestamp_invalid_values() {
        assert!(resolve_timestamp(&json!("not a date")).is_none());
        assert!(resolve_timestamp(&json!("")).is_none());
        assert!(resolve_timestamp(&json!(0)).is_none());
        assert!(resolve_timestamp(&json!(null)).is_none());
        assert!(resolve_timestamp(&json!([1, 2])).is_none());
    }
}
